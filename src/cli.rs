use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "straighten")]
#[command(
    about = "Rotate a scanned document image so its text lines are horizontal",
    override_usage = "straighten -i <inputfile> -o <outputfile>"
)]
pub struct Cli {
    /// Input image path
    #[arg(short = 'i', long = "ifile", value_name = "inputfile")]
    pub input: PathBuf,

    /// Output image path; the format follows its extension
    #[arg(short = 'o', long = "ofile", value_name = "outputfile")]
    pub output: PathBuf,
}
