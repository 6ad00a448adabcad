use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use straighten::{Cli, StraightenConfig, Straightener};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let straightener = Straightener::new(StraightenConfig::default())
        .context("Invalid straightening configuration")?;

    straightener
        .straighten_file(&cli.input, &cli.output)
        .with_context(|| format!("Failed to straighten {:?} into {:?}", cli.input, cli.output))?;

    Ok(())
}
