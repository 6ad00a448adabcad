use std::path::PathBuf;

use image::ImageError;
use thiserror::Error;

/// Failures of the straightening pipeline, one variant per stage
#[derive(Debug, Error)]
pub enum StraightenError {
    #[error("failed to load image {path:?}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("image processing failed: {0}")]
    Processing(String),

    #[error("no lines reached the Hough vote threshold of {vote_threshold}")]
    Detection { vote_threshold: u32 },

    #[error("failed to write image {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StraightenError>;
