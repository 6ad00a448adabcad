pub mod artifacts;
pub mod cli;
pub mod config;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod preprocess;
pub mod transform;

pub use artifacts::DebugArtifacts;
pub use cli::Cli;
pub use config::{StraightenConfig, StraightenConfigBuilder};
pub use detection::{detect_document_lines, LineDetection};
pub use error::{Result, StraightenError};
pub use geometry::{rotation_from_theta, select_rotation_angle, AngleSelection, DetectedLine};
pub use pipeline::{load_image, rotate_image, save_image, SkewReport, Straightener};
pub use preprocess::{preprocess, Preprocessed};
pub use transform::{resize_by_factor, warp_affine};
