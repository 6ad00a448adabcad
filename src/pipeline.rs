use std::path::Path;

use image::{DynamicImage, ImageDecoder, ImageError, ImageReader, Rgb, RgbImage};
use log::{debug, info};

use crate::artifacts::DebugArtifacts;
use crate::config::StraightenConfig;
use crate::detection::detect_document_lines;
use crate::error::{Result, StraightenError};
use crate::geometry::{rotation_matrix, select_rotation_angle};
use crate::preprocess::preprocess;
use crate::transform::warp_affine;

/// Outcome of skew detection on one image
#[derive(Debug, Clone)]
pub struct SkewReport {
    /// Counter-clockwise rotation in degrees that levels the text lines
    pub angle: f64,
    /// Number of Hough lines the angle was chosen from
    pub line_count: usize,
    /// Dimensions the detection stages ran at
    pub detection_size: (u32, u32),
}

/// Read an image from disk as 8-bit RGB
///
/// The format is guessed from the file contents and any EXIF orientation is
/// applied. Alpha and extra bit depth are dropped.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let load_error = |source: ImageError| StraightenError::Load {
        path: path.to_path_buf(),
        source,
    };

    let mut decoder = ImageReader::open(path)
        .map_err(|e| load_error(ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| load_error(ImageError::IoError(e)))?
        .into_decoder()
        .map_err(load_error)?;
    let orientation = decoder.orientation().map_err(load_error)?;
    let mut img = DynamicImage::from_decoder(decoder).map_err(load_error)?;
    img.apply_orientation(orientation);

    debug!(
        "Loaded image: {:?} ({}x{}, {:?})",
        path,
        img.width(),
        img.height(),
        orientation
    );
    Ok(img.to_rgb8())
}

/// Write an image in the format implied by the path's extension
pub fn save_image(img: &RgbImage, path: &Path) -> Result<()> {
    img.save(path).map_err(|source| StraightenError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Rotate an image about its center, keeping its dimensions
pub fn rotate_image(img: &RgbImage, angle_degrees: f64, fill: Rgb<u8>) -> Result<RgbImage> {
    let center = (img.width() as f64 / 2.0, img.height() as f64 / 2.0);
    let matrix = rotation_matrix(center, angle_degrees, 1.0);
    warp_affine(img, &matrix, fill)
}

/// Document straightening pipeline
///
/// Load → preprocess → detect → select → rotate → save. Any stage failure
/// aborts the run.
#[derive(Debug, Clone)]
pub struct Straightener {
    config: StraightenConfig,
    artifacts: DebugArtifacts,
}

impl Straightener {
    /// Create a pipeline after validating the configuration
    pub fn new(config: StraightenConfig) -> Result<Self> {
        config.validate()?;
        let artifacts = DebugArtifacts::new(config.debug_artifacts.clone());
        if let Some(dir) = artifacts.dir() {
            debug!("Debug artifacts enabled in {:?}", dir);
        }
        Ok(Self { config, artifacts })
    }

    pub fn config(&self) -> &StraightenConfig {
        &self.config
    }

    /// Find the rotation that levels the text lines of `img`
    pub fn detect_skew(&self, img: &RgbImage) -> Result<SkewReport> {
        let pre = preprocess(img, &self.config, &self.artifacts)?;
        let detection = detect_document_lines(&pre, &self.config, &self.artifacts)?;

        // No line reached the vote threshold
        let angle = select_rotation_angle(&detection.lines, self.config.angle_selection).ok_or(
            StraightenError::Detection {
                vote_threshold: self.config.hough_vote_threshold,
            },
        )?;

        debug!(
            "Selected {:.3}° from {} lines ({:?})",
            angle,
            detection.lines.len(),
            self.config.angle_selection
        );

        Ok(SkewReport {
            angle,
            line_count: detection.lines.len(),
            detection_size: pre.gray.dimensions(),
        })
    }

    /// Detect the skew of `img` and return the rotated full-resolution image
    pub fn straighten(&self, img: &RgbImage) -> Result<(RgbImage, SkewReport)> {
        let report = self.detect_skew(img)?;
        let rotated = rotate_image(img, report.angle, Rgb(self.config.border_color))?;
        Ok((rotated, report))
    }

    /// Straighten the image at `input` and write the result to `output`
    pub fn straighten_file(&self, input: &Path, output: &Path) -> Result<SkewReport> {
        let img = load_image(input)?;
        let (rotated, report) = self.straighten(&img)?;
        save_image(&rotated, output)?;

        info!(
            "Rotated {:?} by {:.2}° ({}x{}) -> {:?}",
            input,
            report.angle,
            rotated.width(),
            rotated.height(),
            output
        );
        Ok(report)
    }
}
