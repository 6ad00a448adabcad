use std::path::PathBuf;

use crate::error::{Result, StraightenError};
use crate::geometry::AngleSelection;

/// Images taller than this many rows are downscaled before detection
pub const DEFAULT_DOWNSCALE_THRESHOLD: u32 = 2000;

/// Scale factor applied to both dimensions of oversized images
pub const DEFAULT_DOWNSCALE_FACTOR: f64 = 0.15;

/// Gaussian kernel size (odd)
pub const DEFAULT_BLUR_KERNEL_SIZE: u32 = 9;

pub const DEFAULT_CANNY_LOW: f32 = 100.0;
pub const DEFAULT_CANNY_HIGH: f32 = 200.0;

/// Minimum accumulator votes for a Hough line to be reported
pub const DEFAULT_HOUGH_VOTE_THRESHOLD: u32 = 250;

/// Radius of the accumulator local-maximum check
pub const DEFAULT_HOUGH_SUPPRESSION_RADIUS: u32 = 1;

/// Fill for pixels rotated in from outside the frame
pub const DEFAULT_BORDER_COLOR: [u8; 3] = [0, 0, 0];

/// Tunable parameters of the straightening pipeline
///
/// Defaults are the long-standing fixed constants of the tool. The debug
/// artifact directory defaults to the working directory when the crate is
/// built with the `debug-artifacts` feature, and is disabled otherwise.
#[derive(Debug, Clone)]
pub struct StraightenConfig {
    pub downscale_threshold: u32,
    pub downscale_factor: f64,
    pub blur_kernel_size: u32,
    /// Gaussian sigma; 0 derives it from the kernel size
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    pub hough_vote_threshold: u32,
    pub hough_suppression_radius: u32,
    pub angle_selection: AngleSelection,
    pub border_color: [u8; 3],
    /// Directory receiving intermediate images, if any
    pub debug_artifacts: Option<PathBuf>,
}

impl Default for StraightenConfig {
    fn default() -> Self {
        Self {
            downscale_threshold: DEFAULT_DOWNSCALE_THRESHOLD,
            downscale_factor: DEFAULT_DOWNSCALE_FACTOR,
            blur_kernel_size: DEFAULT_BLUR_KERNEL_SIZE,
            blur_sigma: 0.0,
            canny_low: DEFAULT_CANNY_LOW,
            canny_high: DEFAULT_CANNY_HIGH,
            hough_vote_threshold: DEFAULT_HOUGH_VOTE_THRESHOLD,
            hough_suppression_radius: DEFAULT_HOUGH_SUPPRESSION_RADIUS,
            angle_selection: AngleSelection::default(),
            border_color: DEFAULT_BORDER_COLOR,
            debug_artifacts: cfg!(feature = "debug-artifacts").then(|| PathBuf::from(".")),
        }
    }
}

impl StraightenConfig {
    pub fn builder() -> StraightenConfigBuilder {
        StraightenConfigBuilder::default()
    }

    /// Reject parameter combinations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.downscale_factor > 0.0 && self.downscale_factor <= 1.0) {
            return Err(StraightenError::Config(format!(
                "downscale factor must be in (0, 1], got {}",
                self.downscale_factor
            )));
        }
        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(StraightenError::Config(format!(
                "blur kernel size must be odd and positive, got {}",
                self.blur_kernel_size
            )));
        }
        if !(self.blur_sigma.is_finite() && self.blur_sigma >= 0.0) {
            return Err(StraightenError::Config(format!(
                "blur sigma must be finite and non-negative, got {}",
                self.blur_sigma
            )));
        }
        if !(self.canny_low.is_finite() && self.canny_high.is_finite()) {
            return Err(StraightenError::Config(format!(
                "canny thresholds must be finite, got {} and {}",
                self.canny_low, self.canny_high
            )));
        }
        if self.canny_low > self.canny_high {
            return Err(StraightenError::Config(format!(
                "canny low threshold {} exceeds high threshold {}",
                self.canny_low, self.canny_high
            )));
        }
        if self.hough_vote_threshold == 0 {
            return Err(StraightenError::Config(
                "hough vote threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Gaussian sigma actually applied, deriving it from the kernel size when unset
    pub fn effective_blur_sigma(&self) -> f32 {
        if self.blur_sigma > 0.0 {
            self.blur_sigma
        } else {
            0.3 * ((self.blur_kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
        }
    }
}

/// Builder for StraightenConfig
#[derive(Debug, Default)]
pub struct StraightenConfigBuilder {
    config: StraightenConfig,
}

impl StraightenConfigBuilder {
    #[must_use]
    pub fn downscale(mut self, threshold: u32, factor: f64) -> Self {
        self.config.downscale_threshold = threshold;
        self.config.downscale_factor = factor;
        self
    }

    #[must_use]
    pub fn blur(mut self, kernel_size: u32, sigma: f32) -> Self {
        self.config.blur_kernel_size = kernel_size;
        self.config.blur_sigma = sigma;
        self
    }

    #[must_use]
    pub fn canny(mut self, low: f32, high: f32) -> Self {
        self.config.canny_low = low;
        self.config.canny_high = high;
        self
    }

    #[must_use]
    pub fn hough(mut self, vote_threshold: u32, suppression_radius: u32) -> Self {
        self.config.hough_vote_threshold = vote_threshold;
        self.config.hough_suppression_radius = suppression_radius;
        self
    }

    #[must_use]
    pub fn angle_selection(mut self, policy: AngleSelection) -> Self {
        self.config.angle_selection = policy;
        self
    }

    #[must_use]
    pub fn border_color(mut self, color: [u8; 3]) -> Self {
        self.config.border_color = color;
        self
    }

    /// Write intermediate images into `dir`, or disable with `None`
    #[must_use]
    pub fn debug_artifacts(mut self, dir: Option<PathBuf>) -> Self {
        self.config.debug_artifacts = dir;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<StraightenConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let config = StraightenConfig::default();
        assert_eq!(config.downscale_threshold, 2000);
        assert_eq!(config.downscale_factor, 0.15);
        assert_eq!(config.blur_kernel_size, 9);
        assert_eq!(config.canny_low, 100.0);
        assert_eq!(config.canny_high, 200.0);
        assert_eq!(config.hough_vote_threshold, 250);
        assert_eq!(config.angle_selection, AngleSelection::Last);
        assert_eq!(config.border_color, [0, 0, 0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_derived_sigma_for_9x9_kernel() {
        let config = StraightenConfig::default();
        assert!((config.effective_blur_sigma() - 1.7).abs() < 1e-5);

        let explicit = StraightenConfig {
            blur_sigma: 2.5,
            ..Default::default()
        };
        assert_eq!(explicit.effective_blur_sigma(), 2.5);
    }

    #[test]
    fn test_builder_rejects_even_kernel() {
        let err = StraightenConfig::builder().blur(8, 0.0).build().unwrap_err();
        assert!(matches!(err, StraightenError::Config(_)));
    }

    #[test]
    fn test_builder_rejects_bad_factor_and_thresholds() {
        assert!(StraightenConfig::builder().downscale(2000, 0.0).build().is_err());
        assert!(StraightenConfig::builder().downscale(2000, 1.5).build().is_err());
        assert!(StraightenConfig::builder().canny(300.0, 200.0).build().is_err());
        assert!(StraightenConfig::builder().hough(0, 1).build().is_err());
    }

    #[test]
    fn test_builder_rejects_non_finite_values() {
        assert!(StraightenConfig::builder().downscale(2000, f64::NAN).build().is_err());
        assert!(StraightenConfig::builder().blur(9, f32::INFINITY).build().is_err());
        assert!(StraightenConfig::builder().blur(9, f32::NAN).build().is_err());
        assert!(StraightenConfig::builder().canny(f32::NAN, 200.0).build().is_err());
        assert!(StraightenConfig::builder().canny(100.0, f32::NAN).build().is_err());
        assert!(StraightenConfig::builder().canny(100.0, f32::INFINITY).build().is_err());
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = StraightenConfig::builder()
            .hough(120, 3)
            .angle_selection(AngleSelection::WeightedMedian)
            .border_color([255, 255, 255])
            .debug_artifacts(None)
            .build()
            .unwrap();
        assert_eq!(config.hough_vote_threshold, 120);
        assert_eq!(config.hough_suppression_radius, 3);
        assert_eq!(config.angle_selection, AngleSelection::WeightedMedian);
        assert_eq!(config.border_color, [255, 255, 255]);
        assert!(config.debug_artifacts.is_none());
    }
}
