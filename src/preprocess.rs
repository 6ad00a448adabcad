use image::{GrayImage, Luma, RgbImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::filter::separable_filter_equal;
use log::debug;

use crate::artifacts::DebugArtifacts;
use crate::config::StraightenConfig;
use crate::error::{Result, StraightenError};
use crate::transform::resize_by_factor;

/// Intermediate images produced ahead of edge detection
#[derive(Debug)]
pub struct Preprocessed {
    /// Color image at detection resolution
    pub color: RgbImage,
    pub gray: GrayImage,
    pub blurred: GrayImage,
    /// Inverted Otsu binarization: dark ink becomes 255
    pub binary: GrayImage,
    /// Otsu level the binary image was cut at
    pub threshold: u8,
    /// Scale from the original image to detection resolution
    pub scale: f64,
}

/// Downscale oversized images for detection
///
/// Only the row count is compared against the threshold. Returns `None` when
/// the image is used unchanged.
pub fn downscale_for_detection(img: &RgbImage, config: &StraightenConfig) -> Option<RgbImage> {
    if img.height() > config.downscale_threshold {
        Some(resize_by_factor(img, config.downscale_factor))
    } else {
        None
    }
}

/// Convert RGB to grayscale with the standard luminance weights
pub fn to_grayscale(img: &RgbImage) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut gray = GrayImage::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let luma = 0.299 * pixel[0] as f64 + 0.587 * pixel[1] as f64 + 0.114 * pixel[2] as f64;
        gray.put_pixel(x, y, Luma([luma.round().clamp(0.0, 255.0) as u8]));
    }

    gray
}

/// Fixed binomial kernels used for small sizes when sigma is derived
const SMALL_GAUSSIAN_KERNELS: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// Normalized 1-D Gaussian with exactly `size` taps
///
/// A non-positive `sigma` selects the binomial tables for sizes up to 7 and
/// otherwise derives sigma from the size.
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 && size % 2 == 1 && size <= 7 {
        return SMALL_GAUSSIAN_KERNELS[(size / 2) as usize].to_vec();
    }

    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let center = (size as f32 - 1.0) / 2.0;
    let scale = -0.5 / (sigma * sigma);

    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (scale * d * d).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for weight in &mut kernel {
        *weight /= sum;
    }
    kernel
}

/// Separable Gaussian blur with a `size`-tap kernel
pub fn gaussian_blur(img: &GrayImage, size: u32, sigma: f32) -> GrayImage {
    let kernel = gaussian_kernel(size, sigma);
    separable_filter_equal(img, &kernel)
}

/// Binarize at the Otsu level with inverted polarity
///
/// Pixels above the level become 0 and the rest 255.
pub fn binarize_inverted_otsu(img: &GrayImage) -> (u8, GrayImage) {
    let level = otsu_level(img);
    (level, threshold(img, level, ThresholdType::BinaryInverted))
}

/// Run downscale, grayscale, blur and threshold
pub fn preprocess(
    img: &RgbImage,
    config: &StraightenConfig,
    artifacts: &DebugArtifacts,
) -> Result<Preprocessed> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(StraightenError::Processing(format!(
            "cannot process an empty {}x{} image",
            width, height
        )));
    }

    let (color, scale) = match downscale_for_detection(img, config) {
        Some(small) => {
            debug!(
                "Downscaled {}x{} -> {}x{} for detection",
                width,
                height,
                small.width(),
                small.height()
            );
            (small, config.downscale_factor)
        }
        None => (img.clone(), 1.0),
    };

    let gray = to_grayscale(&color);
    artifacts.save_gray("grey.jpg", &gray)?;

    let blurred = gaussian_blur(&gray, config.blur_kernel_size, config.blur_sigma);
    debug!(
        "Applied Gaussian blur (kernel {}, sigma {:.3})",
        config.blur_kernel_size,
        config.effective_blur_sigma()
    );
    artifacts.save_gray("blur.jpg", &blurred)?;

    let (threshold, binary) = binarize_inverted_otsu(&blurred);
    debug!("Otsu threshold: {}", threshold);
    artifacts.save_gray("thresh.jpg", &binary)?;

    Ok(Preprocessed {
        color,
        gray,
        blurred,
        binary,
        threshold,
        scale,
    })
}
