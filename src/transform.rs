use image::{ImageBuffer, Pixel};
use nalgebra::Matrix3;

use crate::error::{Result, StraightenError};
use crate::geometry::transform_point;

/// 8-bit image with any pixel layout
pub type Image8<P> = ImageBuffer<P, Vec<u8>>;

/// How samples outside the source image are read
#[derive(Debug, Clone, Copy)]
pub enum Border<P> {
    /// Repeat the nearest edge pixel
    Replicate,
    /// Read a fixed color
    Constant(P),
}

/// Bilinear interpolation at a given position
fn bilinear_interpolate<P>(img: &Image8<P>, x: f64, y: f64, border: Border<P>) -> P
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = img.dimensions();
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let x1 = x0 + 1;
    let y1 = y0 + 1;

    let x_frac = x - x.floor();
    let y_frac = y - y.floor();

    let get_pixel = |px: i64, py: i64| -> P {
        let inside = px >= 0 && py >= 0 && px < width as i64 && py < height as i64;
        if inside {
            return *img.get_pixel(px as u32, py as u32);
        }
        match border {
            Border::Replicate => {
                let px = px.clamp(0, width as i64 - 1) as u32;
                let py = py.clamp(0, height as i64 - 1) as u32;
                *img.get_pixel(px, py)
            }
            Border::Constant(color) => color,
        }
    };

    let p00 = get_pixel(x0, y0);
    let p10 = get_pixel(x1, y0);
    let p01 = get_pixel(x0, y1);
    let p11 = get_pixel(x1, y1);

    let mut result = p00;
    for c in 0..P::CHANNEL_COUNT as usize {
        let top = p00.channels()[c] as f64 * (1.0 - x_frac) + p10.channels()[c] as f64 * x_frac;
        let bottom =
            p01.channels()[c] as f64 * (1.0 - x_frac) + p11.channels()[c] as f64 * x_frac;
        let value = top * (1.0 - y_frac) + bottom * y_frac;
        result.channels_mut()[c] = value.round().clamp(0.0, 255.0) as u8;
    }

    result
}

/// Scaled dimension, rounded and never below one pixel
pub fn scaled_dimension(dim: u32, factor: f64) -> u32 {
    ((dim as f64 * factor).round() as u32).max(1)
}

/// Resize both dimensions by `factor` with bilinear interpolation
///
/// Pixel centers are aligned, so source coordinates are `(dst + 0.5) / factor - 0.5`
/// and edge pixels are replicated.
pub fn resize_by_factor<P>(img: &Image8<P>, factor: f64) -> Image8<P>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = img.dimensions();
    let new_width = scaled_dimension(width, factor);
    let new_height = scaled_dimension(height, factor);

    ImageBuffer::from_fn(new_width, new_height, |out_x, out_y| {
        let src_x = (out_x as f64 + 0.5) / factor - 0.5;
        let src_y = (out_y as f64 + 0.5) / factor - 0.5;
        bilinear_interpolate(img, src_x, src_y, Border::Replicate)
    })
}

/// Apply an affine transformation using inverse mapping
///
/// The output keeps the source dimensions; anything mapped in from outside the
/// source frame takes the `fill` color.
pub fn warp_affine<P>(img: &Image8<P>, forward_matrix: &Matrix3<f64>, fill: P) -> Result<Image8<P>>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = img.dimensions();

    let inverse_matrix = forward_matrix.try_inverse().ok_or_else(|| {
        StraightenError::Processing("affine transform is not invertible".to_string())
    })?;

    Ok(ImageBuffer::from_fn(width, height, |out_x, out_y| {
        let (src_x, src_y) = transform_point(&inverse_matrix, out_x as f64, out_y as f64);
        bilinear_interpolate(img, src_x, src_y, Border::Constant(fill))
    }))
}
