// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

use image::{Rgb, RgbImage};

pub const INK: Rgb<u8> = Rgb([30, 30, 30]);
pub const PAPER: Rgb<u8> = Rgb([235, 235, 235]);

/// Signed distance of (x, y) from the line through the image center that
/// slopes `skew_degrees` downward to the right
fn offset_from_center_line(width: u32, height: u32, skew_degrees: f64, x: u32, y: u32) -> f64 {
    let (sin, cos) = skew_degrees.to_radians().sin_cos();
    let dx = x as f64 - width as f64 / 2.0;
    let dy = y as f64 - height as f64 / 2.0;
    -dx * sin + dy * cos
}

/// A single dark stroke across a light page
pub fn skewed_line(width: u32, height: u32, skew_degrees: f64, thickness: f64) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let offset = offset_from_center_line(width, height, skew_degrees, x, y);
        if offset.abs() < thickness / 2.0 {
            INK
        } else {
            PAPER
        }
    })
}

/// Parallel dark rules every `spacing` pixels, standing in for text lines
pub fn ruled_page(
    width: u32,
    height: u32,
    skew_degrees: f64,
    spacing: f64,
    thickness: f64,
) -> RgbImage {
    assert!(spacing > thickness, "rules must not overlap");
    RgbImage::from_fn(width, height, |x, y| {
        let offset = offset_from_center_line(width, height, skew_degrees, x, y);
        if offset.rem_euclid(spacing) < thickness {
            INK
        } else {
            PAPER
        }
    })
}
