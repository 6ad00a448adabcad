use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use imageproc::edges::canny;
use imageproc::hough::{detect_lines, LineDetectionOptions, PolarLine};
use log::debug;

use crate::artifacts::DebugArtifacts;
use crate::config::StraightenConfig;
use crate::error::Result;
use crate::geometry::DetectedLine;
use crate::preprocess::Preprocessed;

/// Half-length of the segments drawn for each line in the debug overlay
const OVERLAY_HALF_LENGTH: f32 = 1000.0;

const OVERLAY_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Edge map and the Hough lines found in it
#[derive(Debug)]
pub struct LineDetection {
    pub edges: GrayImage,
    /// Lines in accumulator scan order: ascending angle, then ascending distance
    pub lines: Vec<DetectedLine>,
}

/// Apply Canny edge detection
pub fn detect_edges(binary: &GrayImage, config: &StraightenConfig) -> GrayImage {
    canny(binary, config.canny_low, config.canny_high)
}

/// Hough distance bin an edge pixel votes for at a whole-degree angle
///
/// Mirrors the accumulator: f32 trigonometry and distances truncated toward
/// zero, so counts match the votes the line received.
fn vote_bin(x: u32, y: u32, angle_in_degrees: u32) -> i32 {
    let theta = angle_in_degrees as f32 * std::f32::consts::PI / 180.0;
    let (sin, cos) = theta.sin_cos();
    (x as f32 * cos + y as f32 * sin) as i32
}

/// Number of edge pixels voting for a line
fn count_line_votes(edge_points: &[(u32, u32)], line: &PolarLine) -> f64 {
    let bin = line.r as i32;
    edge_points
        .iter()
        .filter(|&&(x, y)| vote_bin(x, y, line.angle_in_degrees) == bin)
        .count() as f64
}

/// Hough transform over an edge map at 1 px / 1° resolution
pub fn find_lines(edges: &GrayImage, config: &StraightenConfig) -> Vec<DetectedLine> {
    let options = LineDetectionOptions {
        vote_threshold: config.hough_vote_threshold,
        suppression_radius: config.hough_suppression_radius,
    };

    let polar_lines = detect_lines(edges, options);
    if polar_lines.is_empty() {
        return Vec::new();
    }

    let edge_points: Vec<(u32, u32)> = edges
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] > 0)
        .map(|(x, y, _)| (x, y))
        .collect();

    polar_lines
        .iter()
        .map(|pl| {
            let theta = (pl.angle_in_degrees as f64).to_radians();
            DetectedLine::new(pl.r, theta, count_line_votes(&edge_points, pl))
        })
        .collect()
}

/// Draw every line in red, two pixels wide, over a copy of `canvas`
pub fn draw_detected_lines(canvas: &RgbImage, lines: &[DetectedLine]) -> RgbImage {
    let mut overlay = canvas.clone();

    for line in lines {
        let (b, a) = line.theta.sin_cos();
        let (a, b) = (a as f32, b as f32);
        let x0 = a * line.rho;
        let y0 = b * line.rho;
        let start = (x0 - OVERLAY_HALF_LENGTH * b, y0 + OVERLAY_HALF_LENGTH * a);
        let end = (x0 + OVERLAY_HALF_LENGTH * b, y0 - OVERLAY_HALF_LENGTH * a);

        draw_line_segment_mut(&mut overlay, start, end, OVERLAY_COLOR);
        draw_line_segment_mut(
            &mut overlay,
            (start.0 + a, start.1 + b),
            (end.0 + a, end.1 + b),
            OVERLAY_COLOR,
        );
    }

    overlay
}

/// Edge and line detection over a preprocessed image
///
/// The line list is empty when nothing reaches the vote threshold.
pub fn detect_document_lines(
    pre: &Preprocessed,
    config: &StraightenConfig,
    artifacts: &DebugArtifacts,
) -> Result<LineDetection> {
    let edges = detect_edges(&pre.binary, config);
    debug!(
        "Applied Canny edge detection ({:.1}, {:.1})",
        config.canny_low, config.canny_high
    );
    artifacts.save_gray("canny.jpg", &edges)?;

    let lines = find_lines(&edges, config);
    debug!(
        "Detected {} Hough lines (vote threshold {})",
        lines.len(),
        config.hough_vote_threshold
    );

    if artifacts.is_enabled() {
        artifacts.save_rgb("houghlines.jpg", &draw_detected_lines(&pre.color, &lines))?;
    }

    Ok(LineDetection { edges, lines })
}
