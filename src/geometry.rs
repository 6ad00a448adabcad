use nalgebra::{Matrix2, Matrix3, Vector3};

/// Angle above which a Hough normal is treated as belonging to a near-horizontal line
const NEAR_HORIZONTAL_THETA: f64 = 1.0;

/// Period of the folded skew angle: horizontal and vertical strokes agree modulo 90°
const QUARTER_TURN: f64 = 90.0;

/// How the rotation is chosen from the detected lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AngleSelection {
    /// Use the last line in accumulator scan order
    #[default]
    Last,
    /// Weighted circular median of all lines, weighted by edge support
    WeightedMedian,
}

/// A Hough line in polar form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedLine {
    /// Signed distance from the top-left origin, in pixels
    pub rho: f32,
    /// Angle of the line normal in radians, in [0, π)
    pub theta: f64,
    /// Number of edge pixels lying on the line
    pub weight: f64,
}

impl DetectedLine {
    pub fn new(rho: f32, theta: f64, weight: f64) -> Self {
        Self { rho, theta, weight }
    }

    /// Rotation in degrees that levels this line
    pub fn rotation_degrees(&self) -> f64 {
        rotation_from_theta(self.theta)
    }
}

/// Map a Hough normal angle to a corrective rotation in degrees
///
/// Normals above one radian come from near-horizontal lines and fold back by
/// 90°; the rest are used as-is.
pub fn rotation_from_theta(theta: f64) -> f64 {
    let degrees = theta.to_degrees();
    if theta > NEAR_HORIZONTAL_THETA {
        degrees - 90.0
    } else {
        degrees
    }
}

/// Fold a normal angle in degrees into (-45, 45]
fn fold_quarter_turn(degrees: f64) -> f64 {
    let folded = degrees.rem_euclid(QUARTER_TURN);
    if folded > QUARTER_TURN / 2.0 {
        folded - QUARTER_TURN
    } else {
        folded
    }
}

fn circular_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(QUARTER_TURN);
    diff.min(QUARTER_TURN - diff)
}

/// Weighted circular median over folded angles
///
/// Picks the sample minimizing the weighted sum of circular distances to all
/// other samples. Ties keep the earliest sample.
fn weighted_circular_median(samples: &[(f64, f64)]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    // Lines without support still count, equally
    let total_weight: f64 = samples.iter().map(|&(_, w)| w).sum();
    let uniform = total_weight <= 0.0;

    let mut best: Option<(f64, f64)> = None;
    for &(candidate, _) in samples {
        let cost: f64 = samples
            .iter()
            .map(|&(angle, weight)| {
                let weight = if uniform { 1.0 } else { weight };
                weight * circular_distance(candidate, angle)
            })
            .sum();
        match best {
            Some((_, best_cost)) if cost >= best_cost => {}
            _ => best = Some((candidate, cost)),
        }
    }

    best.map(|(angle, _)| angle)
}

/// Reduce the detected lines to one rotation in degrees
///
/// Returns `None` when there are no lines.
pub fn select_rotation_angle(lines: &[DetectedLine], policy: AngleSelection) -> Option<f64> {
    match policy {
        AngleSelection::Last => lines.last().map(DetectedLine::rotation_degrees),
        AngleSelection::WeightedMedian => {
            let samples: Vec<(f64, f64)> = lines
                .iter()
                .map(|line| (fold_quarter_turn(line.theta.to_degrees()), line.weight))
                .collect();
            weighted_circular_median(&samples)
        }
    }
}

/// Affine rotation about `center`, counter-clockwise as displayed for positive angles
///
/// Built as translate-to-origin, rotate and scale, translate-back, which yields
/// the familiar 2×3 form `[α β (1-α)cx-βcy; -β α βcx+(1-α)cy]`.
pub fn rotation_matrix(center: (f64, f64), angle_degrees: f64, scale: f64) -> Matrix3<f64> {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let alpha = scale * cos;
    let beta = scale * sin;
    let rotate = Matrix2::new(alpha, beta, -beta, alpha);

    let (cx, cy) = center;

    let translate_to_origin = Matrix3::new(
        1.0, 0.0, -cx,
        0.0, 1.0, -cy,
        0.0, 0.0, 1.0,
    );

    let transform = Matrix3::new(
        rotate[(0, 0)], rotate[(0, 1)], 0.0,
        rotate[(1, 0)], rotate[(1, 1)], 0.0,
        0.0, 0.0, 1.0,
    );

    let translate_back = Matrix3::new(
        1.0, 0.0, cx,
        0.0, 1.0, cy,
        0.0, 0.0, 1.0,
    );

    translate_back * transform * translate_to_origin
}

/// Transform a point using the affine matrix
pub fn transform_point(matrix: &Matrix3<f64>, x: f64, y: f64) -> (f64, f64) {
    let p = Vector3::new(x, y, 1.0);
    let result = matrix * p;
    (result.x / result.z, result.y / result.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn line(theta_degrees: f64, weight: f64) -> DetectedLine {
        DetectedLine::new(0.0, theta_degrees.to_radians(), weight)
    }

    #[test]
    fn test_rotation_from_theta_branches() {
        // Horizontal line: normal points straight down
        assert!(rotation_from_theta(FRAC_PI_2).abs() < 1e-9);
        assert!((rotation_from_theta(93f64.to_radians()) - 3.0).abs() < 1e-9);
        assert!((rotation_from_theta(85f64.to_radians()) + 5.0).abs() < 1e-9);
        // At or below one radian the angle is used directly
        assert!((rotation_from_theta(1.0) - 1.0f64.to_degrees()).abs() < 1e-9);
        assert!((rotation_from_theta(2f64.to_radians()) - 2.0).abs() < 1e-9);
        // Near-vertical normals past one radian fold by 90 even when large
        assert!((rotation_from_theta(PI - 0.01) - ((PI - 0.01).to_degrees() - 90.0)).abs() < 1e-9);
    }

    #[test]
    fn test_last_policy_uses_last_line_only() {
        let lines = [line(90.0, 500.0), line(90.0, 400.0), line(96.0, 1.0)];
        let angle = select_rotation_angle(&lines, AngleSelection::Last).unwrap();
        assert!((angle - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_median_follows_support() {
        let lines = [line(93.0, 500.0), line(93.0, 400.0), line(120.0, 10.0)];
        let angle = select_rotation_angle(&lines, AngleSelection::WeightedMedian).unwrap();
        assert!((angle - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_median_agrees_across_orientations() {
        // Text lines at 87° and page edge at 177° both mean a -3° skew
        let lines = [line(87.0, 300.0), line(177.0, 300.0), line(2.0, 10.0)];
        let angle = select_rotation_angle(&lines, AngleSelection::WeightedMedian).unwrap();
        assert!((angle + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_lines_selects_nothing() {
        assert!(select_rotation_angle(&[], AngleSelection::Last).is_none());
        assert!(select_rotation_angle(&[], AngleSelection::WeightedMedian).is_none());
    }

    #[test]
    fn test_rotation_keeps_center_fixed() {
        let matrix = rotation_matrix((50.0, 40.0), 17.0, 1.0);
        let (x, y) = transform_point(&matrix, 50.0, 40.0);
        assert!((x - 50.0).abs() < 1e-9);
        assert!((y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_rotation_is_identity() {
        let matrix = rotation_matrix((320.0, 240.0), 0.0, 1.0);
        assert_eq!(matrix, Matrix3::identity());
    }

    #[test]
    fn test_positive_angle_levels_down_sloping_line() {
        // A line sloping 3° downward to the right (y grows downward)
        let skew = 3f64.to_radians();
        let matrix = rotation_matrix((0.0, 0.0), 3.0, 1.0);
        let (x, y) = transform_point(&matrix, 100.0 * skew.cos(), 100.0 * skew.sin());
        assert!((x - 100.0).abs() < 1e-9);
        assert!(y.abs() < 1e-9);
    }
}
