//! Angle and distance conversions.
//!
//! Bearings are compass bearings: 0° = north, increasing clockwise,
//! with x = east and y = north.

use crate::constants::{FULL_CIRCLE_DEG, MILS_PER_CIRCLE};
use crate::types::Point2;

/// Degrees to NATO mils.
pub fn deg_to_mil(deg: f64) -> f64 {
    deg * MILS_PER_CIRCLE / FULL_CIRCLE_DEG
}

/// NATO mils to degrees.
pub fn mil_to_deg(mil: f64) -> f64 {
    mil * FULL_CIRCLE_DEG / MILS_PER_CIRCLE
}

/// Wrap an angle into [0, 360).
pub fn wrap_deg(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(FULL_CIRCLE_DEG);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= FULL_CIRCLE_DEG {
        0.0
    } else {
        wrapped
    }
}

/// Signed difference `to - from` folded into (-180, 180].
pub fn angle_diff_deg(from: f64, to: f64) -> f64 {
    let diff = wrap_deg(to - from);
    if diff > 180.0 {
        diff - FULL_CIRCLE_DEG
    } else {
        diff
    }
}

/// Compass bearing in degrees from `from` to `to`.
pub fn bearing_deg(from: &Point2, to: &Point2) -> f64 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    wrap_deg(dx.atan2(dy).to_degrees())
}

/// Horizontal distance between two map points (m).
pub fn horizontal_distance(from: &Point2, to: &Point2) -> f64 {
    (to.x - from.x).hypot(to.y - from.y)
}

/// Unit vector for a compass bearing: (sin, cos), so 0° points north.
pub fn bearing_unit(deg: f64) -> (f64, f64) {
    let rad = deg.to_radians();
    (rad.sin(), rad.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mil_conversions() {
        assert!((deg_to_mil(90.0) - 1600.0).abs() < 1e-9);
        assert!((mil_to_deg(3200.0) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_deg() {
        assert_eq!(wrap_deg(370.0), 10.0);
        assert_eq!(wrap_deg(-10.0), 350.0);
        assert_eq!(wrap_deg(360.0), 0.0);
    }

    #[test]
    fn test_angle_diff_folds() {
        assert!((angle_diff_deg(350.0, 10.0) - 20.0).abs() < 1e-9);
        assert!((angle_diff_deg(10.0, 350.0) + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = Point2::new(0.0, 0.0);
        assert!((bearing_deg(&origin, &Point2::new(0.0, 10.0)) - 0.0).abs() < 1e-9);
        assert!((bearing_deg(&origin, &Point2::new(10.0, 0.0)) - 90.0).abs() < 1e-9);
        assert!((bearing_deg(&origin, &Point2::new(0.0, -10.0)) - 180.0).abs() < 1e-9);
        assert!((bearing_deg(&origin, &Point2::new(-10.0, 0.0)) - 270.0).abs() < 1e-9);
    }
}
