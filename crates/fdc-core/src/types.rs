//! Fundamental geometric types.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::AimPointRole;

/// Point on the map plane in world meters.
/// x = East, y = North.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point in meters.
    pub fn distance_to(&self, other: &Point2) -> f64 {
        DVec2::from(*self).distance(DVec2::from(*other))
    }

    /// Point reached by moving `distance` meters along a compass bearing.
    pub fn offset_along(&self, bearing_deg: f64, distance: f64) -> Point2 {
        let (sin, cos) = crate::units::bearing_unit(bearing_deg);
        Point2::new(self.x + sin * distance, self.y + cos * distance)
    }
}

impl From<Point2> for DVec2 {
    fn from(p: Point2) -> Self {
        DVec2::new(p.x, p.y)
    }
}

impl From<DVec2> for Point2 {
    fn from(v: DVec2) -> Self {
        Point2::new(v.x, v.y)
    }
}

/// Target location with an optional altitude (m).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl TargetPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    pub fn xy(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// Provenance of an aim point inside its pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimPointMeta {
    /// Position of the point in the generated list.
    pub index: usize,
    pub role: AimPointRole,
    /// East offset from the pattern center (m).
    pub offset_x: f64,
    /// North offset from the pattern center (m).
    pub offset_y: f64,
}

/// A single point a gun is laid on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    pub meta: AimPointMeta,
}

impl AimPoint {
    pub fn xy(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// Altitude, treating a missing value as sea level.
    pub fn altitude(&self) -> f64 {
        self.z.unwrap_or(0.0)
    }
}
