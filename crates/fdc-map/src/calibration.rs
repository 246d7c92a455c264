//! Map calibration: converts between map-image pixels and world meters.
//!
//! Three control points define the transform. P0 pins a pixel to a known
//! world coordinate; P1→P2 is a ruler of known real length. Pixel y grows
//! downward, world y (north) grows upward.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use fdc_core::error::{FdcError, Result};
use fdc_core::types::Point2;

/// A point picked on the map image, optionally with its known game coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub map_x: f64,
    pub map_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_y: Option<f64>,
}

impl ControlPoint {
    pub fn new(map_x: f64, map_y: f64) -> Self {
        Self {
            map_x,
            map_y,
            game_x: None,
            game_y: None,
        }
    }

    pub fn with_game(mut self, game_x: f64, game_y: f64) -> Self {
        self.game_x = Some(game_x);
        self.game_y = Some(game_y);
        self
    }

    pub fn pixel(&self) -> Point2 {
        Point2::new(self.map_x, self.map_y)
    }

    pub fn game(&self) -> Option<Point2> {
        match (self.game_x, self.game_y) {
            (Some(x), Some(y)) => Some(Point2::new(x, y)),
            _ => None,
        }
    }
}

/// Rotation + uniform-scale map from pixels to world meters.
///
/// `matrix` is row-major and applies to y-flipped pixel offsets from
/// `origin_pixel`. The ruler direction maps onto world east, so an
/// `angle_rad` of zero is the plain origin-and-scale model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationModel {
    pub meters_per_pixel: f64,
    pub angle_rad: f64,
    pub origin_pixel: Point2,
    pub origin_world: Point2,
    pub matrix: [[f64; 2]; 2],
}

impl CalibrationModel {
    /// Build the model for a given scale and ruler angle.
    pub fn new(origin_pixel: Point2, origin_world: Point2, meters_per_pixel: f64, angle_rad: f64) -> Self {
        let (sin, cos) = angle_rad.sin_cos();
        Self {
            meters_per_pixel,
            angle_rad,
            origin_pixel,
            origin_world,
            matrix: [
                [cos * meters_per_pixel, sin * meters_per_pixel],
                [-sin * meters_per_pixel, cos * meters_per_pixel],
            ],
        }
    }

    /// Origin plus uniform scale, no rotation.
    pub fn uniform(origin_pixel: Point2, origin_world: Point2, meters_per_pixel: f64) -> Self {
        Self::new(origin_pixel, origin_world, meters_per_pixel, 0.0)
    }

    /// Convert a pixel position to world meters.
    pub fn pixel_to_world(&self, pixel: Point2) -> Point2 {
        let d = DVec2::new(
            pixel.x - self.origin_pixel.x,
            -(pixel.y - self.origin_pixel.y),
        );
        let [[a, b], [c, e]] = self.matrix;
        let world = DVec2::from(self.origin_world) + DVec2::new(a * d.x + b * d.y, c * d.x + e * d.y);
        world.into()
    }

    /// Convert world meters to a pixel position. Exact inverse of `pixel_to_world`.
    pub fn world_to_pixel(&self, world: Point2) -> Point2 {
        let w = DVec2::from(world) - DVec2::from(self.origin_world);
        // Inverse of a rotation-scale matrix: transpose over scale squared.
        let [[a, b], [c, e]] = self.matrix;
        let k = self.meters_per_pixel * self.meters_per_pixel;
        let d = DVec2::new((a * w.x + c * w.y) / k, (b * w.x + e * w.y) / k);
        Point2::new(self.origin_pixel.x + d.x, self.origin_pixel.y - d.y)
    }
}

/// Stored calibration: the control points it was derived from and the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub control_points: [ControlPoint; 3],
    pub known_p0: Point2,
    pub scale_meters: f64,
    pub model: CalibrationModel,
}

impl Calibration {
    pub fn pixel_to_world(&self, pixel: Point2) -> Point2 {
        self.model.pixel_to_world(pixel)
    }

    pub fn world_to_pixel(&self, world: Point2) -> Point2 {
        self.model.world_to_pixel(world)
    }

    /// Distance (m) between each control point's known game coordinate and
    /// where the model places it. Points without game coordinates are skipped.
    pub fn control_point_residuals(&self) -> Vec<(usize, f64)> {
        self.control_points
            .iter()
            .enumerate()
            .filter_map(|(i, cp)| {
                cp.game()
                    .map(|game| (i, self.model.pixel_to_world(cp.pixel()).distance_to(&game)))
            })
            .collect()
    }
}

/// Derive a calibration from three control points and a known ruler length.
pub fn calibrate_by_three_points(
    p0: ControlPoint,
    p1: ControlPoint,
    p2: ControlPoint,
    known_p0: Point2,
    scale_meters: f64,
) -> Result<Calibration> {
    if !scale_meters.is_finite() || scale_meters <= 0.0 {
        return Err(FdcError::InvalidScale(scale_meters));
    }

    if !p0.map_x.is_finite() || !p0.map_y.is_finite() {
        return Err(FdcError::Config(format!(
            "calibration pixel ({}, {}) must be finite",
            p0.map_x, p0.map_y
        )));
    }
    if !known_p0.x.is_finite() || !known_p0.y.is_finite() {
        return Err(FdcError::Config(format!(
            "known calibration coordinate ({}, {}) must be finite",
            known_p0.x, known_p0.y
        )));
    }

    let ruler_dx = p2.map_x - p1.map_x;
    let ruler_dy = -(p2.map_y - p1.map_y);
    let ruler_pixels = ruler_dx.hypot(ruler_dy);
    if ruler_pixels == 0.0 || !ruler_pixels.is_finite() {
        return Err(FdcError::DegenerateCalibration);
    }

    let meters_per_pixel = scale_meters / ruler_pixels;
    let angle_rad = ruler_dy.atan2(ruler_dx);
    let model = CalibrationModel::new(p0.pixel(), known_p0, meters_per_pixel, angle_rad);

    tracing::info!(
        meters_per_pixel,
        angle_deg = angle_rad.to_degrees(),
        "Map calibrated"
    );

    Ok(Calibration {
        control_points: [p0, p1, p2],
        known_p0,
        scale_meters,
        model,
    })
}
