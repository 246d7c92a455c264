//! Aim-point generation for multi-gun fire patterns.
//!
//! Generation is a pure function of the pattern configuration and the
//! number of guns. Bearings are compass bearings; "right" is the
//! bearing plus 90°.

use serde::{Deserialize, Serialize};

use fdc_core::constants::*;
use fdc_core::enums::{AimPointRole, Distribution, FireMode};
use fdc_core::types::{AimPoint, AimPointMeta, TargetPoint};
use fdc_core::units::{bearing_unit, wrap_deg};

/// Parameters of a fire pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireModeConfig {
    pub mode: FireMode,
    pub center_point: TargetPoint,
    /// Point used by `CONVERGED`; falls back to `center_point`.
    pub converge_point: Option<TargetPoint>,
    pub bearing_deg: f64,
    pub radius_m: f64,
    pub width_m: f64,
    pub length_m: f64,
    pub spacing_m: f64,
    pub sheaf_width_m: f64,
    pub aimpoint_count: u32,
    /// Explicit line endpoints for `LINEAR`; both must be set to be used.
    pub start_point: Option<TargetPoint>,
    pub end_point: Option<TargetPoint>,
}

impl Default for FireModeConfig {
    fn default() -> Self {
        Self {
            mode: FireMode::Point,
            center_point: TargetPoint::default(),
            converge_point: None,
            bearing_deg: DEFAULT_PATTERN_BEARING_DEG,
            radius_m: DEFAULT_PATTERN_RADIUS_M,
            width_m: DEFAULT_PATTERN_WIDTH_M,
            length_m: DEFAULT_PATTERN_LENGTH_M,
            spacing_m: DEFAULT_PATTERN_SPACING_M,
            sheaf_width_m: DEFAULT_SHEAF_WIDTH_M,
            aimpoint_count: DEFAULT_AIMPOINT_COUNT,
            start_point: None,
            end_point: None,
        }
    }
}

impl FireModeConfig {
    pub fn new(mode: FireMode, center_point: TargetPoint) -> Self {
        Self {
            mode,
            center_point,
            ..Self::default()
        }
    }

    pub fn with_bearing(mut self, bearing_deg: f64) -> Self {
        self.bearing_deg = bearing_deg;
        self
    }

    pub fn with_line(mut self, start: TargetPoint, end: TargetPoint) -> Self {
        self.start_point = Some(start);
        self.end_point = Some(end);
        self
    }

    /// Pattern bearing wrapped into [0, 360); non-finite input counts as 0.
    pub fn bearing(&self) -> f64 {
        wrap_deg(finite_or(self.bearing_deg, DEFAULT_PATTERN_BEARING_DEG))
    }

    /// Start and end of the `LINEAR` pattern.
    pub fn line_endpoints(&self) -> (TargetPoint, TargetPoint) {
        if let (Some(start), Some(end)) = (self.start_point, self.end_point) {
            return (start, end);
        }
        let c = self.center_point;
        let half = finite_or(self.length_m, DEFAULT_PATTERN_LENGTH_M).max(MIN_PATTERN_DIMENSION_M) / 2.0;
        let (sin, cos) = bearing_unit(self.bearing());
        (
            TargetPoint { x: c.x - sin * half, y: c.y - cos * half, z: c.z },
            TargetPoint { x: c.x + sin * half, y: c.y + cos * half, z: c.z },
        )
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn aim_point(x: f64, y: f64, z: Option<f64>, index: usize, role: AimPointRole, offset: (f64, f64)) -> AimPoint {
    AimPoint {
        x,
        y,
        z,
        meta: AimPointMeta {
            index,
            role,
            offset_x: offset.0,
            offset_y: offset.1,
        },
    }
}

/// Offsets of `count` lanes spread evenly across `width`, centred on 0.
fn lane_offsets(count: usize, width: f64) -> Vec<f64> {
    if count <= 1 {
        return vec![0.0];
    }
    let spacing = width / (count - 1) as f64;
    (0..count).map(|i| -width / 2.0 + i as f64 * spacing).collect()
}

/// Generate the aim points of a pattern for `gun_count` guns.
pub fn generate_aim_points(config: &FireModeConfig, gun_count: usize) -> Vec<AimPoint> {
    let gun_count = gun_count.max(1);
    let center = config.center_point;

    match config.mode {
        FireMode::Point => vec![aim_point(center.x, center.y, center.z, 0, AimPointRole::Center, (0.0, 0.0))],
        FireMode::Converged => {
            let p = config.converge_point.unwrap_or(center);
            vec![aim_point(p.x, p.y, p.z, 0, AimPointRole::Center, (0.0, 0.0))]
        }
        FireMode::ParallelSheaf | FireMode::OpenSheaf => sheaf(config, gun_count),
        FireMode::CircularArea => circular(config),
        FireMode::Linear => linear(config),
        FireMode::RectArea => rectangle(config),
    }
}

fn sheaf(config: &FireModeConfig, gun_count: usize) -> Vec<AimPoint> {
    let center = config.center_point;
    let width = finite_or(config.sheaf_width_m, DEFAULT_SHEAF_WIDTH_M).max(MIN_SHEAF_WIDTH_M);
    let (sin, cos) = bearing_unit(config.bearing() + 90.0);

    lane_offsets(gun_count, width)
        .into_iter()
        .enumerate()
        .map(|(index, offset)| {
            let (dx, dy) = (sin * offset, cos * offset);
            aim_point(center.x + dx, center.y + dy, center.z, index, AimPointRole::SheafLane, (dx, dy))
        })
        .collect()
}

fn circular(config: &FireModeConfig) -> Vec<AimPoint> {
    let center = config.center_point;
    let radius = finite_or(config.radius_m, DEFAULT_PATTERN_RADIUS_M).max(MIN_PATTERN_DIMENSION_M);
    let count = config.aimpoint_count.clamp(MIN_RING_POINTS, MAX_RING_POINTS) as usize;

    let mut points = Vec::with_capacity(count + 1);
    points.push(aim_point(center.x, center.y, center.z, 0, AimPointRole::Center, (0.0, 0.0)));
    for i in 0..count {
        let angle = std::f64::consts::TAU * i as f64 / count as f64;
        let (dx, dy) = (angle.sin() * radius, angle.cos() * radius);
        points.push(aim_point(center.x + dx, center.y + dy, center.z, i + 1, AimPointRole::Ring, (dx, dy)));
    }
    points
}

fn linear(config: &FireModeConfig) -> Vec<AimPoint> {
    let (start, end) = config.line_endpoints();
    let spacing = finite_or(config.spacing_m, DEFAULT_PATTERN_SPACING_M).max(MIN_PATTERN_DIMENSION_M);
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let mut steps = ((dx.hypot(dy) / spacing).floor().max(1.0)) as usize;
    if steps >= MAX_PATTERN_POINTS {
        tracing::warn!(
            requested = steps.saturating_add(1),
            max = MAX_PATTERN_POINTS,
            "Linear pattern too dense, spacing widened"
        );
        steps = MAX_PATTERN_POINTS - 1;
    }

    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            aim_point(
                start.x + dx * t,
                start.y + dy * t,
                config.center_point.z,
                i,
                AimPointRole::Line,
                (0.0, 0.0),
            )
        })
        .collect()
}

fn rectangle(config: &FireModeConfig) -> Vec<AimPoint> {
    let center = config.center_point;
    let width = finite_or(config.width_m, DEFAULT_PATTERN_WIDTH_M).max(MIN_PATTERN_DIMENSION_M);
    let length = finite_or(config.length_m, DEFAULT_PATTERN_LENGTH_M).max(MIN_PATTERN_DIMENSION_M);
    let mut spacing = finite_or(config.spacing_m, DEFAULT_PATTERN_SPACING_M).max(MIN_PATTERN_DIMENSION_M);

    let bearing = config.bearing();
    let (fx, fy) = bearing_unit(bearing);
    let (rx, ry) = bearing_unit(bearing + 90.0);

    let cells = |spacing: f64| ((width / spacing).floor().max(1.0), (length / spacing).floor().max(1.0));
    let (mut x_cells, mut y_cells) = cells(spacing);
    let requested = (x_cells + 1.0) * (y_cells + 1.0);
    if requested > MAX_PATTERN_POINTS as f64 {
        while (x_cells + 1.0) * (y_cells + 1.0) > MAX_PATTERN_POINTS as f64 {
            let ratio = (x_cells + 1.0) * (y_cells + 1.0) / MAX_PATTERN_POINTS as f64;
            spacing *= ratio.sqrt().max(1.01);
            (x_cells, y_cells) = cells(spacing);
        }
        tracing::warn!(
            requested,
            max = MAX_PATTERN_POINTS,
            spacing_m = spacing,
            "Rectangular pattern too dense, spacing widened"
        );
    }
    let (x_cells, y_cells) = (x_cells as usize, y_cells as usize);

    let mut points = Vec::with_capacity((x_cells + 1) * (y_cells + 1));
    for yi in 0..=y_cells {
        let depth = -length / 2.0 + length * yi as f64 / y_cells as f64;
        let mut row: Vec<(f64, f64)> = (0..=x_cells)
            .map(|xi| {
                let lateral = -width / 2.0 + width * xi as f64 / x_cells as f64;
                (rx * lateral + fx * depth, ry * lateral + fy * depth)
            })
            .collect();
        // Serpentine order keeps traverse between successive points short.
        if yi % 2 == 1 {
            row.reverse();
        }
        for (dx, dy) in row {
            let index = points.len();
            points.push(aim_point(center.x + dx, center.y + dy, center.z, index, AimPointRole::Grid, (dx, dy)));
        }
    }
    points
}

/// Aim point for the gun at `gun_index`: the first point for `SAME_POINT`
/// or a single-point pattern, otherwise round-robin.
pub fn pick_aim_point_for_gun(
    aim_points: &[AimPoint],
    gun_index: usize,
    distribute: Distribution,
) -> Option<&AimPoint> {
    if aim_points.is_empty() {
        return None;
    }
    if distribute == Distribution::SamePoint || aim_points.len() == 1 {
        return aim_points.first();
    }
    aim_points.get(gun_index % aim_points.len())
}
