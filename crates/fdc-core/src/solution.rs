//! Firing solution records produced by the solver.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::Point2;

/// Contribution of a single correction term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppliedCorrection {
    pub term: CorrectionTerm,
    pub enabled: bool,
    /// Elevation contribution (mil).
    pub elevation_mil: f64,
    /// Time of flight contribution (s).
    pub time_s: f64,
}

/// Per-term correction breakdown, kept on every solution for auditing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionBreakdown {
    pub terms: Vec<AppliedCorrection>,
    /// Crosswind component used by the wind term (m/s).
    pub crosswind_mps: f64,
    /// Headwind component used by the wind term (m/s).
    pub headwind_mps: f64,
    pub total_elevation_mil: f64,
    pub total_time_s: f64,
}

impl CorrectionBreakdown {
    /// Elevation contribution of one term (0 if absent or disabled).
    pub fn elevation_of(&self, term: CorrectionTerm) -> f64 {
        self.terms
            .iter()
            .find(|t| t.term == term)
            .map(|t| t.elevation_mil)
            .unwrap_or(0.0)
    }

    pub fn time_of(&self, term: CorrectionTerm) -> f64 {
        self.terms
            .iter()
            .find(|t| t.term == term)
            .map(|t| t.time_s)
            .unwrap_or(0.0)
    }
}

/// Reachable area of a gun for one charge, for reporting and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Full ring rather than a sector.
    pub omni: bool,
    /// Center direction of the sector (degrees).
    pub heading_deg: f64,
    /// Angular width of the sector (degrees).
    pub traverse_deg: f64,
    pub min_range: f64,
    pub max_range: f64,
    /// Closed outline in world meters.
    pub polygon: Vec<Point2>,
}

/// One sample of the display trajectory: x along the gun-target line, y height (m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub x: f64,
    pub y: f64,
}

/// Complete firing solution for one gun and projectile.
///
/// A solution is produced even when the target cannot be engaged: check
/// `in_range`, `in_sector` and `in_elevation_limits` before laying the gun.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub gun_id: String,
    pub projectile_id: String,
    pub in_range: bool,
    /// Set when no charge could be selected.
    pub reason: Option<SolveFailure>,
    pub in_sector: bool,
    pub in_elevation_limits: bool,
    pub charge_level: Option<u32>,
    pub fire_type: Option<FireType>,
    pub trajectory_variant: Option<ArcVariant>,
    pub interpolation: Option<Interpolation>,
    /// Corrected barrel elevation (mil).
    pub elevation_mil: Option<f64>,
    /// Compass azimuth to lay (degrees).
    pub azimuth_deg: f64,
    /// Compass azimuth to lay (mil).
    pub azimuth_mil: f64,
    /// Corrected time of flight (s).
    pub time_of_flight: Option<f64>,
    pub corrections: Option<CorrectionBreakdown>,
    pub envelope: Option<Envelope>,
    /// Cosmetic arc for display only; not derived from the table.
    pub trajectory: Vec<TrajectoryPoint>,
}

impl Solution {
    /// In range, inside the sector and within elevation limits.
    pub fn is_fireable(&self) -> bool {
        self.in_range && self.in_sector && self.in_elevation_limits
    }
}

/// A gun/projectile pairing inside a battery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GunAssignment {
    pub gun_id: String,
    pub projectile_id: String,
}

impl GunAssignment {
    pub fn new(gun_id: impl Into<String>, projectile_id: impl Into<String>) -> Self {
        Self {
            gun_id: gun_id.into(),
            projectile_id: projectile_id.into(),
        }
    }
}

/// Result of solving one battery assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatteryOutcome {
    Solved(Solution),
    /// The assignment referenced missing or unlinked entities.
    Failed { error: String },
}

impl BatteryOutcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            BatteryOutcome::Solved(s) => Some(s),
            BatteryOutcome::Failed { .. } => None,
        }
    }
}

/// One entry of a battery solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatterySolution {
    pub gun_id: String,
    pub projectile_id: String,
    pub outcome: BatteryOutcome,
}
