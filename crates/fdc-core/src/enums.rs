//! Enumeration types used throughout the fire-direction crates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a charge is fired flat at the target or lobbed over cover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FireType {
    Direct,
    #[default]
    Indirect,
}

/// Trajectory shape family of a charge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcVariant {
    /// Flat trajectory.
    Direct,
    /// Low-angle indirect (below 800 mils).
    Low,
    /// High-angle indirect (above 800 mils).
    High,
    #[default]
    Standard,
}

impl ArcVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArcVariant::Direct => "direct",
            ArcVariant::Low => "low",
            ArcVariant::High => "high",
            ArcVariant::Standard => "standard",
        }
    }
}

/// Requested fire type for a solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrajectoryType {
    /// Any fire type.
    #[default]
    Auto,
    Direct,
    Indirect,
}

impl TrajectoryType {
    /// Fire type a charge must have to match, `None` for no restriction.
    pub fn fire_type(&self) -> Option<FireType> {
        match self {
            TrajectoryType::Auto => None,
            TrajectoryType::Direct => Some(FireType::Direct),
            TrajectoryType::Indirect => Some(FireType::Indirect),
        }
    }
}

/// Requested arc for a solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcPreference {
    /// Prefer nothing; fall back to any variant.
    #[default]
    Standard,
    Direct,
    Low,
    High,
}

impl ArcPreference {
    /// Charge variant required by a strict preference, `None` for `Standard`.
    pub fn variant(&self) -> Option<ArcVariant> {
        match self {
            ArcPreference::Standard => None,
            ArcPreference::Direct => Some(ArcVariant::Direct),
            ArcPreference::Low => Some(ArcVariant::Low),
            ArcPreference::High => Some(ArcVariant::High),
        }
    }
}

/// Weapon system class, set once at registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemClass {
    /// Indirect-fire only.
    Mortar,
    #[default]
    Howitzer,
    Gun,
}

/// Rifling twist direction, which sets the sign of spin drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpinDirection {
    Left,
    #[default]
    Right,
}

impl SpinDirection {
    pub fn sign(&self) -> f64 {
        match self {
            SpinDirection::Left => -1.0,
            SpinDirection::Right => 1.0,
        }
    }
}

/// Fire pattern shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FireMode {
    #[default]
    Point,
    Converged,
    ParallelSheaf,
    OpenSheaf,
    CircularArea,
    Linear,
    RectArea,
}

/// How aim points are handed out to the guns of a battery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Distribution {
    /// Every gun takes the first aim point.
    SamePoint,
    /// Guns take aim points round-robin.
    #[default]
    Pattern,
}

/// Role of an aim point inside its pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AimPointRole {
    Center,
    SheafLane,
    Ring,
    Line,
    Grid,
}

/// How a range-table lookup was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interpolation {
    /// Distance at or below the first row.
    ClampedMin,
    /// Distance at or above the last row.
    ClampedMax,
    Linear,
}

/// Why no charge could be selected for a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolveFailure {
    /// No charge covers the requested distance.
    DistanceOutOfRange,
    /// Charges cover the distance but none match the trajectory/arc request.
    TrajectoryNotSupported,
}

impl SolveFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolveFailure::DistanceOutOfRange => "distance-out-of-range",
            SolveFailure::TrajectoryNotSupported => "trajectory-not-supported",
        }
    }
}

impl fmt::Display for SolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Environmental correction terms, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionTerm {
    Height,
    Wind,
    Temperature,
    Humidity,
    Pressure,
    SpinDrift,
    Calibration,
}

impl CorrectionTerm {
    /// Every term, in the order the correction pipeline evaluates them.
    pub const ALL: [CorrectionTerm; 7] = [
        CorrectionTerm::Height,
        CorrectionTerm::Wind,
        CorrectionTerm::Temperature,
        CorrectionTerm::Humidity,
        CorrectionTerm::Pressure,
        CorrectionTerm::SpinDrift,
        CorrectionTerm::Calibration,
    ];
}

/// Policy decision after checking a firing segment against no-fire areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NfaAction {
    Allow,
    CancelFire,
    SkipNfaSegment,
    WarnOnly,
}

impl NfaAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            NfaAction::Allow => "allow",
            NfaAction::CancelFire => "cancel-fire",
            NfaAction::SkipNfaSegment => "skip-nfa-segment",
            NfaAction::WarnOnly => "warn-only",
        }
    }
}

impl fmt::Display for NfaAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
