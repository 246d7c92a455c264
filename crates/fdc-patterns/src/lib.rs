//! Fire patterns for multi-gun missions.
//!
//! Aim-point generation and gun assignment, phase planning
//! for sequenced and creeping fire, and adjust-fire helpers.

pub mod adjustment;
pub mod aim_points;
pub mod plan;

pub use fdc_core as core;

pub use aim_points::{generate_aim_points, pick_aim_point_for_gun, FireModeConfig};
pub use plan::{build_fire_plan, FireControl, FirePhase, FirePlan};
