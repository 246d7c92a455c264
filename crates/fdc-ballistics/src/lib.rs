//! Fire-direction solver.
//!
//! Owns the gun/projectile workspace, runs the solver stages
//! (charge selection, table interpolation, corrections, sector checks)
//! and plans complete fire missions.

pub mod mission;
pub mod mission_file;
pub mod stages;
pub mod workspace;

pub use fdc_core as core;
pub use mission::{MissionReport, MissionRequest, MissionShot, MrsiConfig};
pub use mission_file::MissionFile;
pub use stages::corrections::{Environment, Weather, WindInput};
pub use stages::solver::{solve, FireRequest};
pub use workspace::Workspace;

#[cfg(test)]
mod tests;
