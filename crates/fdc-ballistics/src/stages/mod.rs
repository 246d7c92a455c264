//! Solver stages.
//!
//! Stages are pure functions over value snapshots of the weapon model.
//! They do not own state; the `Workspace` feeds them.

pub mod corrections;
pub mod interpolation;
pub mod sector;
pub mod selector;
pub mod solver;
