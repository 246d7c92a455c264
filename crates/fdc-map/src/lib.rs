//! Map-plane services for fire direction.
//!
//! Pixel/world calibration, grid references,
//! and no-fire area geometry and policy.

pub use fdc_core as core;

pub mod calibration;
pub mod grid;
pub mod nfa;

// Re-export key types for convenience.
pub use calibration::{calibrate_by_three_points, Calibration, CalibrationModel, ControlPoint};
pub use grid::{format_grid_reference, parse_grid_reference, GridPrecision};
pub use nfa::{NfaAssessment, NoFireArea, NoFireAreaRegistry, Segment, SegmentVerdict};
