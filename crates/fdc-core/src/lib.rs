//! Core types and definitions for the fire-direction workspace.
//!
//! This crate defines the vocabulary shared across all other crates:
//! value types, the gun/projectile/charge model, correction and NFA
//! configuration, the solution record, errors and unit conversions.
//! It performs no I/O and owns no mutable state.

pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod model;
pub mod solution;
pub mod types;
pub mod units;

pub use error::{FdcError, Result};

#[cfg(test)]
mod tests;
