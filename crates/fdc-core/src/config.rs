//! Solver configuration: correction terms and no-fire-area policy.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::CorrectionTerm;

/// Per-term enable flags for the correction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionToggles {
    pub height: bool,
    pub wind: bool,
    pub temperature: bool,
    pub humidity: bool,
    pub pressure: bool,
    pub spin_drift: bool,
    pub calibration: bool,
}

impl Default for CorrectionToggles {
    fn default() -> Self {
        Self::all(true)
    }
}

impl CorrectionToggles {
    pub fn all(enabled: bool) -> Self {
        Self {
            height: enabled,
            wind: enabled,
            temperature: enabled,
            humidity: enabled,
            pressure: enabled,
            spin_drift: enabled,
            calibration: enabled,
        }
    }

    pub fn is_enabled(&self, term: CorrectionTerm) -> bool {
        match term {
            CorrectionTerm::Height => self.height,
            CorrectionTerm::Wind => self.wind,
            CorrectionTerm::Temperature => self.temperature,
            CorrectionTerm::Humidity => self.humidity,
            CorrectionTerm::Pressure => self.pressure,
            CorrectionTerm::SpinDrift => self.spin_drift,
            CorrectionTerm::Calibration => self.calibration,
        }
    }

    pub fn set(&mut self, term: CorrectionTerm, enabled: bool) {
        let flag = match term {
            CorrectionTerm::Height => &mut self.height,
            CorrectionTerm::Wind => &mut self.wind,
            CorrectionTerm::Temperature => &mut self.temperature,
            CorrectionTerm::Humidity => &mut self.humidity,
            CorrectionTerm::Pressure => &mut self.pressure,
            CorrectionTerm::SpinDrift => &mut self.spin_drift,
            CorrectionTerm::Calibration => &mut self.calibration,
        };
        *flag = enabled;
    }
}

/// Scaling factors and baselines for environmental corrections.
///
/// Held by the repository and replaced only through explicit reconfiguration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    pub enabled: CorrectionToggles,
    /// Elevation per m/s of headwind (mil).
    pub headwind_factor: f64,
    /// Elevation per °C off reference (mil).
    pub temperature_factor: f64,
    /// Elevation per % humidity off reference (mil).
    pub humidity_factor: f64,
    /// Elevation per hPa off reference (mil).
    pub pressure_factor: f64,
    /// Spin drift per km of range (mil).
    pub spin_factor: f64,
    pub reference_temperature_c: f64,
    pub reference_humidity_pct: f64,
    pub reference_pressure_hpa: f64,
    /// Calibration offset for guns without their own (mil).
    pub default_calibration_offset_mil: f64,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            enabled: CorrectionToggles::default(),
            headwind_factor: DEFAULT_HEADWIND_FACTOR,
            temperature_factor: DEFAULT_TEMPERATURE_FACTOR,
            humidity_factor: DEFAULT_HUMIDITY_FACTOR,
            pressure_factor: DEFAULT_PRESSURE_FACTOR,
            spin_factor: DEFAULT_SPIN_FACTOR,
            reference_temperature_c: REFERENCE_TEMPERATURE_C,
            reference_humidity_pct: REFERENCE_HUMIDITY_PCT,
            reference_pressure_hpa: REFERENCE_PRESSURE_HPA,
            default_calibration_offset_mil: 0.0,
        }
    }
}

impl CorrectionConfig {
    /// Default factors with only the listed terms enabled.
    pub fn only(terms: &[CorrectionTerm]) -> Self {
        let mut enabled = CorrectionToggles::all(false);
        for term in terms {
            enabled.set(*term, true);
        }
        Self {
            enabled,
            ..Self::default()
        }
    }
}

/// What to do when a firing segment crosses a no-fire area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NfaSettings {
    /// Cancel the shot outright.
    pub cancel_fire_on_nfa_hit: bool,
    /// In linear patterns, drop only the offending segment.
    pub skip_nfa_in_linear_pattern: bool,
}

impl Default for NfaSettings {
    fn default() -> Self {
        Self {
            cancel_fire_on_nfa_hit: false,
            skip_nfa_in_linear_pattern: true,
        }
    }
}
