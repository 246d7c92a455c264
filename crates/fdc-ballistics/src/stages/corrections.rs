//! Environmental corrections.
//!
//! Every term in `CorrectionTerm::ALL` is computed by `compute_term` and
//! summed in a single loop. Disabled terms are reported with zero
//! contribution.

use serde::{Deserialize, Serialize};

use fdc_core::config::CorrectionConfig;
use fdc_core::constants::*;
use fdc_core::enums::{CorrectionTerm, SpinDirection};
use fdc_core::model::RangeTableRow;
use fdc_core::solution::{AppliedCorrection, CorrectionBreakdown};

/// Wind as measured, or as pre-resolved components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindInput {
    pub speed_mps: f64,
    /// Compass direction of the wind (degrees).
    pub direction_deg: f64,
    /// Used as-is instead of the resolved component when set.
    pub crosswind_mps: Option<f64>,
    pub headwind_mps: Option<f64>,
}

impl WindInput {
    pub fn new(speed_mps: f64, direction_deg: f64) -> Self {
        Self {
            speed_mps,
            direction_deg,
            ..Self::default()
        }
    }

    /// Crosswind and headwind relative to the line of fire.
    pub fn components(&self, bearing_deg: f64) -> (f64, f64) {
        let delta = (self.direction_deg - bearing_deg).to_radians();
        let crosswind = self
            .crosswind_mps
            .unwrap_or_else(|| self.speed_mps * delta.sin());
        let headwind = self
            .headwind_mps
            .unwrap_or_else(|| self.speed_mps * delta.cos());
        (crosswind, headwind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weather {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub pressure_hpa: f64,
}

impl Default for Weather {
    fn default() -> Self {
        Self {
            temperature_c: REFERENCE_TEMPERATURE_C,
            humidity_pct: REFERENCE_HUMIDITY_PCT,
            pressure_hpa: REFERENCE_PRESSURE_HPA,
        }
    }
}

/// Conditions shared by all guns of a mission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub wind: WindInput,
    pub weather: Weather,
    pub spin: SpinDirection,
}

/// Everything a correction term may look at.
#[derive(Debug, Clone, Copy)]
pub struct CorrectionContext<'a> {
    pub config: &'a CorrectionConfig,
    pub environment: &'a Environment,
    /// Line of fire (degrees).
    pub bearing_deg: f64,
    pub distance_m: f64,
    /// Target altitude minus gun altitude (m).
    pub height_diff_m: f64,
    /// Interpolated table row at `distance_m`.
    pub row: &'a RangeTableRow,
    pub wind_drift_factor: f64,
    /// Gun-specific calibration offset (mil), overriding the configured default.
    pub gun_calibration_offset_mil: Option<f64>,
}

/// Contribution of one term.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TermValue {
    pub elevation_mil: f64,
    pub time_s: f64,
}

impl TermValue {
    fn elevation(elevation_mil: f64) -> Self {
        Self {
            elevation_mil,
            time_s: 0.0,
        }
    }
}

/// Raw contribution of `term`, regardless of whether it is enabled.
pub fn compute_term(term: CorrectionTerm, ctx: &CorrectionContext) -> TermValue {
    let cfg = ctx.config;
    let weather = &ctx.environment.weather;
    match term {
        CorrectionTerm::Height => {
            let steps = ctx.height_diff_m / HEIGHT_TABLE_STEP_M;
            TermValue {
                elevation_mil: ctx.row.d_elev * steps,
                time_s: ctx.row.tof_per_100m * steps,
            }
        }
        CorrectionTerm::Wind => {
            let (crosswind, headwind) = ctx.environment.wind.components(ctx.bearing_deg);
            TermValue::elevation(crosswind * ctx.wind_drift_factor + headwind * cfg.headwind_factor)
        }
        CorrectionTerm::Temperature => TermValue::elevation(
            (weather.temperature_c - cfg.reference_temperature_c) * cfg.temperature_factor,
        ),
        CorrectionTerm::Humidity => TermValue::elevation(
            (weather.humidity_pct - cfg.reference_humidity_pct) * cfg.humidity_factor,
        ),
        CorrectionTerm::Pressure => TermValue::elevation(
            (weather.pressure_hpa - cfg.reference_pressure_hpa) * cfg.pressure_factor,
        ),
        CorrectionTerm::SpinDrift => TermValue::elevation(
            ctx.environment.spin.sign() * (ctx.distance_m / 1000.0) * cfg.spin_factor,
        ),
        CorrectionTerm::Calibration => TermValue::elevation(
            ctx.gun_calibration_offset_mil
                .unwrap_or(cfg.default_calibration_offset_mil),
        ),
    }
}

/// Evaluate all terms and sum the enabled ones.
pub fn compute_corrections(ctx: &CorrectionContext) -> CorrectionBreakdown {
    let (crosswind, headwind) = ctx.environment.wind.components(ctx.bearing_deg);
    let mut breakdown = CorrectionBreakdown {
        crosswind_mps: crosswind,
        headwind_mps: headwind,
        ..CorrectionBreakdown::default()
    };

    for term in CorrectionTerm::ALL {
        let enabled = ctx.config.enabled.is_enabled(term);
        let value = if enabled {
            compute_term(term, ctx)
        } else {
            TermValue::default()
        };
        breakdown.total_elevation_mil += value.elevation_mil;
        breakdown.total_time_s += value.time_s;
        breakdown.terms.push(AppliedCorrection {
            term,
            enabled,
            elevation_mil: value.elevation_mil,
            time_s: value.time_s,
        });
    }

    breakdown
}
