//! Fire phase planning: splits a pattern into timed firing phases.

use serde::{Deserialize, Serialize};

use fdc_core::constants::MIN_PATTERN_DIMENSION_M;
use fdc_core::types::AimPoint;
use fdc_core::units::bearing_unit;

/// How the aim points of a pattern are sequenced.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "control", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FireControl {
    /// One phase, all points at once.
    #[default]
    Simultaneous,
    /// One phase per aim point, in pattern order.
    Sequence,
    /// The whole pattern walks forward along the bearing.
    Creeping {
        step_m: f64,
        steps: u32,
        #[serde(default)]
        step_interval_s: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirePhase {
    pub index: usize,
    pub label: String,
    /// Indices into `FirePlan::aim_points`.
    pub aim_point_indices: Vec<usize>,
    /// Delay from mission start (s).
    pub planned_start_delay_s: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirePlan {
    pub aim_points: Vec<AimPoint>,
    pub phases: Vec<FirePhase>,
}

impl FirePlan {
    /// Aim points of one phase, in phase order.
    pub fn phase_points(&self, phase: &FirePhase) -> Vec<AimPoint> {
        phase
            .aim_point_indices
            .iter()
            .filter_map(|&i| self.aim_points.get(i).copied())
            .collect()
    }
}

/// Arrange `aim_points` into phases. `bearing_deg` is the direction a
/// creeping barrage advances in.
pub fn build_fire_plan(aim_points: Vec<AimPoint>, control: &FireControl, bearing_deg: f64) -> FirePlan {
    match *control {
        FireControl::Simultaneous => {
            let phase = FirePhase {
                index: 0,
                label: "Main".to_string(),
                aim_point_indices: (0..aim_points.len()).collect(),
                planned_start_delay_s: 0.0,
            };
            FirePlan {
                aim_points,
                phases: vec![phase],
            }
        }
        FireControl::Sequence => {
            let phases = (0..aim_points.len())
                .map(|i| FirePhase {
                    index: i,
                    label: format!("#{}", i + 1),
                    aim_point_indices: vec![i],
                    planned_start_delay_s: 0.0,
                })
                .collect();
            FirePlan { aim_points, phases }
        }
        FireControl::Creeping {
            step_m,
            steps,
            step_interval_s,
        } => {
            let step_m = step_m.max(MIN_PATTERN_DIMENSION_M);
            let steps = steps.max(1) as usize;
            let interval = step_interval_s.max(0.0);
            let (sin, cos) = bearing_unit(bearing_deg);

            let mut points = Vec::with_capacity(aim_points.len() * steps);
            let mut phases = Vec::with_capacity(steps);
            for k in 0..steps {
                let shift = k as f64 * step_m;
                let mut indices = Vec::with_capacity(aim_points.len());
                for base in &aim_points {
                    let mut shifted = *base;
                    shifted.x += sin * shift;
                    shifted.y += cos * shift;
                    shifted.meta.index = points.len();
                    indices.push(points.len());
                    points.push(shifted);
                }
                phases.push(FirePhase {
                    index: k,
                    label: format!("Step {}", k + 1),
                    aim_point_indices: indices,
                    planned_start_delay_s: k as f64 * interval,
                });
            }
            FirePlan {
                aim_points: points,
                phases,
            }
        }
    }
}
