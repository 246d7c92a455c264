//! Fire missions: pattern → per-gun aim points → solutions → NFA verdicts.

use serde::{Deserialize, Serialize};

use fdc_core::constants::{DEFAULT_MRSI_MIN_SEPARATION_S, DEFAULT_MRSI_ROUNDS};
use fdc_core::enums::{ArcPreference, Distribution, FireMode, NfaAction, TrajectoryType};
use fdc_core::error::FdcError;
use fdc_core::solution::{BatteryOutcome, GunAssignment, Solution};
use fdc_core::types::{AimPoint, TargetPoint};
use fdc_map::nfa::{NfaAssessment, Segment, SegmentVerdict};
use fdc_patterns::aim_points::{generate_aim_points, pick_aim_point_for_gun, FireModeConfig};
use fdc_patterns::plan::{build_fire_plan, FireControl, FirePlan};

use crate::stages::corrections::Environment;
use crate::stages::solver::FireRequest;
use crate::workspace::Workspace;

/// A fire mission for a set of guns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionRequest {
    pub fire_mode: FireModeConfig,
    pub control: FireControl,
    /// Guns taking part, in lane order.
    pub guns: Vec<GunAssignment>,
    pub distribute: Distribution,
    pub environment: Environment,
    pub trajectory_type: TrajectoryType,
    pub arc_preference: ArcPreference,
    /// Stagger firing so every round of a phase lands together.
    pub time_on_target: bool,
    /// Fire several rounds per gun on different charges, timed to land
    /// together.
    pub mrsi: Option<MrsiConfig>,
}

/// Multiple rounds, simultaneous impact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MrsiConfig {
    /// Rounds per gun; at least one.
    pub rounds: u32,
    /// Smallest time-of-flight gap between two rounds of one gun (s).
    pub min_separation_s: f64,
}

impl Default for MrsiConfig {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_MRSI_ROUNDS,
            min_separation_s: DEFAULT_MRSI_MIN_SEPARATION_S,
        }
    }
}

impl MrsiConfig {
    fn round_count(&self) -> usize {
        self.rounds.max(1) as usize
    }

    fn separation_s(&self) -> f64 {
        if self.min_separation_s.is_finite() {
            self.min_separation_s.max(0.0)
        } else {
            DEFAULT_MRSI_MIN_SEPARATION_S
        }
    }
}

/// One gun's shot at one aim point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionShot {
    pub phase_index: usize,
    pub gun_id: String,
    pub projectile_id: String,
    pub aim_point: AimPoint,
    pub outcome: BatteryOutcome,
    /// Verdict for the gun → aim point segment; absent when the gun is unknown.
    pub nfa: Option<NfaAssessment>,
    /// Delay from mission start before firing (s).
    pub fire_delay_s: f64,
    /// Position of the round in its gun's MRSI volley, in firing order.
    #[serde(default)]
    pub round_index: usize,
}

impl MissionShot {
    /// Solved, fireable, and not stopped by a no-fire area.
    pub fn cleared_to_fire(&self) -> bool {
        let fireable = self.outcome.solution().is_some_and(|s| s.is_fireable());
        let nfa_ok = self.nfa.as_ref().map_or(true, |a| {
            matches!(a.action, NfaAction::Allow | NfaAction::WarnOnly)
        });
        fireable && nfa_ok
    }

    fn time_of_flight(&self) -> Option<f64> {
        self.outcome
            .solution()
            .filter(|s| s.in_range)
            .and_then(|s| s.time_of_flight)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionReport {
    pub plan: FirePlan,
    pub shots: Vec<MissionShot>,
    /// Legs between consecutive points of linear patterns.
    pub pattern_segments: Vec<SegmentVerdict>,
}

impl MissionReport {
    pub fn cleared_count(&self) -> usize {
        self.shots.iter().filter(|s| s.cleared_to_fire()).count()
    }
}

fn flight_time(solution: &Solution) -> f64 {
    solution.time_of_flight.unwrap_or(0.0)
}

/// Pick the rounds of one gun's MRSI volley from its per-charge solutions.
///
/// Only fireable solutions count. Walking from the shortest time of flight,
/// a solution is kept when it flies at least `min_separation_s` longer
/// than the last kept one, up to `rounds`. The result is in firing order,
/// longest flight first.
pub fn pick_mrsi_rounds(mut solutions: Vec<Solution>, config: &MrsiConfig) -> Vec<Solution> {
    solutions.retain(|s| s.is_fireable() && s.time_of_flight.is_some_and(f64::is_finite));
    solutions.sort_by(|a, b| flight_time(a).total_cmp(&flight_time(b)));

    let separation = config.separation_s();
    let mut picked: Vec<Solution> = Vec::with_capacity(config.round_count());
    for solution in solutions {
        if picked.len() >= config.round_count() {
            break;
        }
        let spaced = picked
            .last()
            .map_or(true, |last| flight_time(&solution) - flight_time(last) >= separation);
        if spaced {
            picked.push(solution);
        }
    }
    picked.reverse();
    picked
}

/// Delay each in-range shot by `max_tof − tof` so the rounds land together.
pub fn apply_time_on_target(shots: &mut [MissionShot]) {
    let max_tof = shots
        .iter()
        .filter_map(MissionShot::time_of_flight)
        .fold(0.0_f64, f64::max);
    for shot in shots.iter_mut() {
        if let Some(tof) = shot.time_of_flight() {
            shot.fire_delay_s += (max_tof - tof).max(0.0);
        }
    }
}

impl Workspace {
    /// Plan and solve a fire mission. Problems with individual guns are
    /// reported on their shots and never abort the mission.
    pub fn run_fire_mission(&self, request: &MissionRequest) -> MissionReport {
        let mode = request.fire_mode.mode;
        let base_points = generate_aim_points(&request.fire_mode, request.guns.len());
        let plan = build_fire_plan(base_points, &request.control, request.fire_mode.bearing());

        let mut shots = Vec::new();
        let mut pattern_segments = Vec::new();

        for phase in &plan.phases {
            let points = plan.phase_points(phase);

            if mode == FireMode::Linear {
                let legs: Vec<Segment> = points
                    .windows(2)
                    .map(|w| Segment::new(w[0].xy(), w[1].xy()))
                    .collect();
                pattern_segments.extend(self.no_fire_areas().filter_linear_pattern_segments(&legs));
            }

            let mut phase_shots = Vec::with_capacity(request.guns.len());
            for (gun_index, assignment) in request.guns.iter().enumerate() {
                let Some(aim) = pick_aim_point_for_gun(&points, gun_index, request.distribute).copied() else {
                    continue;
                };
                let target = TargetPoint {
                    x: aim.x,
                    y: aim.y,
                    z: aim.z,
                };

                let (outcomes, nfa) = match self.gun(&assignment.gun_id) {
                    Some(gun) => {
                        let fire_request = FireRequest::toward(gun, &target)
                            .with_environment(request.environment)
                            .with_trajectory(request.trajectory_type, request.arc_preference);
                        let outcomes = match &request.mrsi {
                            Some(mrsi) => self.mrsi_outcomes(assignment, &fire_request, mrsi),
                            None => vec![self.battery_outcome(assignment, &fire_request)],
                        };
                        let nfa = self.assess_trajectory(gun.position, aim.xy(), mode);
                        (outcomes, Some(nfa))
                    }
                    None => {
                        let error = FdcError::GunNotFound(assignment.gun_id.clone());
                        tracing::warn!(gun = %assignment.gun_id, "Mission gun not registered");
                        (vec![BatteryOutcome::Failed { error: error.to_string() }], None)
                    }
                };

                let mut gun_shots: Vec<MissionShot> = outcomes
                    .into_iter()
                    .enumerate()
                    .map(|(round_index, outcome)| MissionShot {
                        phase_index: phase.index,
                        gun_id: assignment.gun_id.clone(),
                        projectile_id: assignment.projectile_id.clone(),
                        aim_point: aim,
                        outcome,
                        nfa: nfa.clone(),
                        fire_delay_s: phase.planned_start_delay_s,
                        round_index,
                    })
                    .collect();
                // Without a common impact time each volley lands on its own.
                if request.mrsi.is_some() && !request.time_on_target {
                    apply_time_on_target(&mut gun_shots);
                }
                phase_shots.extend(gun_shots);
            }

            if request.time_on_target {
                apply_time_on_target(&mut phase_shots);
            }
            shots.extend(phase_shots);
        }

        let report = MissionReport {
            plan,
            shots,
            pattern_segments,
        };
        tracing::info!(
            mode = ?mode,
            phases = report.plan.phases.len(),
            shots = report.shots.len(),
            cleared = report.cleared_count(),
            "Fire mission planned"
        );
        report
    }

    /// The rounds of one gun's MRSI volley. Falls back to the single
    /// regular shot when no charge gives a fireable solution.
    fn mrsi_outcomes(
        &self,
        assignment: &GunAssignment,
        request: &FireRequest,
        mrsi: &MrsiConfig,
    ) -> Vec<BatteryOutcome> {
        let solutions = match self.calculate_charge_solutions(&assignment.gun_id, &assignment.projectile_id, request) {
            Ok(solutions) => solutions,
            Err(_) => return vec![self.battery_outcome(assignment, request)],
        };
        let rounds = pick_mrsi_rounds(solutions, mrsi);
        if rounds.is_empty() {
            return vec![self.battery_outcome(assignment, request)];
        }
        tracing::debug!(gun = %assignment.gun_id, rounds = rounds.len(), "MRSI volley planned");
        rounds.into_iter().map(BatteryOutcome::Solved).collect()
    }
}
