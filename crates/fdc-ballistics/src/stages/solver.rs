//! Firing solution for one gun and projectile.
//!
//! `solve` is a pure function of value snapshots; looking up and
//! validating the gun/projectile pair is the caller's job.

use serde::{Deserialize, Serialize};

use fdc_core::config::CorrectionConfig;
use fdc_core::constants::*;
use fdc_core::enums::{ArcPreference, SolveFailure, TrajectoryType};
use fdc_core::model::{Charge, Gun, Projectile};
use fdc_core::solution::{Solution, TrajectoryPoint};
use fdc_core::types::TargetPoint;
use fdc_core::units::{bearing_deg, deg_to_mil, horizontal_distance, wrap_deg};

use super::corrections::{compute_corrections, CorrectionContext, Environment};
use super::interpolation::interpolate_table;
use super::sector::{build_envelope, gun_covers_bearing};
use super::selector::{candidate_charges, select_charge};

/// Target geometry and firing preferences for one solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireRequest {
    /// Horizontal gun-target distance (m).
    pub distance_m: f64,
    /// Compass bearing gun → target (degrees).
    pub bearing_deg: f64,
    /// Target altitude minus gun altitude (m).
    pub height_diff_m: f64,
    pub environment: Environment,
    pub trajectory_type: TrajectoryType,
    pub arc_preference: ArcPreference,
}

impl FireRequest {
    pub fn new(distance_m: f64, bearing_deg: f64) -> Self {
        Self {
            distance_m,
            bearing_deg,
            ..Self::default()
        }
    }

    /// Geometry from the gun's position and altitude to `target`.
    /// A target without altitude is taken to sit at the gun's altitude.
    pub fn toward(gun: &Gun, target: &TargetPoint) -> Self {
        let to = target.xy();
        Self {
            distance_m: horizontal_distance(&gun.position, &to),
            bearing_deg: bearing_deg(&gun.position, &to),
            height_diff_m: target.z.map_or(0.0, |z| z - gun.altitude_m),
            ..Self::default()
        }
    }

    pub fn with_height_diff(mut self, height_diff_m: f64) -> Self {
        self.height_diff_m = height_diff_m;
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_trajectory(mut self, trajectory_type: TrajectoryType, arc_preference: ArcPreference) -> Self {
        self.trajectory_type = trajectory_type;
        self.arc_preference = arc_preference;
        self
    }
}

/// Display-only arc from the gun to the target. Never used for laying.
pub fn display_trajectory(distance_m: f64, height_diff_m: f64) -> Vec<TrajectoryPoint> {
    let peak = (TRAJECTORY_PEAK_PER_METER * distance_m + TRAJECTORY_PEAK_HEIGHT_SHARE * height_diff_m).max(0.0);
    (0..=TRAJECTORY_STEPS)
        .map(|i| {
            let t = i as f64 / TRAJECTORY_STEPS as f64;
            TrajectoryPoint {
                x: distance_m * t,
                y: 4.0 * peak * t * (1.0 - t) + height_diff_m * t,
            }
        })
        .collect()
}

fn unsolved(gun: &Gun, projectile: &Projectile, request: &FireRequest) -> Solution {
    let azimuth_deg = wrap_deg(request.bearing_deg);
    Solution {
        gun_id: gun.id.clone(),
        projectile_id: projectile.id.clone(),
        in_range: false,
        reason: None,
        in_sector: gun_covers_bearing(gun, azimuth_deg),
        in_elevation_limits: false,
        charge_level: None,
        fire_type: None,
        trajectory_variant: None,
        interpolation: None,
        elevation_mil: None,
        azimuth_deg,
        azimuth_mil: deg_to_mil(azimuth_deg),
        time_of_flight: None,
        corrections: None,
        envelope: None,
        trajectory: Vec::new(),
    }
}

/// Compute the firing solution of `gun` with `projectile` for `request`.
pub fn solve(gun: &Gun, projectile: &Projectile, request: &FireRequest, config: &CorrectionConfig) -> Solution {
    let charge = match select_charge(
        &projectile.charges,
        request.distance_m,
        request.trajectory_type,
        request.arc_preference,
        gun.system_class,
    ) {
        Ok(charge) => charge,
        Err(reason) => {
            tracing::debug!(gun = %gun.id, projectile = %projectile.id, %reason, "No charge for target");
            let mut solution = unsolved(gun, projectile, request);
            solution.reason = Some(reason);
            return solution;
        }
    };
    solve_with_charge(gun, projectile, charge, request, config)
}

/// One solution per charge able to reach the target, in registration order.
/// Used to plan several rounds that arrive together.
pub fn solve_all_charges(
    gun: &Gun,
    projectile: &Projectile,
    request: &FireRequest,
    config: &CorrectionConfig,
) -> Result<Vec<Solution>, SolveFailure> {
    let charges = candidate_charges(
        &projectile.charges,
        request.distance_m,
        request.trajectory_type,
        request.arc_preference,
        gun.system_class,
    )?;
    Ok(charges
        .into_iter()
        .map(|charge| solve_with_charge(gun, projectile, charge, request, config))
        .collect())
}

fn solve_with_charge(
    gun: &Gun,
    projectile: &Projectile,
    charge: &Charge,
    request: &FireRequest,
    config: &CorrectionConfig,
) -> Solution {
    let mut solution = unsolved(gun, projectile, request);
    let azimuth_deg = solution.azimuth_deg;

    let base = interpolate_table(&charge.range_table, request.distance_m);
    let ctx = CorrectionContext {
        config,
        environment: &request.environment,
        bearing_deg: azimuth_deg,
        distance_m: request.distance_m,
        height_diff_m: request.height_diff_m,
        row: &base.row,
        wind_drift_factor: projectile.wind_drift_factor,
        gun_calibration_offset_mil: gun.calibration_offset_mil,
    };
    let corrections = compute_corrections(&ctx);
    let elevation = base.row.elevation + corrections.total_elevation_mil;

    tracing::debug!(
        gun = %gun.id,
        charge = charge.level,
        variant = charge.variant.as_str(),
        interpolation = ?base.interpolation,
        elevation,
        "Charge selected"
    );

    solution.in_range = true;
    solution.in_elevation_limits = elevation >= gun.min_elevation_mil && elevation <= gun.max_elevation_mil;
    solution.charge_level = Some(charge.level);
    solution.fire_type = Some(charge.fire_type);
    solution.trajectory_variant = Some(charge.variant);
    solution.interpolation = Some(base.interpolation);
    solution.elevation_mil = Some(elevation);
    solution.time_of_flight = Some(base.row.tof + corrections.total_time_s);
    solution.corrections = Some(corrections);
    solution.envelope = Some(build_envelope(gun, charge.min_range(), charge.max_range()));
    solution.trajectory = display_trajectory(request.distance_m, request.height_diff_m);
    solution
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_trajectory_endpoints() {
        let curve = display_trajectory(1000.0, 40.0);
        assert_eq!(curve.len(), TRAJECTORY_STEPS + 1);
        assert_eq!(curve[0], TrajectoryPoint { x: 0.0, y: 0.0 });
        let end = curve[TRAJECTORY_STEPS];
        assert!((end.x - 1000.0).abs() < 1e-9);
        assert!((end.y - 40.0).abs() < 1e-9);
        // Apex at the middle: 4·peak·¼ + Δh/2 with peak = 230 + 20.
        let mid = curve[TRAJECTORY_STEPS / 2];
        assert!((mid.y - (250.0 + 20.0)).abs() < 1e-9);
    }

    #[test]
    fn test_display_trajectory_peak_never_negative() {
        let curve = display_trajectory(100.0, -500.0);
        // peak clamps to 0, so the curve is the straight drop.
        for p in &curve {
            assert!((p.y - (-500.0 * p.x / 100.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_request_toward_target() {
        let mut gun = Gun::new("g", fdc_core::types::Point2::new(0.0, 0.0), 0.0, 1000.0);
        gun.altitude_m = 20.0;
        let req = FireRequest::toward(&gun, &TargetPoint::with_z(3000.0, 4000.0, 80.0));
        assert!((req.distance_m - 5000.0).abs() < 1e-9);
        assert!((req.bearing_deg - 36.869_897_645_844_02).abs() < 1e-9);
        assert!((req.height_diff_m - 60.0).abs() < 1e-9);

        let flat = FireRequest::toward(&gun, &TargetPoint::new(0.0, 10.0));
        assert_eq!(flat.height_diff_m, 0.0);
    }
}
