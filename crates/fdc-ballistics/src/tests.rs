//! Tests for the workspace, battery solving and fire missions.

use fdc_core::config::{CorrectionConfig, NfaSettings};
use fdc_core::enums::*;
use fdc_core::error::FdcError;
use fdc_core::model::{Charge, Gun, Projectile, RangeTableRow};
use fdc_core::solution::{BatteryOutcome, GunAssignment};
use fdc_core::types::{Point2, TargetPoint};
use fdc_map::calibration::ControlPoint;
use fdc_map::nfa::NoFireArea;
use fdc_patterns::aim_points::FireModeConfig;
use fdc_patterns::plan::FireControl;

use crate::mission::{pick_mrsi_rounds, MissionRequest, MrsiConfig};
use crate::stages::corrections::{Environment, WindInput};
use crate::stages::solver::FireRequest;
use crate::workspace::Workspace;

fn m795() -> Projectile {
    Projectile::new("m795", "HE", 0.5).with_charge(
        Charge::new(
            5,
            ArcVariant::Low,
            FireType::Indirect,
            vec![
                RangeTableRow::new(4000.0, 980.0, 12.0, 14.0, 0.12),
                RangeTableRow::new(6000.0, 870.0, 17.0, 18.0, 0.16),
                RangeTableRow::new(8000.0, 760.0, 23.0, 25.0, 0.22),
            ],
        )
        .unwrap(),
    )
}

fn mortar_round() -> Projectile {
    Projectile::new("m821", "HE", 0.2).with_charge(
        Charge::new(
            1,
            ArcVariant::High,
            FireType::Indirect,
            vec![
                RangeTableRow::new(1200.0, 1250.0, 20.0, 9.0, 0.3),
                RangeTableRow::new(1800.0, 1100.0, 24.0, 11.0, 0.35),
            ],
        )
        .unwrap(),
    )
}

fn howitzer_workspace() -> Workspace {
    let mut ws = Workspace::new();
    ws.register_projectile(m795()).unwrap();
    ws.register_gun(
        Gun::new("m777-1", Point2::new(0.0, 0.0), 250.0, 1300.0)
            .with_sector(90.0, 75.0, 105.0)
            .with_projectile("m795"),
    )
    .unwrap();
    ws
}

// ---- Single gun ----

#[test]
fn test_end_to_end_gun_solution() {
    let ws = howitzer_workspace();
    let request = FireRequest::new(5000.0, 92.0)
        .with_height_diff(60.0)
        .with_environment(Environment {
            wind: WindInput::new(6.0, 130.0),
            ..Environment::default()
        });

    let s = ws.calculate_gun_solution("m777-1", "m795", &request).unwrap();
    assert!(s.in_range);
    assert!(s.in_sector);
    assert!(s.in_elevation_limits);
    assert!(s.is_fireable());
    assert_eq!(s.charge_level, Some(5));
    assert_eq!(s.interpolation, Some(Interpolation::Linear));

    let elevation = s.elevation_mil.unwrap();
    assert!(elevation > 900.0 && elevation < 1000.0, "elevation {elevation}");

    // Base 925 mil plus the per-term contributions.
    let corrections = s.corrections.as_ref().unwrap();
    assert!((elevation - (925.0 + corrections.total_elevation_mil)).abs() < 1e-9);
    assert!((corrections.elevation_of(CorrectionTerm::Height) - 9.6).abs() < 1e-9);
    assert!((s.time_of_flight.unwrap() - (14.5 + 0.084)).abs() < 1e-9);
    assert!((s.azimuth_mil - 92.0 * 6400.0 / 360.0).abs() < 1e-9);

    let envelope = s.envelope.as_ref().unwrap();
    assert!(!envelope.omni);
    assert_eq!(envelope.min_range, 4000.0);
    assert_eq!(envelope.max_range, 8000.0);
}

#[test]
fn test_out_of_sector_still_solved() {
    let ws = howitzer_workspace();
    let s = ws
        .calculate_gun_solution("m777-1", "m795", &FireRequest::new(5000.0, 200.0))
        .unwrap();
    assert!(s.in_range);
    assert!(!s.in_sector);
    assert!(!s.is_fireable());
    assert!(s.elevation_mil.is_some());
}

#[test]
fn test_out_of_range_is_reported_not_error() {
    let ws = howitzer_workspace();
    let s = ws
        .calculate_gun_solution("m777-1", "m795", &FireRequest::new(9000.0, 90.0))
        .unwrap();
    assert!(!s.in_range);
    assert_eq!(s.reason, Some(SolveFailure::DistanceOutOfRange));
    assert!(s.elevation_mil.is_none());
    assert!(s.in_sector);
}

#[test]
fn test_setup_errors() {
    let mut ws = howitzer_workspace();
    let req = FireRequest::new(5000.0, 90.0);
    assert!(matches!(
        ws.calculate_gun_solution("nope", "m795", &req),
        Err(FdcError::GunNotFound(id)) if id == "nope"
    ));
    assert!(matches!(
        ws.calculate_gun_solution("m777-1", "nope", &req),
        Err(FdcError::ProjectileNotFound(_))
    ));

    ws.register_projectile(mortar_round()).unwrap();
    let err = ws.calculate_gun_solution("m777-1", "m821", &req).unwrap_err();
    assert!(matches!(err, FdcError::ProjectileNotLinked { .. }));
    assert_eq!(err.to_string(), "Projectile m821 is not linked to gun m777-1");
}

// ---- Battery ----

#[test]
fn test_battery_mixed_systems() {
    let mut ws = howitzer_workspace();
    ws.register_projectile(mortar_round()).unwrap();
    ws.register_gun(
        Gun::new("mortar-1", Point2::new(0.0, 0.0), 800.0, 1500.0)
            .with_system_class(SystemClass::Mortar)
            .with_projectile("m821"),
    )
    .unwrap();

    let assignments = vec![
        GunAssignment::new("mortar-1", "m821"),
        GunAssignment::new("m777-1", "m795"),
        GunAssignment::new("ghost", "m795"),
    ];
    let request = FireRequest::new(1500.0, 90.0).with_trajectory(TrajectoryType::Direct, ArcPreference::Standard);
    let results = ws.calculate_battery_solutions(&assignments, &request);
    assert_eq!(results.len(), 3);

    // Mortars ignore the direct-fire request.
    let mortar = results[0].outcome.solution().unwrap();
    assert!(mortar.in_range);
    assert_eq!(mortar.fire_type, Some(FireType::Indirect));

    let howitzer = results[1].outcome.solution().unwrap();
    assert!(!howitzer.in_range);
    assert_eq!(howitzer.reason, Some(SolveFailure::DistanceOutOfRange));

    match &results[2].outcome {
        BatteryOutcome::Failed { error } => assert_eq!(error, "Gun not found: ghost"),
        other => panic!("expected failure, got {other:?}"),
    }
}

// ---- Repository operations ----

#[test]
fn test_register_gun_requires_known_projectiles() {
    let mut ws = Workspace::new();
    let gun = Gun::new("g", Point2::new(0.0, 0.0), 100.0, 1000.0).with_projectile("m795");
    assert!(matches!(ws.register_gun(gun), Err(FdcError::ProjectileNotFound(_))));
}

#[test]
fn test_set_sector_keeps_old_on_invalid() {
    let mut ws = howitzer_workspace();
    ws.set_sector("m777-1", 0.0, 350.0, 10.0).unwrap();
    let gun = ws.gun("m777-1").unwrap();
    assert_eq!(gun.sector_start_deg, 350.0);

    let s = ws
        .calculate_gun_solution("m777-1", "m795", &FireRequest::new(5000.0, 5.0))
        .unwrap();
    assert!(s.in_sector);

    assert!(ws.set_elevation_limits("m777-1", 900.0, 100.0).is_err());
    assert_eq!(ws.gun("m777-1").unwrap().min_elevation_mil, 250.0);
    assert!(matches!(
        ws.set_sector("m777-1", 0.0, f64::NAN, 10.0),
        Err(FdcError::InvalidGun { .. })
    ));
    assert_eq!(ws.gun("m777-1").unwrap().sector_start_deg, 350.0);
    assert!(matches!(
        ws.set_sector("ghost", 0.0, 0.0, 90.0),
        Err(FdcError::GunNotFound(_))
    ));
}

#[test]
fn test_rebind_table_changes_solution() {
    let mut ws = howitzer_workspace();
    ws.rebind_table(
        "m795",
        5,
        ArcVariant::Low,
        vec![
            RangeTableRow::new(3000.0, 1000.0, 10.0, 10.0, 0.1),
            RangeTableRow::new(5000.0, 800.0, 15.0, 12.0, 0.12),
        ],
    )
    .unwrap();
    let s = ws
        .calculate_gun_solution("m777-1", "m795", &FireRequest::new(5000.0, 90.0))
        .unwrap();
    assert_eq!(s.interpolation, Some(Interpolation::ClampedMax));
    assert_eq!(s.envelope.as_ref().unwrap().max_range, 5000.0);

    assert!(matches!(
        ws.rebind_table("m795", 9, ArcVariant::Low, vec![RangeTableRow::new(1.0, 1.0, 1.0, 1.0, 1.0)]),
        Err(FdcError::ChargeNotFound { level: 9, .. })
    ));
    assert!(matches!(
        ws.rebind_table("m795", 5, ArcVariant::Low, Vec::new()),
        Err(FdcError::EmptyRangeTable)
    ));
}

#[test]
fn test_remove_projectile_unbinds() {
    let mut ws = howitzer_workspace();
    ws.remove_projectile("m795").unwrap();
    assert!(!ws.gun("m777-1").unwrap().is_bound("m795"));
}

#[test]
fn test_recalibrate_keeps_previous_on_error() {
    let mut ws = Workspace::new();
    ws.recalibrate(
        ControlPoint::new(0.0, 0.0),
        ControlPoint::new(0.0, 0.0),
        ControlPoint::new(100.0, 0.0),
        Point2::new(500.0, 500.0),
        1000.0,
    )
    .unwrap();
    let before = ws.calibration();

    let err = ws.recalibrate(
        ControlPoint::new(0.0, 0.0),
        ControlPoint::new(5.0, 5.0),
        ControlPoint::new(5.0, 5.0),
        Point2::new(0.0, 0.0),
        1000.0,
    );
    assert!(matches!(err, Err(FdcError::DegenerateCalibration)));
    assert_eq!(ws.calibration(), before);

    let world = ws.pixel_to_world(Point2::new(10.0, 0.0)).unwrap();
    assert!((world.x - 600.0).abs() < 1e-9);
    assert!((world.y - 500.0).abs() < 1e-9);
}

#[test]
fn test_reset_clears_everything() {
    let mut ws = howitzer_workspace();
    ws.reconfigure_corrections(CorrectionConfig::only(&[CorrectionTerm::Height]));
    ws.add_no_fire_area(NoFireArea::circle("z", Point2::new(0.0, 0.0), 10.0).unwrap());
    ws.reset();
    assert_eq!(ws.guns().count(), 0);
    assert_eq!(ws.projectiles().count(), 0);
    assert!(ws.no_fire_areas().is_empty());
    assert_eq!(ws.corrections(), &CorrectionConfig::default());
}

// ---- Missions ----

/// Two omni guns 1 km apart on the y axis, one table spanning 2–6 km.
fn mission_workspace() -> Workspace {
    let mut ws = Workspace::new();
    ws.register_projectile(Projectile::new("he", "HE", 0.0).with_charge(
        Charge::new(
            3,
            ArcVariant::Low,
            FireType::Indirect,
            vec![
                RangeTableRow::new(2000.0, 1100.0, 9.0, 10.0, 0.1),
                RangeTableRow::new(6000.0, 800.0, 21.0, 14.0, 0.15),
            ],
        )
        .unwrap(),
    ))
    .unwrap();
    for (id, y) in [("g1", 0.0), ("g2", -1000.0)] {
        ws.register_gun(Gun::new(id, Point2::new(0.0, y), 100.0, 1300.0).with_projectile("he"))
            .unwrap();
    }
    ws
}

fn point_mission() -> MissionRequest {
    MissionRequest {
        fire_mode: FireModeConfig::new(FireMode::Point, TargetPoint::new(0.0, 4000.0)),
        guns: vec![GunAssignment::new("g1", "he"), GunAssignment::new("g2", "he")],
        time_on_target: true,
        ..MissionRequest::default()
    }
}

#[test]
fn test_time_on_target_staggers_fire() {
    let ws = mission_workspace();
    let report = ws.run_fire_mission(&point_mission());
    assert_eq!(report.shots.len(), 2);

    let near = &report.shots[0];
    let far = &report.shots[1];
    assert!((near.outcome.solution().unwrap().time_of_flight.unwrap() - 15.0).abs() < 1e-9);
    assert!((far.outcome.solution().unwrap().time_of_flight.unwrap() - 18.0).abs() < 1e-9);
    assert!((near.fire_delay_s - 3.0).abs() < 1e-9);
    assert_eq!(far.fire_delay_s, 0.0);
    assert_eq!(report.cleared_count(), 2);
}

#[test]
fn test_mission_nfa_policy() {
    let mut ws = mission_workspace();
    ws.add_no_fire_area(NoFireArea::circle("school", Point2::new(0.0, 2000.0), 100.0).unwrap());

    let report = ws.run_fire_mission(&point_mission());
    for shot in &report.shots {
        let nfa = shot.nfa.as_ref().unwrap();
        assert!(nfa.has_violation);
        assert_eq!(nfa.action, NfaAction::WarnOnly);
        assert!(shot.cleared_to_fire());
    }

    ws.set_nfa_settings(NfaSettings {
        cancel_fire_on_nfa_hit: true,
        skip_nfa_in_linear_pattern: true,
    });
    let report = ws.run_fire_mission(&point_mission());
    assert!(report.shots.iter().all(|s| !s.cleared_to_fire()));
    assert_eq!(report.cleared_count(), 0);
}

#[test]
fn test_mission_unknown_gun_does_not_abort() {
    let ws = mission_workspace();
    let mut mission = point_mission();
    mission.guns.insert(0, GunAssignment::new("ghost", "he"));
    let report = ws.run_fire_mission(&mission);
    assert_eq!(report.shots.len(), 3);
    assert!(matches!(report.shots[0].outcome, BatteryOutcome::Failed { .. }));
    assert!(report.shots[0].nfa.is_none());
    assert!(report.shots[1].outcome.solution().is_some());
    assert!(report.shots[2].outcome.solution().is_some());
}

#[test]
fn test_linear_mission_skips_legs_through_nfa() {
    let mut ws = mission_workspace();
    ws.add_no_fire_area(NoFireArea::circle("bridge", Point2::new(0.0, 4000.0), 30.0).unwrap());

    let mut fire_mode = FireModeConfig::new(FireMode::Linear, TargetPoint::new(0.0, 4000.0))
        .with_line(TargetPoint::new(-200.0, 4000.0), TargetPoint::new(200.0, 4000.0));
    fire_mode.spacing_m = 100.0;
    let mission = MissionRequest {
        fire_mode,
        guns: vec![GunAssignment::new("g1", "he"), GunAssignment::new("g2", "he")],
        ..MissionRequest::default()
    };

    let report = ws.run_fire_mission(&mission);
    assert_eq!(report.plan.aim_points.len(), 5);
    assert_eq!(report.pattern_segments.len(), 4);
    let skipped: Vec<bool> = report.pattern_segments.iter().map(|v| v.skipped).collect();
    assert_eq!(skipped, vec![false, true, true, false]);
    // Guns take the first points of the line round-robin.
    assert_eq!(report.shots[0].aim_point.x, -200.0);
    assert_eq!(report.shots[1].aim_point.x, -100.0);
}

#[test]
fn test_sequenced_mission_has_shot_per_phase_and_gun() {
    let ws = mission_workspace();
    let mut fire_mode = FireModeConfig::new(FireMode::ParallelSheaf, TargetPoint::new(0.0, 4000.0));
    fire_mode.sheaf_width_m = 100.0;
    let mission = MissionRequest {
        fire_mode,
        control: FireControl::Sequence,
        guns: vec![GunAssignment::new("g1", "he"), GunAssignment::new("g2", "he")],
        ..MissionRequest::default()
    };
    let report = ws.run_fire_mission(&mission);
    assert_eq!(report.plan.phases.len(), 2);
    // Each phase holds one point, so both guns fire on it.
    assert_eq!(report.shots.len(), 4);
    assert_eq!(report.shots[0].aim_point, report.shots[1].aim_point);
    assert_eq!(report.shots[2].phase_index, 1);
}

/// One gun pair as in `mission_workspace`, firing a projectile with four
/// low charges that all reach 4–5 km.
fn mrsi_workspace() -> Workspace {
    let mut projectile = Projectile::new("he", "HE", 0.0);
    for (level, rows) in [
        (3, [(2000.0, 1100.0, 9.0), (6000.0, 800.0, 21.0)]),
        (4, [(2000.0, 1050.0, 8.0), (6000.0, 780.0, 18.0)]),
        (5, [(3000.0, 1000.0, 10.0), (7000.0, 700.0, 16.0)]),
        (6, [(2000.0, 1000.0, 10.0), (6000.0, 760.0, 15.0)]),
    ] {
        let table = rows
            .iter()
            .map(|&(range, elevation, tof)| RangeTableRow::new(range, elevation, tof, 10.0, 0.1))
            .collect();
        projectile = projectile.with_charge(Charge::new(level, ArcVariant::Low, FireType::Indirect, table).unwrap());
    }

    let mut ws = Workspace::new();
    ws.register_projectile(projectile).unwrap();
    for (id, y) in [("g1", 0.0), ("g2", -1000.0)] {
        ws.register_gun(Gun::new(id, Point2::new(0.0, y), 100.0, 1300.0).with_projectile("he"))
            .unwrap();
    }
    ws
}

fn shot_tof(shot: &crate::mission::MissionShot) -> f64 {
    shot.outcome.solution().unwrap().time_of_flight.unwrap()
}

#[test]
fn test_mrsi_volley_spaces_charges_and_lands_together() {
    let ws = mrsi_workspace();
    // Flight times at 4000 m: 15.0, 13.0, 11.5, 12.5 s.
    let mission = MissionRequest {
        guns: vec![GunAssignment::new("g1", "he")],
        time_on_target: false,
        mrsi: Some(MrsiConfig::default()),
        ..point_mission()
    };
    let report = ws.run_fire_mission(&mission);

    assert_eq!(report.shots.len(), 2);
    let levels: Vec<u32> = report
        .shots
        .iter()
        .map(|s| s.outcome.solution().unwrap().charge_level.unwrap())
        .collect();
    assert_eq!(levels, vec![3, 5]);
    assert_eq!(report.shots[0].round_index, 0);
    assert_eq!(report.shots[1].round_index, 1);
    assert!((shot_tof(&report.shots[0]) - 15.0).abs() < 1e-9);
    assert!((shot_tof(&report.shots[1]) - 11.5).abs() < 1e-9);
    assert!(report.shots[0].fire_delay_s.abs() < 1e-9);
    assert!((report.shots[1].fire_delay_s - 3.5).abs() < 1e-9);
    for shot in &report.shots {
        assert!((shot.fire_delay_s + shot_tof(shot) - 15.0).abs() < 1e-9);
    }

    // A tighter separation lets the three fastest charges through.
    let tight = MissionRequest {
        mrsi: Some(MrsiConfig {
            rounds: 3,
            min_separation_s: 0.5,
        }),
        ..mission
    };
    let report = ws.run_fire_mission(&tight);
    let delays: Vec<f64> = report.shots.iter().map(|s| s.fire_delay_s).collect();
    assert_eq!(delays.len(), 3);
    for (delay, expected) in delays.iter().zip([0.0, 0.5, 1.5]) {
        assert!((delay - expected).abs() < 1e-9, "{delays:?}");
    }
}

#[test]
fn test_mrsi_with_time_on_target_shares_one_impact_time() {
    let ws = mrsi_workspace();
    let mission = MissionRequest {
        mrsi: Some(MrsiConfig::default()),
        ..point_mission()
    };
    let report = ws.run_fire_mission(&mission);

    // g1 gets two rounds, g2 at 5000 m gets three (13.0, 15.5, 18.0 s).
    assert_eq!(report.shots.iter().filter(|s| s.gun_id == "g1").count(), 2);
    assert_eq!(report.shots.iter().filter(|s| s.gun_id == "g2").count(), 3);
    for shot in &report.shots {
        assert!((shot.fire_delay_s + shot_tof(shot) - 18.0).abs() < 1e-9, "{}", shot.gun_id);
    }
    assert_eq!(report.cleared_count(), 5);
}

#[test]
fn test_mrsi_out_of_range_falls_back_to_single_shot() {
    let ws = mrsi_workspace();
    let mission = MissionRequest {
        fire_mode: FireModeConfig::new(FireMode::Point, TargetPoint::new(0.0, 9000.0)),
        guns: vec![GunAssignment::new("g1", "he"), GunAssignment::new("ghost", "he")],
        mrsi: Some(MrsiConfig::default()),
        ..MissionRequest::default()
    };
    let report = ws.run_fire_mission(&mission);
    assert_eq!(report.shots.len(), 2);
    let solution = report.shots[0].outcome.solution().unwrap();
    assert_eq!(solution.reason, Some(SolveFailure::DistanceOutOfRange));
    assert!(matches!(report.shots[1].outcome, BatteryOutcome::Failed { .. }));
}

#[test]
fn test_pick_mrsi_rounds_skips_unfireable() {
    let ws = mrsi_workspace();
    let request = FireRequest::new(4000.0, 0.0);
    let mut solutions = ws.calculate_charge_solutions("g1", "he", &request).unwrap();
    assert_eq!(solutions.len(), 4);
    // Charge 5 (11.5 s) drops out, so 12.5 s leads and 15.0 s follows.
    solutions[2].in_sector = false;
    let picked = pick_mrsi_rounds(solutions, &MrsiConfig::default());
    let levels: Vec<u32> = picked.iter().map(|s| s.charge_level.unwrap()).collect();
    assert_eq!(levels, vec![3, 6]);

    let single = MrsiConfig {
        rounds: 0,
        min_separation_s: f64::NAN,
    };
    let solutions = ws.calculate_charge_solutions("g1", "he", &request).unwrap();
    assert_eq!(pick_mrsi_rounds(solutions, &single).len(), 1);
}

#[test]
fn test_mission_report_serializes() {
    let ws = mission_workspace();
    let report = ws.run_fire_mission(&point_mission());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["shots"][0]["outcome"]["status"], "solved");
    assert_eq!(json["plan"]["phases"][0]["label"], "Main");
}

// ---- Properties ----

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn uncorrected_elevation_stays_inside_table(distance in 4000.0f64..=8000.0) {
            let mut ws = howitzer_workspace();
            ws.reconfigure_corrections(CorrectionConfig::only(&[]));
            let s = ws
                .calculate_gun_solution("m777-1", "m795", &FireRequest::new(distance, 90.0))
                .unwrap();
            let elevation = s.elevation_mil.unwrap();
            prop_assert!((760.0..=980.0).contains(&elevation));
            prop_assert!(s.in_range);
        }

        #[test]
        fn battery_returns_one_entry_per_assignment(n in 0usize..6, distance in 0.0f64..10000.0) {
            let ws = howitzer_workspace();
            let assignments: Vec<GunAssignment> = (0..n)
                .map(|i| if i % 2 == 0 {
                    GunAssignment::new("m777-1", "m795")
                } else {
                    GunAssignment::new(format!("missing-{i}"), "m795")
                })
                .collect();
            let results = ws.calculate_battery_solutions(&assignments, &FireRequest::new(distance, 90.0));
            prop_assert_eq!(results.len(), n);
        }
    }
}
