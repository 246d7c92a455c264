//! Tests for the shared model, configuration and serialization contracts.

use crate::config::{CorrectionConfig, CorrectionToggles, NfaSettings};
use crate::enums::*;
use crate::error::FdcError;
use crate::model::{Charge, Gun, Projectile, RangeTable, RangeTableRow};
use crate::solution::{BatteryOutcome, GunAssignment};
use crate::types::{AimPoint, AimPointMeta, Point2, TargetPoint};

fn rows() -> Vec<RangeTableRow> {
    vec![
        RangeTableRow::new(6000.0, 870.0, 17.0, 18.0, 0.16),
        RangeTableRow::new(4000.0, 980.0, 12.0, 14.0, 0.12),
        RangeTableRow::new(8000.0, 760.0, 23.0, 25.0, 0.22),
    ]
}

// ---- Range tables ----

#[test]
fn test_range_table_sorted_and_derived_limits() {
    let table = RangeTable::new(rows()).unwrap();
    let ranges: Vec<f64> = table.rows().iter().map(|r| r.range).collect();
    assert_eq!(ranges, vec![4000.0, 6000.0, 8000.0]);
    assert_eq!(table.min_range(), 4000.0);
    assert_eq!(table.max_range(), 8000.0);
}

#[test]
fn test_empty_range_table_rejected() {
    let err = Charge::new(1, ArcVariant::Low, FireType::Indirect, vec![]).unwrap_err();
    assert!(matches!(err, FdcError::EmptyRangeTable));
}

#[test]
fn test_non_finite_row_rejected() {
    let err = RangeTable::new(vec![RangeTableRow::new(100.0, f64::NAN, 1.0, 0.0, 0.0)])
        .unwrap_err();
    assert!(matches!(err, FdcError::InvalidRangeTable(_)));
}

#[test]
fn test_range_table_deserialize_validates() {
    let json = "[]";
    assert!(serde_json::from_str::<RangeTable>(json).is_err());

    let json = r#"[{"range": 1200, "elevation": 1100, "tof": 20, "d_elev": 10, "tof_per_100m": 0.3}]"#;
    let table: RangeTable = serde_json::from_str(json).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.min_range(), table.max_range());
}

#[test]
fn test_charge_covers_inclusive() {
    let charge = Charge::new(5, ArcVariant::Low, FireType::Indirect, rows()).unwrap();
    assert!(charge.covers(4000.0));
    assert!(charge.covers(8000.0));
    assert!(!charge.covers(3999.9));
    assert!(!charge.covers(8000.1));
}

#[test]
fn test_projectile_range_span() {
    let near = Charge::new(
        1,
        ArcVariant::High,
        FireType::Indirect,
        vec![
            RangeTableRow::new(1200.0, 1200.0, 20.0, 5.0, 0.2),
            RangeTableRow::new(1800.0, 1000.0, 22.0, 6.0, 0.2),
        ],
    )
    .unwrap();
    let far = Charge::new(2, ArcVariant::High, FireType::Indirect, rows()).unwrap();
    let projectile = Projectile::new("he", "HE", 0.5)
        .with_charge(near)
        .with_charge(far);
    assert_eq!(projectile.range_span(), Some((1200.0, 8000.0)));
    assert!(projectile.charge(2, ArcVariant::High).is_some());
    assert!(projectile.charge(2, ArcVariant::Low).is_none());
    assert_eq!(Projectile::new("x", "HE", 0.0).range_span(), None);
}

// ---- Guns ----

#[test]
fn test_gun_traverse_wraparound() {
    let gun = Gun::new("g", Point2::default(), 0.0, 1000.0).with_sector(350.0, 330.0, 10.0);
    assert!((gun.traverse_deg() - 40.0).abs() < 1e-9);
    assert!(!gun.is_omni());
    assert_eq!(gun.sector_center_deg(), 350.0);
}

#[test]
fn test_gun_omni_cases() {
    let no_heading = Gun::new("a", Point2::default(), 0.0, 1000.0);
    assert!(no_heading.is_omni());

    let full_sector = Gun::new("b", Point2::default(), 0.0, 1000.0).with_sector(90.0, 0.0, 360.0);
    assert_eq!(full_sector.traverse_deg(), 360.0);
    assert!(full_sector.is_omni());
}

#[test]
fn test_gun_sector_center_without_heading() {
    let mut gun = Gun::new("g", Point2::default(), 0.0, 1000.0).with_sector(360.0, 300.0, 20.0);
    assert!(gun.is_omni());
    assert!((gun.sector_center_deg() - 340.0).abs() < 1e-9);
    gun.heading_deg = 10.0;
    assert_eq!(gun.sector_center_deg(), 10.0);
}

#[test]
fn test_gun_validation() {
    assert!(Gun::new("g", Point2::default(), 100.0, 1200.0).validate().is_ok());
    let inverted = Gun::new("g", Point2::default(), 1200.0, 100.0);
    assert!(matches!(inverted.validate(), Err(FdcError::InvalidGun { .. })));
    let unnamed = Gun::new("", Point2::default(), 0.0, 1.0);
    assert!(unnamed.validate().is_err());
}

#[test]
fn test_gun_validation_rejects_non_finite_sector() {
    let base = Gun::new("g", Point2::default(), 100.0, 1200.0);
    for (heading, start, end) in [
        (f64::NAN, 0.0, 90.0),
        (45.0, f64::NAN, 90.0),
        (45.0, 0.0, f64::INFINITY),
        (f64::NEG_INFINITY, 0.0, 90.0),
    ] {
        let gun = base.clone().with_sector(heading, start, end);
        assert!(
            matches!(gun.validate(), Err(FdcError::InvalidGun { .. })),
            "{heading} {start} {end}"
        );
    }
    assert!(base.with_sector(45.0, 0.0, 90.0).validate().is_ok());
}

#[test]
fn test_gun_deserialize_defaults() {
    let json = r#"{
        "id": "m777-1",
        "position": {"x": 10, "y": 20},
        "min_elevation_mil": 0,
        "max_elevation_mil": 1275,
        "projectiles": ["m795"]
    }"#;
    let gun: Gun = serde_json::from_str(json).unwrap();
    assert!(gun.is_omni());
    assert_eq!(gun.system_class, SystemClass::Howitzer);
    assert!(gun.is_bound("m795"));
    assert_eq!(gun.calibration_offset_mil, None);
}

// ---- Configuration ----

#[test]
fn test_correction_config_only() {
    let cfg = CorrectionConfig::only(&[CorrectionTerm::Wind, CorrectionTerm::Height]);
    for term in CorrectionTerm::ALL {
        let expected = matches!(term, CorrectionTerm::Wind | CorrectionTerm::Height);
        assert_eq!(cfg.enabled.is_enabled(term), expected, "{term:?}");
    }
}

#[test]
fn test_correction_config_partial_deserialize() {
    let json = r#"{"spin_factor": 1.5, "enabled": {"humidity": false}}"#;
    let cfg: CorrectionConfig = serde_json::from_str(json).unwrap();
    assert_eq!(cfg.spin_factor, 1.5);
    assert!(!cfg.enabled.humidity);
    assert!(cfg.enabled.wind);
    assert_eq!(cfg.reference_pressure_hpa, 1013.25);
    assert_eq!(CorrectionToggles::default(), CorrectionToggles::all(true));
}

#[test]
fn test_nfa_settings_default() {
    let settings = NfaSettings::default();
    assert!(!settings.cancel_fire_on_nfa_hit);
    assert!(settings.skip_nfa_in_linear_pattern);
}

// ---- Serialization contracts ----

#[test]
fn test_fire_mode_serde_names() {
    let json = serde_json::to_string(&FireMode::CircularArea).unwrap();
    assert_eq!(json, "\"CIRCULAR_AREA\"");
    let back: FireMode = serde_json::from_str("\"PARALLEL_SHEAF\"").unwrap();
    assert_eq!(back, FireMode::ParallelSheaf);
    let dist: Distribution = serde_json::from_str("\"SAME_POINT\"").unwrap();
    assert_eq!(dist, Distribution::SamePoint);
}

#[test]
fn test_tag_names_match_contract() {
    assert_eq!(
        serde_json::to_string(&Interpolation::ClampedMin).unwrap(),
        "\"clamped-min\""
    );
    assert_eq!(
        serde_json::to_string(&SolveFailure::TrajectoryNotSupported).unwrap(),
        "\"trajectory-not-supported\""
    );
    assert_eq!(
        serde_json::to_string(&NfaAction::SkipNfaSegment).unwrap(),
        "\"skip-nfa-segment\""
    );
    assert_eq!(
        serde_json::to_string(&AimPointRole::SheafLane).unwrap(),
        "\"sheaf-lane\""
    );
    assert_eq!(SolveFailure::DistanceOutOfRange.to_string(), "distance-out-of-range");
    assert_eq!(NfaAction::CancelFire.to_string(), "cancel-fire");
}

#[test]
fn test_aim_point_omits_missing_altitude() {
    let point = AimPoint {
        x: 1.0,
        y: 2.0,
        z: None,
        meta: AimPointMeta {
            index: 0,
            role: AimPointRole::Center,
            offset_x: 0.0,
            offset_y: 0.0,
        },
    };
    let json = serde_json::to_string(&point).unwrap();
    assert!(!json.contains("\"z\""));
    let target: TargetPoint = serde_json::from_str(r#"{"x": 5, "y": 6}"#).unwrap();
    assert_eq!(target.z, None);
    assert_eq!(target.xy(), Point2::new(5.0, 6.0));
}

#[test]
fn test_battery_outcome_tagging() {
    let failed = BatteryOutcome::Failed {
        error: "Gun not found: x".into(),
    };
    let json = serde_json::to_string(&failed).unwrap();
    assert!(json.contains("\"status\":\"failed\""));
    assert!(failed.solution().is_none());
    let assignment = GunAssignment::new("g1", "p1");
    assert_eq!(assignment.gun_id, "g1");
}

#[test]
fn test_point_offset_along_bearing() {
    let p = Point2::new(100.0, 200.0).offset_along(90.0, 1000.0);
    assert!((p.x - 1100.0).abs() < 1e-9);
    assert!((p.y - 200.0).abs() < 1e-9);
    assert!((Point2::new(0.0, 0.0).distance_to(&Point2::new(3.0, 4.0)) - 5.0).abs() < 1e-12);
}
