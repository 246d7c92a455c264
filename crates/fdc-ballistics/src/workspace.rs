//! Entity repository for fire direction.
//!
//! `Workspace` owns guns, projectiles, correction configuration,
//! map calibration and no-fire areas. Entities change only through the
//! named operations below; solving reads value snapshots and hands them
//! to the pure solver stages.

use std::collections::BTreeMap;

use serde::Serialize;

use fdc_core::config::{CorrectionConfig, NfaSettings};
use fdc_core::enums::{ArcVariant, FireMode};
use fdc_core::error::{FdcError, Result};
use fdc_core::model::{Gun, Projectile, RangeTable, RangeTableRow};
use fdc_core::solution::{BatteryOutcome, BatterySolution, GunAssignment, Solution};
use fdc_core::types::Point2;
use fdc_map::calibration::{calibrate_by_three_points, Calibration, ControlPoint};
use fdc_map::nfa::{NfaAssessment, NoFireArea, NoFireAreaRegistry};

use crate::stages::solver::{solve, solve_all_charges, FireRequest};

/// Serializable as a snapshot; build one through the registration calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Workspace {
    guns: BTreeMap<String, Gun>,
    projectiles: BTreeMap<String, Projectile>,
    corrections: CorrectionConfig,
    calibration: Option<Calibration>,
    no_fire_areas: NoFireAreaRegistry,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_corrections(corrections: CorrectionConfig) -> Self {
        Self {
            corrections,
            ..Self::default()
        }
    }

    // --- Guns ---

    /// Register a gun, replacing any gun with the same id.
    /// Bound projectiles must already be registered.
    pub fn register_gun(&mut self, gun: Gun) -> Result<()> {
        gun.validate()?;
        if let Some(missing) = gun.projectile_ids.iter().find(|p| !self.projectiles.contains_key(*p)) {
            return Err(FdcError::ProjectileNotFound(missing.clone()));
        }
        tracing::info!(gun = %gun.id, class = ?gun.system_class, "Gun registered");
        self.guns.insert(gun.id.clone(), gun);
        Ok(())
    }

    pub fn remove_gun(&mut self, gun_id: &str) -> Result<Gun> {
        let gun = self
            .guns
            .remove(gun_id)
            .ok_or_else(|| FdcError::GunNotFound(gun_id.to_string()))?;
        tracing::info!(gun = %gun_id, "Gun removed");
        Ok(gun)
    }

    pub fn gun(&self, gun_id: &str) -> Option<&Gun> {
        self.guns.get(gun_id)
    }

    pub fn guns(&self) -> impl Iterator<Item = &Gun> {
        self.guns.values()
    }

    fn gun_mut(&mut self, gun_id: &str) -> Result<&mut Gun> {
        self.guns
            .get_mut(gun_id)
            .ok_or_else(|| FdcError::GunNotFound(gun_id.to_string()))
    }

    /// Apply `update` to a copy of the gun and keep it only if it still validates.
    fn update_gun(&mut self, gun_id: &str, update: impl FnOnce(&mut Gun)) -> Result<()> {
        let gun = self.gun_mut(gun_id)?;
        let mut next = gun.clone();
        update(&mut next);
        next.validate()?;
        *gun = next;
        Ok(())
    }

    pub fn set_sector(&mut self, gun_id: &str, heading_deg: f64, start_deg: f64, end_deg: f64) -> Result<()> {
        self.update_gun(gun_id, |g| {
            g.heading_deg = heading_deg;
            g.sector_start_deg = start_deg;
            g.sector_end_deg = end_deg;
        })?;
        tracing::info!(gun = %gun_id, heading_deg, start_deg, end_deg, "Sector set");
        Ok(())
    }

    pub fn set_elevation_limits(&mut self, gun_id: &str, min_mil: f64, max_mil: f64) -> Result<()> {
        self.update_gun(gun_id, |g| {
            g.min_elevation_mil = min_mil;
            g.max_elevation_mil = max_mil;
        })?;
        tracing::info!(gun = %gun_id, min_mil, max_mil, "Elevation limits set");
        Ok(())
    }

    pub fn move_gun(&mut self, gun_id: &str, position: Point2, altitude_m: f64) -> Result<()> {
        self.update_gun(gun_id, |g| {
            g.position = position;
            g.altitude_m = altitude_m;
        })?;
        tracing::info!(gun = %gun_id, x = position.x, y = position.y, "Gun moved");
        Ok(())
    }

    pub fn set_gun_calibration_offset(&mut self, gun_id: &str, offset_mil: Option<f64>) -> Result<()> {
        self.gun_mut(gun_id)?.calibration_offset_mil = offset_mil;
        Ok(())
    }

    // --- Projectiles ---

    /// Register a projectile, replacing any projectile with the same id.
    pub fn register_projectile(&mut self, projectile: Projectile) -> Result<()> {
        if projectile.id.is_empty() {
            return Err(FdcError::Config("projectile id must not be empty".to_string()));
        }
        tracing::info!(
            projectile = %projectile.id,
            charges = projectile.charges.len(),
            "Projectile registered"
        );
        self.projectiles.insert(projectile.id.clone(), projectile);
        Ok(())
    }

    /// Remove a projectile and unbind it from every gun.
    pub fn remove_projectile(&mut self, projectile_id: &str) -> Result<Projectile> {
        let projectile = self
            .projectiles
            .remove(projectile_id)
            .ok_or_else(|| FdcError::ProjectileNotFound(projectile_id.to_string()))?;
        for gun in self.guns.values_mut() {
            gun.projectile_ids.remove(projectile_id);
        }
        tracing::info!(projectile = %projectile_id, "Projectile removed");
        Ok(projectile)
    }

    pub fn projectile(&self, projectile_id: &str) -> Option<&Projectile> {
        self.projectiles.get(projectile_id)
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.values()
    }

    pub fn bind_projectile(&mut self, gun_id: &str, projectile_id: &str) -> Result<()> {
        if !self.projectiles.contains_key(projectile_id) {
            return Err(FdcError::ProjectileNotFound(projectile_id.to_string()));
        }
        self.gun_mut(gun_id)?
            .projectile_ids
            .insert(projectile_id.to_string());
        tracing::info!(gun = %gun_id, projectile = %projectile_id, "Projectile bound");
        Ok(())
    }

    /// Returns whether the projectile was bound.
    pub fn unbind_projectile(&mut self, gun_id: &str, projectile_id: &str) -> Result<bool> {
        Ok(self.gun_mut(gun_id)?.projectile_ids.remove(projectile_id))
    }

    /// Replace the range table of one charge.
    pub fn rebind_table(
        &mut self,
        projectile_id: &str,
        level: u32,
        variant: ArcVariant,
        rows: Vec<RangeTableRow>,
    ) -> Result<()> {
        let table = RangeTable::new(rows)?;
        let projectile = self
            .projectiles
            .get_mut(projectile_id)
            .ok_or_else(|| FdcError::ProjectileNotFound(projectile_id.to_string()))?;
        let charge = projectile
            .charge_mut(level, variant)
            .ok_or_else(|| FdcError::ChargeNotFound {
                projectile_id: projectile_id.to_string(),
                level,
                variant: variant.as_str().to_string(),
            })?;
        charge.range_table = table;
        tracing::info!(
            projectile = %projectile_id,
            level,
            variant = variant.as_str(),
            min_range = charge.min_range(),
            max_range = charge.max_range(),
            "Range table rebound"
        );
        Ok(())
    }

    // --- Corrections ---

    pub fn corrections(&self) -> &CorrectionConfig {
        &self.corrections
    }

    pub fn reconfigure_corrections(&mut self, corrections: CorrectionConfig) {
        tracing::info!("Correction configuration replaced");
        self.corrections = corrections;
    }

    // --- Calibration ---

    /// Derive and store a new map calibration. The old one is kept on error.
    pub fn recalibrate(
        &mut self,
        p0: ControlPoint,
        p1: ControlPoint,
        p2: ControlPoint,
        known_p0: Point2,
        scale_meters: f64,
    ) -> Result<&Calibration> {
        let calibration = calibrate_by_three_points(p0, p1, p2, known_p0, scale_meters)?;
        let stored: &Calibration = self.calibration.insert(calibration);
        Ok(stored)
    }

    /// Copy of the current calibration.
    pub fn calibration(&self) -> Option<Calibration> {
        self.calibration.clone()
    }

    pub fn pixel_to_world(&self, pixel: Point2) -> Option<Point2> {
        self.calibration.as_ref().map(|c| c.pixel_to_world(pixel))
    }

    pub fn world_to_pixel(&self, world: Point2) -> Option<Point2> {
        self.calibration.as_ref().map(|c| c.world_to_pixel(world))
    }

    // --- No-fire areas ---

    pub fn add_no_fire_area(&mut self, zone: NoFireArea) {
        self.no_fire_areas.add(zone);
    }

    pub fn remove_no_fire_area(&mut self, zone_id: &str) -> bool {
        self.no_fire_areas.remove(zone_id)
    }

    pub fn set_nfa_settings(&mut self, settings: NfaSettings) {
        self.no_fire_areas.set_settings(settings);
    }

    pub fn no_fire_areas(&self) -> &NoFireAreaRegistry {
        &self.no_fire_areas
    }

    pub fn assess_trajectory(&self, start: Point2, end: Point2, mode: FireMode) -> NfaAssessment {
        self.no_fire_areas.assess_trajectory(start, end, mode)
    }

    /// Drop every entity and restore default configuration.
    pub fn reset(&mut self) {
        tracing::info!(
            guns = self.guns.len(),
            projectiles = self.projectiles.len(),
            "Workspace reset"
        );
        *self = Self::default();
    }

    // --- Solving ---

    /// Gun and bound projectile, or the setup error explaining why not.
    pub fn resolve(&self, gun_id: &str, projectile_id: &str) -> Result<(&Gun, &Projectile)> {
        let gun = self
            .guns
            .get(gun_id)
            .ok_or_else(|| FdcError::GunNotFound(gun_id.to_string()))?;
        let projectile = self
            .projectiles
            .get(projectile_id)
            .ok_or_else(|| FdcError::ProjectileNotFound(projectile_id.to_string()))?;
        if !gun.is_bound(projectile_id) {
            return Err(FdcError::ProjectileNotLinked {
                gun_id: gun_id.to_string(),
                projectile_id: projectile_id.to_string(),
            });
        }
        Ok((gun, projectile))
    }

    /// Solve one gun. Out-of-range and unsupported trajectories are
    /// reported on the solution, not as errors.
    pub fn calculate_gun_solution(
        &self,
        gun_id: &str,
        projectile_id: &str,
        request: &FireRequest,
    ) -> Result<Solution> {
        let (gun, projectile) = self.resolve(gun_id, projectile_id)?;
        Ok(solve(gun, projectile, request, &self.corrections))
    }

    /// One solution per charge able to reach the target. When no charge
    /// fits, the single unsolved solution carries the reason.
    pub fn calculate_charge_solutions(
        &self,
        gun_id: &str,
        projectile_id: &str,
        request: &FireRequest,
    ) -> Result<Vec<Solution>> {
        let (gun, projectile) = self.resolve(gun_id, projectile_id)?;
        Ok(match solve_all_charges(gun, projectile, request, &self.corrections) {
            Ok(solutions) => solutions,
            Err(_) => vec![solve(gun, projectile, request, &self.corrections)],
        })
    }

    /// Solve every assignment against the same target geometry.
    /// Each entry succeeds or fails on its own.
    pub fn calculate_battery_solutions(
        &self,
        assignments: &[GunAssignment],
        request: &FireRequest,
    ) -> Vec<BatterySolution> {
        assignments
            .iter()
            .map(|a| BatterySolution {
                gun_id: a.gun_id.clone(),
                projectile_id: a.projectile_id.clone(),
                outcome: self.battery_outcome(a, request),
            })
            .collect()
    }

    pub(crate) fn battery_outcome(&self, assignment: &GunAssignment, request: &FireRequest) -> BatteryOutcome {
        match self.calculate_gun_solution(&assignment.gun_id, &assignment.projectile_id, request) {
            Ok(solution) => BatteryOutcome::Solved(solution),
            Err(e) => {
                tracing::warn!(gun = %assignment.gun_id, error = %e, "Battery gun skipped");
                BatteryOutcome::Failed { error: e.to_string() }
            }
        }
    }
}
