//! Mission files: a TOML (or JSON) description of the battery, its
//! ammunition, the map and the fire mission.

use std::path::Path;

use serde::{Deserialize, Serialize};

use fdc_core::config::{CorrectionConfig, NfaSettings};
use fdc_core::error::{FdcError, Result};
use fdc_core::model::{Gun, Projectile};
use fdc_core::solution::GunAssignment;
use fdc_core::types::Point2;
use fdc_map::calibration::ControlPoint;
use fdc_map::grid::parse_grid_reference;
use fdc_map::nfa::NoFireArea;

use crate::mission::MissionRequest;
use crate::workspace::Workspace;

/// Three-point calibration as written in a mission file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationInput {
    pub p0: ControlPoint,
    pub p1: ControlPoint,
    pub p2: ControlPoint,
    pub known_p0: Point2,
    pub scale_meters: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionFile {
    pub corrections: CorrectionConfig,
    pub nfa_settings: NfaSettings,
    pub projectiles: Vec<Projectile>,
    pub guns: Vec<Gun>,
    pub no_fire_areas: Vec<NoFireArea>,
    pub calibration: Option<CalibrationInput>,
    pub mission: Option<MissionRequest>,
    /// Grid reference overriding the mission's center point.
    pub target_grid: Option<String>,
    /// Map pixel overriding the mission's center point; needs `calibration`.
    pub target_pixel: Option<Point2>,
}

impl MissionFile {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| FdcError::Config(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| FdcError::Config(e.to_string()))
    }

    /// Load by extension: `.json` is JSON, anything else TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let parsed = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_toml_str(&text),
        };
        let file = parsed.map_err(|e| FdcError::Config(format!("{}: {e}", path.display())))?;
        tracing::info!(
            path = %path.display(),
            guns = file.guns.len(),
            projectiles = file.projectiles.len(),
            no_fire_areas = file.no_fire_areas.len(),
            "Mission file loaded"
        );
        Ok(file)
    }

    /// Build a workspace from the file. Projectiles go in before the guns
    /// that reference them.
    pub fn build_workspace(&self) -> Result<Workspace> {
        let mut workspace = Workspace::with_corrections(self.corrections.clone());
        workspace.set_nfa_settings(self.nfa_settings);
        for projectile in &self.projectiles {
            workspace.register_projectile(projectile.clone())?;
        }
        for gun in &self.guns {
            workspace.register_gun(gun.clone())?;
        }
        for zone in &self.no_fire_areas {
            workspace.add_no_fire_area(zone.clone());
        }
        if let Some(c) = &self.calibration {
            workspace.recalibrate(c.p0, c.p1, c.p2, c.known_p0, c.scale_meters)?;
        }
        Ok(workspace)
    }

    /// The mission with its target resolved against `workspace`.
    ///
    /// A mission without guns fires every registered gun with its first
    /// bound projectile.
    pub fn resolve_mission(&self, workspace: &Workspace) -> Result<MissionRequest> {
        let mut mission = self
            .mission
            .clone()
            .ok_or_else(|| FdcError::Config("mission file has no [mission] section".to_string()))?;

        if let Some(reference) = &self.target_grid {
            let point = parse_grid_reference(reference)?;
            mission.fire_mode.center_point.x = point.x;
            mission.fire_mode.center_point.y = point.y;
        }
        if let Some(pixel) = self.target_pixel {
            let point = workspace
                .pixel_to_world(pixel)
                .ok_or_else(|| FdcError::Config("target_pixel needs a calibration".to_string()))?;
            mission.fire_mode.center_point.x = point.x;
            mission.fire_mode.center_point.y = point.y;
        }

        if mission.guns.is_empty() {
            mission.guns = workspace
                .guns()
                .filter_map(|g| {
                    g.projectile_ids
                        .iter()
                        .next()
                        .map(|p| GunAssignment::new(g.id.clone(), p.clone()))
                })
                .collect();
        }
        Ok(mission)
    }
}
