//! Weapon model: guns, projectiles, charges and their range tables.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::{FULL_CIRCLE_DEG, NO_HEADING_DEG};
use crate::enums::{ArcVariant, FireType, SystemClass};
use crate::error::{FdcError, Result};
use crate::types::Point2;

/// One row of a firing table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeTableRow {
    /// Horizontal range (m).
    pub range: f64,
    /// Barrel elevation (mil).
    pub elevation: f64,
    /// Time of flight (s).
    pub tof: f64,
    /// Elevation change per 100 m of target height difference (mil).
    pub d_elev: f64,
    /// Time of flight change per 100 m of target height difference (s).
    pub tof_per_100m: f64,
}

impl RangeTableRow {
    pub fn new(range: f64, elevation: f64, tof: f64, d_elev: f64, tof_per_100m: f64) -> Self {
        Self {
            range,
            elevation,
            tof,
            d_elev,
            tof_per_100m,
        }
    }

    fn is_finite(&self) -> bool {
        [
            self.range,
            self.elevation,
            self.tof,
            self.d_elev,
            self.tof_per_100m,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Non-empty firing table, kept sorted by range ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RangeTableRow>", into = "Vec<RangeTableRow>")]
pub struct RangeTable {
    rows: Vec<RangeTableRow>,
}

impl RangeTable {
    /// Build a table, rejecting empty or non-finite input.
    pub fn new(mut rows: Vec<RangeTableRow>) -> Result<Self> {
        if rows.is_empty() {
            return Err(FdcError::EmptyRangeTable);
        }
        if let Some(bad) = rows.iter().find(|r| !r.is_finite()) {
            return Err(FdcError::InvalidRangeTable(format!(
                "non-finite value in row at range {}",
                bad.range
            )));
        }
        rows.sort_by(|a, b| a.range.total_cmp(&b.range));
        Ok(Self { rows })
    }

    /// Rows sorted by range ascending.
    pub fn rows(&self) -> &[RangeTableRow] {
        &self.rows
    }

    pub fn min_range(&self) -> f64 {
        self.rows[0].range
    }

    pub fn max_range(&self) -> f64 {
        self.rows[self.rows.len() - 1].range
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TryFrom<Vec<RangeTableRow>> for RangeTable {
    type Error = FdcError;

    fn try_from(rows: Vec<RangeTableRow>) -> Result<Self> {
        RangeTable::new(rows)
    }
}

impl From<RangeTable> for Vec<RangeTableRow> {
    fn from(table: RangeTable) -> Self {
        table.rows
    }
}

/// A propellant charge with its own firing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub level: u32,
    #[serde(default)]
    pub variant: ArcVariant,
    #[serde(default)]
    pub fire_type: FireType,
    pub range_table: RangeTable,
}

impl Charge {
    pub fn new(
        level: u32,
        variant: ArcVariant,
        fire_type: FireType,
        rows: Vec<RangeTableRow>,
    ) -> Result<Self> {
        Ok(Self {
            level,
            variant,
            fire_type,
            range_table: RangeTable::new(rows)?,
        })
    }

    pub fn min_range(&self) -> f64 {
        self.range_table.min_range()
    }

    pub fn max_range(&self) -> f64 {
        self.range_table.max_range()
    }

    /// Whether `distance` lies inside the table's range span (inclusive).
    pub fn covers(&self, distance: f64) -> bool {
        distance >= self.min_range() && distance <= self.max_range()
    }
}

fn default_shell_type() -> String {
    "HE".to_string()
}

/// A round type and the charges it can be fired with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: String,
    #[serde(default = "default_shell_type")]
    pub shell_type: String,
    /// Elevation change per m/s of crosswind (mil).
    #[serde(default)]
    pub wind_drift_factor: f64,
    #[serde(default)]
    pub charges: Vec<Charge>,
}

impl Projectile {
    pub fn new(id: impl Into<String>, shell_type: impl Into<String>, wind_drift_factor: f64) -> Self {
        Self {
            id: id.into(),
            shell_type: shell_type.into(),
            wind_drift_factor,
            charges: Vec::new(),
        }
    }

    pub fn with_charge(mut self, charge: Charge) -> Self {
        self.charges.push(charge);
        self
    }

    pub fn charge(&self, level: u32, variant: ArcVariant) -> Option<&Charge> {
        self.charges
            .iter()
            .find(|c| c.level == level && c.variant == variant)
    }

    pub fn charge_mut(&mut self, level: u32, variant: ArcVariant) -> Option<&mut Charge> {
        self.charges
            .iter_mut()
            .find(|c| c.level == level && c.variant == variant)
    }

    /// Shortest and longest range over all charges, `None` without charges.
    pub fn range_span(&self) -> Option<(f64, f64)> {
        self.charges.iter().fold(None, |acc, c| match acc {
            None => Some((c.min_range(), c.max_range())),
            Some((lo, hi)) => Some((lo.min(c.min_range()), hi.max(c.max_range()))),
        })
    }
}

fn default_heading() -> f64 {
    NO_HEADING_DEG
}

fn default_sector_end() -> f64 {
    FULL_CIRCLE_DEG
}

/// A registered firing unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gun {
    pub id: String,
    pub position: Point2,
    #[serde(default)]
    pub altitude_m: f64,
    /// Compass heading of the mount; 360 or more means no heading set.
    #[serde(default = "default_heading")]
    pub heading_deg: f64,
    #[serde(default)]
    pub sector_start_deg: f64,
    #[serde(default = "default_sector_end")]
    pub sector_end_deg: f64,
    pub min_elevation_mil: f64,
    pub max_elevation_mil: f64,
    #[serde(default)]
    pub system_class: SystemClass,
    /// Overrides the global calibration offset when set (mil).
    #[serde(default)]
    pub calibration_offset_mil: Option<f64>,
    #[serde(default, rename = "projectiles")]
    pub projectile_ids: BTreeSet<String>,
}

impl Gun {
    /// An omni-directional gun with no projectiles bound.
    pub fn new(
        id: impl Into<String>,
        position: Point2,
        min_elevation_mil: f64,
        max_elevation_mil: f64,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            altitude_m: 0.0,
            heading_deg: NO_HEADING_DEG,
            sector_start_deg: 0.0,
            sector_end_deg: FULL_CIRCLE_DEG,
            min_elevation_mil,
            max_elevation_mil,
            system_class: SystemClass::default(),
            calibration_offset_mil: None,
            projectile_ids: BTreeSet::new(),
        }
    }

    pub fn with_sector(mut self, heading_deg: f64, start_deg: f64, end_deg: f64) -> Self {
        self.heading_deg = heading_deg;
        self.sector_start_deg = start_deg;
        self.sector_end_deg = end_deg;
        self
    }

    pub fn with_system_class(mut self, class: SystemClass) -> Self {
        self.system_class = class;
        self
    }

    pub fn with_projectile(mut self, projectile_id: impl Into<String>) -> Self {
        self.projectile_ids.insert(projectile_id.into());
        self
    }

    /// Clockwise span from sector start to sector end (degrees).
    /// A raw span of a full circle or more is a full circle.
    pub fn traverse_deg(&self) -> f64 {
        let raw = self.sector_end_deg - self.sector_start_deg;
        if raw >= FULL_CIRCLE_DEG {
            return FULL_CIRCLE_DEG;
        }
        raw.rem_euclid(FULL_CIRCLE_DEG)
    }

    pub fn has_heading(&self) -> bool {
        self.heading_deg < NO_HEADING_DEG
    }

    /// Omni-directional guns pass every sector check.
    pub fn is_omni(&self) -> bool {
        !self.has_heading() || self.traverse_deg() >= FULL_CIRCLE_DEG
    }

    /// Direction the envelope is centred on: the heading, or the sector middle.
    pub fn sector_center_deg(&self) -> f64 {
        if self.has_heading() {
            self.heading_deg
        } else {
            crate::units::wrap_deg(self.sector_start_deg + self.traverse_deg() / 2.0)
        }
    }

    pub fn is_bound(&self, projectile_id: &str) -> bool {
        self.projectile_ids.contains(projectile_id)
    }

    pub fn is_mortar(&self) -> bool {
        self.system_class == SystemClass::Mortar
    }

    /// Check the invariants registration relies on.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| FdcError::InvalidGun {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.id.is_empty() {
            return Err(invalid("id must not be empty"));
        }
        if !self.position.x.is_finite() || !self.position.y.is_finite() {
            return Err(invalid("position must be finite"));
        }
        if !self.heading_deg.is_finite() {
            return Err(invalid("heading must be finite"));
        }
        if !self.sector_start_deg.is_finite() || !self.sector_end_deg.is_finite() {
            return Err(invalid("sector bounds must be finite"));
        }
        if !self.min_elevation_mil.is_finite() || !self.max_elevation_mil.is_finite() {
            return Err(invalid("elevation limits must be finite"));
        }
        if self.min_elevation_mil > self.max_elevation_mil {
            return Err(invalid("minimum elevation exceeds maximum"));
        }
        Ok(())
    }
}
