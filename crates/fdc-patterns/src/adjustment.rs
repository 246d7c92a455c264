//! Adjust-fire: walking a target position onto the observed impacts.
//!
//! Range corrections move along the origin→target line, direction
//! corrections along its right perpendicular. Positive values mean
//! "add" (farther) and "right".

use serde::{Deserialize, Serialize};

use fdc_core::constants::{DEFAULT_BRACKET_M, MIN_BRACKET_M};
use fdc_core::types::{Point2, TargetPoint};
use fdc_core::units::{angle_diff_deg, bearing_deg, bearing_unit};

/// Observer's call on where a round landed relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Observation {
    Over,
    Short,
}

impl Observation {
    /// Read a spotting call such as "over" or "SHORT, left 50".
    pub fn parse(call: &str) -> Option<Self> {
        let call = call.to_ascii_uppercase();
        if call.contains("OVER") {
            Some(Observation::Over)
        } else if call.contains("SHORT") {
            Some(Observation::Short)
        } else {
            None
        }
    }
}

/// One applied shift of the target (m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub dx: f64,
    pub dy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentState {
    pub base_target: TargetPoint,
    pub current_target: TargetPoint,
    pub bracket_m: f64,
    pub history: Vec<Shift>,
}

impl AdjustmentState {
    pub fn new(base_target: TargetPoint, bracket_m: f64) -> Self {
        let bracket_m = if bracket_m.is_finite() {
            bracket_m.max(MIN_BRACKET_M)
        } else {
            DEFAULT_BRACKET_M
        };
        Self {
            base_target,
            current_target: base_target,
            bracket_m,
            history: Vec::new(),
        }
    }

    fn shift(&mut self, origin: Point2, range_m: f64, direction_m: f64) {
        let bearing = bearing_deg(&origin, &self.current_target.xy());
        self.shift_along(bearing, range_m, direction_m);
    }

    fn shift_along(&mut self, bearing: f64, range_m: f64, direction_m: f64) {
        let (fx, fy) = bearing_unit(bearing);
        let (rx, ry) = bearing_unit(bearing + 90.0);
        let shift = Shift {
            dx: fx * range_m + rx * direction_m,
            dy: fy * range_m + ry * direction_m,
        };
        self.current_target.x += shift.dx;
        self.current_target.y += shift.dy;
        self.history.push(shift);
    }

    /// Add (+) or drop (−) along the origin→target line.
    pub fn adjust_range(&mut self, origin: Point2, delta_m: f64) {
        self.shift(origin, delta_m, 0.0);
    }

    /// Right (+) or left (−) of the origin→target line.
    pub fn adjust_direction(&mut self, origin: Point2, delta_m: f64) {
        self.shift(origin, 0.0, delta_m);
    }

    /// Halve the bracket and step toward the target: drop on OVER, add on SHORT.
    pub fn auto_bracket(&mut self, origin: Point2, observation: Observation) {
        let step = (self.bracket_m / 2.0).max(MIN_BRACKET_M);
        self.bracket_m = step;
        let direction = match observation {
            Observation::Over => -1.0,
            Observation::Short => 1.0,
        };
        self.adjust_range(origin, direction * step);
    }

    /// Total displacement from the base target (m).
    pub fn offset(&self) -> Shift {
        Shift {
            dx: self.current_target.x - self.base_target.x,
            dy: self.current_target.y - self.base_target.y,
        }
    }

    /// Apply a forward observer's correction, given along the
    /// observer→target line rather than the gun→target line.
    pub fn correct_from_observer(
        &mut self,
        gun: Point2,
        observer: Point2,
        right_m: f64,
        add_m: f64,
    ) -> ObserverCorrection {
        let ot_bearing = bearing_deg(&observer, &self.current_target.xy());
        self.shift_along(ot_bearing, add_m, right_m);
        let gt_bearing = bearing_deg(&gun, &self.current_target.xy());
        ObserverCorrection {
            ot_bearing_deg: ot_bearing,
            gt_bearing_deg: gt_bearing,
            angle_diff_deg: angle_diff_deg(ot_bearing, gt_bearing),
        }
    }
}

/// Geometry of an observer correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverCorrection {
    /// Observer→target bearing the correction was applied along.
    pub ot_bearing_deg: f64,
    /// Gun→corrected-target bearing.
    pub gt_bearing_deg: f64,
    /// Angle between the two lines, in (−180, 180].
    pub angle_diff_deg: f64,
}
