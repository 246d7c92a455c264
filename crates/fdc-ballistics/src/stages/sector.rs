//! Traverse sectors and reachable-area envelopes.

use fdc_core::constants::{ENVELOPE_STEP_DEG, FULL_CIRCLE_DEG};
use fdc_core::model::Gun;
use fdc_core::solution::Envelope;
use fdc_core::types::Point2;
use fdc_core::units::wrap_deg;

/// Whether `angle` lies in the clockwise sector from `start` to `end`.
/// Handles sectors that wrap through north.
pub fn is_angle_inside_sector(angle: f64, start: f64, end: f64) -> bool {
    let value = wrap_deg(angle);
    let start = wrap_deg(start);
    let end = wrap_deg(end);
    if start <= end {
        value >= start && value <= end
    } else {
        value >= start || value <= end
    }
}

/// Sector limits centred on `heading` with total width `traverse`.
pub fn sector_bounds(heading_deg: f64, traverse_deg: f64) -> (f64, f64) {
    let half = traverse_deg / 2.0;
    (wrap_deg(heading_deg - half), wrap_deg(heading_deg + half))
}

/// Whether a bearing from the gun is inside its traverse limits.
pub fn gun_covers_bearing(gun: &Gun, bearing_deg: f64) -> bool {
    gun.is_omni() || is_angle_inside_sector(bearing_deg, gun.sector_start_deg, gun.sector_end_deg)
}

/// Angles from `from` sweeping `span` degrees clockwise, every
/// `ENVELOPE_STEP_DEG`, always ending exactly at `from + span`.
fn sweep(from: f64, span: f64) -> Vec<f64> {
    let steps = (span / ENVELOPE_STEP_DEG).ceil().max(1.0) as usize;
    (0..=steps)
        .map(|i| from + (i as f64 * ENVELOPE_STEP_DEG).min(span))
        .collect()
}

fn polar(origin: Point2, bearing_deg: f64, radius: f64) -> Point2 {
    origin.offset_along(bearing_deg, radius)
}

/// Reachable-area outline of `gun` for a charge spanning `min_range..=max_range`.
pub fn build_envelope(gun: &Gun, min_range: f64, max_range: f64) -> Envelope {
    let origin = gun.position;

    if gun.is_omni() {
        let angles = sweep(0.0, FULL_CIRCLE_DEG);
        let mut polygon: Vec<Point2> = angles.iter().map(|&a| polar(origin, a, max_range)).collect();
        if min_range > 0.0 {
            polygon.extend(angles.iter().rev().map(|&a| polar(origin, a, min_range)));
        }
        return Envelope {
            omni: true,
            heading_deg: gun.sector_center_deg(),
            traverse_deg: FULL_CIRCLE_DEG,
            min_range,
            max_range,
            polygon,
        };
    }

    let heading = gun.sector_center_deg();
    let traverse = gun.traverse_deg();
    let angles = sweep(heading - traverse / 2.0, traverse);

    let mut polygon: Vec<Point2> = angles.iter().map(|&a| polar(origin, a, max_range)).collect();
    if min_range > 0.0 {
        polygon.extend(angles.iter().rev().map(|&a| polar(origin, a, min_range)));
    } else {
        polygon.push(origin);
    }

    Envelope {
        omni: false,
        heading_deg: heading,
        traverse_deg: traverse,
        min_range,
        max_range,
        polygon,
    }
}
