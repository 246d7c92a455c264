//! Range-table lookup with clamping at the table ends.

use serde::{Deserialize, Serialize};

use fdc_core::enums::Interpolation;
use fdc_core::error::{FdcError, Result};
use fdc_core::model::{RangeTable, RangeTableRow};

/// Table values at a requested distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpolatedRow {
    pub row: RangeTableRow,
    pub interpolation: Interpolation,
}

/// Interpolate arbitrary rows at `distance`. Rows need not be sorted.
pub fn interpolate(rows: &[RangeTableRow], distance: f64) -> Result<InterpolatedRow> {
    if rows.is_empty() {
        return Err(FdcError::EmptyRangeTable);
    }
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| a.range.total_cmp(&b.range));
    Ok(interpolate_sorted(&sorted, distance))
}

/// Interpolate a validated table at `distance`.
pub fn interpolate_table(table: &RangeTable, distance: f64) -> InterpolatedRow {
    interpolate_sorted(table.rows(), distance)
}

/// `rows` must be non-empty and sorted by range ascending.
fn interpolate_sorted(rows: &[RangeTableRow], distance: f64) -> InterpolatedRow {
    let first = rows[0];
    let last = rows[rows.len() - 1];

    if distance <= first.range {
        return InterpolatedRow {
            row: first,
            interpolation: Interpolation::ClampedMin,
        };
    }
    if distance >= last.range {
        return InterpolatedRow {
            row: last,
            interpolation: Interpolation::ClampedMax,
        };
    }

    let bracket = rows
        .windows(2)
        .find(|pair| pair[0].range <= distance && distance <= pair[1].range);
    let Some([left, right]) = bracket.map(|pair| [pair[0], pair[1]]) else {
        // Only reachable for NaN distances.
        return InterpolatedRow {
            row: first,
            interpolation: Interpolation::ClampedMin,
        };
    };

    let span = right.range - left.range;
    if span <= 0.0 {
        return InterpolatedRow {
            row: right,
            interpolation: Interpolation::Linear,
        };
    }

    let ratio = (distance - left.range) / span;
    let lerp = |a: f64, b: f64| a + (b - a) * ratio;
    InterpolatedRow {
        row: RangeTableRow {
            range: distance,
            elevation: lerp(left.elevation, right.elevation),
            tof: lerp(left.tof, right.tof),
            d_elev: lerp(left.d_elev, right.d_elev),
            tof_per_100m: lerp(left.tof_per_100m, right.tof_per_100m),
        },
        interpolation: Interpolation::Linear,
    }
}
