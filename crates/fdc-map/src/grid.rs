//! Map grid references: "058/071" style easting/northing pairs.
//!
//! Three digits per axis name a 100 m square and resolve to its center.
//! Four digits per axis name a 10 m point directly.

use fdc_core::constants::{GRID_SQUARE_COARSE_M, GRID_SQUARE_FINE_M};
use fdc_core::error::{FdcError, Result};
use fdc_core::types::Point2;

/// Grid square size used when formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridPrecision {
    /// Three digits per axis, 100 m squares.
    Coarse,
    /// Four digits per axis, 10 m squares.
    Fine,
}

impl GridPrecision {
    fn square_m(self) -> f64 {
        match self {
            GridPrecision::Coarse => GRID_SQUARE_COARSE_M,
            GridPrecision::Fine => GRID_SQUARE_FINE_M,
        }
    }

    fn digits(self) -> usize {
        match self {
            GridPrecision::Coarse => 3,
            GridPrecision::Fine => 4,
        }
    }

    /// Offset from the square's corner to the point a reference resolves to.
    fn center_offset_m(self) -> f64 {
        match self {
            GridPrecision::Coarse => GRID_SQUARE_COARSE_M / 2.0,
            GridPrecision::Fine => 0.0,
        }
    }

    fn from_digits(digits: usize) -> Option<Self> {
        match digits {
            3 => Some(GridPrecision::Coarse),
            4 => Some(GridPrecision::Fine),
            _ => None,
        }
    }
}

/// Parse "EEE/NNN" or "EEEE/NNNN" (`,` also accepted) into meters.
pub fn parse_grid_reference(reference: &str) -> Result<Point2> {
    let bad = || FdcError::InvalidGridReference(reference.to_string());

    let compact: String = reference.chars().filter(|c| !c.is_whitespace()).collect();
    let (easting, northing) = compact
        .split_once(['/', ','])
        .ok_or_else(bad)?;

    if easting.len() != northing.len()
        || !easting.bytes().all(|b| b.is_ascii_digit())
        || !northing.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(bad());
    }
    let precision = GridPrecision::from_digits(easting.len()).ok_or_else(bad)?;
    let square = precision.square_m();
    let offset = precision.center_offset_m();

    let e: f64 = easting.parse::<u32>().map_err(|_| bad())?.into();
    let n: f64 = northing.parse::<u32>().map_err(|_| bad())?.into();

    Ok(Point2::new(e * square + offset, n * square + offset))
}

/// Format the grid square containing `point`.
pub fn format_grid_reference(point: Point2, precision: GridPrecision) -> Result<String> {
    let square = precision.square_m();
    let width = precision.digits();
    let limit = 10u32.pow(width as u32);

    let e = (point.x / square).floor();
    let n = (point.y / square).floor();
    if !(0.0..f64::from(limit)).contains(&e) || !(0.0..f64::from(limit)).contains(&n) {
        return Err(FdcError::InvalidGridReference(format!(
            "({:.1}, {:.1}) is outside the grid",
            point.x, point.y
        )));
    }
    Ok(format!("{:0width$}/{:0width$}", e as u32, n as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coarse_reference() {
        let p = parse_grid_reference("058/071").unwrap();
        assert_eq!(p, Point2::new(5850.0, 7150.0));
    }

    #[test]
    fn test_parse_fine_reference_with_spaces() {
        let p = parse_grid_reference(" 0583 , 0712 ").unwrap();
        assert_eq!(p, Point2::new(5830.0, 7120.0));
    }

    #[test]
    fn test_fine_reference_has_no_center_offset() {
        assert_eq!(parse_grid_reference("0584/0713").unwrap(), Point2::new(5840.0, 7130.0));
        assert_eq!(parse_grid_reference("0000/0000").unwrap(), Point2::new(0.0, 0.0));
        assert_eq!(parse_grid_reference("000/000").unwrap(), Point2::new(50.0, 50.0));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "058", "058/07", "05a/071", "05/07", "05831/07120", "058-071"] {
            assert!(
                matches!(parse_grid_reference(bad), Err(FdcError::InvalidGridReference(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_format_names_containing_square() {
        let p = Point2::new(5899.0, 7101.0);
        assert_eq!(format_grid_reference(p, GridPrecision::Coarse).unwrap(), "058/071");
        assert_eq!(format_grid_reference(p, GridPrecision::Fine).unwrap(), "0589/0710");
    }

    #[test]
    fn test_format_parse_lands_in_same_square() {
        let reference = "0420/0913";
        let p = parse_grid_reference(reference).unwrap();
        assert_eq!(format_grid_reference(p, GridPrecision::Fine).unwrap(), reference);
    }

    #[test]
    fn test_format_rejects_off_grid() {
        assert!(format_grid_reference(Point2::new(-1.0, 0.0), GridPrecision::Coarse).is_err());
        assert!(format_grid_reference(Point2::new(100_000.0, 0.0), GridPrecision::Coarse).is_err());
    }
}
