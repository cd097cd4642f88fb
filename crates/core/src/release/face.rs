//! Cell faces and per-face subdivision counts

use crate::core_types::Vec3;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six faces of a structured-grid cell.
///
/// The declaration order is the enumeration order used by the translator:
/// lateral faces first, then top and bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    /// Southern face (local y = 0)
    Front,
    /// Northern face (local y = 1)
    Back,
    /// Western face (local x = 0)
    Left,
    /// Eastern face (local x = 1)
    Right,
    /// Upper face (local z = 1)
    Top,
    /// Lower face (local z = 0)
    Bottom,
}

impl Face {
    /// All faces in enumeration order
    pub const ALL: [Face; 6] = [
        Face::Front,
        Face::Back,
        Face::Left,
        Face::Right,
        Face::Top,
        Face::Bottom,
    ];

    /// Whether this is a vertical (side) face
    #[inline]
    pub const fn is_lateral(self) -> bool {
        !matches!(self, Face::Top | Face::Bottom)
    }

    /// Local cell coordinate of an in-face position.
    ///
    /// `row` and `column` are fractions in `[0, 1]` along the face's two axes.
    /// On lateral faces `row` runs up the cell (z) and `column` runs along the
    /// face (x for front/back, y for left/right). On top and bottom faces `row`
    /// runs along y and `column` along x.
    pub fn local_point(self, row: f64, column: f64) -> Vec3 {
        match self {
            Face::Front => Vec3::new(column, 0.0, row),
            Face::Back => Vec3::new(column, 1.0, row),
            Face::Left => Vec3::new(0.0, column, row),
            Face::Right => Vec3::new(1.0, column, row),
            Face::Bottom => Vec3::new(column, row, 0.0),
            Face::Top => Vec3::new(column, row, 1.0),
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Face::Front => "front",
            Face::Back => "back",
            Face::Left => "left",
            Face::Right => "right",
            Face::Top => "top",
            Face::Bottom => "bottom",
        };
        f.write_str(name)
    }
}

/// Unvalidated division counts as they appear in configuration files.
///
/// Lateral faces are usually described with `vertical`/`horizontal` counts,
/// top and bottom faces with `rows`/`columns`; both spellings are accepted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RawDivisions {
    #[serde(alias = "vertical")]
    pub rows: i64,
    #[serde(alias = "horizontal")]
    pub columns: i64,
}

/// Subdivision counts for one face.
///
/// `rows` is the vertical division count on lateral faces and the row
/// division count on top/bottom faces; `columns` is the horizontal or column
/// division count. A zero on either axis disables the face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawDivisions")]
pub struct FaceDivisions {
    rows: u32,
    columns: u32,
}

impl FaceDivisions {
    /// No points on this face
    pub const NONE: FaceDivisions = FaceDivisions { rows: 0, columns: 0 };

    /// Create validated division counts.
    ///
    /// # Errors
    /// Returns `OutOfRange` if either count is negative or exceeds `u32::MAX`.
    pub fn new(rows: i64, columns: i64) -> Result<Self> {
        let convert = |name: &str, n: i64| {
            u32::try_from(n).map_err(|_| {
                Error::out_of_range(format!("{name} divisions must be in 0..={}, got {n}", u32::MAX))
            })
        };
        Ok(Self {
            rows: convert("row", rows)?,
            columns: convert("column", columns)?,
        })
    }

    /// Same counts on both axes
    pub const fn square(n: u32) -> Self {
        Self { rows: n, columns: n }
    }

    /// Row (vertical) division count
    #[inline]
    pub const fn rows(self) -> u32 {
        self.rows
    }

    /// Column (horizontal) division count
    #[inline]
    pub const fn columns(self) -> u32 {
        self.columns
    }

    /// Number of points generated on this face
    #[inline]
    pub const fn count(self) -> usize {
        (self.rows as usize).saturating_mul(self.columns as usize)
    }

    /// Centre fraction of subdivision `i` out of `n`
    #[inline]
    pub(crate) fn center(i: u32, n: u32) -> f64 {
        (f64::from(i) + 0.5) / f64::from(n)
    }
}

impl TryFrom<RawDivisions> for FaceDivisions {
    type Error = Error;

    fn try_from(raw: RawDivisions) -> Result<Self> {
        FaceDivisions::new(raw.rows, raw.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_order_puts_lateral_faces_first() {
        let lateral: Vec<bool> = Face::ALL.iter().map(|f| f.is_lateral()).collect();
        assert_eq!(lateral, vec![true, true, true, true, false, false]);
        let mut sorted = Face::ALL;
        sorted.sort();
        assert_eq!(sorted, Face::ALL);
    }

    #[test]
    fn test_local_points_lie_on_their_face() {
        assert_eq!(Face::Front.local_point(0.25, 0.75), Vec3::new(0.75, 0.0, 0.25));
        assert_eq!(Face::Back.local_point(0.25, 0.75).y, 1.0);
        assert_eq!(Face::Left.local_point(0.25, 0.75), Vec3::new(0.0, 0.75, 0.25));
        assert_eq!(Face::Right.local_point(0.25, 0.75).x, 1.0);
        assert_eq!(Face::Bottom.local_point(0.25, 0.75), Vec3::new(0.75, 0.25, 0.0));
        assert_eq!(Face::Top.local_point(0.25, 0.75).z, 1.0);
    }

    #[test]
    fn test_negative_divisions_rejected() {
        let err = FaceDivisions::new(-1, 3).unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)));
        assert!(err.to_string().contains("-1"));
    }

    #[test]
    fn test_count_is_product() {
        assert_eq!(FaceDivisions::new(5, 4).unwrap().count(), 20);
        assert_eq!(FaceDivisions::new(5, 0).unwrap().count(), 0);
        assert_eq!(FaceDivisions::NONE.count(), 0);
    }

    #[test]
    fn test_centers_are_cell_centred() {
        assert_eq!(FaceDivisions::center(0, 2), 0.25);
        assert_eq!(FaceDivisions::center(1, 2), 0.75);
        assert_eq!(FaceDivisions::center(0, 1), 0.5);
    }

    #[test]
    fn test_lateral_spelling_deserializes() {
        let d: FaceDivisions = serde_json::from_str(r#"{"vertical": 5, "horizontal": 4}"#).unwrap();
        assert_eq!((d.rows(), d.columns()), (5, 4));
        assert!(serde_json::from_str::<FaceDivisions>(r#"{"rows": -2, "columns": 1}"#).is_err());
    }
}
