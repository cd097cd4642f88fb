//! Face-subdivision release specification
//!
//! A release specification lists cell regions (boxes between two
//! layer/row/column corners) and, for each region, how many release points
//! to place on each of the six cell faces. It is the input of
//! [`translate`](super::translate).

use super::face::{Face, FaceDivisions, RawDivisions};
use crate::core_types::{CellIndex, GridShape};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Largest number of release points a single specification may expand to
pub const MAX_RELEASE_POINTS: usize = 10_000_000;

/// Division counts for all six faces of a cell.
///
/// Faces missing from a configuration file default to no divisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubdivisionData {
    pub front: FaceDivisions,
    pub back: FaceDivisions,
    pub left: FaceDivisions,
    pub right: FaceDivisions,
    pub top: FaceDivisions,
    pub bottom: FaceDivisions,
}

impl SubdivisionData {
    /// Same divisions on the four lateral faces, none on top and bottom
    pub fn lateral(divisions: FaceDivisions) -> Self {
        Self {
            front: divisions,
            back: divisions,
            left: divisions,
            right: divisions,
            ..Self::default()
        }
    }

    /// Same divisions on all six faces
    pub fn uniform(divisions: FaceDivisions) -> Self {
        Self {
            top: divisions,
            bottom: divisions,
            ..Self::lateral(divisions)
        }
    }

    /// Replace the divisions of one face
    pub fn with_face(mut self, face: Face, divisions: FaceDivisions) -> Self {
        *self.face_mut(face) = divisions;
        self
    }

    /// Divisions of `face`
    pub const fn divisions(&self, face: Face) -> FaceDivisions {
        match face {
            Face::Front => self.front,
            Face::Back => self.back,
            Face::Left => self.left,
            Face::Right => self.right,
            Face::Top => self.top,
            Face::Bottom => self.bottom,
        }
    }

    fn face_mut(&mut self, face: Face) -> &mut FaceDivisions {
        match face {
            Face::Front => &mut self.front,
            Face::Back => &mut self.back,
            Face::Left => &mut self.left,
            Face::Right => &mut self.right,
            Face::Top => &mut self.top,
            Face::Bottom => &mut self.bottom,
        }
    }

    /// Release points generated per cell
    pub fn points_per_cell(&self) -> usize {
        Face::ALL
            .iter()
            .fold(0usize, |n, &f| n.saturating_add(self.divisions(f).count()))
    }
}

/// Box of cells between two corners, inclusive.
///
/// Corners may be given in any order; the box spans the component-wise
/// minimum to maximum. Equal corners select a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRegion {
    /// First corner
    pub from: CellIndex,
    /// Opposite corner
    pub to: CellIndex,
}

impl CellRegion {
    /// Region between two corners
    pub const fn new(from: CellIndex, to: CellIndex) -> Self {
        Self { from, to }
    }

    /// Region covering exactly one cell
    pub const fn single(cell: CellIndex) -> Self {
        Self { from: cell, to: cell }
    }

    /// Component-wise minimum corner
    pub fn lower(&self) -> CellIndex {
        CellIndex::new(
            self.from.layer.min(self.to.layer),
            self.from.row.min(self.to.row),
            self.from.column.min(self.to.column),
        )
    }

    /// Component-wise maximum corner
    pub fn upper(&self) -> CellIndex {
        CellIndex::new(
            self.from.layer.max(self.to.layer),
            self.from.row.max(self.to.row),
            self.from.column.max(self.to.column),
        )
    }

    /// Number of cells in the box
    pub fn cell_count(&self) -> usize {
        let (lo, hi) = (self.lower(), self.upper());
        (hi.layer - lo.layer + 1) * (hi.row - lo.row + 1) * (hi.column - lo.column + 1)
    }

    /// Cells in layer, row, column order
    pub fn cells(&self) -> impl Iterator<Item = CellIndex> {
        let (lo, hi) = (self.lower(), self.upper());
        (lo.layer..=hi.layer).flat_map(move |k| {
            (lo.row..=hi.row)
                .flat_map(move |i| (lo.column..=hi.column).map(move |j| CellIndex::new(k, i, j)))
        })
    }

    /// Ensure both corners lie inside the grid.
    ///
    /// # Errors
    /// Returns `OutOfRange` for the first corner outside `shape`.
    pub fn validate(&self, shape: GridShape) -> Result<()> {
        shape.check(self.from)?;
        shape.check(self.to)
    }
}

/// One cell region and the subdivision descriptor applied to each of its cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRelease {
    pub region: CellRegion,
    pub subdivision: SubdivisionData,
}

impl RegionRelease {
    /// Release points this region contributes
    pub fn point_count(&self) -> usize {
        self.region
            .cell_count()
            .saturating_mul(self.subdivision.points_per_cell())
    }
}

/// Complete face-subdivision release specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseSpec {
    /// Regions in enumeration order
    pub regions: Vec<RegionRelease>,
    /// Release time shared by every point (model time units)
    #[serde(default)]
    pub release_time: f64,
    /// Ask the release consumer to drape points in dry cells down to the
    /// highest active cell below
    #[serde(default)]
    pub drape: bool,
}

impl ReleaseSpec {
    /// Specification releasing at time zero
    pub fn new(regions: Vec<RegionRelease>) -> Self {
        Self {
            regions,
            release_time: 0.0,
            drape: false,
        }
    }

    /// Add a region
    pub fn with_region(mut self, region: CellRegion, subdivision: SubdivisionData) -> Self {
        self.regions.push(RegionRelease { region, subdivision });
        self
    }

    /// Set the release time
    pub fn with_release_time(mut self, time: f64) -> Self {
        self.release_time = time;
        self
    }

    /// Set the drape flag
    pub fn with_drape(mut self, drape: bool) -> Self {
        self.drape = drape;
        self
    }

    /// Total number of release points the specification expands to.
    ///
    /// Saturates at `usize::MAX` instead of overflowing.
    pub fn point_count(&self) -> usize {
        self.regions
            .iter()
            .fold(0usize, |n, r| n.saturating_add(r.point_count()))
    }

    /// Check every region against the grid and the release time.
    ///
    /// # Errors
    /// Returns `OutOfRange` if a region corner lies outside `shape`, the
    /// release time is negative or not finite, or the specification expands
    /// to more than [`MAX_RELEASE_POINTS`] points.
    pub fn validate(&self, shape: GridShape) -> Result<()> {
        shape.validate()?;
        if !(self.release_time.is_finite() && self.release_time >= 0.0) {
            return Err(Error::out_of_range(format!(
                "release time must be finite and >= 0, got {}",
                self.release_time
            )));
        }
        for (n, r) in self.regions.iter().enumerate() {
            r.region
                .validate(shape)
                .map_err(|e| Error::out_of_range(format!("region {n}: {e}")))?;
        }
        if self.point_count() > MAX_RELEASE_POINTS {
            return Err(Error::out_of_range(format!(
                "specification expands to more than {MAX_RELEASE_POINTS} release points"
            )));
        }
        Ok(())
    }

    /// Parse a specification from JSON text.
    ///
    /// Division counts are read as signed integers and checked afterwards, so
    /// a negative count is reported as `OutOfRange` rather than as a parse
    /// failure.
    ///
    /// # Errors
    /// Returns `Json` if the text is not a well-formed specification and
    /// `OutOfRange` for a negative or oversized division count.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawReleaseSpec = serde_json::from_str(text)?;
        let regions = raw
            .regions
            .into_iter()
            .enumerate()
            .map(|(n, r)| {
                let subdivision = r
                    .subdivision
                    .into_validated()
                    .map_err(|e| Error::out_of_range(format!("region {n}: {e}")))?;
                Ok(RegionRelease {
                    region: r.region,
                    subdivision,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            regions,
            release_time: raw.release_time,
            drape: raw.drape,
        })
    }

    /// Load a specification from a JSON file.
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`ReleaseSpec::from_json`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Save the specification as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns `Io` or `Json` if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

/// File form of [`SubdivisionData`] with unchecked signed counts
#[derive(Default, Deserialize)]
#[serde(default)]
struct RawSubdivision {
    front: RawDivisions,
    back: RawDivisions,
    left: RawDivisions,
    right: RawDivisions,
    top: RawDivisions,
    bottom: RawDivisions,
}

impl RawSubdivision {
    fn into_validated(self) -> Result<SubdivisionData> {
        let faces = [
            (Face::Front, self.front),
            (Face::Back, self.back),
            (Face::Left, self.left),
            (Face::Right, self.right),
            (Face::Top, self.top),
            (Face::Bottom, self.bottom),
        ];
        faces
            .into_iter()
            .try_fold(SubdivisionData::default(), |sub, (face, raw)| {
                let divisions = FaceDivisions::new(raw.rows, raw.columns)
                    .map_err(|e| Error::out_of_range(format!("{face} face: {e}")))?;
                Ok(sub.with_face(face, divisions))
            })
    }
}

#[derive(Deserialize)]
struct RawRegionRelease {
    region: CellRegion,
    subdivision: RawSubdivision,
}

#[derive(Deserialize)]
struct RawReleaseSpec {
    regions: Vec<RawRegionRelease>,
    #[serde(default)]
    release_time: f64,
    #[serde(default)]
    drape: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_cells_in_layer_row_column_order() {
        let region = CellRegion::new(CellIndex::new(1, 3, 2), CellIndex::new(0, 2, 3));
        let cells: Vec<CellIndex> = region.cells().collect();
        assert_eq!(region.cell_count(), 8);
        assert_eq!(cells.len(), 8);
        assert_eq!(cells[0], CellIndex::new(0, 2, 2));
        assert_eq!(cells[1], CellIndex::new(0, 2, 3));
        assert_eq!(cells[2], CellIndex::new(0, 3, 2));
        assert_eq!(cells[7], CellIndex::new(1, 3, 3));
    }

    #[test]
    fn test_single_cell_region() {
        let cell = CellIndex::new(2, 10, 9);
        let region = CellRegion::single(cell);
        assert_eq!(region.cells().collect::<Vec<_>>(), vec![cell]);
    }

    #[test]
    fn test_points_per_cell() {
        let sub = SubdivisionData::lateral(FaceDivisions::square(5));
        assert_eq!(sub.points_per_cell(), 100);

        let sub = sub.with_face(Face::Top, FaceDivisions::new(2, 3).unwrap());
        assert_eq!(sub.points_per_cell(), 106);
        assert_eq!(SubdivisionData::uniform(FaceDivisions::square(3)).points_per_cell(), 54);
    }

    #[test]
    fn test_validate_rejects_out_of_grid_corner() {
        let shape = GridShape::new(3, 21, 20).unwrap();
        let spec = ReleaseSpec::new(Vec::new()).with_region(
            CellRegion::new(CellIndex::new(0, 0, 0), CellIndex::new(0, 21, 0)),
            SubdivisionData::default(),
        );
        let err = spec.validate(shape).unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)));
        assert!(err.to_string().contains("region 0"));
    }

    #[test]
    fn test_validate_rejects_negative_release_time() {
        let shape = GridShape::new(1, 1, 1).unwrap();
        let spec = ReleaseSpec::new(Vec::new()).with_release_time(-1.0);
        assert!(matches!(spec.validate(shape), Err(Error::OutOfRange(_))));
    }

    #[test]
    fn test_spec_from_json() {
        let json = r#"{
            "regions": [{
                "region": {"from": [2, 10, 9], "to": [2, 10, 9]},
                "subdivision": {
                    "front": {"vertical": 5, "horizontal": 5},
                    "back": {"vertical": 5, "horizontal": 5},
                    "left": {"vertical": 5, "horizontal": 5},
                    "right": {"vertical": 5, "horizontal": 5}
                }
            }],
            "drape": true
        }"#;
        let spec: ReleaseSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.point_count(), 100);
        assert!(spec.drape);
        assert_eq!(spec.release_time, 0.0);
        assert_eq!(spec.regions[0].subdivision.top, FaceDivisions::NONE);
    }

    #[test]
    fn test_save_and_load() {
        let spec = ReleaseSpec::new(Vec::new())
            .with_region(
                CellRegion::single(CellIndex::new(0, 1, 2)),
                SubdivisionData::uniform(FaceDivisions::square(2)),
            )
            .with_release_time(10.0);

        let path = std::env::temp_dir().join("pathline_release_spec_test.json");
        spec.save(&path).unwrap();
        let loaded = ReleaseSpec::load(&path).unwrap();
        assert_eq!(loaded, spec);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_negative_count_from_file_is_out_of_range() {
        let path = std::env::temp_dir().join("pathline_negative_divisions_test.json");
        fs::write(
            &path,
            r#"{"regions":[{"region":{"from":[0,0,0],"to":[0,0,0]},
                "subdivision":{"left":{"vertical":-2,"horizontal":1}}}]}"#,
        )
        .unwrap();
        let err = ReleaseSpec::load(&path).unwrap_err();
        let _ = fs::remove_file(&path);
        assert!(matches!(err, Error::OutOfRange(_)));
        let msg = err.to_string();
        assert!(msg.contains("region 0"));
        assert!(msg.contains("left face"));
    }

    #[test]
    fn test_malformed_json_is_still_a_parse_error() {
        let err = ReleaseSpec::from_json(r#"{"regions": 3}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_overflowing_point_count_rejected() {
        let shape = GridShape::new(1, 1, 1).unwrap();
        let spec = ReleaseSpec::new(Vec::new()).with_region(
            CellRegion::single(CellIndex::new(0, 0, 0)),
            SubdivisionData::uniform(FaceDivisions::square(u32::MAX)),
        );
        assert_eq!(spec.point_count(), usize::MAX);
        assert!(matches!(spec.validate(shape), Err(Error::OutOfRange(_))));
    }

    #[test]
    fn test_point_limit_is_inclusive() {
        let shape = GridShape::new(1, 1, 1).unwrap();
        let at_limit = ReleaseSpec::new(Vec::new()).with_region(
            CellRegion::single(CellIndex::new(0, 0, 0)),
            SubdivisionData::default()
                .with_face(Face::Top, FaceDivisions::new(1, MAX_RELEASE_POINTS as i64).unwrap()),
        );
        assert!(at_limit.validate(shape).is_ok());

        let over = at_limit.with_region(
            CellRegion::single(CellIndex::new(0, 0, 0)),
            SubdivisionData::default().with_face(Face::Bottom, FaceDivisions::square(1)),
        );
        let err = over.validate(shape).unwrap_err();
        assert!(err.to_string().contains("release points"));
    }
}
