//! Face-subdivision to point-list translation

use super::face::{Face, FaceDivisions};
use super::spec::ReleaseSpec;
use crate::core_types::{CellIndex, GridShape, Vec3};
use crate::error::Result;
use crate::grid::StructuredGrid;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One explicit particle release location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReleasePoint {
    /// Synthetic id, contiguous from 0 in enumeration order
    pub id: usize,
    /// Cell the point is released in
    pub cell: CellIndex,
    /// Face the point was generated on
    pub face: Face,
    /// Local coordinates within the cell, each in `[0, 1]`
    pub local: Vec3,
    /// Release time (model time units)
    pub release_time: f64,
}

impl ReleasePoint {
    /// Model coordinates of the point.
    ///
    /// # Errors
    /// Returns `OutOfRange` if the cell is outside `grid`.
    pub fn model_coordinates(&self, grid: &StructuredGrid) -> Result<Vec3> {
        grid.to_model(self.cell, self.local)
    }
}

fn push_face(
    points: &mut Vec<ReleasePoint>,
    cell: CellIndex,
    face: Face,
    divisions: FaceDivisions,
    release_time: f64,
) {
    let (nr, nc) = (divisions.rows(), divisions.columns());
    for r in 0..nr {
        let row = FaceDivisions::center(r, nr);
        for c in 0..nc {
            let column = FaceDivisions::center(c, nc);
            points.push(ReleasePoint {
                id: points.len(),
                cell,
                face,
                local: face.local_point(row, column),
                release_time,
            });
        }
    }
}

/// Expand a face-subdivision specification into explicit release points.
///
/// Points are enumerated by region, then by cell within the region (layer,
/// row, column), then by face in [`Face::ALL`] order, then by row
/// subdivision, then by column subdivision. Ids are assigned in that order
/// starting at 0, so identical input always yields identical output.
///
/// Faces with a zero division count on either axis produce nothing; a
/// specification whose counts are all zero yields an empty list.
///
/// # Errors
/// Returns `OutOfRange` if a region lies outside `shape` or the release time
/// is invalid. Validation happens before any point is generated.
pub fn translate(spec: &ReleaseSpec, shape: GridShape) -> Result<Vec<ReleasePoint>> {
    spec.validate(shape)?;

    let mut points = Vec::with_capacity(spec.point_count());
    for (n, release) in spec.regions.iter().enumerate() {
        let start = points.len();
        for cell in release.region.cells() {
            for face in Face::ALL {
                let divisions = release.subdivision.divisions(face);
                if divisions.count() == 0 {
                    continue;
                }
                push_face(&mut points, cell, face, divisions, spec.release_time);
            }
        }
        debug!(
            "Region {} {}..{}: {} cells, {} points",
            n,
            release.region.lower(),
            release.region.upper(),
            release.region.cell_count(),
            points.len() - start
        );
    }

    info!(
        "Translated {} regions into {} release points",
        spec.regions.len(),
        points.len()
    );
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::spec::{CellRegion, SubdivisionData};

    fn shape() -> GridShape {
        GridShape::new(3, 21, 20).unwrap()
    }

    #[test]
    fn test_all_zero_divisions_yield_nothing() {
        let spec = ReleaseSpec::new(Vec::new())
            .with_region(CellRegion::single(CellIndex::new(0, 0, 0)), SubdivisionData::default())
            .with_region(
                CellRegion::new(CellIndex::new(0, 0, 0), CellIndex::new(2, 5, 5)),
                SubdivisionData::default(),
            );
        assert!(translate(&spec, shape()).unwrap().is_empty());
    }

    #[test]
    fn test_zero_on_one_axis_disables_face() {
        let sub = SubdivisionData::default().with_face(Face::Left, FaceDivisions::new(4, 0).unwrap());
        let spec = ReleaseSpec::new(Vec::new())
            .with_region(CellRegion::single(CellIndex::new(0, 0, 0)), sub);
        assert!(translate(&spec, shape()).unwrap().is_empty());
    }

    #[test]
    fn test_face_order_and_subdivision_order() {
        let sub = SubdivisionData::default()
            .with_face(Face::Bottom, FaceDivisions::new(1, 2).unwrap())
            .with_face(Face::Front, FaceDivisions::new(2, 1).unwrap());
        let spec = ReleaseSpec::new(Vec::new())
            .with_region(CellRegion::single(CellIndex::new(1, 2, 3)), sub);
        let points = translate(&spec, shape()).unwrap();

        let faces: Vec<Face> = points.iter().map(|p| p.face).collect();
        assert_eq!(faces, vec![Face::Front, Face::Front, Face::Bottom, Face::Bottom]);

        // Front: rows run up z, column centred in x
        assert_eq!(points[0].local, Vec3::new(0.5, 0.0, 0.25));
        assert_eq!(points[1].local, Vec3::new(0.5, 0.0, 0.75));
        // Bottom: single row centred in y, columns along x
        assert_eq!(points[2].local, Vec3::new(0.25, 0.5, 0.0));
        assert_eq!(points[3].local, Vec3::new(0.75, 0.5, 0.0));
    }

    #[test]
    fn test_region_order_then_cell_order() {
        let sub = SubdivisionData::default().with_face(Face::Top, FaceDivisions::square(1));
        let spec = ReleaseSpec::new(Vec::new())
            .with_region(
                CellRegion::new(CellIndex::new(0, 0, 1), CellIndex::new(0, 0, 0)),
                sub,
            )
            .with_region(CellRegion::single(CellIndex::new(2, 0, 0)), sub);
        let points = translate(&spec, shape()).unwrap();
        let cells: Vec<CellIndex> = points.iter().map(|p| p.cell).collect();
        assert_eq!(
            cells,
            vec![CellIndex::new(0, 0, 0), CellIndex::new(0, 0, 1), CellIndex::new(2, 0, 0)]
        );
        let ids: Vec<usize> = points.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_release_time_propagates() {
        let spec = ReleaseSpec::new(Vec::new())
            .with_region(
                CellRegion::single(CellIndex::new(0, 0, 0)),
                SubdivisionData::uniform(FaceDivisions::square(1)),
            )
            .with_release_time(365.25);
        let points = translate(&spec, shape()).unwrap();
        assert_eq!(points.len(), 6);
        assert!(points.iter().all(|p| p.release_time == 365.25));
    }

    #[test]
    fn test_invalid_region_produces_no_points() {
        let spec = ReleaseSpec::new(Vec::new())
            .with_region(
                CellRegion::single(CellIndex::new(0, 0, 0)),
                SubdivisionData::uniform(FaceDivisions::square(2)),
            )
            .with_region(
                CellRegion::single(CellIndex::new(5, 0, 0)),
                SubdivisionData::uniform(FaceDivisions::square(2)),
            );
        assert!(translate(&spec, shape()).is_err());
    }
}
