//! Writers for the release-point consumer
//!
//! Two text forms are produced from translated [`ReleasePoint`]s:
//! - a point-release package input file (`OPTIONS`, `DIMENSIONS`,
//!   `PACKAGEDATA` and release timing blocks) with one-based cell ids
//! - a CSV listing, for inspection and plotting

use super::translate::ReleasePoint;
use crate::core_types::Vec3;
use crate::error::Result;
use crate::grid::StructuredGrid;
use std::io::Write;

/// Options written into the package `OPTIONS` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackageOptions {
    /// Write z as a local (0-1) cell coordinate instead of an elevation
    pub local_z: bool,
    /// Drape points in dry cells down to the highest active cell
    pub drape: bool,
}

/// Coordinates emitted for one point: model x/y and either model or local z
fn package_coordinates(
    point: &ReleasePoint,
    grid: &StructuredGrid,
    local_z: bool,
) -> Result<Vec3> {
    let model = point.model_coordinates(grid)?;
    let z = if local_z { point.local.z } else { model.z };
    Ok(Vec3::new(model.x, model.y, z))
}

/// Distinct release times in ascending order
fn release_times(points: &[ReleasePoint]) -> Vec<f64> {
    let mut times: Vec<f64> = points.iter().map(|p| p.release_time).collect();
    times.sort_by(f64::total_cmp);
    times.dedup();
    times
}

/// Write a point-release package input file.
///
/// Points released at time zero are released in the first time step of
/// stress period 1; any other release times are listed in a `RELEASETIMES`
/// block.
///
/// # Errors
/// Returns `OutOfRange` if a point's cell lies outside `grid`, or `Io` if
/// writing fails. Coordinates are resolved before anything is written.
pub fn write_package<W: Write>(
    out: &mut W,
    points: &[ReleasePoint],
    grid: &StructuredGrid,
    options: PackageOptions,
) -> Result<()> {
    let coords = points
        .iter()
        .map(|p| package_coordinates(p, grid, options.local_z))
        .collect::<Result<Vec<_>>>()?;
    let times = release_times(points);
    let first_step_only = times.iter().all(|&t| t == 0.0);

    writeln!(out, "BEGIN OPTIONS")?;
    if options.local_z {
        writeln!(out, "  LOCAL_Z")?;
    }
    if options.drape {
        writeln!(out, "  DRAPE")?;
    }
    writeln!(out, "END OPTIONS")?;
    writeln!(out)?;

    writeln!(out, "BEGIN DIMENSIONS")?;
    writeln!(out, "  NRELEASEPTS {}", points.len())?;
    if !first_step_only {
        writeln!(out, "  NRELEASETIMES {}", times.len())?;
    }
    writeln!(out, "END DIMENSIONS")?;
    writeln!(out)?;

    writeln!(out, "BEGIN PACKAGEDATA")?;
    writeln!(out, "# irptno k i j xrpt yrpt zrpt")?;
    for (p, xyz) in points.iter().zip(&coords) {
        let (k, i, j) = p.cell.one_based();
        writeln!(
            out,
            "  {} {} {} {} {} {} {}",
            p.id + 1,
            k,
            i,
            j,
            xyz.x,
            xyz.y,
            xyz.z
        )?;
    }
    writeln!(out, "END PACKAGEDATA")?;
    writeln!(out)?;

    if first_step_only {
        writeln!(out, "BEGIN PERIOD 1")?;
        writeln!(out, "  FIRST")?;
        writeln!(out, "END PERIOD")?;
    } else {
        writeln!(out, "BEGIN RELEASETIMES")?;
        for t in &times {
            writeln!(out, "  {t}")?;
        }
        writeln!(out, "END RELEASETIMES")?;
    }
    Ok(())
}

/// Write release points as CSV.
///
/// With a grid, x/y/z are model coordinates; without one they are the local
/// cell coordinates.
///
/// # Errors
/// Returns `OutOfRange` if a point's cell lies outside `grid`, or `Io` if
/// writing fails.
pub fn write_csv<W: Write>(
    out: &mut W,
    points: &[ReleasePoint],
    grid: Option<&StructuredGrid>,
) -> Result<()> {
    writeln!(out, "id,layer,row,column,face,x,y,z,release_time")?;
    for p in points {
        let xyz = match grid {
            Some(g) => p.model_coordinates(g)?,
            None => p.local,
        };
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{}",
            p.id, p.cell.layer, p.cell.row, p.cell.column, p.face, xyz.x, xyz.y, xyz.z, p.release_time
        )?;
    }
    Ok(())
}
