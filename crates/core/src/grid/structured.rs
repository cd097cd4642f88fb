//! Structured (layer/row/column) grid geometry
//!
//! Supplied by the model builder and used to resolve cell identifiers and
//! local cell coordinates into model coordinates.
//!
//! # Conventions
//! - `delr[j]` is the width of column `j` along x
//! - `delc[i]` is the height of row `i` along y; row 0 is the northern row
//! - `top` holds the top elevation of layer 0 (row-major, `nrow * ncol`)
//! - `botm` holds the bottom elevation of every layer (`nlay * nrow * ncol`)
//! - `(xoff, yoff)` is the model coordinate of the lower-left grid corner

use crate::core_types::{CellIndex, GridShape, Vec3};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Serialized form of a [`StructuredGrid`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridDefinition {
    /// Layer/row/column counts
    pub shape: GridShape,
    /// Column widths (ncol)
    pub delr: Vec<f64>,
    /// Row heights (nrow)
    pub delc: Vec<f64>,
    /// Model top (nrow * ncol)
    pub top: Vec<f64>,
    /// Layer bottoms (nlay * nrow * ncol)
    pub botm: Vec<f64>,
    /// X of the lower-left corner
    #[serde(default)]
    pub xoff: f64,
    /// Y of the lower-left corner
    #[serde(default)]
    pub yoff: f64,
}

/// Axis-aligned bounds of one cell in model coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellExtent {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub zmin: f64,
    pub zmax: f64,
}

impl CellExtent {
    /// Map a local coordinate in `[0, 1]^3` to model coordinates
    #[inline]
    pub fn to_model(&self, local: Vec3) -> Vec3 {
        Vec3::new(
            self.xmin + local.x * (self.xmax - self.xmin),
            self.ymin + local.y * (self.ymax - self.ymin),
            self.zmin + local.z * (self.zmax - self.zmin),
        )
    }
}

/// Validated structured grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridDefinition", into = "GridDefinition")]
pub struct StructuredGrid {
    shape: GridShape,
    delr: Vec<f64>,
    delc: Vec<f64>,
    top: Vec<f64>,
    botm: Vec<f64>,
    xoff: f64,
    yoff: f64,
    /// Column edge x offsets from the west edge (ncol + 1)
    x_edges: Vec<f64>,
    /// Row edge y offsets from the north edge (nrow + 1)
    y_edges: Vec<f64>,
}

fn cumulative(widths: &[f64]) -> Vec<f64> {
    let mut edges = Vec::with_capacity(widths.len() + 1);
    let mut acc = 0.0;
    edges.push(acc);
    for w in widths {
        acc += w;
        edges.push(acc);
    }
    edges
}

fn check_len(name: &str, values: &[f64], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(Error::out_of_range(format!(
            "{name} has {} values, expected {expected}",
            values.len()
        )));
    }
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(Error::out_of_range(format!("{name}[{i}] is not finite")));
    }
    Ok(())
}

impl StructuredGrid {
    /// Create a grid from explicit geometry arrays.
    ///
    /// # Errors
    /// Returns `OutOfRange` if array lengths do not match the shape, widths are
    /// not positive and finite, or a layer bottom is not below the layer top.
    pub fn new(
        shape: GridShape,
        delr: Vec<f64>,
        delc: Vec<f64>,
        top: Vec<f64>,
        botm: Vec<f64>,
    ) -> Result<Self> {
        shape.validate()?;
        let plan = shape.nrow * shape.ncol;
        check_len("delr", &delr, shape.ncol)?;
        check_len("delc", &delc, shape.nrow)?;
        check_len("top", &top, plan)?;
        check_len("botm", &botm, shape.cell_count())?;

        for (name, widths) in [("delr", &delr), ("delc", &delc)] {
            if let Some(i) = widths.iter().position(|&w| w <= 0.0) {
                return Err(Error::out_of_range(format!("{name}[{i}] must be > 0")));
            }
        }

        for layer in 0..shape.nlay {
            for row in 0..shape.nrow {
                for column in 0..shape.ncol {
                    let cell = CellIndex::new(layer, row, column);
                    let node = shape.node(cell);
                    let upper = if layer == 0 { top[node] } else { botm[node - plan] };
                    if botm[node] >= upper {
                        return Err(Error::out_of_range(format!(
                            "cell {cell}: bottom {} is not below top {upper}",
                            botm[node]
                        )));
                    }
                }
            }
        }

        let x_edges = cumulative(&delr);
        let y_edges = cumulative(&delc);
        Ok(Self {
            shape,
            delr,
            delc,
            top,
            botm,
            xoff: 0.0,
            yoff: 0.0,
            x_edges,
            y_edges,
        })
    }

    /// Create a grid with uniform cell sizes and flat, equally thick layers.
    ///
    /// # Errors
    /// Same as [`StructuredGrid::new`]; additionally `layer_thickness` must be > 0.
    pub fn uniform(
        shape: GridShape,
        cell_width: f64,
        cell_height: f64,
        top: f64,
        layer_thickness: f64,
    ) -> Result<Self> {
        if !(layer_thickness > 0.0 && layer_thickness.is_finite()) {
            return Err(Error::out_of_range("layer_thickness must be finite and > 0"));
        }
        shape.validate()?;
        let plan = shape.nrow * shape.ncol;
        let botm = (0..shape.nlay)
            .flat_map(|k| std::iter::repeat_n(top - layer_thickness * (k + 1) as f64, plan))
            .collect();
        Self::new(
            shape,
            vec![cell_width; shape.ncol],
            vec![cell_height; shape.nrow],
            vec![top; plan],
            botm,
        )
    }

    /// Place the lower-left grid corner at `(xoff, yoff)`
    pub fn with_offset(mut self, xoff: f64, yoff: f64) -> Self {
        self.xoff = xoff;
        self.yoff = yoff;
        self
    }

    /// Load a grid definition from a JSON file.
    ///
    /// # Errors
    /// Returns `Io` or `Json` if the file cannot be read or parsed, and
    /// `OutOfRange` if the geometry is invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let def: GridDefinition = serde_json::from_str(&contents)?;
        Self::try_from(def)
    }

    /// Layer/row/column counts
    #[inline]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Column widths
    pub fn delr(&self) -> &[f64] {
        &self.delr
    }

    /// Row heights
    pub fn delc(&self) -> &[f64] {
        &self.delc
    }

    /// Total extent along x
    pub fn total_width(&self) -> f64 {
        self.x_edges[self.shape.ncol]
    }

    /// Total extent along y
    pub fn total_height(&self) -> f64 {
        self.y_edges[self.shape.nrow]
    }

    /// Top elevation of `cell`.
    ///
    /// # Errors
    /// Returns `OutOfRange` if `cell` is outside the grid.
    pub fn cell_top(&self, cell: CellIndex) -> Result<f64> {
        self.shape.check(cell)?;
        Ok(self.top_unchecked(cell))
    }

    /// Bottom elevation of `cell`.
    ///
    /// # Errors
    /// Returns `OutOfRange` if `cell` is outside the grid.
    pub fn cell_bottom(&self, cell: CellIndex) -> Result<f64> {
        self.shape.check(cell)?;
        Ok(self.botm[self.shape.node(cell)])
    }

    fn top_unchecked(&self, cell: CellIndex) -> f64 {
        if cell.layer == 0 {
            self.top[cell.row * self.shape.ncol + cell.column]
        } else {
            let above = CellIndex::new(cell.layer - 1, cell.row, cell.column);
            self.botm[self.shape.node(above)]
        }
    }

    /// Model-coordinate bounds of `cell`.
    ///
    /// # Errors
    /// Returns `OutOfRange` if `cell` is outside the grid.
    pub fn cell_extent(&self, cell: CellIndex) -> Result<CellExtent> {
        self.shape.check(cell)?;
        let north = self.yoff + self.total_height();
        Ok(CellExtent {
            xmin: self.xoff + self.x_edges[cell.column],
            xmax: self.xoff + self.x_edges[cell.column + 1],
            ymin: north - self.y_edges[cell.row + 1],
            ymax: north - self.y_edges[cell.row],
            zmin: self.botm[self.shape.node(cell)],
            zmax: self.top_unchecked(cell),
        })
    }

    /// Resolve a local coordinate inside `cell` to model coordinates.
    ///
    /// # Errors
    /// Returns `OutOfRange` if `cell` is outside the grid.
    pub fn to_model(&self, cell: CellIndex, local: Vec3) -> Result<Vec3> {
        Ok(self.cell_extent(cell)?.to_model(local))
    }
}

impl TryFrom<GridDefinition> for StructuredGrid {
    type Error = Error;

    fn try_from(def: GridDefinition) -> Result<Self> {
        for (name, v) in [("xoff", def.xoff), ("yoff", def.yoff)] {
            if !v.is_finite() {
                return Err(Error::out_of_range(format!("{name} is not finite")));
            }
        }
        let grid = Self::new(def.shape, def.delr, def.delc, def.top, def.botm)?;
        Ok(grid.with_offset(def.xoff, def.yoff))
    }
}

impl From<StructuredGrid> for GridDefinition {
    fn from(grid: StructuredGrid) -> Self {
        GridDefinition {
            shape: grid.shape,
            delr: grid.delr,
            delc: grid.delc,
            top: grid.top,
            botm: grid.botm,
            xoff: grid.xoff,
            yoff: grid.yoff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid() -> StructuredGrid {
        // 3 layers, 21 rows, 20 columns of 500 m cells
        StructuredGrid::uniform(GridShape::new(3, 21, 20).unwrap(), 500.0, 500.0, 400.0, 100.0)
            .unwrap()
    }

    #[test]
    fn test_uniform_dimensions() {
        let g = grid();
        assert_relative_eq!(g.total_width(), 10_000.0);
        assert_relative_eq!(g.total_height(), 10_500.0);
        assert_relative_eq!(g.cell_top(CellIndex::new(0, 0, 0)).unwrap(), 400.0);
        assert_relative_eq!(g.cell_top(CellIndex::new(2, 5, 5)).unwrap(), 200.0);
        assert_relative_eq!(g.cell_bottom(CellIndex::new(2, 5, 5)).unwrap(), 100.0);
    }

    #[test]
    fn test_row_zero_is_north() {
        let g = grid();
        let north = g.cell_extent(CellIndex::new(0, 0, 0)).unwrap();
        let south = g.cell_extent(CellIndex::new(0, 20, 0)).unwrap();
        assert!(north.ymin > south.ymin);
        assert_relative_eq!(north.ymax, 10_500.0);
        assert_relative_eq!(south.ymin, 0.0);
    }

    #[test]
    fn test_local_to_model() {
        let g = grid().with_offset(1000.0, 2000.0);
        let cell = CellIndex::new(2, 10, 9);
        let p = g.to_model(cell, Vec3::new(0.5, 0.0, 1.0)).unwrap();
        assert_relative_eq!(p.x, 1000.0 + 9.0 * 500.0 + 250.0);
        // Local y = 0 is the southern face of row 10
        assert_relative_eq!(p.y, 2000.0 + 10_500.0 - 11.0 * 500.0);
        assert_relative_eq!(p.z, 200.0);
    }

    #[test]
    fn test_out_of_grid_cell_rejected() {
        let g = grid();
        let err = g.cell_extent(CellIndex::new(3, 0, 0)).unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)));
    }

    #[test]
    fn test_inverted_layer_rejected() {
        let shape = GridShape::new(1, 1, 1).unwrap();
        let err = StructuredGrid::new(shape, vec![1.0], vec![1.0], vec![0.0], vec![5.0]).unwrap_err();
        assert!(err.to_string().contains("not below top"));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let shape = GridShape::new(1, 2, 2).unwrap();
        let err =
            StructuredGrid::new(shape, vec![1.0], vec![1.0, 1.0], vec![0.0; 4], vec![-1.0; 4])
                .unwrap_err();
        assert!(err.to_string().contains("delr"));
    }

    #[test]
    fn test_json_round_trip_keeps_offset() {
        let g = grid().with_offset(10.0, 20.0);
        let json = serde_json::to_string(&g).unwrap();
        let back: StructuredGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn test_non_finite_offset_rejected() {
        let mut def = GridDefinition::from(grid());
        def.yoff = f64::NAN;
        let err = StructuredGrid::try_from(def).unwrap_err();
        assert!(matches!(err, Error::OutOfRange(_)));
        assert!(err.to_string().contains("yoff"));
    }
}
