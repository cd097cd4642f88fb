//! Structured-grid cell addressing
//!
//! Cells are addressed by zero-based `(layer, row, column)` triples. Rows are
//! counted from the top (north) edge of the model, columns from the left
//! (west) edge, layers from the top of the model downward.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based `(layer, row, column)` cell index.
///
/// Serialized as a three-element array, e.g. `[2, 10, 9]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[usize; 3]", into = "[usize; 3]")]
pub struct CellIndex {
    /// Layer index (0 = top layer)
    pub layer: usize,
    /// Row index (0 = northern row)
    pub row: usize,
    /// Column index (0 = western column)
    pub column: usize,
}

impl CellIndex {
    /// Create a new cell index
    #[inline]
    pub const fn new(layer: usize, row: usize, column: usize) -> Self {
        Self { layer, row, column }
    }

    /// One-based `(layer, row, column)`, as written into simulator input files
    #[inline]
    pub const fn one_based(&self) -> (usize, usize, usize) {
        (self.layer + 1, self.row + 1, self.column + 1)
    }
}

impl From<[usize; 3]> for CellIndex {
    fn from(v: [usize; 3]) -> Self {
        CellIndex::new(v[0], v[1], v[2])
    }
}

impl From<CellIndex> for [usize; 3] {
    fn from(c: CellIndex) -> Self {
        [c.layer, c.row, c.column]
    }
}

impl From<(usize, usize, usize)> for CellIndex {
    fn from((layer, row, column): (usize, usize, usize)) -> Self {
        CellIndex::new(layer, row, column)
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.layer, self.row, self.column)
    }
}

/// Layer/row/column counts of a structured grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    /// Number of layers
    pub nlay: usize,
    /// Number of rows
    pub nrow: usize,
    /// Number of columns
    pub ncol: usize,
}

impl GridShape {
    /// Create a grid shape.
    ///
    /// # Errors
    /// Returns `OutOfRange` if any count is zero.
    pub fn new(nlay: usize, nrow: usize, ncol: usize) -> Result<Self> {
        let shape = Self { nlay, nrow, ncol };
        shape.validate()?;
        Ok(shape)
    }

    /// Check that every count is positive.
    ///
    /// # Errors
    /// Returns `OutOfRange` naming the first zero count.
    pub fn validate(&self) -> Result<()> {
        for (name, n) in [("nlay", self.nlay), ("nrow", self.nrow), ("ncol", self.ncol)] {
            if n == 0 {
                return Err(Error::out_of_range(format!("{name} must be > 0")));
            }
        }
        Ok(())
    }

    /// Total number of cells
    #[inline]
    pub const fn cell_count(&self) -> usize {
        self.nlay * self.nrow * self.ncol
    }

    /// Whether `cell` lies inside the grid
    #[inline]
    pub const fn contains(&self, cell: CellIndex) -> bool {
        cell.layer < self.nlay && cell.row < self.nrow && cell.column < self.ncol
    }

    /// Ensure `cell` lies inside the grid.
    ///
    /// # Errors
    /// Returns `OutOfRange` naming the offending component.
    pub fn check(&self, cell: CellIndex) -> Result<()> {
        if cell.layer >= self.nlay {
            return Err(Error::out_of_range(format!(
                "cell {cell}: layer {} >= nlay {}",
                cell.layer, self.nlay
            )));
        }
        if cell.row >= self.nrow {
            return Err(Error::out_of_range(format!(
                "cell {cell}: row {} >= nrow {}",
                cell.row, self.nrow
            )));
        }
        if cell.column >= self.ncol {
            return Err(Error::out_of_range(format!(
                "cell {cell}: column {} >= ncol {}",
                cell.column, self.ncol
            )));
        }
        Ok(())
    }

    /// Zero-based node number (layer-major, then row, then column)
    #[inline]
    pub const fn node(&self, cell: CellIndex) -> usize {
        cell.layer * self.nrow * self.ncol + cell.row * self.ncol + cell.column
    }

    /// Inverse of [`GridShape::node`]
    pub fn cell(&self, node: usize) -> Option<CellIndex> {
        if node >= self.cell_count() {
            return None;
        }
        let per_layer = self.nrow * self.ncol;
        let layer = node / per_layer;
        let rem = node % per_layer;
        Some(CellIndex::new(layer, rem / self.ncol, rem % self.ncol))
    }
}
