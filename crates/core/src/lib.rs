//! Pathline Release and Capture Core Library
//!
//! Pre- and post-processing for groundwater particle tracking on structured
//! layer/row/column grids.
//!
//! ## Release translation
//!
//! A release specification names cell regions and, per cell face, how many
//! subdivisions to place particles in. [`release::translate`] expands it into
//! an explicit, deterministically ordered point list that the package writers
//! emit for point-based release input.
//!
//! ## Capture analysis
//!
//! [`analysis::analyze`] reads the terminal events of a tracking run and reports:
//! - the convex hull of the terminal (x, y) positions and its area
//! - travel-time statistics (count, mean, std, min, quartiles, max)

// Core types and utilities
pub mod core_types;
pub mod error;
pub mod grid;

// Pre-processing
pub mod release;

// Post-processing
pub mod analysis;
pub mod tracking;

// Re-export core types
pub use core_types::{CellIndex, GridShape, Vec2, Vec3};
pub use error::{Error, Result};
pub use grid::StructuredGrid;

// Re-export translator and analyzer entry points
pub use analysis::{analyze, analyze_by_group, analyze_runs, AnalysisConfig, CaptureAnalysis};
pub use release::{translate, Face, FaceDivisions, ReleasePoint, ReleaseSpec, SubdivisionData};
pub use tracking::{EventReason, EventTable, ReasonCode};
