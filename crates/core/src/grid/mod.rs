//! Model grid geometry supplied by the upstream model builder

pub mod structured;

pub use structured::{CellExtent, GridDefinition, StructuredGrid};
