//! Core types and utilities

pub mod cell;
pub mod vec;

pub use cell::{CellIndex, GridShape};
pub use vec::{Vec2, Vec3};
