//! Configuration translator
//!
//! Converts a face-subdivision release specification (division counts per
//! cell face over layer/row/column regions) into the explicit point list
//! expected by point-based release packages.

pub mod face;
pub mod package;
pub mod spec;
pub mod translate;

pub use face::{Face, FaceDivisions};
pub use package::{write_csv, write_package, PackageOptions};
pub use spec::{CellRegion, RegionRelease, ReleaseSpec, SubdivisionData, MAX_RELEASE_POINTS};
pub use translate::{translate, ReleasePoint};
