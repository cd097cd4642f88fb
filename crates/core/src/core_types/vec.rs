//! Vector type aliases for planar and spatial coordinates.

use nalgebra::{Vector2, Vector3};

/// Planar coordinate pair, used for the capture-area hull.
pub type Vec2 = Vector2<f64>;

/// Spatial coordinate triple.
///
/// Holds local cell coordinates in `[0, 1]^3` for release points and model
/// coordinates for tracking events.
pub type Vec3 = Vector3<f64>;
