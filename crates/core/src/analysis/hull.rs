//! Planar convex hull and polygon area
//!
//! The hull is built with Andrew's monotone chain: points are sorted by
//! (x, y), then lower and upper chains are assembled with a cross-product
//! turn test. Collinear boundary points are dropped, so the hull contains
//! only true corners, in counter-clockwise order.

use crate::core_types::Vec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// z-component of `(a - o) x (b - o)`; positive for a counter-clockwise turn
#[inline]
fn cross(o: Vec2, a: Vec2, b: Vec2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull of `points`, counter-clockwise, without the closing vertex.
///
/// Duplicate points are ignored. With fewer than three distinct points, or
/// when every point is collinear, the result has at most two vertices (the
/// extreme points) and encloses no area.
pub fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    let mut pts: Vec<Vec2> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();

    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<Vec2> = Vec::with_capacity(2 * pts.len());

    // Lower chain
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }

    // Upper chain
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }

    // Last point repeats the first
    hull.pop();
    hull
}

/// Area enclosed by a simple polygon (shoelace formula).
///
/// Accepts open or closed vertex lists and either winding; the result is
/// never negative. Fewer than three vertices enclose nothing.
pub fn polygon_area(vertices: &[Vec2]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let twice: f64 = vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    0.5 * twice.abs()
}

/// Convex capture area of a set of terminal points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureArea {
    /// Hull vertices, counter-clockwise, first vertex repeated at the end
    pub polygon: Vec<Vec2>,
    /// Enclosed area in model length units squared
    pub area: f64,
    /// Fewer than three distinct points, or all points collinear
    pub degenerate: bool,
}

impl CaptureArea {
    /// Compute the hull and its area.
    ///
    /// Degenerate point sets are not an error: the area is exactly zero and
    /// `degenerate` is set.
    pub fn from_points(points: &[Vec2]) -> Self {
        let mut polygon = convex_hull(points);
        let degenerate = polygon.len() < 3;
        let area = if degenerate {
            warn!(
                "Degenerate capture area: {} points, {} distinct hull vertices; reporting zero area",
                points.len(),
                polygon.len()
            );
            0.0
        } else {
            polygon_area(&polygon)
        };
        if let Some(&first) = polygon.first() {
            polygon.push(first);
        }
        Self {
            polygon,
            area,
            degenerate,
        }
    }

    /// Number of distinct hull vertices
    pub fn vertex_count(&self) -> usize {
        self.polygon.len().saturating_sub(1)
    }
}
