//! Narrowphase polygon intersection via the separating axis theorem.
//!
//! Two convex shapes are disjoint iff some axis exists onto which their
//! projections do not overlap; for convex polygons it suffices to test
//! the outward normals of every edge. When every axis overlaps, the axis
//! of minimum overlap is the minimum-translation direction the impulse
//! resolver pushes along.
//!
//! There is no broad phase: pairs are registered explicitly by the
//! caller, so the O((|A|+|B|)²) per-pair cost stays bounded.

use glam::DVec2;

use crate::math::Vec2Ext;
use crate::polygon::Polygon;

/// Result of an intersection test between two overlapping polygons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Minimum-translation direction, normalized. Tie between equally
    /// small overlaps keeps the first axis in enumeration order (shape
    /// A's edges before shape B's).
    pub axis: DVec2,
    /// Projection overlap length along `axis` (penetration depth).
    pub overlap: f64,
}

/// Projection of a polygon onto an axis: scalar `(min, max)` interval.
fn project(shape: &Polygon, axis: DVec2) -> (f64, f64) {
    let mut min = shape.vertices()[0].dot(axis);
    let mut max = min;
    for v in &shape.vertices()[1..] {
        let d = v.dot(axis);
        if d < min {
            min = d;
        } else if d > max {
            max = d;
        }
    }
    (min, max)
}

/// Normalized outward edge normals of `shape`, in edge order.
///
/// Validated polygons have no zero-length edges, so normalization cannot
/// fail.
fn edge_normals(shape: &Polygon) -> impl Iterator<Item = DVec2> + '_ {
    shape
        .edges()
        .map(|(v1, v2)| (v2 - v1).normalize().perpendicular())
}

/// Test two convex polygons for intersection.
///
/// Returns `None` as soon as any candidate axis separates the shapes;
/// otherwise returns the minimum-overlap axis and its penetration depth.
/// Collision (the `is_some` answer) is symmetric in its arguments; the
/// reported axis direction follows A-edges-first enumeration order.
pub fn find_collision(a: &Polygon, b: &Polygon) -> Option<Contact> {
    let mut best: Option<Contact> = None;

    for axis in edge_normals(a).chain(edge_normals(b)) {
        let (min_a, max_a) = project(a, axis);
        let (min_b, max_b) = project(b, axis);

        if min_a > max_b || max_a < min_b {
            return None;
        }

        let overlap = (min_a - max_b).abs().min((max_a - min_b).abs());
        if best.map_or(true, |c| overlap < c.overlap) {
            best = Some(Contact { axis, overlap });
        }
    }

    best
}
