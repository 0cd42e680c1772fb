//! Error types for precondition violations at construction and call boundaries.

/// Geometric precondition violations.
///
/// These replace silent NaN propagation: a degenerate polygon or a
/// zero-length direction vector corrupts downstream physics state in ways
/// that are hard to diagnose, so the checked entry points reject them
/// up front.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// A polygon needs at least 3 vertices to bound an area.
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// Two consecutive vertices coincide; the edge has no normal.
    #[error("polygon edge {0} has zero length")]
    ZeroLengthEdge(usize),

    /// The vertex loop encloses no area (collinear or self-cancelling).
    #[error("polygon is degenerate (zero area)")]
    DegenerateArea,

    /// A direction was requested from a zero-length vector.
    #[error("zero-length vector has no direction")]
    ZeroLengthVector,
}

/// Physical precondition violations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    /// Mass must be positive and finite, or positive infinity for
    /// immovable bodies. Zero, negative, and NaN masses are rejected.
    #[error("mass must be positive (finite or +inf), got {0}")]
    InvalidMass(f64),
}
