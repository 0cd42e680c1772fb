//! 2D vector helpers layered over [`glam::DVec2`].
//!
//! glam already covers the bulk of the kernel's vector arithmetic
//! (add/scale/dot/`perp_dot`/`length`/`distance`/rotation via
//! [`DVec2::from_angle`]). This module adds the handful of operations it
//! lacks, as an extension trait so call sites read uniformly.

use glam::DVec2;

use crate::error::GeometryError;

/// Extra vector operations used by the kernel.
pub trait Vec2Ext {
    /// 90° clockwise rotation: `(x, y) -> (y, -x)`.
    ///
    /// Note this is the opposite handedness of [`DVec2::perp`]; edge
    /// normals in the collision module are built with this convention.
    fn perpendicular(self) -> DVec2;

    /// Rotate counter-clockwise by `angle` radians.
    fn rotated(self, angle: f64) -> DVec2;

    /// Clamp each component to `[-bound, +bound]` per axis.
    ///
    /// Used to cap velocities against per-axis speed limits. `bound`
    /// components must be non-negative.
    fn trim(self, bound: DVec2) -> DVec2;

    /// Unit vector in the same direction, or
    /// [`GeometryError::ZeroLengthVector`] when there is no direction.
    fn unit(self) -> Result<DVec2, GeometryError>;

    /// Unsigned angle to `other` in `[0, pi]`, via the arccosine of the
    /// normalized dot product. Fails when either vector has zero length.
    fn angle_between(self, other: DVec2) -> Result<f64, GeometryError>;
}

impl Vec2Ext for DVec2 {
    #[inline]
    fn perpendicular(self) -> DVec2 {
        DVec2::new(self.y, -self.x)
    }

    #[inline]
    fn rotated(self, angle: f64) -> DVec2 {
        DVec2::from_angle(angle).rotate(self)
    }

    #[inline]
    fn trim(self, bound: DVec2) -> DVec2 {
        self.clamp(-bound, bound)
    }

    #[inline]
    fn unit(self) -> Result<DVec2, GeometryError> {
        self.try_normalize().ok_or(GeometryError::ZeroLengthVector)
    }

    fn angle_between(self, other: DVec2) -> Result<f64, GeometryError> {
        let cos = self.unit()?.dot(other.unit()?);
        // Rounding can push the dot product a hair outside [-1, 1].
        Ok(cos.clamp(-1.0, 1.0).acos())
    }
}
