//! Rigid body state, force/impulse application, and integration.

use std::any::Any;
use std::fmt;

use glam::DVec2;

use crate::collision::find_collision;
use crate::color::Color;
use crate::error::PhysicsError;
use crate::polygon::Polygon;

/// What a body is, gameplay-wise.
///
/// A closed set so collision handlers can match exhaustively; identifying
/// data (player number, wall side, pickup type) rides in the body's
/// opaque [`info`](Body::info) payload instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Immovable boundary geometry.
    Wall,
    /// A player-controlled segment.
    Player,
    /// A projectile.
    Bullet,
    /// A consumable pickup.
    Food,
    /// No gameplay role.
    Scenery,
}

/// Position update rule used by [`Body::integrate`].
///
/// Both rules share the velocity update; they differ only in which
/// velocity advances the position. The two are distinct on purpose and
/// selected explicitly, never swapped silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrationMode {
    /// Trapezoidal: position advances by `dt` times the average of the
    /// old and new velocity. Kept for the legacy tick path.
    Averaged,
    /// Position advances by `dt` times the new velocity. The live scene
    /// tick uses this rule.
    #[default]
    Canonical,
}

/// A rigid polygonal body.
///
/// The shape lives in world coordinates and is translated/rotated in
/// place as the body moves; `centroid` is kept equal to the shape's live
/// centroid at all times. `position` is a free-running integral of
/// velocity for absolute tracking and is deliberately not re-derived from
/// the shape.
pub struct Body {
    shape: Polygon,
    centroid: DVec2,
    position: DVec2,
    velocity: DVec2,
    acceleration: DVec2,
    impulse: DVec2,
    mass: f64,
    color: Color,
    angle: f64,
    glowing: bool,
    glow_radius: f64,
    removed: bool,
    kind: BodyKind,
    info: Option<Box<dyn Any>>,
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("kind", &self.kind)
            .field("centroid", &self.centroid)
            .field("velocity", &self.velocity)
            .field("mass", &self.mass)
            .field("removed", &self.removed)
            .finish_non_exhaustive()
    }
}

impl Body {
    /// Create a body at rest.
    ///
    /// `mass` must be positive: finite for movable bodies or
    /// `f64::INFINITY` for immovable ones (walls). Zero, negative, and
    /// NaN masses are rejected.
    pub fn new(shape: Polygon, mass: f64, color: Color) -> Result<Self, PhysicsError> {
        if mass.is_nan() || mass <= 0.0 {
            return Err(PhysicsError::InvalidMass(mass));
        }
        let centroid = shape.centroid();
        Ok(Self {
            shape,
            centroid,
            position: DVec2::ZERO,
            velocity: DVec2::ZERO,
            acceleration: DVec2::ZERO,
            impulse: DVec2::ZERO,
            mass,
            color,
            angle: 0.0,
            glowing: false,
            glow_radius: 0.0,
            removed: false,
            kind: BodyKind::Scenery,
            info: None,
        })
    }

    /// Tag the body with a gameplay kind.
    pub fn with_kind(mut self, kind: BodyKind) -> Self {
        self.kind = kind;
        self
    }

    /// Attach an opaque payload identifying this body to game code.
    ///
    /// The payload is dropped exactly once, when the body itself is
    /// dropped (for scene-owned bodies: at prune time or scene drop).
    pub fn with_info(mut self, info: impl Any) -> Self {
        self.info = Some(Box::new(info));
        self
    }

    /// Current shape in world coordinates. Clone it for a snapshot.
    #[inline]
    pub fn shape(&self) -> &Polygon {
        &self.shape
    }

    #[inline]
    pub fn centroid(&self) -> DVec2 {
        self.centroid
    }

    #[inline]
    pub fn position(&self) -> DVec2 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    #[inline]
    pub fn acceleration(&self) -> DVec2 {
        self.acceleration
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    #[inline]
    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    /// The opaque payload, if any, downcast by the caller.
    pub fn info(&self) -> Option<&dyn Any> {
        self.info.as_deref()
    }

    #[inline]
    pub fn glowing(&self) -> bool {
        self.glowing
    }

    #[inline]
    pub fn glow_radius(&self) -> f64 {
        self.glow_radius
    }

    pub fn set_position(&mut self, position: DVec2) {
        self.position = position;
    }

    pub fn set_velocity(&mut self, velocity: DVec2) {
        self.velocity = velocity;
    }

    pub fn set_acceleration(&mut self, acceleration: DVec2) {
        self.acceleration = acceleration;
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_glowing(&mut self, glowing: bool) {
        self.glowing = glowing;
    }

    pub fn set_glow_radius(&mut self, radius: f64) {
        self.glow_radius = radius;
    }

    /// Move the shape so its centroid lands on `centroid`.
    ///
    /// `position` is untouched: it tracks integrated motion, not
    /// geometric placement.
    pub fn set_centroid(&mut self, centroid: DVec2) {
        let delta = centroid - self.centroid;
        self.shape.translate(delta);
        self.centroid = centroid;
    }

    /// Set the absolute orientation, rotating the shape about its
    /// centroid by the difference from the current angle.
    pub fn set_rotation(&mut self, angle: f64) {
        self.shape.rotate(angle - self.angle, self.centroid);
        self.angle = angle;
    }

    /// Accumulate a force for this tick: `acceleration += force / mass`.
    ///
    /// Infinite mass absorbs any force without moving, and a body
    /// flagged for removal is inert.
    pub fn apply_force(&mut self, force: DVec2) {
        if self.mass.is_infinite() || self.removed {
            return;
        }
        self.acceleration += force / self.mass;
    }

    /// Accumulate an impulse; it reaches the velocity at the next
    /// integration step, not before. Bodies flagged for removal are
    /// inert.
    pub fn apply_impulse(&mut self, impulse: DVec2) {
        if self.removed {
            return;
        }
        self.impulse += impulse;
    }

    /// Advance one timestep.
    ///
    /// Velocity gains `acceleration * dt` plus the accumulated impulse
    /// divided by mass; position, centroid, and shape all advance by the
    /// same delta, chosen by `mode`. Acceleration and impulse reset to
    /// zero afterwards.
    pub fn integrate(&mut self, dt: f64, mode: IntegrationMode) {
        let old_velocity = self.velocity;
        let mut new_velocity = old_velocity + self.acceleration * dt;
        if self.mass.is_finite() {
            new_velocity += self.impulse / self.mass;
        }
        self.velocity = new_velocity;

        let delta = match mode {
            IntegrationMode::Averaged => 0.5 * (old_velocity + new_velocity) * dt,
            IntegrationMode::Canonical => new_velocity * dt,
        };
        self.position += delta;
        self.centroid += delta;
        self.shape.translate(delta);

        self.acceleration = DVec2::ZERO;
        self.impulse = DVec2::ZERO;
    }

    /// Flag this body for removal. Sticky and idempotent; the owning
    /// scene prunes flagged bodies at the end of its next integrate pass.
    pub fn mark_removed(&mut self) {
        self.removed = true;
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// Exchange an elastic collision impulse between two overlapping bodies.
///
/// The impulse acts along the pair's minimum-overlap axis, oriented from
/// `a` toward `b`, with magnitude
/// `reduced_mass * (1 + restitution) * (v_b - v_a) . axis`. The reduced
/// mass is the harmonic combination `m_a * m_b / (m_a + m_b)`; when one
/// mass is infinite it degenerates to the other body's mass, so walls
/// reflect without moving. Tangential velocity is untouched.
///
/// If the shapes do not currently intersect there is no defined axis and
/// the call does nothing.
pub fn apply_elastic_impulse(a: &mut Body, b: &mut Body, restitution: f64) {
    let Some(contact) = find_collision(a.shape(), b.shape()) else {
        return;
    };

    let reduced_mass = if a.mass.is_infinite() {
        b.mass
    } else if b.mass.is_infinite() {
        a.mass
    } else {
        (a.mass * b.mass) / (a.mass + b.mass)
    };

    let mut axis = contact.axis;
    if axis.dot(b.centroid() - a.centroid()) < 0.0 {
        axis = -axis;
    }

    let approach = b.velocity.dot(axis) - a.velocity.dot(axis);
    let magnitude = reduced_mass * (1.0 + restitution) * approach;
    a.apply_impulse(axis * magnitude);
    b.apply_impulse(axis * -magnitude);
}
