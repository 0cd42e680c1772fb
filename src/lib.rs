//! planar 2D Physics Kernel
//!
//! A minimal real-time rigid-body simulation core for polygonal shapes:
//! bodies integrate each fixed timestep, pluggable force creators mutate
//! their accelerations and impulses, and polygon pairs are tested with
//! the separating axis theorem.
//!
//! # Architecture
//!
//! The library is organized into layers, leaves first:
//!
//! 1. **math** - 2D vector helpers over glam's `DVec2`
//! 2. **polygon** - validated convex vertex loops and in-place transforms
//! 3. **collision** - SAT narrowphase with minimum-translation axis
//! 4. **body** - rigid body state, impulse exchange, integration
//! 5. **forces** - built-in force laws and collision packages
//! 6. **scene** - body/entry/text ownership and the per-tick pipeline
//! 7. **color**, **text** - opaque display tags carried for the host
//!
//! The host loop calls [`Scene::tick`] once per fixed timestep; the scene
//! invokes registered force creators in order, integrates every live
//! body, then prunes whatever was flagged for removal. Rendering, input,
//! and audio are the host's business: the kernel only exposes query and
//! command surfaces.

pub mod body;
pub mod collision;
pub mod color;
pub mod error;
pub mod forces;
pub mod math;
pub mod polygon;
pub mod scene;
pub mod text;

// Re-export commonly used types
pub use body::{apply_elastic_impulse, Body, BodyKind, IntegrationMode};
pub use collision::{find_collision, Contact};
pub use color::Color;
pub use error::{GeometryError, PhysicsError};
pub use forces::{
    create_applied_force, create_collision, create_destructive_collision, create_drag,
    create_newtonian_gravity, create_physics_collision, create_spring, CollisionHandler,
    CollisionPackage,
};
pub use math::Vec2Ext;
pub use polygon::Polygon;
pub use scene::{BodyHandle, ForceContext, ForceHandle, Scene};
pub use text::Text;

// Re-export glam for convenience
pub use glam;
