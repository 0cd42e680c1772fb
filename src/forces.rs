//! Built-in force laws and the pairwise collision package.
//!
//! Each factory packages a force law's constants and participating body
//! handles into a closure and registers it with the scene, scoped to
//! those bodies so the entry is garbage-collected when any of them is
//! pruned. A stale handle makes the entry inert for the remainder of the
//! tick that pruned its body.

use std::cell::Cell;
use std::rc::Rc;

use glam::DVec2;

use crate::body::{apply_elastic_impulse, Body};
use crate::collision::find_collision;
use crate::math::Vec2Ext;
use crate::scene::{BodyHandle, ForceHandle, Scene};

/// Gravitational attraction is suppressed below this separation to keep
/// the inverse-square law away from its singularity.
pub const MIN_GRAVITY_DIST: f64 = 30.0;

/// Mutual inverse-square attraction between two bodies:
/// `F = g * m1 * m2 / r^2` along the centroid line, equal and opposite.
/// No force is applied while the centroids are closer than
/// [`MIN_GRAVITY_DIST`].
pub fn create_newtonian_gravity(
    scene: &mut Scene,
    g: f64,
    first: BodyHandle,
    second: BodyHandle,
) -> ForceHandle {
    scene.register_scoped_force(
        move |ctx| {
            let Some((a, b)) = ctx.body_pair_mut(first, second) else {
                return;
            };
            let r = b.centroid() - a.centroid();
            let dist = r.length();
            if dist < MIN_GRAVITY_DIST {
                return;
            }
            let force = (r / dist) * (g * a.mass() * b.mass() / (dist * dist));
            a.apply_force(force);
            b.apply_force(-force);
        },
        vec![first, second],
    )
}

/// Hookean spring pulling `first` toward `second`:
/// `F = -k * (c1 - c2)`, applied to `first` only. Register a second
/// spring with the handles swapped for a mutual pull.
pub fn create_spring(
    scene: &mut Scene,
    k: f64,
    first: BodyHandle,
    second: BodyHandle,
) -> ForceHandle {
    scene.register_scoped_force(
        move |ctx| {
            let Some((a, b)) = ctx.body_pair_mut(first, second) else {
                return;
            };
            let displacement = a.centroid() - b.centroid();
            a.apply_force(displacement * -k);
        },
        vec![first, second],
    )
}

/// Linear drag opposing the body's velocity: `F = -gamma * v`.
pub fn create_drag(scene: &mut Scene, gamma: f64, handle: BodyHandle) -> ForceHandle {
    scene.register_scoped_force(
        move |ctx| {
            let Some(body) = ctx.body_mut(handle) else {
                return;
            };
            let force = body.velocity() * -gamma;
            body.apply_force(force);
        },
        vec![handle],
    )
}

/// Constant-magnitude thrust along the body's current velocity
/// direction. The magnitude lives in a shared cell so host code can
/// retune it continuously between ticks. A body at rest has no thrust
/// direction and receives nothing that tick.
pub fn create_applied_force(
    scene: &mut Scene,
    magnitude: Rc<Cell<f64>>,
    handle: BodyHandle,
) -> ForceHandle {
    scene.register_scoped_force(
        move |ctx| {
            let Some(body) = ctx.body_mut(handle) else {
                return;
            };
            let Ok(direction) = body.velocity().unit() else {
                return;
            };
            body.apply_force(direction * magnitude.get());
        },
        vec![handle],
    )
}

/// Mark both bodies removed as soon as their shapes intersect.
pub fn create_destructive_collision(
    scene: &mut Scene,
    first: BodyHandle,
    second: BodyHandle,
) -> ForceHandle {
    scene.register_scoped_force(
        move |ctx| {
            let Some((a, b)) = ctx.body_pair_mut(first, second) else {
                return;
            };
            if find_collision(a.shape(), b.shape()).is_some() {
                a.mark_removed();
                b.mark_removed();
            }
        },
        vec![first, second],
    )
}

/// Callback dispatched when a registered pair intersects. Receives both
/// bodies and the minimum-overlap axis; auxiliary state is whatever the
/// closure captures.
pub type CollisionHandler = Box<dyn FnMut(&mut Body, &mut Body, DVec2)>;

/// A registered collision pair: two bodies and the handler to dispatch
/// when their shapes intersect.
pub struct CollisionPackage {
    first: BodyHandle,
    second: BodyHandle,
    handler: CollisionHandler,
}

impl CollisionPackage {
    pub fn new(first: BodyHandle, second: BodyHandle, handler: CollisionHandler) -> Self {
        Self {
            first,
            second,
            handler,
        }
    }

    /// Re-run the intersection test on the pair's current shapes and
    /// dispatch the handler if they overlap.
    fn handle(&mut self, a: &mut Body, b: &mut Body) {
        if let Some(contact) = find_collision(a.shape(), b.shape()) {
            (self.handler)(a, b, contact.axis);
        }
    }
}

/// Register an arbitrary pairwise collision response: every tick the
/// pair's current shapes are tested, and `handler` runs only on
/// intersection.
pub fn create_collision(
    scene: &mut Scene,
    first: BodyHandle,
    second: BodyHandle,
    handler: CollisionHandler,
) -> ForceHandle {
    let mut package = CollisionPackage::new(first, second, handler);
    scene.register_scoped_force(
        move |ctx| {
            let Some((a, b)) = ctx.body_pair_mut(package.first, package.second) else {
                return;
            };
            package.handle(a, b);
        },
        vec![first, second],
    )
}

/// Elastic bounce between two bodies with the given restitution.
///
/// A debounce flag suppresses the impulse on the tick immediately after
/// one was applied while the shapes still overlap, then rearms, so
/// during sustained overlap the impulse alternates apply/skip tick by
/// tick. The flag persists across contact events.
pub fn create_physics_collision(
    scene: &mut Scene,
    restitution: f64,
    first: BodyHandle,
    second: BodyHandle,
) -> ForceHandle {
    let mut impulsed_last_tick = false;
    create_collision(
        scene,
        first,
        second,
        Box::new(move |a, b, _axis| {
            if !impulsed_last_tick {
                impulsed_last_tick = true;
                apply_elastic_impulse(a, b, restitution);
            } else {
                impulsed_last_tick = false;
            }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::polygon::Polygon;
    use std::cell::RefCell;

    const EPS: f64 = 1e-9;

    fn body_at(center: DVec2, mass: f64) -> Body {
        Body::new(Polygon::rectangle(2.0, 2.0, center), mass, Color::WHITE).unwrap()
    }

    fn point_mass(center: DVec2) -> Body {
        body_at(center, 1.0)
    }

    #[test]
    fn test_spring_pulls_first_body_toward_second() {
        // k = 8000 at 1 unit of separation: |F| = 8000 on body 1 only.
        let mut scene = Scene::new();
        let first = scene.add_body(point_mass(DVec2::ZERO));
        let second = scene.add_body(point_mass(DVec2::new(1.0, 0.0)));
        create_spring(&mut scene, 8000.0, first, second);
        let dt = 1e-3;
        scene.tick(dt);
        // Mass 1: velocity after one tick is F * dt, toward body 2.
        let v1 = scene.body(first).unwrap().velocity();
        assert!((v1 - DVec2::new(8000.0 * dt, 0.0)).length() < EPS);
        assert_eq!(scene.body(second).unwrap().velocity(), DVec2::ZERO);
    }

    #[test]
    fn test_gravity_skipped_inside_minimum_distance() {
        let mut scene = Scene::new();
        let a = scene.add_body(point_mass(DVec2::ZERO));
        let b = scene.add_body(point_mass(DVec2::new(10.0, 0.0)));
        create_newtonian_gravity(&mut scene, 1000.0, a, b);
        scene.tick(0.1);
        assert_eq!(scene.body(a).unwrap().velocity(), DVec2::ZERO);
        assert_eq!(scene.body(b).unwrap().velocity(), DVec2::ZERO);
    }

    #[test]
    fn test_gravity_is_equal_and_opposite() {
        let g = 1000.0;
        let mut scene = Scene::new();
        let a = scene.add_body(body_at(DVec2::ZERO, 2.0));
        let b = scene.add_body(body_at(DVec2::new(100.0, 0.0), 3.0));
        create_newtonian_gravity(&mut scene, g, a, b);
        let dt = 0.01;
        scene.tick(dt);
        // |F| = g * m1 * m2 / r^2 at r = 100.
        let magnitude = g * 2.0 * 3.0 / (100.0 * 100.0);
        let va = scene.body(a).unwrap().velocity();
        let vb = scene.body(b).unwrap().velocity();
        assert!((va.x - magnitude / 2.0 * dt).abs() < 1e-6);
        assert!((vb.x + magnitude / 3.0 * dt).abs() < 1e-6);
        assert!(va.y.abs() < EPS && vb.y.abs() < EPS);
    }

    #[test]
    fn test_drag_opposes_velocity() {
        let mut scene = Scene::new();
        let handle = scene.add_body(point_mass(DVec2::ZERO));
        scene
            .body_mut(handle)
            .unwrap()
            .set_velocity(DVec2::new(10.0, -10.0));
        create_drag(&mut scene, 0.5, handle);
        let dt = 0.1;
        scene.tick(dt);
        // v' = v + (-gamma * v / m) * dt = v * (1 - gamma * dt).
        let expected = DVec2::new(10.0, -10.0) * (1.0 - 0.5 * dt);
        assert!((scene.body(handle).unwrap().velocity() - expected).length() < EPS);
    }

    #[test]
    fn test_applied_force_follows_velocity_and_retunes() {
        let mut scene = Scene::new();
        let handle = scene.add_body(point_mass(DVec2::ZERO));
        scene
            .body_mut(handle)
            .unwrap()
            .set_velocity(DVec2::new(2.0, 0.0));
        let magnitude = Rc::new(Cell::new(10.0));
        create_applied_force(&mut scene, Rc::clone(&magnitude), handle);
        scene.tick(0.1);
        let v = scene.body(handle).unwrap().velocity();
        assert!((v - DVec2::new(3.0, 0.0)).length() < EPS);

        // Host retunes the shared cell; the same entry picks it up.
        magnitude.set(0.0);
        scene.tick(0.1);
        assert!((scene.body(handle).unwrap().velocity() - v).length() < EPS);
    }

    #[test]
    fn test_applied_force_skips_body_at_rest() {
        let mut scene = Scene::new();
        let handle = scene.add_body(point_mass(DVec2::ZERO));
        create_applied_force(&mut scene, Rc::new(Cell::new(10.0)), handle);
        scene.tick(0.1);
        let body = scene.body(handle).unwrap();
        assert_eq!(body.velocity(), DVec2::ZERO);
        assert!(body.velocity().x.is_finite());
    }

    #[test]
    fn test_destructive_collision_removes_both_on_contact() {
        let mut scene = Scene::new();
        let a = scene.add_body(point_mass(DVec2::ZERO));
        let b = scene.add_body(point_mass(DVec2::new(10.0, 0.0)));
        scene.body_mut(a).unwrap().set_velocity(DVec2::new(5.0, 0.0));
        create_destructive_collision(&mut scene, a, b);
        // Ticks 1-2: the pair is still clear when forces run (the test
        // sees positions from the previous integrate), so nothing dies
        // while a advances to x=5, then x=10.
        scene.tick(1.0);
        assert_eq!(scene.body_count(), 2);
        scene.tick(1.0);
        assert_eq!(scene.body_count(), 2);
        // Tick 3 sees the shapes coincident at x=10: both flagged and
        // pruned in the same tick.
        scene.tick(1.0);
        assert_eq!(scene.body_count(), 0);
    }

    #[test]
    fn test_generic_collision_passes_minimum_overlap_axis() {
        let mut scene = Scene::new();
        let a = scene.add_body(point_mass(DVec2::ZERO));
        let b = scene.add_body(point_mass(DVec2::new(1.5, 0.0)));
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = Rc::clone(&seen);
            create_collision(
                &mut scene,
                a,
                b,
                Box::new(move |_, _, axis| seen.borrow_mut().push(axis)),
            );
        }
        scene.tick(0.1);
        let axes = seen.borrow();
        assert_eq!(axes.len(), 1);
        // Overlap is 0.5 on x vs 2.0 on y: the x normal wins.
        assert!(axes[0].y.abs() < EPS);
        assert!((axes[0].x.abs() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_generic_collision_silent_when_apart() {
        let mut scene = Scene::new();
        let a = scene.add_body(point_mass(DVec2::ZERO));
        let b = scene.add_body(point_mass(DVec2::new(50.0, 0.0)));
        let hits = Rc::new(Cell::new(0u32));
        {
            let hits = Rc::clone(&hits);
            create_collision(
                &mut scene,
                a,
                b,
                Box::new(move |_, _, _| hits.set(hits.get() + 1)),
            );
        }
        for _ in 0..5 {
            scene.tick(0.1);
        }
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_physics_collision_alternates_during_sustained_overlap() {
        // Slow closing speed and a tiny timestep keep the pair
        // overlapping for many ticks; the impulse must land on the
        // first, skip the second, land on the third.
        let mut scene = Scene::new();
        let a = scene.add_body(point_mass(DVec2::ZERO));
        let b = scene.add_body(point_mass(DVec2::new(1.0, 0.0)));
        scene.body_mut(a).unwrap().set_velocity(DVec2::new(0.1, 0.0));
        create_physics_collision(&mut scene, 1.0, a, b);
        let dt = 1e-4;

        // Tick 1: equal masses at restitution 1 swap normal velocities.
        scene.tick(dt);
        assert!(scene.body(a).unwrap().velocity().x.abs() < EPS);
        assert!((scene.body(b).unwrap().velocity().x - 0.1).abs() < EPS);

        // Tick 2: still overlapping, debounced - velocities unchanged.
        scene.tick(dt);
        assert!(scene.body(a).unwrap().velocity().x.abs() < EPS);
        assert!((scene.body(b).unwrap().velocity().x - 0.1).abs() < EPS);

        // Tick 3: rearmed - the impulse applies again and swaps back.
        scene.tick(dt);
        assert!((scene.body(a).unwrap().velocity().x - 0.1).abs() < EPS);
        assert!(scene.body(b).unwrap().velocity().x.abs() < EPS);
    }

    #[test]
    fn test_physics_collision_wall_bounce() {
        let mut scene = Scene::new();
        let wall = scene.add_body(body_at(DVec2::new(6.0, 0.0), f64::INFINITY));
        let ball = scene.add_body(point_mass(DVec2::ZERO));
        scene.body_mut(ball).unwrap().set_velocity(DVec2::new(10.0, 0.0));
        create_physics_collision(&mut scene, 1.0, ball, wall);
        // Ball reaches the wall within a few ticks and reflects.
        for _ in 0..10 {
            scene.tick(0.1);
        }
        let v = scene.body(ball).unwrap().velocity();
        assert!((v.x + 10.0).abs() < 1e-6, "ball should have reflected: {v:?}");
        assert_eq!(scene.body(wall).unwrap().velocity(), DVec2::ZERO);
    }

    #[test]
    fn test_force_entries_gc_when_scoped_body_pruned() {
        let mut scene = Scene::new();
        let a = scene.add_body(point_mass(DVec2::ZERO));
        let b = scene.add_body(point_mass(DVec2::new(1.0, 0.0)));
        create_spring(&mut scene, 100.0, a, b);
        create_drag(&mut scene, 0.5, a);
        scene.remove_body(a);
        scene.tick(0.1);
        // Both entries were scoped to the pruned body; neither fires
        // again, so b stays untouched forever after.
        let vb = scene.body(b).unwrap().velocity();
        scene.tick(0.1);
        assert_eq!(scene.body(b).unwrap().velocity(), vb);
    }
}
