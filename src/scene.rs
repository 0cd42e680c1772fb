//! Scene: authoritative owner of bodies, force-creator entries, and texts.
//!
//! Only the scene owns bodies; every external reference is a non-owning
//! generational [`BodyHandle`], so a pruned body can never dangle: stale
//! handles simply resolve to `None`. Force creators run once per tick in
//! registration order, then every non-removed body integrates, then
//! flagged entries are swept. The ordering is load-bearing: force
//! application always sees the previous tick's fully-integrated
//! positions, and removal takes effect only after the integrate walk, so
//! a body removed mid-tick keeps one final consistent position until the
//! end of the tick.
//!
//! Structural additions requested from inside a force creator go through
//! the deferred command buffer and become visible starting next tick.

use glam::DVec2;

use crate::body::{Body, IntegrationMode};
use crate::text::Text;

/// Non-owning reference to a body in a [`Scene`].
///
/// Generation-checked: after the body is pruned, lookups through old
/// handles return `None`, even if the slot has been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

/// Non-owning reference to a registered force-creator entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForceHandle(u64);

/// Slot arena for bodies: dense insertion-ordered iteration plus
/// generation-checked slot lookup.
struct BodyStore {
    slots: Vec<Slot>,
    /// Live handles in insertion order (== rendering order).
    order: Vec<BodyHandle>,
    free: Vec<u32>,
}

struct Slot {
    generation: u32,
    body: Option<Body>,
}

impl BodyStore {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            order: Vec::new(),
            free: Vec::new(),
        }
    }

    fn insert(&mut self, body: Body) -> BodyHandle {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    body: None,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.body = Some(body);
        let handle = BodyHandle {
            index,
            generation: slot.generation,
        };
        self.order.push(handle);
        handle
    }

    fn get(&self, handle: BodyHandle) -> Option<&Body> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.body.as_ref())
    }

    fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.body.as_mut())
    }

    /// Disjoint mutable access to two different bodies.
    fn get_pair_mut(&mut self, a: BodyHandle, b: BodyHandle) -> Option<(&mut Body, &mut Body)> {
        let (i, j) = (a.index as usize, b.index as usize);
        if i == j || i >= self.slots.len() || j >= self.slots.len() {
            return None;
        }
        if self.slots[i].generation != a.generation || self.slots[j].generation != b.generation {
            return None;
        }
        let (low_index, high_index) = if i < j { (i, j) } else { (j, i) };
        let (low_slice, high_slice) = self.slots.split_at_mut(high_index);
        let low = low_slice[low_index].body.as_mut()?;
        let high = high_slice[0].body.as_mut()?;
        if i < j {
            Some((low, high))
        } else {
            Some((high, low))
        }
    }

    /// Drop the body, bump the slot generation, and recycle the slot.
    fn remove(&mut self, handle: BodyHandle) -> Option<Body> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.order.retain(|&h| h != handle);
        Some(body)
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

/// Deferred structural mutation, run against the scene at the end of the
/// tick that queued it.
type Command = Box<dyn FnOnce(&mut Scene)>;

/// What a force creator sees while it runs.
///
/// Grants body access by handle plus a deferred command buffer for
/// structural changes. Handlers mark bodies removed through the sticky
/// flag ([`Body::mark_removed`]); actual destruction is the scene's job.
pub struct ForceContext<'a> {
    bodies: &'a mut BodyStore,
    commands: &'a mut Vec<Command>,
    removed_forces: &'a mut Vec<ForceHandle>,
}

impl ForceContext<'_> {
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    /// Mutable access to two distinct bodies at once, as collision
    /// handlers need. `None` if the handles are equal or either is stale.
    pub fn body_pair_mut(
        &mut self,
        a: BodyHandle,
        b: BodyHandle,
    ) -> Option<(&mut Body, &mut Body)> {
        self.bodies.get_pair_mut(a, b)
    }

    /// Queue a structural mutation (spawn bodies, register forces, add
    /// text). Runs after this tick's sweep; effects are visible to force
    /// creators starting next tick.
    pub fn defer(&mut self, command: impl FnOnce(&mut Scene) + 'static) {
        self.commands.push(Box::new(command));
    }

    /// Flag another entry for removal. It finishes the current
    /// force-apply pass (it may already have run) and is dropped in this
    /// tick's sweep.
    pub fn remove_force(&mut self, handle: ForceHandle) {
        self.removed_forces.push(handle);
    }
}

struct ForceEntry {
    id: u64,
    apply: Box<dyn FnMut(&mut ForceContext<'_>)>,
    /// Bodies this entry is scoped to, used only for garbage collection:
    /// once any of them is pruned, the entry is swept.
    scope: Vec<BodyHandle>,
    removed: bool,
}

/// The simulation scene. See the module docs for the tick pipeline.
pub struct Scene {
    bodies: BodyStore,
    forces: Vec<ForceEntry>,
    texts: Vec<Text>,
    mode: IntegrationMode,
    elapsed: f64,
    next_force_id: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// A scene ticking with the canonical integration rule.
    pub fn new() -> Self {
        Self::with_mode(IntegrationMode::Canonical)
    }

    /// A scene with an explicitly chosen integration rule.
    pub fn with_mode(mode: IntegrationMode) -> Self {
        Self {
            bodies: BodyStore::new(),
            forces: Vec::new(),
            texts: Vec::new(),
            mode,
            elapsed: 0.0,
            next_force_id: 0,
        }
    }

    #[inline]
    pub fn integration_mode(&self) -> IntegrationMode {
        self.mode
    }

    /// Simulation time accumulated over all ticks, in seconds.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Take ownership of a body. The returned handle is the only way to
    /// refer to it from outside the scene.
    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        let handle = self.bodies.insert(body);
        tracing::trace!(?handle, "added body");
        handle
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    /// Handle of the `index`-th live body in insertion order.
    pub fn handle_at(&self, index: usize) -> Option<BodyHandle> {
        self.bodies.order.get(index).copied()
    }

    /// The `index`-th live body in insertion order.
    pub fn body_at(&self, index: usize) -> Option<&Body> {
        self.handle_at(index).and_then(|h| self.bodies.get(h))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Live bodies in insertion order (== rendering order).
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.bodies
            .order
            .iter()
            .filter_map(move |&h| self.bodies.get(h).map(|b| (h, b)))
    }

    /// Flag a body for removal. It stays queryable (and inert) until the
    /// next tick's prune. Returns false for stale handles.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        match self.bodies.get_mut(handle) {
            Some(body) => {
                body.mark_removed();
                true
            }
            None => false,
        }
    }

    /// Flag the `index`-th body (insertion order) for removal.
    pub fn remove_body_at(&mut self, index: usize) -> bool {
        match self.handle_at(index) {
            Some(handle) => self.remove_body(handle),
            None => false,
        }
    }

    pub fn add_text(&mut self, text: Text) {
        self.texts.push(text);
    }

    pub fn texts(&self) -> &[Text] {
        &self.texts
    }

    pub fn texts_mut(&mut self) -> &mut [Text] {
        &mut self.texts
    }

    /// Register a force creator invoked once per tick, in registration
    /// order. Its captures are dropped when the entry is swept or the
    /// scene is dropped.
    pub fn register_force(
        &mut self,
        apply: impl FnMut(&mut ForceContext<'_>) + 'static,
    ) -> ForceHandle {
        self.register_scoped_force(apply, Vec::new())
    }

    /// Register a force creator scoped to the given bodies: when any of
    /// them is pruned, the entry is swept automatically the same tick.
    pub fn register_scoped_force(
        &mut self,
        apply: impl FnMut(&mut ForceContext<'_>) + 'static,
        scope: Vec<BodyHandle>,
    ) -> ForceHandle {
        let id = self.next_force_id;
        self.next_force_id += 1;
        self.forces.push(ForceEntry {
            id,
            apply: Box::new(apply),
            scope,
            removed: false,
        });
        tracing::trace!(id, "registered force creator");
        ForceHandle(id)
    }

    /// Flag a force-creator entry for removal; it is dropped (captures
    /// released) in the next tick's sweep and not invoked again.
    pub fn remove_force(&mut self, handle: ForceHandle) -> bool {
        match self.forces.iter_mut().find(|e| e.id == handle.0) {
            Some(entry) => {
                entry.removed = true;
                true
            }
            None => false,
        }
    }

    /// Zero every body's acceleration accumulator.
    pub fn reset_accelerations(&mut self) {
        for slot in &mut self.bodies.slots {
            if let Some(body) = slot.body.as_mut() {
                body.set_acceleration(DVec2::ZERO);
            }
        }
    }

    /// Advance the simulation one fixed timestep.
    ///
    /// Pipeline:
    ///
    /// 1. Invoke every live force-creator entry, in registration order
    /// 2. Integrate live bodies; prune flagged ones and flag their
    ///    scoped entries
    /// 3. Sweep flagged entries
    /// 4. Tick and prune texts
    /// 5. Run deferred commands
    ///
    /// `dt` is always threaded in explicitly; the scene holds no clock
    /// of its own.
    pub fn tick(&mut self, dt: f64) {
        self.elapsed += dt;

        // Force-apply. The entry list is detached while its closures run
        // so they can borrow the body store; structural changes go
        // through the deferred buffer.
        let mut forces = std::mem::take(&mut self.forces);
        let mut commands: Vec<Command> = Vec::new();
        let mut removed_forces: Vec<ForceHandle> = Vec::new();
        for entry in &mut forces {
            if entry.removed {
                continue;
            }
            let mut ctx = ForceContext {
                bodies: &mut self.bodies,
                commands: &mut commands,
                removed_forces: &mut removed_forces,
            };
            (entry.apply)(&mut ctx);
        }
        self.forces = forces;
        for handle in removed_forces {
            self.remove_force(handle);
        }

        // Integrate and prune. A body flagged removed keeps the position
        // it was last integrated to; it is dropped here (releasing its
        // payload) rather than advanced.
        let mut pruned = 0usize;
        let mut i = 0;
        while i < self.bodies.order.len() {
            let handle = self.bodies.order[i];
            let flagged = self.bodies.get(handle).is_some_and(Body::is_removed);
            if flagged {
                for entry in &mut self.forces {
                    if entry.scope.contains(&handle) {
                        entry.removed = true;
                    }
                }
                let _ = self.bodies.remove(handle);
                pruned += 1;
            } else {
                if let Some(body) = self.bodies.get_mut(handle) {
                    body.integrate(dt, self.mode);
                }
                i += 1;
            }
        }

        // Sweep entries flagged this tick, explicitly or by scope GC.
        let before = self.forces.len();
        self.forces.retain(|entry| !entry.removed);
        let swept = before - self.forces.len();
        if pruned > 0 || swept > 0 {
            tracing::debug!(bodies = pruned, entries = swept, "pruned scene objects");
        }

        // Texts count down and expire.
        for text in &mut self.texts {
            text.tick(dt);
        }
        self.texts.retain(|t| !t.is_removed());

        // Deferred structural mutations land last: visible next tick.
        for command in commands {
            command(self);
        }
    }
}
