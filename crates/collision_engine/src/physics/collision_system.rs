//! Per-tick collision detection and resolution
//!
//! Based on Game Engine Architecture 3rd Edition, Chapter 13:
//! "The collision detection system is typically split into two phases:
//! broad-phase and narrow-phase."
//!
//! Each tick runs one resolution pass over the potential set:
//!
//! 1. **Update** - recompute world shapes of every potential bounder
//! 2. **Gather** - test each potential against the other bounders and record
//!    `(other_weight, delta)` entries on the side that has to yield
//! 3. **Composite** - fold each bounder's entries with [`det_net_delta`] and
//!    combine bounders of the same entity
//! 4. **Apply** - set each corrected entity's position once
//!
//! All world shapes are updated before any pair is tested, and every pair is
//! gathered before any position changes. An optional settle pass repeats the
//! cycle once for the entities that just moved; anything still overlapping
//! after that is left for the next tick.

use crate::config::CollisionConfig;
use crate::ecs::{ChangeKind, Entity, TransformSource};
use crate::events::{CollisionEvent, EventSystem};
use crate::foundation::math::utils::{is_zero, safe_norm};
use crate::foundation::math::Vec3;
use crate::physics::bounder::{Bounder, BounderId, Weight};
use crate::physics::collision::{fit_shape, AABox, Intersect, Ray, Shape, ShapeKinds};
use crate::physics::resolver::{composite_deltas, det_net_delta, WeightedDelta};
use crate::physics::CollisionError;
use crate::spatial::{Octree, OctreeConfig, SpatialQuery};
use log::{debug, trace, warn};
use slotmap::SlotMap;
use std::collections::{BTreeMap, BTreeSet};

/// Entries gathered for one pass, keyed by the bounder that has to yield
type EntryMap = BTreeMap<BounderId, Vec<WeightedDelta>>;

/// Owns every bounder and resolves their overlaps each tick
pub struct CollisionSystem {
    bounders: SlotMap<BounderId, Bounder>,
    entity_bounders: BTreeMap<Entity, Vec<BounderId>>,

    /// Bounders to re-test on the next tick
    potentials: BTreeSet<BounderId>,

    /// Optional broad phase; without it every potential is swept against all bounders
    spatial: Option<Box<dyn SpatialQuery<BounderId>>>,

    /// Bounders whose enclosing box does not fit in the spatial structure
    outside: BTreeSet<BounderId>,

    settle_pass: bool,
    events: EventSystem,
}

impl CollisionSystem {
    /// Create an empty system with no broad phase and the settle pass enabled
    pub fn new() -> Self {
        Self {
            bounders: SlotMap::with_key(),
            entity_bounders: BTreeMap::new(),
            potentials: BTreeSet::new(),
            spatial: None,
            outside: BTreeSet::new(),
            settle_pass: true,
            events: EventSystem::new(),
        }
    }

    /// Create a system from configuration, building the octree if one is configured
    pub fn from_config(config: &CollisionConfig) -> Result<Self, CollisionError> {
        let mut system = Self::new();
        system.settle_pass = config.settle_pass;
        if let Some(octree) = &config.octree {
            let bounds = AABox::new(octree.world_min, octree.world_max);
            bounds.validate()?;
            system.set_octree(&bounds, octree.config.clone());
        }
        Ok(system)
    }

    /// Attach a bounder with an explicit shape to `entity`
    ///
    /// The bounder is positioned from the entity's current transform and
    /// marked potential so it is tested on the next tick.
    pub fn add_bounder<W: TransformSource + ?Sized>(
        &mut self,
        world: &W,
        entity: Entity,
        weight: Weight,
        shape: Shape,
    ) -> Result<BounderId, CollisionError> {
        let transform = world.transform(entity).ok_or(CollisionError::UnknownEntity(entity))?;
        let mut bounder = Bounder::new(entity, weight, shape)?;
        bounder.update(transform);

        let id = self.bounders.insert(bounder);
        self.entity_bounders.entry(entity).or_default().push(id);
        self.potentials.insert(id);
        self.refresh_spatial(id);

        debug!("Added {:?} bounder {:?} (weight {}) to {}", shape.kind(), id, weight, entity);
        Ok(id)
    }

    /// Attach the least-volume allowed shape around `vertices` to `entity`
    pub fn add_bounder_from_mesh<W: TransformSource + ?Sized>(
        &mut self,
        world: &W,
        entity: Entity,
        weight: Weight,
        vertices: &[Vec3],
        allowed: ShapeKinds,
    ) -> Result<BounderId, CollisionError> {
        let shape = fit_shape(vertices, allowed)?;
        self.add_bounder(world, entity, weight, shape)
    }

    /// Detach and return a bounder
    pub fn remove_bounder(&mut self, id: BounderId) -> Result<Bounder, CollisionError> {
        let bounder = self.bounders.remove(id).ok_or(CollisionError::UnknownBounder)?;

        if let Some(ids) = self.entity_bounders.get_mut(&bounder.entity()) {
            ids.retain(|&b| b != id);
            if ids.is_empty() {
                self.entity_bounders.remove(&bounder.entity());
            }
        }
        self.potentials.remove(&id);
        self.outside.remove(&id);
        if let Some(spatial) = self.spatial.as_mut() {
            spatial.remove(id);
        }

        debug!("Removed bounder {:?} from {}", id, bounder.entity());
        Ok(bounder)
    }

    /// Detach every bounder of `entity`; returns how many were removed
    pub fn remove_entity(&mut self, entity: Entity) -> usize {
        let ids = self.entity_bounders.get(&entity).cloned().unwrap_or_default();
        ids.into_iter().filter(|&id| self.remove_bounder(id).is_ok()).count()
    }

    /// Mark every bounder of `entity` for re-testing; returns `false` if it has none
    pub fn mark_potential(&mut self, entity: Entity) -> bool {
        match self.entity_bounders.get(&entity) {
            Some(ids) => {
                self.potentials.extend(ids.iter().copied());
                true
            }
            None => false,
        }
    }

    /// Run one collision tick
    ///
    /// Drains `world`'s transform changes, resolves overlaps among the
    /// affected bounders, writes corrected positions back through
    /// [`TransformSource::set_position`] and finally dispatches the tick's
    /// events. Events the previous tick left undrained are dropped first.
    pub fn update<W: TransformSource + ?Sized>(&mut self, world: &mut W) {
        // Polling consumers only ever see the latest tick's leftovers
        self.events.discard_unconsumed();

        for change in world.drain_changes() {
            match change.kind {
                ChangeKind::Destroyed => {
                    self.remove_entity(change.entity);
                }
                _ => {
                    self.mark_potential(change.entity);
                }
            }
        }

        for bounder in self.bounders.values_mut() {
            bounder.was_collision = false;
            bounder.was_adjusted = false;
        }

        let potentials = std::mem::take(&mut self.potentials);
        let mut adjusted = self.resolve_pass(world, &potentials);
        if self.settle_pass && !adjusted.is_empty() {
            let settle = self.bounders_of(&adjusted);
            adjusted = self.resolve_pass(world, &settle);
        }

        // Whatever the last pass moved may still overlap something
        self.potentials = self.bounders_of(&adjusted);
        self.events.dispatch();
    }

    /// One update, gather, composite and apply cycle; returns the entities it moved
    fn resolve_pass<W: TransformSource + ?Sized>(
        &mut self,
        world: &mut W,
        potentials: &BTreeSet<BounderId>,
    ) -> BTreeSet<Entity> {
        for &id in potentials {
            let Some(bounder) = self.bounders.get_mut(id) else {
                continue;
            };
            match world.transform(bounder.entity()) {
                Some(transform) => bounder.update(transform),
                None => warn!("Bounder {:?} belongs to {} which has no transform", id, bounder.entity()),
            }
            self.refresh_spatial(id);
        }

        let (entries, overlaps, tested) = self.gather(potentials);
        let nets = self.composite(&entries);
        let adjusted = self.apply(world, nets);

        debug!(
            "Collision pass: {} potentials, {} pairs tested, {} overlaps, {} adjusted",
            potentials.len(),
            tested,
            overlaps.len(),
            adjusted.len()
        );
        adjusted
    }

    /// Narrow phase over the potentials; returns the entries, the overlapping
    /// pairs and the number of pairs tested
    fn gather(&mut self, potentials: &BTreeSet<BounderId>) -> (EntryMap, Vec<(BounderId, BounderId)>, usize) {
        let mut entries = EntryMap::new();
        let mut overlaps = Vec::new();
        let mut checked = BTreeSet::new();
        let mut tested = 0;

        for &id in potentials {
            let Some(a) = self.bounders.get(id) else {
                continue;
            };
            checked.insert(id);

            for other in self.candidates(a) {
                if checked.contains(&other) {
                    continue;
                }
                let Some(b) = self.bounders.get(other) else {
                    continue;
                };
                if a.entity() == b.entity() {
                    continue;
                }

                tested += 1;
                let Some(delta) = a.collide(b) else {
                    continue;
                };
                trace!("Overlap {:?} / {:?}: delta {:?}", id, other, delta);
                overlaps.push((id, other));
                record_pair(&mut entries, (id, a.weight()), (other, b.weight()), delta);
            }
        }

        for &(a, b) in &overlaps {
            for (bounder, other) in [(a, b), (b, a)] {
                if let Some(owner) = self.bounders.get_mut(bounder) {
                    owner.was_collision = true;
                    self.events.send(CollisionEvent::CollisionDetected {
                        bounder,
                        other,
                        entity: owner.entity(),
                    });
                }
            }
        }

        (entries, overlaps, tested)
    }

    /// Bounders worth testing against `bounder`
    fn candidates(&self, bounder: &Bounder) -> Vec<BounderId> {
        match &self.spatial {
            Some(spatial) => {
                let mut ids = spatial.query_aabb(&bounder.enclosing_aabox());
                ids.extend(self.outside.iter().copied());
                ids.sort_unstable();
                ids.dedup();
                ids
            }
            None => self.bounders.keys().collect(),
        }
    }

    /// Net delta per entity
    fn composite(&mut self, entries: &EntryMap) -> BTreeMap<Entity, Vec3> {
        let mut nets: BTreeMap<Entity, Vec3> = BTreeMap::new();

        for (&id, list) in entries {
            let Some(bounder) = self.bounders.get(id) else {
                continue;
            };
            let entity = bounder.entity();

            for entry in list {
                let normal = safe_norm(&entry.delta);
                if !is_zero(&normal) {
                    self.events.send(CollisionEvent::CollisionNormal { bounder: id, entity, normal });
                }
            }

            let net = det_net_delta(list);
            trace!("Net delta for {:?} ({} entries): {:?}", id, list.len(), net);
            let combined = nets.entry(entity).or_insert_with(Vec3::zeros);
            *combined = composite_deltas(combined, &net);
        }

        nets
    }

    /// Move each entity by its net delta; returns the entities actually moved
    fn apply<W: TransformSource + ?Sized>(&mut self, world: &mut W, nets: BTreeMap<Entity, Vec3>) -> BTreeSet<Entity> {
        let mut adjusted = BTreeSet::new();

        for (entity, delta) in nets {
            if is_zero(&delta) {
                continue;
            }
            let Some(position) = world.transform(entity).map(|t| t.position) else {
                warn!("Cannot adjust {}: no transform", entity);
                continue;
            };
            world.set_position(entity, position + delta);

            let ids = self.entity_bounders.get(&entity).cloned().unwrap_or_default();
            if let Some(transform) = world.transform(entity) {
                for &id in &ids {
                    if let Some(bounder) = self.bounders.get_mut(id) {
                        bounder.update(transform);
                        bounder.was_adjusted = true;
                    }
                }
            }
            for &id in &ids {
                self.refresh_spatial(id);
            }

            self.events.send(CollisionEvent::ObjectAdjusted { entity, delta });
            adjusted.insert(entity);
        }

        adjusted
    }

    fn bounders_of(&self, entities: &BTreeSet<Entity>) -> BTreeSet<BounderId> {
        entities
            .iter()
            .filter_map(|e| self.entity_bounders.get(e))
            .flatten()
            .copied()
            .collect()
    }

    /// Re-key a bounder in the spatial structure after its world shape changed
    fn refresh_spatial(&mut self, id: BounderId) {
        let (Some(spatial), Some(bounder)) = (self.spatial.as_mut(), self.bounders.get(id)) else {
            return;
        };

        if spatial.set(id, bounder.enclosing_aabox()) {
            self.outside.remove(&id);
        } else if self.outside.insert(id) {
            warn!("Bounder {:?} of {} left the octree bounds", id, bounder.entity());
            self.events.send(CollisionEvent::OutOfBounds { bounder: id, entity: bounder.entity() });
        }
    }

    /// Nearest bounder hit by `ray`
    pub fn pick(&self, ray: &Ray) -> (Option<BounderId>, Intersect) {
        self.pick_with(ray, |_| true)
    }

    /// Nearest bounder hit by `ray` that does not belong to `entity`
    pub fn pick_ignoring(&self, ray: &Ray, entity: Entity) -> (Option<BounderId>, Intersect) {
        self.pick_with(ray, |b| b.entity() != entity)
    }

    /// Nearest bounder hit by `ray` among those accepted by `filter`
    pub fn pick_with<F: Fn(&Bounder) -> bool>(&self, ray: &Ray, filter: F) -> (Option<BounderId>, Intersect) {
        let test = |id: BounderId| match self.bounders.get(id) {
            Some(bounder) if filter(bounder) => bounder.intersect(ray),
            _ => Intersect::miss(),
        };

        let mut best = (None, Intersect::miss());
        let mut consider = |id: BounderId, hit: Intersect| {
            if hit.hit && hit.distance < best.1.distance {
                best = (Some(id), hit);
            }
        };

        match &self.spatial {
            Some(spatial) => {
                let (id, hit) = spatial.query_ray(ray, &mut |id: &BounderId| test(*id));
                if let Some(id) = id {
                    consider(id, hit);
                }
                for &id in &self.outside {
                    consider(id, test(id));
                }
            }
            None => {
                for id in self.bounders.keys() {
                    consider(id, test(id));
                }
            }
        }

        best
    }

    /// Use an octree over `bounds` as the broad phase
    pub fn set_octree(&mut self, bounds: &AABox, config: OctreeConfig) {
        self.set_spatial_query(Box::new(Octree::new(bounds, config)));
    }

    /// Use `spatial` as the broad phase, inserting every existing bounder
    pub fn set_spatial_query(&mut self, spatial: Box<dyn SpatialQuery<BounderId>>) {
        self.spatial = Some(spatial);
        self.outside.clear();
        let ids: Vec<BounderId> = self.bounders.keys().collect();
        for id in ids {
            self.refresh_spatial(id);
        }
    }

    /// Drop the broad phase and fall back to the all-pairs sweep
    pub fn clear_spatial_query(&mut self) {
        self.spatial = None;
        self.outside.clear();
    }

    /// Get spatial query for direct access (e.g., for visualization)
    pub fn spatial_query(&self) -> Option<&dyn SpatialQuery<BounderId>> {
        self.spatial.as_deref()
    }

    /// The broad phase as an octree, if it is one
    pub fn octree(&self) -> Option<&Octree<BounderId>> {
        self.spatial
            .as_ref()
            .and_then(|s| s.as_any().downcast_ref::<Octree<BounderId>>())
    }

    /// Whether the settle pass runs after a pass that moved something
    pub const fn settle_pass(&self) -> bool {
        self.settle_pass
    }

    /// Enable or disable the settle pass
    pub fn set_settle_pass(&mut self, enabled: bool) {
        self.settle_pass = enabled;
    }

    /// Look up a bounder
    pub fn bounder(&self, id: BounderId) -> Option<&Bounder> {
        self.bounders.get(id)
    }

    /// All bounders in registration order
    pub fn bounders(&self) -> impl Iterator<Item = (BounderId, &Bounder)> {
        self.bounders.iter()
    }

    /// Get the number of registered bounders
    pub fn bounder_count(&self) -> usize {
        self.bounders.len()
    }

    /// Bounders attached to `entity`
    pub fn entity_bounders(&self, entity: Entity) -> &[BounderId] {
        self.entity_bounders.get(&entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `id` will be re-tested on the next tick
    pub fn is_potential(&self, id: BounderId) -> bool {
        self.potentials.contains(&id)
    }

    /// Whether `id` currently lies outside the octree bounds
    pub fn is_outside(&self, id: BounderId) -> bool {
        self.outside.contains(&id)
    }

    /// Event system, for registering handlers
    pub fn events_mut(&mut self) -> &mut EventSystem {
        &mut self.events
    }

    /// Take the events no handler consumed
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        self.events.drain()
    }

    /// Remove every bounder and pending event
    pub fn clear(&mut self) {
        self.bounders.clear();
        self.entity_bounders.clear();
        self.potentials.clear();
        self.outside.clear();
        if let Some(spatial) = self.spatial.as_mut() {
            spatial.clear();
        }
        self.events.clear();
    }
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Record the entries for one overlapping pair
///
/// `delta` moves `a` out of `b`. The lighter side takes the whole delta; equal
/// weights split it. Pairs involving a ghost, or two statics, only report
/// the overlap.
fn record_pair(entries: &mut EntryMap, a: (BounderId, Weight), b: (BounderId, Weight), delta: Vec3) {
    let ((a_id, a_weight), (b_id, b_weight)) = (a, b);

    if a_weight == Bounder::GHOST || b_weight == Bounder::GHOST {
        return;
    }
    if a_weight == Bounder::STATIC && b_weight == Bounder::STATIC {
        return;
    }

    if a_weight < b_weight {
        entries.entry(a_id).or_default().push(WeightedDelta::new(b_weight, delta));
    } else if b_weight < a_weight {
        entries.entry(b_id).or_default().push(WeightedDelta::new(a_weight, -delta));
    } else {
        let half = delta * 0.5;
        entries.entry(a_id).or_default().push(WeightedDelta::new(b_weight, half));
        entries.entry(b_id).or_default().push(WeightedDelta::new(a_weight, -half));
    }
}
