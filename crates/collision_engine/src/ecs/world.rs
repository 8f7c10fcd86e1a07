//! Minimal world: entities with transforms and a change queue

use super::transform::{ChangeKind, TransformChange, TransformSource};
use super::Entity;
use crate::foundation::math::{Quat, Transform, Vec3};
use std::collections::HashMap;

/// World containing entities and their transforms
///
/// Every mutation is recorded so the collision system can pick up exactly the
/// entities that moved since the last tick.
pub struct World {
    next_entity_id: u32,
    transforms: HashMap<Entity, Transform>,
    changes: Vec<TransformChange>,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self {
            next_entity_id: 0,
            transforms: HashMap::new(),
            changes: Vec::new(),
        }
    }

    /// Create a new entity with an identity transform
    pub fn create_entity(&mut self) -> Entity {
        self.create_entity_with(Transform::identity())
    }

    /// Create a new entity with the given transform
    pub fn create_entity_with(&mut self, transform: Transform) -> Entity {
        let entity = Entity::new(self.next_entity_id);
        self.next_entity_id += 1;
        self.transforms.insert(entity, transform);
        entity
    }

    /// Destroy an entity
    ///
    /// Returns `false` if the entity did not exist.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if self.transforms.remove(&entity).is_none() {
            return false;
        }
        self.record(entity, ChangeKind::Destroyed);
        true
    }

    /// Whether the entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.transforms.contains_key(&entity)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.transforms.len()
    }

    /// Get an iterator over all entities
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.transforms.keys()
    }

    /// Offset an entity's position
    pub fn move_by(&mut self, entity: Entity, offset: Vec3) {
        if let Some(t) = self.transforms.get_mut(&entity) {
            t.position += offset;
            self.record(entity, ChangeKind::Moved);
        }
    }

    /// Assign an entity's scale
    pub fn set_scale(&mut self, entity: Entity, scale: Vec3) {
        if let Some(t) = self.transforms.get_mut(&entity) {
            t.scale = scale;
            self.record(entity, ChangeKind::ScaleSet);
        }
    }

    /// Multiply an entity's scale component-wise
    pub fn scale_by(&mut self, entity: Entity, factor: Vec3) {
        if let Some(t) = self.transforms.get_mut(&entity) {
            t.scale.component_mul_assign(&factor);
            self.record(entity, ChangeKind::Scaled);
        }
    }

    /// Assign an entity's orientation
    pub fn set_rotation(&mut self, entity: Entity, rotation: Quat) {
        if let Some(t) = self.transforms.get_mut(&entity) {
            t.rotation = rotation;
            self.record(entity, ChangeKind::OrientationSet);
        }
    }

    /// Compose an entity's orientation with `rotation`
    pub fn rotate(&mut self, entity: Entity, rotation: Quat) {
        if let Some(t) = self.transforms.get_mut(&entity) {
            t.rotation = rotation * t.rotation;
            self.record(entity, ChangeKind::Rotated);
        }
    }

    /// Number of changes waiting to be drained
    pub fn pending_changes(&self) -> usize {
        self.changes.len()
    }

    fn record(&mut self, entity: Entity, kind: ChangeKind) {
        self.changes.push(TransformChange::new(entity, kind));
    }
}

impl TransformSource for World {
    fn transform(&self, entity: Entity) -> Option<&Transform> {
        self.transforms.get(&entity)
    }

    fn set_position(&mut self, entity: Entity, position: Vec3) {
        if let Some(t) = self.transforms.get_mut(&entity) {
            t.position = position;
            self.record(entity, ChangeKind::PositionSet);
        }
    }

    fn drain_changes(&mut self) -> Vec<TransformChange> {
        std::mem::take(&mut self.changes)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
