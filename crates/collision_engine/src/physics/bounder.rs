//! Bounders: bounding volumes attached to entities
//!
//! A bounder keeps its shape twice: the local shape it was created with, and
//! a cached world-space copy recomputed by [`Bounder::update`] whenever the
//! owning entity's transform has changed.

use crate::ecs::Entity;
use crate::foundation::math::{Transform, Vec3};
use crate::physics::collision::{AABox, Intersect, Ray, Shape, Sphere};
use crate::physics::CollisionError;
use slotmap::new_key_type;

new_key_type! {
    /// Stable handle to a bounder owned by a [`CollisionSystem`](crate::physics::CollisionSystem)
    pub struct BounderId;
}

/// Collision priority: lower weights yield to higher ones
pub type Weight = u32;

/// A bounding volume attached to one entity
#[derive(Debug, Clone)]
pub struct Bounder {
    entity: Entity,
    weight: Weight,
    local_shape: Shape,
    world_shape: Shape,

    /// Overlapped something during the last tick (diagnostics only)
    pub was_collision: bool,

    /// Was moved by resolution during the last tick (diagnostics only)
    pub was_adjusted: bool,
}

impl Bounder {
    /// Never moved by resolution
    pub const STATIC: Weight = Weight::MAX;

    /// Detects overlaps but never displaces or is displaced
    pub const GHOST: Weight = 0;

    /// Create a bounder, rejecting malformed shapes
    ///
    /// The world shape starts out equal to the local one; call
    /// [`update`](Self::update) with the owner's transform before use.
    pub fn new(entity: Entity, weight: Weight, shape: Shape) -> Result<Self, CollisionError> {
        shape.validate()?;
        Ok(Self {
            entity,
            weight,
            local_shape: shape,
            world_shape: shape,
            was_collision: false,
            was_adjusted: false,
        })
    }

    /// Owning entity
    pub const fn entity(&self) -> Entity {
        self.entity
    }

    /// Collision priority
    pub const fn weight(&self) -> Weight {
        self.weight
    }

    /// Whether resolution may never move this bounder
    pub const fn is_static(&self) -> bool {
        self.weight == Self::STATIC
    }

    /// Whether this bounder only reports overlaps
    pub const fn is_ghost(&self) -> bool {
        self.weight == Self::GHOST
    }

    /// Untransformed shape
    pub const fn local_shape(&self) -> &Shape {
        &self.local_shape
    }

    /// Shape in world space as of the last update
    pub const fn world_shape(&self) -> &Shape {
        &self.world_shape
    }

    /// Recompute the world shape from the owner's transform
    pub fn update(&mut self, transform: &Transform) {
        self.world_shape = self.local_shape.to_world_space(transform);
    }

    /// Correction that moves this bounder out of `other`, if they overlap
    pub fn collide(&self, other: &Self) -> Option<Vec3> {
        self.world_shape.collide(&other.world_shape)
    }

    /// Ray test against the world shape
    pub fn intersect(&self, ray: &Ray) -> Intersect {
        self.world_shape.intersect(ray)
    }

    /// Sphere around the world shape
    pub fn enclosing_sphere(&self) -> Sphere {
        self.world_shape.enclosing_sphere()
    }

    /// Box around the world shape
    pub fn enclosing_aabox(&self) -> AABox {
        self.world_shape.enclosing_aabox()
    }
}
