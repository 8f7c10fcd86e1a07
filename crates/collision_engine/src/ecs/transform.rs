//! Boundary between the collision system and whatever owns transforms
//!
//! The collision system polls a [`TransformSource`] once per tick instead of
//! subscribing to a message bus: every mutation of an entity's transform is
//! queued as a [`TransformChange`] and drained at the start of the tick.

use super::Entity;
use crate::foundation::math::{Transform, Vec3};

/// What happened to an entity's transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Position assigned
    PositionSet,
    /// Position offset
    Moved,
    /// Scale assigned
    ScaleSet,
    /// Scale multiplied
    Scaled,
    /// Orientation assigned
    OrientationSet,
    /// Orientation composed with a rotation
    Rotated,
    /// Entity destroyed; its bounders must be deregistered
    Destroyed,
}

/// A queued transform notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformChange {
    /// Entity whose transform changed
    pub entity: Entity,
    /// Kind of change
    pub kind: ChangeKind,
}

impl TransformChange {
    /// Create a change record
    pub const fn new(entity: Entity, kind: ChangeKind) -> Self {
        Self { entity, kind }
    }
}

/// Read/write access to entity transforms, as seen by the collision system
pub trait TransformSource {
    /// Current world transform of `entity`, if it exists
    fn transform(&self, entity: Entity) -> Option<&Transform>;

    /// Assign a new position to `entity`
    ///
    /// Resolution always sets positions rather than moving them so hosts can
    /// keep velocity integration separate from corrections.
    fn set_position(&mut self, entity: Entity, position: Vec3);

    /// Take every change queued since the last call, in order
    fn drain_changes(&mut self) -> Vec<TransformChange>;
}
