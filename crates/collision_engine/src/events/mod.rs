//! Collision notifications
//!
//! Event flow follows Game Engine Architecture Ch 16.8:
//! - Handler returns bool (true = consumed, stops forwarding)
//! - Registration system (only notify interested handlers)
//! - Queuing with a single flush point at the end of the collision tick
//!
//! Events no handler consumed are kept so that polling consumers can
//! [`drain`](EventSystem::drain) them instead of registering handlers.

use crate::ecs::Entity;
use crate::foundation::math::Vec3;
use crate::physics::BounderId;
use std::collections::HashMap;

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Two bounders overlapped
    CollisionDetected,
    /// A delta fed into resolution of an entity
    CollisionNormal,
    /// An entity was moved by resolution
    ObjectAdjusted,
    /// A bounder left the octree region
    OutOfBounds,
}

/// Notification emitted by the collision system
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionEvent {
    /// `bounder` (owned by `entity`) overlaps `other`
    ///
    /// Sent once to each side of an overlapping pair, whatever the weights.
    CollisionDetected {
        /// The addressed entity's bounder
        bounder: BounderId,
        /// The bounder it overlaps
        other: BounderId,
        /// Owner of `bounder`
        entity: Entity,
    },

    /// Normalized direction of one delta that fed `entity`'s correction
    CollisionNormal {
        /// Bounder the delta was recorded on
        bounder: BounderId,
        /// Owner of `bounder`
        entity: Entity,
        /// Unit direction of the delta
        normal: Vec3,
    },

    /// `entity` was moved by `delta`
    ObjectAdjusted {
        /// The moved entity
        entity: Entity,
        /// Net correction applied to its position
        delta: Vec3,
    },

    /// `bounder` no longer fits inside the octree region
    OutOfBounds {
        /// Bounder that left
        bounder: BounderId,
        /// Owner of `bounder`
        entity: Entity,
    },
}

impl CollisionEvent {
    /// Type of this event
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::CollisionDetected { .. } => EventType::CollisionDetected,
            Self::CollisionNormal { .. } => EventType::CollisionNormal,
            Self::ObjectAdjusted { .. } => EventType::ObjectAdjusted,
            Self::OutOfBounds { .. } => EventType::OutOfBounds,
        }
    }

    /// Entity the event is addressed to
    pub const fn entity(&self) -> Entity {
        match self {
            Self::CollisionDetected { entity, .. }
            | Self::CollisionNormal { entity, .. }
            | Self::ObjectAdjusted { entity, .. }
            | Self::OutOfBounds { entity, .. } => *entity,
        }
    }
}

/// Event handler trait
/// Returns true if event was consumed (stops forwarding)
/// Returns false to allow forwarding to other handlers
pub trait EventHandler {
    /// Handle an event, return true if consumed
    fn on_event(&mut self, event: &CollisionEvent) -> bool;
}

/// Event system with registration and queuing
/// Follows chain of responsibility pattern
#[derive(Default)]
pub struct EventSystem {
    queue: Vec<CollisionEvent>,
    unconsumed: Vec<CollisionEvent>,
    handlers: HashMap<EventType, Vec<Box<dyn EventHandler>>>,
}

impl EventSystem {
    /// Create a new empty event system
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a specific event type
    /// Only handlers registered for this type will be notified
    pub fn register_handler(&mut self, event_type: EventType, handler: Box<dyn EventHandler>) {
        self.handlers.entry(event_type).or_default().push(handler);
    }

    /// Queue an event until the next dispatch
    pub fn send(&mut self, event: CollisionEvent) {
        self.queue.push(event);
    }

    /// Number of events waiting for dispatch
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Deliver queued events in emission order
    pub fn dispatch(&mut self) {
        for event in std::mem::take(&mut self.queue) {
            if !self.dispatch_event(&event) {
                self.unconsumed.push(event);
            }
        }
    }

    /// Deliver one event; stops on the first handler that consumes it
    fn dispatch_event(&mut self, event: &CollisionEvent) -> bool {
        self.handlers
            .get_mut(&event.event_type())
            .is_some_and(|handlers| handlers.iter_mut().any(|h| h.on_event(event)))
    }

    /// Take dispatched events that no handler consumed
    pub fn drain(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.unconsumed)
    }

    /// Drop unconsumed events left over from earlier dispatches
    pub fn discard_unconsumed(&mut self) {
        self.unconsumed.clear();
    }

    /// Drop queued and unconsumed events
    pub fn clear(&mut self) {
        self.queue.clear();
        self.unconsumed.clear();
    }
}

impl std::fmt::Debug for EventSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSystem")
            .field("queued", &self.queue.len())
            .field("unconsumed", &self.unconsumed.len())
            .field("handler_types", &self.handlers.len())
            .finish()
    }
}
