//! Physics module for collision detection and response
//!
//! Bounding volumes attached to entities are tested against each other every
//! tick; overlaps are resolved by weight into one positional correction per
//! entity.

pub mod collision;
pub mod bounder;
pub mod resolver;
pub mod collision_system;

#[cfg(test)]
mod tests;

use crate::ecs::Entity;
use crate::foundation::math::Vec3;

pub use bounder::{Bounder, BounderId, Weight};
pub use collision::{AABox, Capsule, Intersect, Ray, Shape, ShapeKind, ShapeKinds, Sphere};
pub use collision_system::CollisionSystem;
pub use resolver::{composite_deltas, det_net_delta, WeightedDelta};

/// Collision errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CollisionError {
    /// Radius is not a positive finite number
    #[error("Invalid radius: {0}")]
    InvalidRadius(f32),

    /// Capsule rod height is not a positive finite number
    #[error("Invalid height: {0}")]
    InvalidHeight(f32),

    /// Box is inverted or not finite
    #[error("Invalid box: min {min:?}, max {max:?}")]
    InvalidBox {
        /// Minimum corner
        min: Vec3,
        /// Maximum corner
        max: Vec3,
    },

    /// Mesh has no vertices
    #[error("Mesh has no vertices")]
    EmptyMesh,

    /// None of the allowed shape kinds yields a valid volume
    #[error("No allowed shape fits the mesh")]
    NoFittingShape,

    /// Entity has no transform in the world
    #[error("Unknown entity: {0}")]
    UnknownEntity(Entity),

    /// Bounder handle is stale or was never issued
    #[error("Unknown bounder")]
    UnknownBounder,
}
