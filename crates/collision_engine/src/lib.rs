//! # Collision Engine
//!
//! Collision detection and weighted resolution for game worlds.
//!
//! ## Features
//!
//! - **Bounding Volumes**: Axis-aligned boxes, spheres and upright capsules,
//!   given explicitly or fitted to mesh vertices
//! - **Weighted Resolution**: Simultaneous overlaps folded into one
//!   correction per entity, yielding to heavier obstacles first
//! - **Broad Phase**: Optional octree for overlap candidates and picking
//! - **Picking**: Nearest-hit ray queries with filters
//! - **Events**: Overlap, normal, adjustment and out-of-bounds notifications
//!
//! ## Quick Start
//!
//! ```rust
//! use collision_engine::prelude::*;
//!
//! # fn main() -> Result<(), CollisionError> {
//! let mut world = World::new();
//! let crate_box = world.create_entity();
//! let floor = world.create_entity_with(Transform::from_position(Vec3::new(0.0, -1.0, 0.0)));
//!
//! let mut collisions = CollisionSystem::new();
//! collisions.add_bounder(&world, crate_box, 1, AABox::new(Vec3::repeat(-0.5), Vec3::repeat(0.5)).into())?;
//! collisions.add_bounder(
//!     &world,
//!     floor,
//!     Bounder::STATIC,
//!     AABox::new(Vec3::new(-10.0, -0.75, -10.0), Vec3::new(10.0, 0.75, 10.0)).into(),
//! )?;
//!
//! collisions.update(&mut world);
//!
//! // The crate now rests on top of the floor
//! assert_eq!(world.transform(crate_box).map(|t| t.position.y), Some(0.25));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod ecs;
pub mod events;
pub mod physics;
pub mod spatial;
pub mod debug;

/// Common imports for collision users
pub mod prelude {
    pub use crate::{
        config::{CollisionConfig, Config, OctreeSettings},
        ecs::{ChangeKind, Entity, TransformSource, World},
        events::{CollisionEvent, EventHandler, EventType},
        foundation::math::{Quat, Transform, Vec3},
        physics::{
            AABox, Bounder, BounderId, Capsule, CollisionError, CollisionSystem, Intersect, Ray,
            Shape, ShapeKinds, Sphere, Weight,
        },
        spatial::{Octree, OctreeConfig},
    };
}
