//! Entity and transform boundary
//!
//! The collision system only needs entity handles, read access to world
//! transforms, and a queue of transform changes. [`World`] is a small
//! implementation of that boundary for hosts without a scene graph.

pub mod entity;
pub mod transform;
pub mod world;

pub use entity::Entity;
pub use transform::{ChangeKind, TransformChange, TransformSource};
pub use world::World;
