//! Spatial partitioning data structures
//!
//! Provides the octree used as an optional broad phase for the collision
//! system, behind the [`SpatialQuery`] interface.

pub mod octree;
pub mod spatial_query;

pub use octree::{Octree, OctreeConfig, OctreeNode};
pub use spatial_query::SpatialQuery;
