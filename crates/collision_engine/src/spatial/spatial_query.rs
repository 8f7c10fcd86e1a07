//! Abstract spatial query interface for the broad phase
//!
//! The collision system only ever talks to its spatial structure through
//! this trait, so a different partitioning scheme (grid, BVH, ...) can be
//! swapped in without touching the system.

use crate::physics::collision::{AABox, Intersect, Ray};
use crate::spatial::Octree;
use std::any::Any;
use std::hash::Hash;

/// Spatial partitioning over keyed bounding boxes
pub trait SpatialQuery<K>: Send + Sync {
    /// Store `key` with `bounds`, replacing any previous entry
    ///
    /// Returns `false`, leaving `key` absent, if `bounds` falls outside the
    /// region the structure covers.
    fn set(&mut self, key: K, bounds: AABox) -> bool;

    /// Remove `key`; returns whether it was present
    fn remove(&mut self, key: K) -> bool;

    /// Whether `key` is stored
    fn contains(&self, key: K) -> bool;

    /// Keys whose boxes overlap `bounds`
    fn query_aabb(&self, bounds: &AABox) -> Vec<K>;

    /// Nearest key along `ray`; `test` performs the exact per-key ray test
    fn query_ray(&self, ray: &Ray, test: &mut dyn FnMut(&K) -> Intersect) -> (Option<K>, Intersect);

    /// Region covered by the structure
    fn bounds(&self) -> AABox;

    /// Clear all keys from the structure
    fn clear(&mut self);

    /// Get the number of keys in the structure
    fn len(&self) -> usize;

    /// Whether the structure holds no keys
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Downcast to Any for type-specific access (e.g. octree visualization)
    fn as_any(&self) -> &dyn Any;
}

impl<K> SpatialQuery<K> for Octree<K>
where
    K: Copy + Eq + Hash + Send + Sync + 'static,
{
    fn set(&mut self, key: K, bounds: AABox) -> bool {
        Octree::set(self, key, bounds)
    }

    fn remove(&mut self, key: K) -> bool {
        Octree::remove(self, key)
    }

    fn contains(&self, key: K) -> bool {
        Octree::contains(self, key)
    }

    fn query_aabb(&self, bounds: &AABox) -> Vec<K> {
        self.filter_box(bounds)
    }

    fn query_ray(&self, ray: &Ray, test: &mut dyn FnMut(&K) -> Intersect) -> (Option<K>, Intersect) {
        self.cast_ray(ray, test)
    }

    fn bounds(&self) -> AABox {
        Octree::bounds(self)
    }

    fn clear(&mut self) {
        Octree::clear(self);
    }

    fn len(&self) -> usize {
        Octree::len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
