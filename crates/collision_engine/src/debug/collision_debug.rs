//! Collision-specific debug visualization
//!
//! Based on Game Engine Architecture 3rd Edition, Section 10.2:
//! "Debug drawing for collision detection typically includes visualizations
//! of bounding volumes, collision shapes, and query results."

use crate::debug::draw::{DebugDrawSystem, DebugShape};
use crate::foundation::math::{Vec3, Vec4};
use crate::physics::collision::{Intersect, Ray};
use crate::physics::{BounderId, CollisionSystem};
use crate::spatial::Octree;

/// Color scheme for collision visualization
#[derive(Clone, Debug)]
pub struct CollisionDebugColors {
    /// Bounders that touched nothing last tick
    pub shape_default: Vec4,

    /// Bounders that overlapped something last tick
    pub shape_colliding: Vec4,

    /// Bounders moved by resolution last tick
    pub shape_adjusted: Vec4,

    /// Octree nodes at the root; deeper nodes blend towards `octree_deep`
    pub octree_root: Vec4,

    /// Octree nodes at the maximum depth
    pub octree_deep: Vec4,

    /// Pick rays
    pub ray: Vec4,
}

impl Default for CollisionDebugColors {
    fn default() -> Self {
        Self {
            shape_default: Vec4::new(0.0, 1.0, 0.0, 0.3),   // Green, semi-transparent
            shape_colliding: Vec4::new(1.0, 0.0, 0.0, 0.5), // Red, semi-transparent
            shape_adjusted: Vec4::new(1.0, 1.0, 0.0, 0.5),  // Yellow, semi-transparent
            octree_root: Vec4::new(0.0, 0.0, 1.0, 0.15),    // Blue, transparent
            octree_deep: Vec4::new(0.0, 1.0, 1.0, 0.15),    // Cyan, transparent
            ray: Vec4::new(1.0, 1.0, 1.0, 1.0),
        }
    }
}

/// Collision-specific debug visualizer
///
/// Integrates with DebugDrawSystem to provide collision-specific visualization:
/// - Bounder world shapes, colored by last tick's outcome
/// - Octree node regions, colored by depth
/// - Pick rays and their hits
pub struct CollisionDebugVisualizer {
    debug_draw: DebugDrawSystem,
    colors: CollisionDebugColors,

    /// Show bounder shapes
    pub show_shapes: bool,

    /// Show octree nodes
    pub show_octree: bool,

    /// Only draw leaf nodes of the octree
    pub leaves_only: bool,
}

impl CollisionDebugVisualizer {
    /// Create a new collision debug visualizer
    pub fn new() -> Self {
        Self {
            debug_draw: DebugDrawSystem::new(),
            colors: CollisionDebugColors::default(),
            show_shapes: true,
            show_octree: true,
            leaves_only: false,
        }
    }

    /// Set custom color scheme
    pub fn with_colors(mut self, colors: CollisionDebugColors) -> Self {
        self.colors = colors;
        self
    }

    /// Outline every bounder for one frame
    ///
    /// Adjusted wins over colliding, which wins over the default color.
    pub fn draw_bounders(&mut self, system: &CollisionSystem) {
        if !self.show_shapes {
            return;
        }

        for (_, bounder) in system.bounders() {
            let color = if bounder.was_adjusted {
                self.colors.shape_adjusted
            } else if bounder.was_collision {
                self.colors.shape_colliding
            } else {
                self.colors.shape_default
            };
            self.debug_draw.draw_bounds(bounder.world_shape(), color, 0.0);
        }
    }

    /// Outline the system's octree for one frame, if it has one
    pub fn draw_broad_phase(&mut self, system: &CollisionSystem) {
        if let Some(octree) = system.octree() {
            self.draw_octree(octree);
        }
    }

    /// Outline octree nodes for one frame
    pub fn draw_octree(&mut self, octree: &Octree<BounderId>) {
        if !self.show_octree {
            return;
        }

        let nodes = if self.leaves_only { octree.get_all_leaves() } else { octree.nodes() };
        let max_depth = octree.config().max_depth.max(1) as f32;
        for node in nodes {
            let t = (node.depth as f32 / max_depth).min(1.0);
            let color = self.colors.octree_root.lerp(&self.colors.octree_deep, t);
            self.debug_draw.draw(DebugShape::Box {
                center: node.center,
                extents: Vec3::repeat(node.radius),
                color,
                duration: 0.0,
            });
        }
    }

    /// Draw a pick ray and its result for `duration` seconds
    pub fn draw_pick(&mut self, ray: &Ray, hit: &Intersect, max_distance: f32, duration: f32) {
        self.debug_draw.draw_ray(ray, hit, max_distance, self.colors.ray, duration);
    }

    /// Clear all visualization
    pub fn clear(&mut self) {
        self.debug_draw.clear();
    }

    /// Update debug system (expire temporary shapes)
    pub fn update(&mut self, delta_time: f32) {
        self.debug_draw.update(delta_time);
    }

    /// Get all debug shapes for rendering
    pub fn get_shapes(&self) -> Vec<&DebugShape> {
        self.debug_draw.get_shapes()
    }

    /// Enable/disable the entire debug system
    pub fn set_enabled(&mut self, enabled: bool) {
        self.debug_draw.enabled = enabled;
    }

    /// Check if debug system is enabled
    pub fn is_enabled(&self) -> bool {
        self.debug_draw.enabled
    }

    /// Get reference to underlying debug draw system
    pub fn debug_draw(&self) -> &DebugDrawSystem {
        &self.debug_draw
    }

    /// Get mutable reference to underlying debug draw system
    pub fn debug_draw_mut(&mut self) -> &mut DebugDrawSystem {
        &mut self.debug_draw
    }
}

impl Default for CollisionDebugVisualizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::World;
    use crate::foundation::math::Transform;
    use crate::physics::collision::{AABox, Sphere};
    use crate::physics::Bounder;
    use crate::spatial::OctreeConfig;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounders_colored_by_outcome() {
        let mut world = World::new();
        let mover = world.create_entity();
        let wall = world.create_entity_with(Transform::from_position(Vec3::new(1.5, 0.0, 0.0)));
        let far = world.create_entity_with(Transform::from_position(Vec3::new(20.0, 0.0, 0.0)));

        let mut system = CollisionSystem::new();
        let sphere = Sphere::new(Vec3::zeros(), 1.0).into();
        system.add_bounder(&world, mover, 1, sphere).unwrap();
        system.add_bounder(&world, wall, Bounder::STATIC, sphere).unwrap();
        system.add_bounder(&world, far, 1, sphere).unwrap();
        system.set_settle_pass(false);
        system.update(&mut world);

        let colors = CollisionDebugColors::default();
        let mut viz = CollisionDebugVisualizer::new();
        viz.draw_bounders(&system);

        let drawn: Vec<Vec4> = viz.get_shapes().iter().map(|s| s.color()).collect();
        assert_eq!(drawn, vec![colors.shape_adjusted, colors.shape_colliding, colors.shape_default]);

        // One-frame shapes expire on the next update
        viz.update(0.016);
        assert!(viz.get_shapes().is_empty());
    }

    #[test]
    fn test_octree_nodes_colored_by_depth() {
        let world_bounds = AABox::new(Vec3::repeat(-16.0), Vec3::repeat(16.0));
        let config = OctreeConfig { split_threshold: 1, max_depth: 2, min_radius: 1.0 };
        let mut octree = Octree::new(&world_bounds, config);

        let mut keys = slotmap::SlotMap::<BounderId, ()>::with_key();
        for x in [-8.0, 8.0] {
            let key = keys.insert(());
            octree.set(key, AABox::from_center_extents(Vec3::new(x, 8.0, 8.0), Vec3::repeat(1.0)));
        }

        let colors = CollisionDebugColors::default();
        let mut viz = CollisionDebugVisualizer::new();
        viz.draw_octree(&octree);

        let shapes = viz.get_shapes();
        assert_eq!(shapes.len(), 9);
        assert_eq!(shapes[0].color(), colors.octree_root);
        assert_relative_eq!(shapes[1].color(), colors.octree_root.lerp(&colors.octree_deep, 0.5));

        viz.clear();
        viz.leaves_only = true;
        viz.draw_octree(&octree);
        assert_eq!(viz.get_shapes().len(), 8);
    }

    #[test]
    fn test_disabled_visualizer_draws_nothing() {
        let mut viz = CollisionDebugVisualizer::new();
        viz.set_enabled(false);
        viz.draw_pick(&Ray::new(Vec3::zeros(), Vec3::z()), &Intersect::miss(), 5.0, 1.0);
        assert!(!viz.is_enabled());
        assert_eq!(viz.debug_draw().shape_count(), 0);
    }
}
