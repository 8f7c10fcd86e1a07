//! Debug drawing primitives and system
//!
//! Based on Game Engine Architecture 3rd Edition, Section 10.2:
//! "Debug drawing facilities allow programmers to render simple shapes like
//! lines, points, spheres and boxes for debugging and visualization purposes."

use crate::foundation::math::{Vec3, Vec4};
use crate::physics::collision::{Intersect, Ray, Shape};
use std::collections::HashMap;

/// Unique identifier for persistent debug shapes
pub type DebugShapeId = String;

/// Debug shape primitives that can be rendered for visualization
#[derive(Clone, Debug, PartialEq)]
pub enum DebugShape {
    /// Line segment from start to end
    Line {
        start: Vec3,
        end: Vec3,
        color: Vec4,
        duration: f32,
    },

    /// Wireframe sphere
    Sphere {
        center: Vec3,
        radius: f32,
        color: Vec4,
        duration: f32,
    },

    /// Wireframe axis-aligned box given by center and half-extents
    Box {
        center: Vec3,
        extents: Vec3,
        color: Vec4,
        duration: f32,
    },

    /// Wireframe upright capsule; `height` excludes the caps
    Capsule {
        center: Vec3,
        radius: f32,
        height: f32,
        color: Vec4,
        duration: f32,
    },

    /// Point at position
    Point {
        position: Vec3,
        color: Vec4,
        size: f32,
        duration: f32,
    },
}

impl DebugShape {
    /// Outline of a bounding volume
    pub fn from_shape(shape: &Shape, color: Vec4, duration: f32) -> Self {
        match shape {
            Shape::Aabb(b) => DebugShape::Box {
                center: b.center(),
                extents: b.extents(),
                color,
                duration,
            },
            Shape::Sphere(s) => DebugShape::Sphere {
                center: s.origin,
                radius: s.radius,
                color,
                duration,
            },
            Shape::Capsule(c) => DebugShape::Capsule {
                center: c.center,
                radius: c.radius,
                height: c.height,
                color,
                duration,
            },
        }
    }

    fn duration_mut(&mut self) -> &mut f32 {
        match self {
            DebugShape::Line { duration, .. }
            | DebugShape::Sphere { duration, .. }
            | DebugShape::Box { duration, .. }
            | DebugShape::Capsule { duration, .. }
            | DebugShape::Point { duration, .. } => duration,
        }
    }

    /// Get remaining duration
    pub fn duration(&self) -> f32 {
        match self {
            DebugShape::Line { duration, .. }
            | DebugShape::Sphere { duration, .. }
            | DebugShape::Box { duration, .. }
            | DebugShape::Capsule { duration, .. }
            | DebugShape::Point { duration, .. } => *duration,
        }
    }

    /// Color of the shape
    pub fn color(&self) -> Vec4 {
        match self {
            DebugShape::Line { color, .. }
            | DebugShape::Sphere { color, .. }
            | DebugShape::Box { color, .. }
            | DebugShape::Capsule { color, .. }
            | DebugShape::Point { color, .. } => *color,
        }
    }

    /// Set duration (returns modified shape)
    pub fn with_duration(mut self, new_duration: f32) -> Self {
        *self.duration_mut() = new_duration;
        self
    }

    /// Decrease duration by delta_time, returns true if expired
    pub fn tick(&mut self, delta_time: f32) -> bool {
        let duration = self.duration_mut();
        *duration -= delta_time;
        *duration <= 0.0
    }
}

/// Debug drawing system for rendering debug shapes
///
/// GEA 10.2: "Debug rendering systems typically support both temporary shapes
/// (which expire after a certain time) and persistent shapes (which remain
/// until explicitly removed)."
pub struct DebugDrawSystem {
    /// Temporary shapes that expire after their duration
    temporary_shapes: Vec<DebugShape>,

    /// Persistent shapes that remain until manually removed
    persistent_shapes: HashMap<DebugShapeId, DebugShape>,

    /// Master enable/disable flag
    pub enabled: bool,
}

impl DebugDrawSystem {
    /// Create a new debug draw system
    pub fn new() -> Self {
        Self {
            temporary_shapes: Vec::new(),
            persistent_shapes: HashMap::new(),
            enabled: true,
        }
    }

    /// Draw any shape (temporary)
    pub fn draw(&mut self, shape: DebugShape) {
        if self.enabled {
            self.temporary_shapes.push(shape);
        }
    }

    /// Draw a line segment (temporary)
    pub fn draw_line(&mut self, start: Vec3, end: Vec3, color: Vec4, duration: f32) {
        self.draw(DebugShape::Line { start, end, color, duration });
    }

    /// Draw a bounding volume outline (temporary)
    pub fn draw_bounds(&mut self, shape: &Shape, color: Vec4, duration: f32) {
        self.draw(DebugShape::from_shape(shape, color, duration));
    }

    /// Draw a point (temporary)
    pub fn draw_point(&mut self, position: Vec3, color: Vec4, size: f32, duration: f32) {
        self.draw(DebugShape::Point { position, color, size, duration });
    }

    /// Draw a pick ray up to its hit point (or `max_distance` on a miss),
    /// marking the hit with a point
    pub fn draw_ray(&mut self, ray: &Ray, hit: &Intersect, max_distance: f32, color: Vec4, duration: f32) {
        if hit.hit {
            self.draw_line(ray.origin, hit.point, color, duration);
            self.draw_point(hit.point, color, 4.0, duration);
        } else {
            self.draw_line(ray.origin, ray.point_at(max_distance), color, duration);
        }
    }

    /// Draw a persistent shape that remains until explicitly removed
    pub fn draw_persistent(&mut self, id: impl Into<String>, shape: DebugShape) {
        if !self.enabled {
            return;
        }

        self.persistent_shapes.insert(id.into(), shape);
    }

    /// Remove a persistent shape
    pub fn clear_persistent(&mut self, id: &str) {
        self.persistent_shapes.remove(id);
    }

    /// Clear all persistent shapes
    pub fn clear_all_persistent(&mut self) {
        self.persistent_shapes.clear();
    }

    /// Update shape lifetimes and remove expired temporary shapes
    pub fn update(&mut self, delta_time: f32) {
        if !self.enabled {
            return;
        }

        self.temporary_shapes.retain_mut(|shape| !shape.tick(delta_time));
    }

    /// Get all shapes for rendering (both temporary and persistent)
    pub fn get_shapes(&self) -> Vec<&DebugShape> {
        if !self.enabled {
            return Vec::new();
        }

        self.temporary_shapes.iter()
            .chain(self.persistent_shapes.values())
            .collect()
    }

    /// Get the number of active shapes
    pub fn shape_count(&self) -> usize {
        self.temporary_shapes.len() + self.persistent_shapes.len()
    }

    /// Clear all shapes (temporary and persistent)
    pub fn clear(&mut self) {
        self.temporary_shapes.clear();
        self.persistent_shapes.clear();
    }
}

impl Default for DebugDrawSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::{AABox, Capsule};

    const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);

    #[test]
    fn test_temporary_shape_expiration() {
        let mut system = DebugDrawSystem::new();
        system.draw_point(Vec3::zeros(), RED, 2.0, 1.0);
        assert_eq!(system.shape_count(), 1);

        system.update(0.5);
        assert_eq!(system.shape_count(), 1);

        // Total 1.1 seconds
        system.update(0.6);
        assert_eq!(system.shape_count(), 0);
    }

    #[test]
    fn test_persistent_shapes() {
        let mut system = DebugDrawSystem::new();
        let floor = Shape::Aabb(AABox::new(Vec3::new(-5.0, -1.0, -5.0), Vec3::new(5.0, 0.0, 5.0)));
        system.draw_persistent("floor", DebugShape::from_shape(&floor, RED, f32::INFINITY));

        for _ in 0..100 {
            system.update(1.0);
        }
        assert_eq!(system.shape_count(), 1);

        system.clear_persistent("floor");
        assert_eq!(system.shape_count(), 0);
    }

    #[test]
    fn test_shape_outlines() {
        let boxed = DebugShape::from_shape(
            &Shape::Aabb(AABox::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 6.0))),
            RED,
            0.0,
        );
        assert_eq!(boxed, DebugShape::Box {
            center: Vec3::new(1.0, 2.0, 3.0),
            extents: Vec3::new(1.0, 2.0, 3.0),
            color: RED,
            duration: 0.0,
        });

        let capsule = DebugShape::from_shape(&Shape::Capsule(Capsule::new(Vec3::y(), 0.5, 2.0)), RED, 3.0);
        assert!(matches!(capsule, DebugShape::Capsule { height, .. } if height == 2.0));
        assert_eq!(capsule.with_duration(1.0).duration(), 1.0);
    }

    #[test]
    fn test_ray_drawing() {
        let mut system = DebugDrawSystem::new();
        let ray = Ray::new(Vec3::zeros(), Vec3::x());

        system.draw_ray(&ray, &Intersect::miss(), 10.0, RED, 1.0);
        assert_eq!(system.get_shapes(), vec![&DebugShape::Line {
            start: Vec3::zeros(),
            end: Vec3::new(10.0, 0.0, 0.0),
            color: RED,
            duration: 1.0,
        }]);

        system.clear();
        let hit = Intersect::new(3.0, Vec3::new(3.0, 0.0, 0.0), -Vec3::x(), true);
        system.draw_ray(&ray, &hit, 10.0, RED, 1.0);
        assert_eq!(system.shape_count(), 2);

        system.enabled = false;
        assert!(system.get_shapes().is_empty());
    }
}
