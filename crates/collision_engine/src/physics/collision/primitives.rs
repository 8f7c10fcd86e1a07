//! Primitive bounding volumes and ray types
//!
//! Provides the three bounding volumes (axis-aligned box, sphere, upright
//! capsule) together with the ray and ray-hit types used for picking.
//! Capsule axes are always parallel to world +Y.

use crate::foundation::math::utils::{component_max, component_min};
use crate::foundation::math::Vec3;
use crate::physics::CollisionError;
use std::f32::consts::PI;

/// Axis-aligned box given by its minimum and maximum corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABox {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl AABox {
    /// Creates a box from its corners
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates a box from a center point and half-extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest box containing every point
    ///
    /// Returns `None` for an empty slice.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::new(*first, *first);
        for p in rest {
            bounds.min = component_min(&bounds.min, p);
            bounds.max = component_max(&bounds.max, p);
        }
        Some(bounds)
    }

    /// Center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half-extents of the box
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Full edge lengths of the box
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Volume of the box
    pub fn volume(&self) -> f32 {
        let s = self.size();
        s.x * s.y * s.z
    }

    /// The 8 corners, ordered by octant bits (x = bit 0, y = bit 1, z = bit 2)
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| {
            Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }

    /// Check if a point lies inside the box (inclusive)
    pub fn contains_point(&self, point: &Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if another box lies entirely inside this one (inclusive)
    pub fn contains_box(&self, other: &AABox) -> bool {
        self.contains_point(&other.min) && self.contains_point(&other.max)
    }

    /// Inclusive overlap test, used for broad-phase filtering
    pub fn intersects(&self, other: &AABox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Sphere centered on the box that touches all its corners
    pub fn enclosing_sphere(&self) -> Sphere {
        let center = self.center();
        Sphere::new(center, (self.max - center).magnitude())
    }

    /// Reject inverted or non-finite boxes
    pub fn validate(&self) -> Result<(), CollisionError> {
        let finite = self.min.iter().chain(self.max.iter()).all(|c| c.is_finite());
        if !finite || self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z {
            return Err(CollisionError::InvalidBox { min: self.min, max: self.max });
        }
        Ok(())
    }
}

/// Sphere given by its origin and radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Center of the sphere
    pub origin: Vec3,
    /// Radius of the sphere
    pub radius: f32,
}

impl Sphere {
    /// Creates a new sphere
    pub const fn new(origin: Vec3, radius: f32) -> Self {
        Self { origin, radius }
    }

    /// Volume of the sphere
    pub fn volume(&self) -> f32 {
        4.0 / 3.0 * PI * self.radius.powi(3)
    }

    /// Tightest axis-aligned box around the sphere
    pub fn enclosing_aabox(&self) -> AABox {
        AABox::from_center_extents(self.origin, Vec3::repeat(self.radius))
    }

    /// Reject non-positive or non-finite radii
    pub fn validate(&self) -> Result<(), CollisionError> {
        validate_radius(self.radius)
    }
}

/// Upright capsule: a vertical cylinder of length `height` capped by two
/// hemispheres of `radius`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    /// Midpoint of the axial segment
    pub center: Vec3,
    /// Radius of the cylinder and caps
    pub radius: f32,
    /// Length of the cylindrical section, caps excluded
    pub height: f32,
}

impl Capsule {
    /// Creates a new capsule
    pub const fn new(center: Vec3, radius: f32, height: f32) -> Self {
        Self { center, radius, height }
    }

    /// Volume of the capsule
    pub fn volume(&self) -> f32 {
        PI * self.radius * self.radius * (self.height + 4.0 / 3.0 * self.radius)
    }

    /// Center of the lower cap (bottom end of the axial segment)
    pub fn low_point(&self) -> Vec3 {
        Vec3::new(self.center.x, self.center.y - self.height * 0.5, self.center.z)
    }

    /// Center of the upper cap (top end of the axial segment)
    pub fn high_point(&self) -> Vec3 {
        Vec3::new(self.center.x, self.center.y + self.height * 0.5, self.center.z)
    }

    /// Point on the axial segment closest to height `y`
    pub fn rod_point(&self, y: f32) -> Vec3 {
        let low = self.center.y - self.height * 0.5;
        let high = self.center.y + self.height * 0.5;
        Vec3::new(self.center.x, y.clamp(low, high), self.center.z)
    }

    /// Sphere centered on the capsule that contains both caps
    pub fn enclosing_sphere(&self) -> Sphere {
        Sphere::new(self.center, self.height * 0.5 + self.radius)
    }

    /// Tightest axis-aligned box around the capsule
    pub fn enclosing_aabox(&self) -> AABox {
        AABox::from_center_extents(
            self.center,
            Vec3::new(self.radius, self.height * 0.5 + self.radius, self.radius),
        )
    }

    /// Reject non-positive or non-finite radius and height
    pub fn validate(&self) -> Result<(), CollisionError> {
        validate_radius(self.radius)?;
        if !(self.height > 0.0 && self.height.is_finite()) {
            return Err(CollisionError::InvalidHeight(self.height));
        }
        Ok(())
    }
}

fn validate_radius(radius: f32) -> Result<(), CollisionError> {
    // Negated so NaN is rejected too
    if !(radius > 0.0 && radius.is_finite()) {
        return Err(CollisionError::InvalidRadius(radius));
    }
    Ok(())
}

/// A ray for ray casting and picking
///
/// Box tests accept any direction; sphere and capsule distances are only
/// exact for unit directions, which [`Ray::new`] guarantees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray, normalizing the direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Creates a ray keeping the direction as given
    pub const fn from_raw(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray intersection test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersect {
    /// Whether anything was hit
    pub hit: bool,
    /// Distance along the ray to the hit point; infinite on a miss
    pub distance: f32,
    /// The point of intersection in world space
    pub point: Vec3,
    /// Outward surface normal at the intersection point
    pub normal: Vec3,
    /// `false` when the ray started inside the volume and the hit is the exit
    pub is_outer_face: bool,
}

impl Intersect {
    /// A miss
    pub fn miss() -> Self {
        Self {
            hit: false,
            distance: f32::INFINITY,
            point: Vec3::zeros(),
            normal: Vec3::zeros(),
            is_outer_face: true,
        }
    }

    /// A hit at `distance`
    pub const fn new(distance: f32, point: Vec3, normal: Vec3, is_outer_face: bool) -> Self {
        Self {
            hit: true,
            distance,
            point,
            normal,
            is_outer_face,
        }
    }

    /// Keep whichever of `self` and `other` is nearer
    pub fn nearest(self, other: Self) -> Self {
        if other.hit && other.distance < self.distance {
            other
        } else {
            self
        }
    }
}

impl Default for Intersect {
    fn default() -> Self {
        Self::miss()
    }
}
