//! Closed set of bounding volumes
//!
//! A [`Shape`] is stored untransformed on its bounder and re-derived in world
//! space whenever the owner's transform changes. Pair tests dispatch over all
//! nine combinations; the three mirrored pairs reuse the canonical test and
//! negate its delta so that `a.collide(b) == -b.collide(a)`.

use super::contact;
use super::primitives::{AABox, Capsule, Intersect, Ray, Sphere};
use super::raycast;
use crate::foundation::math::utils::{component_max, component_min};
use crate::foundation::math::{Transform, Vec3};
use crate::physics::CollisionError;

/// Which kind of volume a shape is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Axis-aligned box
    Aabb,
    /// Sphere
    Sphere,
    /// Upright capsule
    Capsule,
}

/// A bounding volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned box
    Aabb(AABox),
    /// Sphere
    Sphere(Sphere),
    /// Upright capsule
    Capsule(Capsule),
}

impl Shape {
    /// Kind of this shape
    pub const fn kind(&self) -> ShapeKind {
        match self {
            Self::Aabb(_) => ShapeKind::Aabb,
            Self::Sphere(_) => ShapeKind::Sphere,
            Self::Capsule(_) => ShapeKind::Capsule,
        }
    }

    /// Volume of the shape
    pub fn volume(&self) -> f32 {
        match self {
            Self::Aabb(b) => b.volume(),
            Self::Sphere(s) => s.volume(),
            Self::Capsule(c) => c.volume(),
        }
    }

    /// Center of the shape
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Aabb(b) => b.center(),
            Self::Sphere(s) => s.origin,
            Self::Capsule(c) => c.center,
        }
    }

    /// Reject malformed parameters
    pub fn validate(&self) -> Result<(), CollisionError> {
        match self {
            Self::Aabb(b) => b.validate(),
            Self::Sphere(s) => s.validate(),
            Self::Capsule(c) => c.validate(),
        }
    }

    /// Transform this (local) shape into world space
    ///
    /// Boxes never rotate: under rotation all 8 corners are transformed and a
    /// new axis-aligned box is fitted around them, which only ever grows the
    /// volume. Spheres scale by the largest scale component; capsules scale
    /// their radius by the larger horizontal component and keep their total
    /// vertical extent proportional to the vertical component.
    pub fn to_world_space(&self, transform: &Transform) -> Self {
        let scale = transform.scale.abs();
        match self {
            Self::Aabb(b) => {
                if transform.is_unrotated() {
                    let p0 = b.min.component_mul(&transform.scale) + transform.position;
                    let p1 = b.max.component_mul(&transform.scale) + transform.position;
                    Self::Aabb(AABox::new(component_min(&p0, &p1), component_max(&p0, &p1)))
                } else {
                    let corners = b.corners().map(|c| transform.transform_point(c));
                    let mut fitted = AABox::new(corners[0], corners[0]);
                    for c in &corners[1..] {
                        fitted.min = component_min(&fitted.min, c);
                        fitted.max = component_max(&fitted.max, c);
                    }
                    Self::Aabb(fitted)
                }
            }
            Self::Sphere(s) => Self::Sphere(Sphere::new(
                transform.transform_point(s.origin),
                scale.max() * s.radius,
            )),
            Self::Capsule(c) => {
                let radius = scale.x.max(scale.z) * c.radius;
                let height = (scale.y * (c.height + 2.0 * c.radius) - 2.0 * radius).max(0.0);
                Self::Capsule(Capsule::new(transform.transform_point(c.center), radius, height))
            }
        }
    }

    /// Overlap test returning the correction that moves `self` out of `other`
    pub fn collide(&self, other: &Self) -> Option<Vec3> {
        match (self, other) {
            (Self::Aabb(a), Self::Aabb(b)) => contact::collide_box_box(a, b),
            (Self::Aabb(a), Self::Sphere(b)) => contact::collide_box_sphere(a, b),
            (Self::Aabb(a), Self::Capsule(b)) => contact::collide_box_capsule(a, b),
            (Self::Sphere(a), Self::Aabb(b)) => contact::collide_box_sphere(b, a).map(|d| -d),
            (Self::Sphere(a), Self::Sphere(b)) => contact::collide_sphere_sphere(a, b),
            (Self::Sphere(a), Self::Capsule(b)) => contact::collide_sphere_capsule(a, b),
            (Self::Capsule(a), Self::Aabb(b)) => contact::collide_box_capsule(b, a).map(|d| -d),
            (Self::Capsule(a), Self::Sphere(b)) => contact::collide_sphere_capsule(b, a).map(|d| -d),
            (Self::Capsule(a), Self::Capsule(b)) => contact::collide_capsule_capsule(a, b),
        }
    }

    /// Ray test against this shape
    pub fn intersect(&self, ray: &Ray) -> Intersect {
        match self {
            Self::Aabb(b) => raycast::intersect_box(ray, b),
            Self::Sphere(s) => raycast::intersect_sphere(ray, s),
            Self::Capsule(c) => raycast::intersect_capsule(ray, c),
        }
    }

    /// Sphere containing the whole shape, for coarse culling
    pub fn enclosing_sphere(&self) -> Sphere {
        match self {
            Self::Aabb(b) => b.enclosing_sphere(),
            Self::Sphere(s) => *s,
            Self::Capsule(c) => c.enclosing_sphere(),
        }
    }

    /// Axis-aligned box containing the whole shape, used to key the octree
    pub fn enclosing_aabox(&self) -> AABox {
        match self {
            Self::Aabb(b) => *b,
            Self::Sphere(s) => s.enclosing_aabox(),
            Self::Capsule(c) => c.enclosing_aabox(),
        }
    }
}

impl From<AABox> for Shape {
    fn from(b: AABox) -> Self {
        Self::Aabb(b)
    }
}

impl From<Sphere> for Shape {
    fn from(s: Sphere) -> Self {
        Self::Sphere(s)
    }
}

impl From<Capsule> for Shape {
    fn from(c: Capsule) -> Self {
        Self::Capsule(c)
    }
}
