//! Best-fit bounding volumes from mesh vertex data
//!
//! Fits an axis-aligned box, a sphere and an upright capsule around a set of
//! model-space vertices and keeps the allowed one with the least volume.

use super::primitives::{AABox, Capsule, Sphere};
use super::shape::Shape;
use crate::foundation::math::Vec3;
use crate::physics::CollisionError;
use bitflags::bitflags;

bitflags! {
    /// Shape kinds a fit may choose from
    ///
    /// An empty set allows every kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShapeKinds: u8 {
        /// Axis-aligned box
        const AABB = 1 << 0;
        /// Sphere
        const SPHERE = 1 << 1;
        /// Upright capsule
        const CAPSULE = 1 << 2;
    }
}

/// Choose the least-volume allowed shape around `vertices`
///
/// On equal volume the sphere is preferred over the box, and the box over
/// the capsule. Candidates with degenerate parameters (such as a capsule
/// with no rod) are skipped.
pub fn fit_shape(vertices: &[Vec3], allowed: ShapeKinds) -> Result<Shape, CollisionError> {
    let span = AABox::from_points(vertices).ok_or(CollisionError::EmptyMesh)?;
    let allowed = if allowed.is_empty() { ShapeKinds::all() } else { allowed };
    let center = span.center();

    let mut candidates: Vec<Shape> = Vec::with_capacity(3);
    if allowed.contains(ShapeKinds::SPHERE) {
        candidates.push(Sphere::new(center, max_radius(vertices, &center)).into());
    }
    if allowed.contains(ShapeKinds::AABB) {
        candidates.push(span.into());
    }
    if allowed.contains(ShapeKinds::CAPSULE) {
        candidates.push(fit_capsule(vertices, &center).into());
    }

    let mut best: Option<(Shape, f32)> = None;
    for shape in candidates {
        if shape.validate().is_err() {
            continue;
        }
        let volume = shape.volume();
        if best.map_or(true, |(_, v)| volume < v) {
            best = Some((shape, volume));
        }
    }

    best.map(|(shape, _)| shape).ok_or(CollisionError::NoFittingShape)
}

/// Largest distance from `center` to any vertex
fn max_radius(vertices: &[Vec3], center: &Vec3) -> f32 {
    vertices
        .iter()
        .map(|v| (v - center).magnitude_squared())
        .fold(0.0_f32, f32::max)
        .sqrt()
}

/// Upright capsule around `center` with the smallest radius that contains
/// every vertex horizontally, then the shortest rod that keeps every vertex
/// inside its cap
fn fit_capsule(vertices: &[Vec3], center: &Vec3) -> Capsule {
    let horizontal2 = |v: &Vec3| {
        let dx = v.x - center.x;
        let dz = v.z - center.z;
        dx * dx + dz * dz
    };
    let radius2 = vertices.iter().map(horizontal2).fold(0.0_f32, f32::max);

    // Lowest possible upper cap center, highest possible lower cap center
    let mut upper = f32::NEG_INFINITY;
    let mut lower = f32::INFINITY;
    for v in vertices {
        let a = (radius2 - horizontal2(v)).max(0.0).sqrt();
        if v.y >= center.y {
            upper = upper.max(v.y - a);
        }
        if v.y <= center.y {
            lower = lower.min(v.y + a);
        }
    }
    if upper < lower {
        let mid = (upper + lower) * 0.5;
        upper = mid;
        lower = mid;
    }

    let height = upper - lower;
    Capsule::new(
        Vec3::new(center.x, lower + height * 0.5, center.z),
        radius2.sqrt(),
        height,
    )
}
