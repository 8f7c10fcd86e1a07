//! Ray intersection tests against the bounding volumes
//!
//! All tests report the outward surface normal at the hit point. When the ray
//! starts inside the volume the hit is the exit point and
//! [`Intersect::is_outer_face`] is `false`.

use super::primitives::{AABox, Capsule, Intersect, Ray, Sphere};
use crate::foundation::math::utils::axis_vec;
use crate::foundation::math::Vec3;

/// Ray against axis-aligned box (slab method)
///
/// A zero direction component produces infinite slab distances, or NaN when
/// the origin lies exactly on that slab's plane; NaN is treated as a miss.
pub fn intersect_box(ray: &Ray, b: &AABox) -> Intersect {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    let mut min_axis = 0;
    let mut max_axis = 0;
    let mut min_high = false;
    let mut max_high = false;

    for i in 0..3 {
        let inv = 1.0 / ray.direction[i];
        let t_low = (b.min[i] - ray.origin[i]) * inv;
        let t_high = (b.max[i] - ray.origin[i]) * inv;
        if t_low.is_nan() || t_high.is_nan() {
            return Intersect::miss();
        }

        // Entry/exit for this slab, and whether the max face produced it
        let (near, near_high, far, far_high) = if t_low <= t_high {
            (t_low, false, t_high, true)
        } else {
            (t_high, true, t_low, false)
        };

        if near > t_min {
            t_min = near;
            min_axis = i;
            min_high = near_high;
        }
        if far < t_max {
            t_max = far;
            max_axis = i;
            max_high = far_high;
        }
    }

    if t_max <= 0.0 || !(t_max >= t_min) {
        return Intersect::miss();
    }

    if t_min >= 0.0 {
        Intersect::new(t_min, ray.point_at(t_min), axis_vec(min_axis, min_high), true)
    } else {
        Intersect::new(t_max, ray.point_at(t_max), axis_vec(max_axis, max_high), false)
    }
}

/// Ray against sphere
///
/// The direction must be unit length for the distance to be exact.
pub fn intersect_sphere(ray: &Ray, s: &Sphere) -> Intersect {
    let r2 = s.radius * s.radius;
    let c = s.origin - ray.origin;
    let outside = c.magnitude_squared() >= r2;
    let p = ray.direction.dot(&c);
    if outside && p < 0.0 {
        return Intersect::miss();
    }

    // Closest approach of the ray to the center
    let closest = ray.direction * p;
    let d2 = (closest - c).magnitude_squared();
    if d2 >= r2 {
        return Intersect::miss();
    }

    let half_chord = (r2 - d2).sqrt();
    let h = if outside { half_chord } else { -half_chord };
    let i = closest - ray.direction * h;

    Intersect::new(p - h, ray.origin + i, (i - c) / s.radius, outside)
}

/// Both parameters where the ray crosses a sphere, in increasing order
fn sphere_roots(ray: &Ray, center: &Vec3, radius: f32) -> Option<(f32, f32)> {
    let oc = ray.origin - center;
    let a = ray.direction.magnitude_squared();
    let b = 2.0 * oc.dot(&ray.direction);
    let c = oc.magnitude_squared() - radius * radius;
    solve_quadratic(a, b, c)
}

/// Both parameters where the ray crosses the capsule's infinite cylinder
///
/// `None` only for rays exactly parallel to the axis; steep rays still get
/// their (distant) roots.
fn cylinder_roots(ray: &Ray, cap: &Capsule) -> Option<(f32, f32)> {
    let ox = ray.origin.x - cap.center.x;
    let oz = ray.origin.z - cap.center.z;
    let (dx, dz) = (ray.direction.x, ray.direction.z);
    let a = dx * dx + dz * dz;
    if a == 0.0 {
        return None;
    }
    let b = 2.0 * (ox * dx + oz * dz);
    let c = ox * ox + oz * oz - cap.radius * cap.radius;
    solve_quadratic(a, b, c)
}

fn solve_quadratic(a: f32, b: f32, c: f32) -> Option<(f32, f32)> {
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 || a == 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    Some(((-b - sq) / (2.0 * a), (-b + sq) / (2.0 * a)))
}

/// Nearest forward crossing of the cylindrical section
fn rod_hit(ray: &Ray, cap: &Capsule, outer: bool) -> Intersect {
    let Some((t0, t1)) = cylinder_roots(ray, cap) else {
        return Intersect::miss();
    };
    let low = cap.center.y - cap.height * 0.5;
    let high = cap.center.y + cap.height * 0.5;

    let mut best = Intersect::miss();
    for t in [t0, t1] {
        let p = ray.point_at(t);
        if t > 0.0 && p.y >= low && p.y <= high {
            let axis_p = Vec3::new(cap.center.x, p.y, cap.center.z);
            best = best.nearest(Intersect::new(t, p, (p - axis_p) / cap.radius, outer));
        }
    }
    best
}

/// Nearest forward crossing of one hemispherical cap
fn cap_hit(ray: &Ray, cap: &Capsule, upper: bool, outer: bool) -> Intersect {
    let center = if upper { cap.high_point() } else { cap.low_point() };
    let Some((t0, t1)) = sphere_roots(ray, &center, cap.radius) else {
        return Intersect::miss();
    };

    let mut best = Intersect::miss();
    for t in [t0, t1] {
        let p = ray.point_at(t);
        let on_cap = if upper { p.y >= center.y } else { p.y <= center.y };
        if t > 0.0 && on_cap {
            best = best.nearest(Intersect::new(t, p, (p - center) / cap.radius, outer));
        }
    }
    best
}

/// Ray against upright capsule
///
/// Split into the infinite cylinder plus the two caps. From outside the
/// cylinder only the side it is entered on matters; from inside, the
/// candidates depend on where along the axis the ray starts and which way
/// it is heading.
pub fn intersect_capsule(ray: &Ray, cap: &Capsule) -> Intersect {
    let low = cap.center.y - cap.height * 0.5;
    let high = cap.center.y + cap.height * 0.5;
    let r2 = cap.radius * cap.radius;
    let o = ray.origin;
    let dy = ray.direction.y;

    let ox = o.x - cap.center.x;
    let oz = o.z - cap.center.z;
    let in_cylinder = ox * ox + oz * oz < r2;

    if !in_cylinder {
        let Some((t0, _)) = cylinder_roots(ray, cap) else {
            return Intersect::miss();
        };
        if t0 <= 0.0 {
            return Intersect::miss();
        }
        let y = o.y + t0 * dy;
        return if y > high {
            cap_hit(ray, cap, true, true)
        } else if y < low {
            cap_hit(ray, cap, false, true)
        } else {
            rod_hit(ray, cap, true)
        };
    }

    let inside = (o.y >= low && o.y <= high)
        || (o - cap.high_point()).magnitude_squared() < r2
        || (o - cap.low_point()).magnitude_squared() < r2;
    let outer = !inside;

    if o.y > high {
        let mut best = cap_hit(ray, cap, true, outer);
        if dy < 0.0 {
            best = best
                .nearest(rod_hit(ray, cap, outer))
                .nearest(cap_hit(ray, cap, false, outer));
        }
        best
    } else if o.y < low {
        let mut best = cap_hit(ray, cap, false, outer);
        if dy > 0.0 {
            best = best
                .nearest(rod_hit(ray, cap, outer))
                .nearest(cap_hit(ray, cap, true, outer));
        }
        best
    } else {
        let mut best = rod_hit(ray, cap, outer);
        if dy > 0.0 {
            best = best.nearest(cap_hit(ray, cap, true, outer));
        } else if dy < 0.0 {
            best = best.nearest(cap_hit(ray, cap, false, outer));
        }
        best
    }
}
