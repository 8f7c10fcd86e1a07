//! Narrow-phase overlap tests
//!
//! Every function answers "does `a` overlap `b`?" and, if so, returns the
//! positional correction that moves `a` out of `b`. Non-overlapping shapes
//! yield `None`, never a zero vector.
//!
//! Box responses are reduced to the single shallowest axis. That is not a
//! true minimum translation vector for corner overlaps; it is the response
//! the rest of the simulation is tuned against.

use super::primitives::{AABox, Capsule, Sphere};
use crate::foundation::math::utils::{clamp_vec, min_axis, sign};
use crate::foundation::math::{Vec3, EPSILON};

/// Keep only the component of `v` with the smallest magnitude
fn keep_min_axis(v: &Vec3) -> (usize, Vec3) {
    let axis = min_axis(v);
    let mut out = Vec3::zeros();
    out[axis] = v[axis];
    (axis, out)
}

/// Corner of `b` nearest to `p`, choosing per axis (the min side wins ties)
fn nearest_corner(b: &AABox, p: &Vec3) -> Vec3 {
    let mut corner = Vec3::zeros();
    for i in 0..3 {
        corner[i] = if (p[i] - b.min[i]).abs() <= (b.max[i] - p[i]).abs() {
            b.min[i]
        } else {
            b.max[i]
        };
    }
    corner
}

/// Direction to leave a box through the face chosen by [`nearest_corner`]
///
/// A centered point leaves through the min face, so the box moves +1.
fn exit_sign(to_center: f32) -> f32 {
    if to_center == 0.0 {
        1.0
    } else {
        sign(to_center)
    }
}

/// Push `dist` along `dir` out to `radius`
fn push_out(dir: &Vec3, dist: f32, radius: f32) -> Vec3 {
    dir * ((radius - dist) / dist)
}

/// Box against box
///
/// Overlap is strict, so boxes that only share a face do not collide.
pub fn collide_box_box(a: &AABox, b: &AABox) -> Option<Vec3> {
    let overlap = a.min.x < b.max.x
        && a.max.x > b.min.x
        && a.min.y < b.max.y
        && a.max.y > b.min.y
        && a.min.z < b.max.z
        && a.max.z > b.min.z;
    if !overlap {
        return None;
    }

    let mut delta = Vec3::zeros();
    for i in 0..3 {
        let up = b.max[i] - a.min[i];
        let down = b.min[i] - a.max[i];
        delta[i] = if up.abs() <= down.abs() { up } else { down };
    }

    Some(keep_min_axis(&delta).1)
}

/// Box against sphere
pub fn collide_box_sphere(b: &AABox, s: &Sphere) -> Option<Vec3> {
    let p = clamp_vec(&s.origin, &b.min, &b.max);
    let d_vec = p - s.origin;
    let d2 = d_vec.magnitude_squared();
    if d2 >= s.radius * s.radius {
        return None;
    }

    // Sphere center outside the box
    if d2 > 0.0 {
        return Some(push_out(&d_vec, d2.sqrt(), s.radius));
    }

    // Center inside: leave through the nearest face
    let corner = nearest_corner(b, &s.origin);
    let (axis, mut delta) = keep_min_axis(&(s.origin - corner));
    delta[axis] += s.radius * exit_sign(b.center()[axis] - s.origin[axis]);
    Some(delta)
}

/// Box against capsule
pub fn collide_box_capsule(b: &AABox, c: &Capsule) -> Option<Vec3> {
    let low = c.low_point();
    let high = c.high_point();
    let mut box_p = clamp_vec(&c.center, &b.min, &b.max);
    let rod_p = c.rod_point(box_p.y);
    let d_vec = box_p - rod_p;
    let d2 = d_vec.magnitude_squared();
    if d2 >= c.radius * c.radius {
        return None;
    }

    if d2 > 0.0 {
        return Some(push_out(&d_vec, d2.sqrt(), c.radius));
    }

    // Axial segment passes through the box
    let box_c = b.center();
    box_p.y = if c.center.y < box_c.y {
        high.y.clamp(b.min.y, b.max.y)
    } else {
        low.y.clamp(b.min.y, b.max.y)
    };

    let corner = nearest_corner(b, &box_p);
    let (axis, mut delta) = keep_min_axis(&(box_p - corner));
    if axis == 1 {
        delta.y = if box_p.y - box_c.y > 0.0 {
            low.y - b.max.y - c.radius
        } else {
            high.y - b.min.y + c.radius
        };
    } else {
        delta[axis] += c.radius * exit_sign(box_c[axis] - box_p[axis]);
    }
    Some(delta)
}

/// Sphere against sphere
pub fn collide_sphere_sphere(a: &Sphere, b: &Sphere) -> Option<Vec3> {
    let comb_r = a.radius + b.radius;
    let d_vec = a.origin - b.origin;
    let d2 = d_vec.magnitude_squared();
    if d2 >= comb_r * comb_r {
        return None;
    }

    if d2 <= EPSILON {
        // Coincident centers
        return Some(Vec3::new(0.0, comb_r, 0.0));
    }

    Some(push_out(&d_vec, d2.sqrt(), comb_r))
}

/// Sphere against capsule
pub fn collide_sphere_capsule(s: &Sphere, c: &Capsule) -> Option<Vec3> {
    let comb_r = s.radius + c.radius;
    let rod_p = c.rod_point(s.origin.y);
    let d_vec = s.origin - rod_p;
    let d2 = d_vec.magnitude_squared();
    if d2 >= comb_r * comb_r {
        return None;
    }

    if d2 <= EPSILON {
        // Sphere center on the axial segment: clear the nearer cap vertically
        let dy = if s.origin.y >= c.center.y {
            c.high_point().y - s.origin.y + comb_r
        } else {
            c.low_point().y - s.origin.y - comb_r
        };
        return Some(Vec3::new(0.0, dy, 0.0));
    }

    Some(push_out(&d_vec, d2.sqrt(), comb_r))
}

/// Capsule against capsule
pub fn collide_capsule_capsule(a: &Capsule, b: &Capsule) -> Option<Vec3> {
    let comb_r = a.radius + b.radius;
    let rod_a = a.rod_point(b.center.y);
    let rod_b = b.rod_point(rod_a.y);
    let d_vec = rod_a - rod_b;
    let d2 = d_vec.magnitude_squared();
    if d2 >= comb_r * comb_r {
        return None;
    }

    if d2 <= EPSILON {
        // Coaxial and overlapping segments
        let dy = if a.center.y >= b.center.y {
            b.high_point().y - a.low_point().y + comb_r
        } else {
            b.low_point().y - a.high_point().y - comb_r
        };
        return Some(Vec3::new(0.0, dy, 0.0));
    }

    Some(push_out(&d_vec, d2.sqrt(), comb_r))
}
