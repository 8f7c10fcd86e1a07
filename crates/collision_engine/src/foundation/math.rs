//! Math utilities and types
//!
//! Provides the vector and transform types used by the collision code, plus
//! the small vector helpers shared by the narrow phase and the resolver.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type (debug colors)
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Tolerance used by the degenerate-distance branches (compared against
/// squared lengths)
pub const EPSILON: f32 = 1e-6;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and scale
    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            scale,
            ..Default::default()
        }
    }

    /// Convert to a model matrix (translation * rotation * scale)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Whether the rotation is exactly the identity
    ///
    /// Axis-aligned boxes take the cheap scale+translate path only in this case.
    pub fn is_unrotated(&self) -> bool {
        self.rotation.imag() == Vec3::zeros()
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.to_matrix().transform_point(&Point3::from(point)).coords
    }
}

/// Vector helpers used by the collision code
pub mod utils {
    use super::{Vec3, EPSILON};

    /// Whether a vector is (numerically) zero
    pub fn is_zero(v: &Vec3) -> bool {
        v.magnitude_squared() <= EPSILON * EPSILON
    }

    /// Normalize, returning zero for a zero-length input instead of NaN
    pub fn safe_norm(v: &Vec3) -> Vec3 {
        let len2 = v.magnitude_squared();
        if len2 == 0.0 {
            Vec3::zeros()
        } else {
            v / len2.sqrt()
        }
    }

    /// Hemispherical clamp: strip the part of `v` that points against the
    /// unit direction `n`. Vectors already in `n`'s hemisphere are returned
    /// unchanged.
    pub fn remove_all_against(v: &Vec3, n: &Vec3) -> Vec3 {
        let d = v.dot(n);
        if d >= 0.0 {
            *v
        } else {
            v - n * d
        }
    }

    /// Unit vector along `axis` (0 = x, 1 = y, 2 = z), negated unless `positive`
    pub fn axis_vec(axis: usize, positive: bool) -> Vec3 {
        let mut v = Vec3::zeros();
        v[axis] = if positive { 1.0 } else { -1.0 };
        v
    }

    /// Sign of `x` as -1, 0 or 1
    pub fn sign(x: f32) -> f32 {
        if x > 0.0 {
            1.0
        } else if x < 0.0 {
            -1.0
        } else {
            0.0
        }
    }

    /// Index of the component with the smallest magnitude
    ///
    /// Ties resolve to the earlier axis, so x wins over y and y over z.
    pub fn min_axis(v: &Vec3) -> usize {
        let a = v.abs();
        let mut axis = 0;
        for i in 1..3 {
            if a[i] < a[axis] {
                axis = i;
            }
        }
        axis
    }

    /// Component-wise minimum
    pub fn component_min(a: &Vec3, b: &Vec3) -> Vec3 {
        a.inf(b)
    }

    /// Component-wise maximum
    pub fn component_max(a: &Vec3, b: &Vec3) -> Vec3 {
        a.sup(b)
    }

    /// Clamp every component of `p` into `[min, max]`
    pub fn clamp_vec(p: &Vec3, min: &Vec3, max: &Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(min.x, max.x),
            p.y.clamp(min.y, max.y),
            p.z.clamp(min.z, max.z),
        )
    }
}
