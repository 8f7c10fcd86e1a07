//! Bounding volumes and the geometric tests between them
//!
//! # Module Organization
//!
//! - [`primitives`] - Box, sphere, capsule, ray and ray-hit value types
//! - [`contact`] - Pairwise overlap tests producing correction deltas
//! - [`raycast`] - Ray tests for picking
//! - [`shape`] - Closed shape enum with pair dispatch and world-space transform
//! - [`mesh`] - Least-volume shape fitting from vertex data
//!
//! All capsules are upright: their axis is parallel to world +Y.

pub mod primitives;
pub mod contact;
pub mod raycast;
pub mod shape;
pub mod mesh;

// Re-export commonly used types
pub use primitives::{AABox, Capsule, Intersect, Ray, Sphere};
pub use shape::{Shape, ShapeKind};
pub use mesh::{fit_shape, ShapeKinds};
