//! Debug visualization of bounders and the broad phase
//!
//! Based on Game Engine Architecture 3rd Edition, Chapter 10.2:
//! "Debug Drawing Facilities"
//!
//! Produces backend-agnostic [`DebugShape`] primitives; drawing them is left
//! to the host renderer.

pub mod draw;
pub mod collision_debug;

pub use draw::{DebugShape, DebugDrawSystem, DebugShapeId};
pub use collision_debug::{CollisionDebugColors, CollisionDebugVisualizer};
