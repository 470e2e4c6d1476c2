//! Core primitives.
//!
//! Geometry and randomness shared by the arena and gun subsystems.

pub mod vec3;
pub mod bounds;
pub mod rng;

// Re-export core types
pub use vec3::{Location, Vec3};
pub use bounds::Bounds;
pub use rng::DeterministicRng;
