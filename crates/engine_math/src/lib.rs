//! # engine_math
//!
//! Math types for the engine. Re-exports [`glam`] for linear algebra and
//! defines spatial components that expose their state as properties.

pub mod transform;

// Re-export glam types for convenience.
pub use glam::{DVec2, DVec3, DVec4, EulerRot, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

pub use transform::Transform3D;
