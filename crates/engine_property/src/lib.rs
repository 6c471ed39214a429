//! # engine_property
//!
//! Reflection layer shared by every engine component: named, typed values
//! that can be read, written, copied and snapshotted without knowing the
//! concrete component type.
//!
//! This crate provides:
//!
//! - [`StringId`] — interned symbolic identifiers ([`sid`] to intern).
//! - [`Property`] — tagged union over all reflectable value types.
//! - [`PropertyTable`] — per-type accessor registry (stored fields, computed
//!   and read-only properties).
//! - [`PropertyContainer`] / [`PropertyAccess`] — uniform get/set, change
//!   hooks, `init_from`, `clone_container` and snapshots.
//! - [`PropertyGroup`] — owned identifier → property map.

pub mod container;
pub mod error;
pub mod property;
pub mod stringid;

pub use container::{PropertyAccess, PropertyContainer, PropertyTable};
pub use error::PropertyError;
pub use property::{Property, PropertyGroup, PropertyKind, PropertyValue};
pub use stringid::{ComponentType, MessageType, StringId, sid};

// Re-export glam so containers can name the vector payload types.
pub use glam;
