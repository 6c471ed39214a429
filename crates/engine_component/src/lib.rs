//! # engine_component
//!
//! The component side of the engine: what a component is, who owns it, and
//! how entities are assembled from prototypes.
//!
//! This crate provides:
//!
//! - [`EntityId`] / [`EntityAllocator`] — serial entity identifiers.
//! - [`Component`] — a property container attached to an entity.
//! - [`EntitySystem`] / [`ComponentStore`] — per-type component ownership.
//! - [`PluginManager`] / [`SystemFactory`] — on-demand system start-up with
//!   dependency ordering.
//! - [`Spawner`] — entity prototypes built from property groups.
//! - [`MapRegistry`] / [`MapComponent`] — named spawners, entity names,
//!   unique ids and spawner-of queries.

pub mod component;
pub mod entity;
pub mod error;
pub mod map;
pub mod plugin;
pub mod spawner;
pub mod system;

pub use component::Component;
pub use entity::{EntityAllocator, EntityId};
pub use error::ComponentError;
pub use map::{MapComponent, MapRegistry};
pub use plugin::{PluginManager, StoreFactory, SystemFactory};
pub use spawner::Spawner;
pub use system::{ComponentStore, EntitySystem};
