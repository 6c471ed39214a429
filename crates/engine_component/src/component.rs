//! The [`Component`] trait.
//!
//! A component is a property container attached to one entity. The entity
//! system owning it calls the lifecycle hooks; everything else goes through
//! the [`PropertyContainer`] interface.

use engine_property::{ComponentType, PropertyContainer, sid};

use crate::entity::EntityId;

/// An attachable unit of entity state.
///
/// # Examples
///
/// ```rust
/// use std::sync::LazyLock;
/// use engine_component::{Component, EntityId};
/// use engine_property::{Property, PropertyContainer, PropertyError, PropertyTable, StringId};
///
/// #[derive(Default)]
/// struct Health {
///     current: f32,
/// }
///
/// static HEALTH_PROPERTIES: LazyLock<PropertyTable<Health>> = LazyLock::new(|| {
///     PropertyTable::new().with_field("Current", |h: &Health| &h.current, |h| &mut h.current)
/// });
///
/// impl PropertyContainer for Health {
///     fn property_ids(&self) -> Vec<StringId> {
///         HEALTH_PROPERTIES.ids().collect()
///     }
///     fn property(&self, id: StringId) -> Result<Property, PropertyError> {
///         HEALTH_PROPERTIES.get(self, id)
///     }
///     fn set_property(&mut self, id: StringId, value: Property) -> Result<(), PropertyError> {
///         HEALTH_PROPERTIES.set(self, id, value)
///     }
/// }
///
/// impl Component for Health {
///     fn type_name() -> &'static str { "Health" }
/// }
/// ```
pub trait Component: PropertyContainer + Send + Sync + 'static {
    /// A human-readable name for this component type.
    fn type_name() -> &'static str
    where
        Self: Sized;

    /// The interned [`type_name`](Component::type_name).
    fn component_type() -> ComponentType
    where
        Self: Sized,
    {
        sid(Self::type_name())
    }

    /// Called by the owning system right after the component is attached.
    fn on_added_to_entity(&mut self, _entity: EntityId) {}

    /// Called by the owning system right before the component is detached.
    fn on_removing_from_entity(&mut self, _entity: EntityId) {}
}
