//! Entity systems.
//!
//! An [`EntitySystem`] owns every component of one type, keyed by entity.
//! [`ComponentStore`] is the stock implementation used for plain data
//! components.

use std::collections::BTreeMap;

use engine_property::{ComponentType, PropertyAccess};
use tracing::debug;

use crate::component::Component;
use crate::entity::EntityId;
use crate::error::ComponentError;

/// Owner of all components of a single [`ComponentType`].
pub trait EntitySystem: Send + Sync {
    /// The component type this system manages.
    fn component_type(&self) -> ComponentType;

    /// Attaches a default-initialised component to `entity`.
    fn create_component(&mut self, entity: EntityId) -> Result<&mut dyn Component, ComponentError>;

    /// Detaches and drops the component of `entity`.
    fn delete_component(&mut self, entity: EntityId) -> Result<(), ComponentError>;

    fn has_component(&self, entity: EntityId) -> bool;

    fn component(&self, entity: EntityId) -> Option<&dyn Component>;

    fn component_mut(&mut self, entity: EntityId) -> Option<&mut dyn Component>;

    /// Every entity with a component in this system, in ascending order.
    fn entities(&self) -> Vec<EntityId>;
}

/// Stores components of type `C` by entity.
#[derive(Debug)]
pub struct ComponentStore<C> {
    components: BTreeMap<EntityId, C>,
}

impl<C: Component + Default> ComponentStore<C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            components: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<&C> {
        self.components.get(&entity)
    }

    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut C> {
        self.components.get_mut(&entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.components.iter().map(|(entity, c)| (*entity, c))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Attaches a copy of `source`'s component to `target`.
    ///
    /// The copy is built with
    /// [`clone_container`](PropertyAccess::clone_container), so only
    /// registered property values carry over.
    pub fn duplicate(&mut self, source: EntityId, target: EntityId) -> Result<&mut C, ComponentError> {
        if self.components.contains_key(&target) {
            return Err(ComponentError::DuplicateComponent {
                component_type: C::component_type(),
                entity: target,
            });
        }
        let original = self
            .components
            .get(&source)
            .ok_or(ComponentError::MissingComponent {
                component_type: C::component_type(),
                entity: source,
            })?;
        let mut copy: C = original.clone_container()?;
        copy.on_added_to_entity(target);
        debug!(component_type = %C::component_type(), %source, %target, "duplicated component");
        Ok(self.components.entry(target).or_insert(copy))
    }
}

impl<C: Component + Default> Default for ComponentStore<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Component + Default> EntitySystem for ComponentStore<C> {
    fn component_type(&self) -> ComponentType {
        C::component_type()
    }

    fn create_component(&mut self, entity: EntityId) -> Result<&mut dyn Component, ComponentError> {
        if self.components.contains_key(&entity) {
            return Err(ComponentError::DuplicateComponent {
                component_type: C::component_type(),
                entity,
            });
        }
        let mut component = C::default();
        component.on_added_to_entity(entity);
        debug!(component_type = %C::component_type(), %entity, "created component");
        let component: &mut dyn Component = self.components.entry(entity).or_insert(component);
        Ok(component)
    }

    fn delete_component(&mut self, entity: EntityId) -> Result<(), ComponentError> {
        let component = self
            .components
            .get_mut(&entity)
            .ok_or(ComponentError::MissingComponent {
                component_type: C::component_type(),
                entity,
            })?;
        component.on_removing_from_entity(entity);
        self.components.remove(&entity);
        debug!(component_type = %C::component_type(), %entity, "deleted component");
        Ok(())
    }

    fn has_component(&self, entity: EntityId) -> bool {
        self.components.contains_key(&entity)
    }

    fn component(&self, entity: EntityId) -> Option<&dyn Component> {
        self.components.get(&entity).map(|c| c as &dyn Component)
    }

    fn component_mut(&mut self, entity: EntityId) -> Option<&mut dyn Component> {
        self.components
            .get_mut(&entity)
            .map(|c| c as &mut dyn Component)
    }

    fn entities(&self) -> Vec<EntityId> {
        self.components.keys().copied().collect()
    }
}
