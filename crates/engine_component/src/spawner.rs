//! Entity prototypes.
//!
//! A [`Spawner`] describes an entity as a set of component types plus the
//! property values each component starts with. Spawners can inherit from a
//! parent spawner; the child's values override the parent's.

use std::sync::Arc;

use engine_property::{ComponentType, PropertyAccess, PropertyGroup};
use tracing::debug;

use crate::entity::EntityId;
use crate::error::ComponentError;
use crate::plugin::{EntityEdit, PluginManager};

/// A named entity prototype.
#[derive(Debug, Clone)]
pub struct Spawner {
    name: String,
    parent: Option<Arc<Spawner>>,
    /// Component types in the order they were added.
    components: Vec<(ComponentType, PropertyGroup)>,
}

impl Spawner {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            components: Vec::new(),
        }
    }

    /// Inherit components and values from `parent`.
    #[must_use]
    pub fn with_parent(mut self, parent: Arc<Spawner>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Adds a component type with its initial values.
    ///
    /// Values for the same component type accumulate; later values for the
    /// same property replace earlier ones.
    #[must_use]
    pub fn with_component(mut self, component_type: ComponentType, values: PropertyGroup) -> Self {
        self.add_component(component_type, values);
        self
    }

    pub fn add_component(&mut self, component_type: ComponentType, values: PropertyGroup) {
        match self.own_values_mut(component_type) {
            Some(entry) => {
                for (id, value) in values.iter() {
                    entry.insert(id, value.clone());
                }
            }
            None => self.components.push((component_type, values)),
        }
    }

    fn own_values(&self, component_type: ComponentType) -> Option<&PropertyGroup> {
        self.components
            .iter()
            .find(|(t, _)| *t == component_type)
            .map(|(_, values)| values)
    }

    fn own_values_mut(&mut self, component_type: ComponentType) -> Option<&mut PropertyGroup> {
        self.components
            .iter_mut()
            .find(|(t, _)| *t == component_type)
            .map(|(_, values)| values)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Arc<Spawner>> {
        self.parent.as_ref()
    }

    /// Component types this spawner creates, ancestors' types first.
    #[must_use]
    pub fn component_types(&self) -> Vec<ComponentType> {
        let mut types = self
            .parent
            .as_ref()
            .map(|parent| parent.component_types())
            .unwrap_or_default();
        for (component_type, _) in &self.components {
            if !types.contains(component_type) {
                types.push(*component_type);
            }
        }
        types
    }

    /// Initial values for `component_type`, merged along the parent chain.
    #[must_use]
    pub fn values(&self, component_type: ComponentType) -> PropertyGroup {
        let mut merged = self
            .parent
            .as_ref()
            .map(|parent| parent.values(component_type))
            .unwrap_or_default();
        if let Some(own) = self.own_values(component_type) {
            for (id, value) in own.iter() {
                merged.insert(id, value.clone());
            }
        }
        merged
    }

    /// Builds the prototype's components on `entity`.
    ///
    /// Missing systems are started through `manager`. Components are created
    /// in the order they were added, ancestors first. Components the entity
    /// already has are reused and overwritten. Each component gets its values
    /// through `init_from` followed by a `finished()` call.
    ///
    /// On error the entity is put back as it was: components created by this
    /// call are deleted and reused ones get their previous values back.
    /// Systems started along the way keep running.
    pub fn spawn(&self, manager: &mut PluginManager, entity: EntityId) -> Result<(), ComponentError> {
        let mut edit = EntityEdit::new(entity);
        if let Err(err) = self.apply(manager, &mut edit) {
            manager.rollback(edit);
            return Err(err);
        }
        debug!(spawner = %self.name, %entity, "spawned entity");
        Ok(())
    }

    fn apply(&self, manager: &mut PluginManager, edit: &mut EntityEdit) -> Result<(), ComponentError> {
        let entity = edit.entity;
        for component_type in self.component_types() {
            manager.start(component_type)?;
            let values = self.values(component_type);
            let component = if manager.component(component_type, entity).is_ok() {
                let component = manager.component_mut(component_type, entity)?;
                edit.overwritten.push((component_type, component.to_group()?));
                component
            } else {
                let component = manager.create_component(component_type, entity)?;
                edit.created.push(component_type);
                component
            };
            component.init_from(&values)?;
            component.finished();
        }
        Ok(())
    }
}
