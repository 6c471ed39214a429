//! Entity-system factories and the plugin manager.
//!
//! Systems are not constructed directly by game code. Instead a
//! [`SystemFactory`] is registered per component type, and the
//! [`PluginManager`] starts systems on demand, dependencies first.

use std::collections::HashMap;
use std::marker::PhantomData;

use engine_property::{ComponentType, PropertyAccess, PropertyGroup};
use tracing::{debug, info, warn};

use crate::component::Component;
use crate::entity::EntityId;
use crate::error::ComponentError;
use crate::system::{ComponentStore, EntitySystem};

/// Creates the entity system for one component type.
pub trait SystemFactory: Send + Sync {
    /// The component type of the system this factory creates.
    fn component_type(&self) -> ComponentType;

    /// Human-readable description for tooling.
    fn description(&self) -> &str {
        ""
    }

    /// Component types whose systems must be running before this one starts.
    fn dependencies(&self) -> Vec<ComponentType> {
        Vec::new()
    }

    fn create(&self) -> Box<dyn EntitySystem>;
}

/// Factory producing a [`ComponentStore<C>`].
pub struct StoreFactory<C> {
    description: String,
    dependencies: Vec<ComponentType>,
    _component: PhantomData<fn() -> C>,
}

impl<C: Component + Default> StoreFactory<C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            description: String::new(),
            dependencies: Vec::new(),
            _component: PhantomData,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_dependency(mut self, component_type: ComponentType) -> Self {
        self.dependencies.push(component_type);
        self
    }
}

impl<C: Component + Default> Default for StoreFactory<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Component + Default> SystemFactory for StoreFactory<C> {
    fn component_type(&self) -> ComponentType {
        C::component_type()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn dependencies(&self) -> Vec<ComponentType> {
        self.dependencies.clone()
    }

    fn create(&self) -> Box<dyn EntitySystem> {
        Box::new(ComponentStore::<C>::new())
    }
}

/// Registry of system factories and of the systems currently running.
#[derive(Default)]
pub struct PluginManager {
    factories: HashMap<ComponentType, Box<dyn SystemFactory>>,
    systems: HashMap<ComponentType, Box<dyn EntitySystem>>,
    /// Running systems in the order they were started.
    start_order: Vec<ComponentType>,
}

impl PluginManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory, replacing any previous one for the same type.
    ///
    /// Returns `true` if a factory was replaced.
    pub fn add_factory(&mut self, factory: Box<dyn SystemFactory>) -> bool {
        let component_type = factory.component_type();
        debug!(%component_type, "registered system factory");
        self.factories.insert(component_type, factory).is_some()
    }

    /// Component types with a registered factory, with their descriptions.
    #[must_use]
    pub fn available(&self) -> Vec<(ComponentType, String)> {
        let mut available: Vec<_> = self
            .factories
            .values()
            .map(|f| (f.component_type(), f.description().to_owned()))
            .collect();
        available.sort_by_key(|(component_type, _)| component_type.to_string());
        available
    }

    #[must_use]
    pub fn has_factory(&self, component_type: ComponentType) -> bool {
        self.factories.contains_key(&component_type)
    }

    /// Starts the system for `component_type` and, before it, every system it
    /// depends on. Already running systems are left as they are.
    pub fn start(&mut self, component_type: ComponentType) -> Result<(), ComponentError> {
        let mut path = Vec::new();
        self.start_with_path(component_type, &mut path)
    }

    fn start_with_path(
        &mut self,
        component_type: ComponentType,
        path: &mut Vec<ComponentType>,
    ) -> Result<(), ComponentError> {
        if self.systems.contains_key(&component_type) {
            return Ok(());
        }
        if let Some(pos) = path.iter().position(|t| *t == component_type) {
            let mut cycle = path[pos..].to_vec();
            cycle.push(component_type);
            warn!(%component_type, "refusing to start system with cyclic dependencies");
            return Err(ComponentError::DependencyCycle(cycle));
        }

        let dependencies = self
            .factories
            .get(&component_type)
            .ok_or(ComponentError::UnknownFactory(component_type))?
            .dependencies();

        path.push(component_type);
        for dependency in dependencies {
            self.start_with_path(dependency, path)?;
        }
        path.pop();

        let system = self
            .factories
            .get(&component_type)
            .ok_or(ComponentError::UnknownFactory(component_type))?
            .create();
        self.systems.insert(component_type, system);
        self.start_order.push(component_type);
        info!(%component_type, "started entity system");
        Ok(())
    }

    /// Stops and drops a running system. Returns `false` if it was not running.
    pub fn stop(&mut self, component_type: ComponentType) -> bool {
        if self.systems.remove(&component_type).is_none() {
            return false;
        }
        self.start_order.retain(|t| *t != component_type);
        info!(%component_type, "stopped entity system");
        true
    }

    #[must_use]
    pub fn is_running(&self, component_type: ComponentType) -> bool {
        self.systems.contains_key(&component_type)
    }

    /// Running systems in start order.
    #[must_use]
    pub fn running(&self) -> &[ComponentType] {
        &self.start_order
    }

    #[must_use]
    pub fn system(&self, component_type: ComponentType) -> Option<&dyn EntitySystem> {
        self.systems.get(&component_type).map(|s| &**s)
    }

    pub fn system_mut(
        &mut self,
        component_type: ComponentType,
    ) -> Option<&mut (dyn EntitySystem + 'static)> {
        self.systems.get_mut(&component_type).map(|s| &mut **s)
    }

    fn running_system_mut(
        &mut self,
        component_type: ComponentType,
    ) -> Result<&mut (dyn EntitySystem + 'static), ComponentError> {
        self.system_mut(component_type)
            .ok_or(ComponentError::UnknownSystem(component_type))
    }

    /// Attaches a default component of `component_type` to `entity`.
    pub fn create_component(
        &mut self,
        component_type: ComponentType,
        entity: EntityId,
    ) -> Result<&mut dyn Component, ComponentError> {
        self.running_system_mut(component_type)?
            .create_component(entity)
    }

    pub fn delete_component(
        &mut self,
        component_type: ComponentType,
        entity: EntityId,
    ) -> Result<(), ComponentError> {
        self.running_system_mut(component_type)?
            .delete_component(entity)
    }

    /// Detaches every component of `entity`, in reverse start order.
    pub fn delete_entity(&mut self, entity: EntityId) -> usize {
        let mut removed = 0;
        for component_type in self.start_order.clone().into_iter().rev() {
            if let Some(system) = self.systems.get_mut(&component_type)
                && system.has_component(entity)
                && system.delete_component(entity).is_ok()
            {
                removed += 1;
            }
        }
        removed
    }

    /// Gives `target` a copy of every component `source` has.
    ///
    /// Values are copied through a property snapshot, so the copies share no
    /// storage with the originals. Returns the number of components copied.
    /// On error every component created for `target` is removed again.
    pub fn duplicate_entity(
        &mut self,
        source: EntityId,
        target: EntityId,
    ) -> Result<usize, ComponentError> {
        let mut edit = EntityEdit::new(target);
        match self.copy_components(source, &mut edit) {
            Ok(()) => {
                let copied = edit.created.len();
                debug!(%source, %target, copied, "duplicated entity");
                Ok(copied)
            }
            Err(err) => {
                self.rollback(edit);
                Err(err)
            }
        }
    }

    fn copy_components(&mut self, source: EntityId, edit: &mut EntityEdit) -> Result<(), ComponentError> {
        for component_type in self.start_order.clone() {
            let values = match self.component(component_type, source) {
                Ok(component) => component.to_group()?,
                Err(_) => continue,
            };
            let copy = self.create_component(component_type, edit.entity)?;
            edit.created.push(component_type);
            copy.init_from(&values)?;
            copy.finished();
        }
        Ok(())
    }

    /// Undoes a partially applied [`EntityEdit`]: created components are
    /// deleted in reverse order and overwritten ones get their old values back.
    pub(crate) fn rollback(&mut self, edit: EntityEdit) {
        let EntityEdit {
            entity,
            created,
            overwritten,
        } = edit;
        warn!(%entity, created = created.len(), "rolling back entity edit");
        for component_type in created.into_iter().rev() {
            let _ = self.delete_component(component_type, entity);
        }
        for (component_type, values) in overwritten.into_iter().rev() {
            if let Ok(component) = self.component_mut(component_type, entity) {
                let _ = component.init_from(&values);
                component.finished();
            }
        }
    }

    /// The component of `component_type` attached to `entity`.
    pub fn component(
        &self,
        component_type: ComponentType,
        entity: EntityId,
    ) -> Result<&dyn Component, ComponentError> {
        self.system(component_type)
            .ok_or(ComponentError::UnknownSystem(component_type))?
            .component(entity)
            .ok_or(ComponentError::MissingComponent {
                component_type,
                entity,
            })
    }

    pub fn component_mut(
        &mut self,
        component_type: ComponentType,
        entity: EntityId,
    ) -> Result<&mut dyn Component, ComponentError> {
        self.running_system_mut(component_type)?
            .component_mut(entity)
            .ok_or(ComponentError::MissingComponent {
                component_type,
                entity,
            })
    }
}

/// The components one multi-component operation has touched on an entity.
#[derive(Debug)]
pub(crate) struct EntityEdit {
    pub(crate) entity: EntityId,
    pub(crate) created: Vec<ComponentType>,
    /// Components that existed before, with their values at that time.
    pub(crate) overwritten: Vec<(ComponentType, PropertyGroup)>,
}

impl EntityEdit {
    pub(crate) fn new(entity: EntityId) -> Self {
        Self {
            entity,
            created: Vec::new(),
            overwritten: Vec::new(),
        }
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("factories", &self.factories.len())
            .field("running", &self.start_order)
            .finish()
    }
}
