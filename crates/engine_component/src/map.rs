//! Map bookkeeping: entity names, unique ids and the spawner registry.
//!
//! Every entity spawned through a [`MapRegistry`] gets a [`MapComponent`]
//! recording its display name, a unique id that survives save and load, and
//! the name of the spawner it came from. The component lives in the plugin
//! manager like any other; the registry answers queries by reading it back
//! through its properties.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use engine_property::{
    Property, PropertyAccess, PropertyContainer, PropertyError, PropertyKind, PropertyTable,
    StringId, sid,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::component::Component;
use crate::entity::EntityId;
use crate::error::ComponentError;
use crate::plugin::{PluginManager, StoreFactory};
use crate::spawner::Spawner;

/// Map-level identity of an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct MapComponent {
    pub entity_name: String,
    /// Defaults to a fresh UUID.
    pub unique_id: String,
    /// Empty if the entity was not spawned through a registered spawner.
    pub spawner_name: String,
    pub save_with_map: bool,
    pub visible_in_entity_list: bool,
}

static MAP_PROPERTIES: LazyLock<PropertyTable<MapComponent>> = LazyLock::new(|| {
    PropertyTable::new()
        .with_field(
            MapComponent::ENTITY_NAME,
            |m: &MapComponent| &m.entity_name,
            |m| &mut m.entity_name,
        )
        .with_field(
            MapComponent::UNIQUE_ID,
            |m: &MapComponent| &m.unique_id,
            |m| &mut m.unique_id,
        )
        .with_field(
            MapComponent::SPAWNER_NAME,
            |m: &MapComponent| &m.spawner_name,
            |m| &mut m.spawner_name,
        )
        .with_field(
            MapComponent::SAVE_WITH_MAP,
            |m: &MapComponent| &m.save_with_map,
            |m| &mut m.save_with_map,
        )
        .with_field(
            MapComponent::VISIBLE_IN_ENTITY_LIST,
            |m: &MapComponent| &m.visible_in_entity_list,
            |m| &mut m.visible_in_entity_list,
        )
});

impl MapComponent {
    pub const ENTITY_NAME: &'static str = "EntityName";
    pub const UNIQUE_ID: &'static str = "UniqueId";
    pub const SPAWNER_NAME: &'static str = "SpawnerName";
    pub const SAVE_WITH_MAP: &'static str = "SaveWithMap";
    pub const VISIBLE_IN_ENTITY_LIST: &'static str = "VisibleInEntityList";
}

impl Default for MapComponent {
    fn default() -> Self {
        Self {
            entity_name: String::new(),
            unique_id: Uuid::new_v4().to_string(),
            spawner_name: String::new(),
            save_with_map: true,
            visible_in_entity_list: true,
        }
    }
}

impl PropertyContainer for MapComponent {
    fn property_ids(&self) -> Vec<StringId> {
        MAP_PROPERTIES.ids().collect()
    }

    fn property(&self, id: StringId) -> Result<Property, PropertyError> {
        MAP_PROPERTIES.get(self, id)
    }

    fn set_property(&mut self, id: StringId, value: Property) -> Result<(), PropertyError> {
        MAP_PROPERTIES.set(self, id, value)
    }

    fn property_kind(&self, id: StringId) -> Option<PropertyKind> {
        MAP_PROPERTIES.kind(id)
    }
}

impl Component for MapComponent {
    fn type_name() -> &'static str {
        "Map"
    }
}

fn string_property(component: &dyn Component, name: &str) -> String {
    component.get::<String>(sid(name)).unwrap_or_default()
}

/// Registered spawners, by name, plus queries over [`MapComponent`]s.
#[derive(Debug, Default)]
pub struct MapRegistry {
    spawners: BTreeMap<String, Arc<Spawner>>,
}

impl MapRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `spawner` under its name, returning the one it replaced.
    pub fn add_spawner(&mut self, spawner: Arc<Spawner>) -> Option<Arc<Spawner>> {
        info!(spawner = spawner.name(), "added spawner");
        self.spawners.insert(spawner.name().to_owned(), spawner)
    }

    /// Unregisters a spawner and clears the spawner name of every entity it
    /// created. Returns `false` if no spawner had that name.
    pub fn delete_spawner(&mut self, manager: &mut PluginManager, name: &str) -> bool {
        if self.spawners.remove(name).is_none() {
            return false;
        }
        let spawned: Vec<EntityId> = Self::map_components(manager)
            .filter(|(_, component)| string_property(*component, MapComponent::SPAWNER_NAME) == name)
            .map(|(entity, _)| entity)
            .collect();
        for entity in spawned {
            if let Ok(component) = manager.component_mut(MapComponent::component_type(), entity) {
                let _ = component.set(sid(MapComponent::SPAWNER_NAME), String::new());
            }
        }
        info!(spawner = name, "deleted spawner");
        true
    }

    #[must_use]
    pub fn spawner(&self, name: &str) -> Option<&Arc<Spawner>> {
        self.spawners.get(name)
    }

    /// Names of all registered spawners, sorted.
    #[must_use]
    pub fn spawner_names(&self) -> Vec<&str> {
        self.spawners.keys().map(String::as_str).collect()
    }

    /// Builds `entity` from the spawner registered as `name` and records the
    /// origin in its [`MapComponent`].
    ///
    /// The map system is registered and started on first use. If the spawner
    /// sets a `UniqueId` another entity already holds, a numeric suffix is
    /// appended (see [`set_unique_id`](Self::set_unique_id)).
    pub fn spawn(
        &self,
        manager: &mut PluginManager,
        name: &str,
        entity: EntityId,
    ) -> Result<(), ComponentError> {
        let spawner = self
            .spawner(name)
            .ok_or_else(|| ComponentError::UnknownSpawner(name.to_owned()))?;

        let map = MapComponent::component_type();
        if !manager.has_factory(map) {
            manager.add_factory(Box::new(
                StoreFactory::<MapComponent>::new()
                    .with_description("entity names, unique ids and spawner origin"),
            ));
        }
        manager.start(map)?;

        spawner.spawn(manager, entity)?;
        if manager.component(map, entity).is_err() {
            manager.create_component(map, entity)?;
        }
        manager
            .component_mut(map, entity)?
            .set(sid(MapComponent::SPAWNER_NAME), spawner.name().to_owned())?;
        let requested = Self::unique_id(manager, entity).unwrap_or_default();
        Self::set_unique_id(manager, entity, &requested)?;
        debug!(spawner = name, %entity, "spawned map entity");
        Ok(())
    }

    /// Duplicates `source` onto `target` like
    /// [`PluginManager::duplicate_entity`], then gives the copy its own
    /// unique id derived from the source's.
    pub fn duplicate(
        manager: &mut PluginManager,
        source: EntityId,
        target: EntityId,
    ) -> Result<usize, ComponentError> {
        let copied = manager.duplicate_entity(source, target)?;
        if let Some(unique_id) = Self::unique_id(manager, target) {
            Self::set_unique_id(manager, target, &unique_id)?;
        }
        Ok(copied)
    }

    fn map_components(
        manager: &PluginManager,
    ) -> impl Iterator<Item = (EntityId, &dyn Component)> + '_ {
        manager
            .system(MapComponent::component_type())
            .into_iter()
            .flat_map(|system| {
                system
                    .entities()
                    .into_iter()
                    .filter_map(move |entity| system.component(entity).map(|c| (entity, c)))
            })
    }

    /// The entity holding `unique_id`. Empty ids match nothing.
    #[must_use]
    pub fn entity_by_unique_id(manager: &PluginManager, unique_id: &str) -> Option<EntityId> {
        if unique_id.is_empty() {
            return None;
        }
        Self::map_components(manager)
            .find(|(_, component)| string_property(*component, MapComponent::UNIQUE_ID) == unique_id)
            .map(|(entity, _)| entity)
    }

    #[must_use]
    pub fn unique_id(manager: &PluginManager, entity: EntityId) -> Option<String> {
        let component = manager
            .component(MapComponent::component_type(), entity)
            .ok()?;
        Some(string_property(component, MapComponent::UNIQUE_ID))
    }

    /// Assigns `unique_id` to the map component of `entity`.
    ///
    /// If another entity holds it already, `_1`, `_2`, ... is appended until
    /// the id is free. Returns the id actually assigned.
    pub fn set_unique_id(
        manager: &mut PluginManager,
        entity: EntityId,
        unique_id: &str,
    ) -> Result<String, ComponentError> {
        let mut candidate = unique_id.to_owned();
        let mut suffix = 0;
        while matches!(
            Self::entity_by_unique_id(manager, &candidate),
            Some(holder) if holder != entity
        ) {
            suffix += 1;
            candidate = format!("{unique_id}_{suffix}");
        }
        manager
            .component_mut(MapComponent::component_type(), entity)?
            .set(sid(MapComponent::UNIQUE_ID), candidate.clone())?;
        Ok(candidate)
    }

    /// Returns `true` if `entity` was spawned by `spawner_name` or by a
    /// spawner inheriting from it.
    #[must_use]
    pub fn is_spawn_of(&self, manager: &PluginManager, entity: EntityId, spawner_name: &str) -> bool {
        manager
            .component(MapComponent::component_type(), entity)
            .is_ok_and(|component| self.descends_from(component, spawner_name, true))
    }

    /// Entities spawned by `spawner_name`. With `recursive`, entities of
    /// spawners inheriting from it are included.
    #[must_use]
    pub fn spawner_created_entities(
        &self,
        manager: &PluginManager,
        spawner_name: &str,
        recursive: bool,
    ) -> Vec<EntityId> {
        Self::map_components(manager)
            .filter(|(_, component)| self.descends_from(*component, spawner_name, recursive))
            .map(|(entity, _)| entity)
            .collect()
    }

    fn descends_from(&self, component: &dyn Component, spawner_name: &str, recursive: bool) -> bool {
        let own = string_property(component, MapComponent::SPAWNER_NAME);
        let mut current = self.spawner(&own).cloned();
        while let Some(spawner) = current {
            if spawner.name() == spawner_name {
                return true;
            }
            if !recursive {
                break;
            }
            current = spawner.parent().cloned();
        }
        false
    }
}
