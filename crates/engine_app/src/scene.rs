//! Builds the demo scene: systems, prototypes, spawned entities.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use engine_component::{
    Component, ComponentError, EntityAllocator, EntityId, MapComponent, MapRegistry,
    PluginManager, Spawner, StoreFactory,
};
use engine_log::{LogLevel, LogManager, log_message};
use engine_math::{Transform3D, Vec3};
use engine_property::{PropertyAccess, PropertyError, PropertyGroup, StringId, sid};
use serde::Serialize;
use tracing::debug;

use crate::config::{AppConfig, PropertyOverride, parse_value};
use crate::health::Health;

/// All component values of one entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntitySnapshot {
    pub entity: EntityId,
    pub components: BTreeMap<StringId, PropertyGroup>,
}

/// A plugin manager with factories for every demo component.
pub fn plugin_manager() -> PluginManager {
    let mut manager = PluginManager::new();
    manager.add_factory(Box::new(
        StoreFactory::<Transform3D>::new().with_description("position, rotation and scale"),
    ));
    manager.add_factory(Box::new(
        StoreFactory::<Health>::new()
            .with_description("hit points")
            .with_dependency(Transform3D::component_type()),
    ));
    manager
}

/// A registry holding the demo prototypes.
pub fn map_registry() -> MapRegistry {
    let crate_spawner = Arc::new(Spawner::new("crate").with_component(
        Transform3D::component_type(),
        PropertyGroup::new().with(sid(Transform3D::SCALE), Vec3::splat(0.5)),
    ));
    let actor = Arc::new(
        Spawner::new("actor")
            .with_component(Transform3D::component_type(), PropertyGroup::new())
            .with_component(
                Health::component_type(),
                PropertyGroup::new()
                    .with(sid(Health::MAX), 100.0f32)
                    .with(sid(Health::CURRENT), 100.0f32),
            ),
    );
    let soldier = Arc::new(
        Spawner::new("soldier")
            .with_parent(Arc::clone(&actor))
            .with_component(
                Health::component_type(),
                PropertyGroup::new()
                    .with(sid(Health::MAX), 150.0f32)
                    .with(sid(Health::CURRENT), 150.0f32),
            ),
    );

    let mut registry = MapRegistry::new();
    for spawner in [crate_spawner, actor, soldier] {
        registry.add_spawner(spawner);
    }
    registry
}

/// Writes each override into the matching component of `entity`, parsing
/// the raw value according to the property's registered kind.
pub fn apply_overrides(
    manager: &mut PluginManager,
    entity: EntityId,
    overrides: &[PropertyOverride],
) -> Result<()> {
    for o in overrides {
        let component = manager
            .component_mut(sid(&o.component), entity)
            .with_context(|| format!("applying {}.{}", o.component, o.property))?;
        let id = sid(&o.property);
        let kind = component
            .property_kind(id)
            .ok_or(PropertyError::NotFound(id))
            .with_context(|| format!("applying {}.{}", o.component, o.property))?;
        let value = parse_value(kind, &o.value).map_err(anyhow::Error::msg)?;
        component.set_property(id, value)?;
        component.on_property_changed(id);
        debug!(%entity, component = %o.component, property = %o.property, "applied override");
    }
    Ok(())
}

/// Snapshots every component attached to `entity`.
pub fn snapshot(manager: &PluginManager, entity: EntityId) -> Result<EntitySnapshot, ComponentError> {
    let mut components = BTreeMap::new();
    for &component_type in manager.running() {
        if let Ok(component) = manager.component(component_type, entity) {
            components.insert(component_type, component.to_group()?);
        }
    }
    Ok(EntitySnapshot { entity, components })
}

/// Spawns `config.count` entities, applies the overrides, duplicates the
/// first entity and returns a snapshot of every entity.
///
/// Spawned entities are named `<spawner> <n>`.
pub fn run(config: &AppConfig, log: &LogManager) -> Result<Vec<EntitySnapshot>> {
    let registry = map_registry();
    let spawner = registry
        .spawner(&config.spawner)
        .with_context(|| format!("unknown spawner '{}'", config.spawner))?;

    let mut manager = plugin_manager();
    let mut allocator = EntityAllocator::new();
    let mut entities = Vec::new();

    for _ in 0..config.count {
        let entity = allocator.allocate();
        registry.spawn(&mut manager, spawner.name(), entity)?;
        manager
            .component_mut(MapComponent::component_type(), entity)?
            .set(
                sid(MapComponent::ENTITY_NAME),
                format!("{} {}", spawner.name(), entities.len() + 1),
            )?;
        apply_overrides(&mut manager, entity, &config.overrides)?;
        entities.push(entity);
    }
    log_message!(
        log,
        LogLevel::Info,
        "spawned {} '{}' entities",
        entities.len(),
        spawner.name()
    );

    if let Some(&first) = entities.first() {
        let copy = allocator.allocate();
        let copied = MapRegistry::duplicate(&mut manager, first, copy)?;
        log_message!(
            log,
            LogLevel::Debug,
            "duplicated {first} onto {copy} ({copied} components)"
        );
        entities.push(copy);

        let transform: Transform3D = manager
            .component(Transform3D::component_type(), first)?
            .clone_container()?;
        if transform.scale.min_element() <= 0.0 {
            log_message!(log, LogLevel::Warning, "{first} has a degenerate scale");
        }
    }

    entities
        .into_iter()
        .map(|entity| snapshot(&manager, entity).map_err(Into::into))
        .collect()
}
