//! Plugin start-up ordering and spawner behaviour.

use std::sync::{Arc, LazyLock};

use engine_component::{
    Component, ComponentError, EntityAllocator, EntityId, MapComponent, MapRegistry,
    PluginManager, Spawner, StoreFactory,
};
use engine_property::{
    Property, PropertyAccess, PropertyContainer, PropertyError, PropertyGroup, PropertyTable,
    StringId, sid,
};

#[derive(Debug, Default)]
struct Body {
    mass: f32,
    name: String,
    finished: u32,
}

static BODY_PROPERTIES: LazyLock<PropertyTable<Body>> = LazyLock::new(|| {
    PropertyTable::new()
        .with_field("Mass", |b: &Body| &b.mass, |b| &mut b.mass)
        .with_field("Name", |b: &Body| &b.name, |b| &mut b.name)
        .with_read_only("FinishedCount", |b: &Body| b.finished)
});

impl PropertyContainer for Body {
    fn property_ids(&self) -> Vec<StringId> {
        BODY_PROPERTIES.ids().collect()
    }

    fn property(&self, id: StringId) -> Result<Property, PropertyError> {
        BODY_PROPERTIES.get(self, id)
    }

    fn set_property(&mut self, id: StringId, value: Property) -> Result<(), PropertyError> {
        BODY_PROPERTIES.set(self, id, value)
    }

    fn finished(&mut self) {
        self.finished += 1;
    }
}

impl Component for Body {
    fn type_name() -> &'static str {
        "Body"
    }
}

#[derive(Debug, Default)]
struct Sensor {
    range: f64,
}

static SENSOR_PROPERTIES: LazyLock<PropertyTable<Sensor>> = LazyLock::new(|| {
    PropertyTable::new().with_field("Range", |s: &Sensor| &s.range, |s| &mut s.range)
});

impl PropertyContainer for Sensor {
    fn property_ids(&self) -> Vec<StringId> {
        SENSOR_PROPERTIES.ids().collect()
    }

    fn property(&self, id: StringId) -> Result<Property, PropertyError> {
        SENSOR_PROPERTIES.get(self, id)
    }

    fn set_property(&mut self, id: StringId, value: Property) -> Result<(), PropertyError> {
        SENSOR_PROPERTIES.set(self, id, value)
    }
}

impl Component for Sensor {
    fn type_name() -> &'static str {
        "Sensor"
    }
}

fn manager() -> PluginManager {
    let mut manager = PluginManager::new();
    manager.add_factory(Box::new(
        StoreFactory::<Body>::new().with_description("rigid bodies"),
    ));
    manager.add_factory(Box::new(
        StoreFactory::<Sensor>::new().with_dependency(Body::component_type()),
    ));
    manager
}

#[test]
fn dependencies_start_first() {
    let mut manager = manager();
    manager.start(Sensor::component_type()).unwrap();
    assert_eq!(
        manager.running(),
        &[Body::component_type(), Sensor::component_type()]
    );

    // Starting again is a no-op.
    manager.start(Body::component_type()).unwrap();
    assert_eq!(manager.running().len(), 2);
}

#[test]
fn available_lists_factories() {
    let manager = manager();
    let available = manager.available();
    assert_eq!(available.len(), 2);
    assert_eq!(
        available[0],
        (Body::component_type(), "rigid bodies".to_owned())
    );
}

#[test]
fn dependency_cycle_is_reported() {
    let mut manager = manager();
    manager.add_factory(Box::new(
        StoreFactory::<Body>::new().with_dependency(Sensor::component_type()),
    ));
    let err = manager.start(Sensor::component_type()).unwrap_err();
    assert_eq!(
        err,
        ComponentError::DependencyCycle(vec![
            Sensor::component_type(),
            Body::component_type(),
            Sensor::component_type(),
        ])
    );
    assert_eq!(err.to_string(), "dependency cycle: Sensor -> Body -> Sensor");
    assert!(manager.running().is_empty());
}

#[test]
fn unknown_factory_and_system() {
    let mut manager = manager();
    assert_eq!(
        manager.start(sid("Nope")),
        Err(ComponentError::UnknownFactory(sid("Nope")))
    );
    assert!(matches!(
        manager.create_component(Body::component_type(), EntityId(1)),
        Err(ComponentError::UnknownSystem(_))
    ));
}

#[test]
fn spawner_applies_inherited_values() {
    let mut manager = manager();
    let mut entities = EntityAllocator::new();

    let base = Arc::new(Spawner::new("crate").with_component(
        Body::component_type(),
        PropertyGroup::new()
            .with(sid("Mass"), 10.0f32)
            .with(sid("Name"), "crate"),
    ));
    let heavy = Spawner::new("heavy_crate")
        .with_parent(base)
        .with_component(
            Body::component_type(),
            PropertyGroup::new().with(sid("Mass"), 80.0f32),
        )
        .with_component(
            Sensor::component_type(),
            PropertyGroup::new().with(sid("Range"), 2.5f64),
        );

    assert_eq!(
        heavy.component_types(),
        vec![Body::component_type(), Sensor::component_type()]
    );

    let entity = entities.allocate();
    heavy.spawn(&mut manager, entity).unwrap();

    let body = manager.component(Body::component_type(), entity).unwrap();
    assert_eq!(body.get::<f32>(sid("Mass")).unwrap(), 80.0);
    assert_eq!(body.get::<String>(sid("Name")).unwrap(), "crate");
    assert_eq!(body.get::<u32>(sid("FinishedCount")).unwrap(), 1);

    let sensor = manager.component(Sensor::component_type(), entity).unwrap();
    assert_eq!(sensor.get::<f64>(sid("Range")).unwrap(), 2.5);
}

#[test]
fn spawner_rejects_mistyped_values() {
    let mut manager = manager();
    let spawner = Spawner::new("bad").with_component(
        Body::component_type(),
        PropertyGroup::new().with(sid("Mass"), "heavy"),
    );
    let err = spawner.spawn(&mut manager, EntityId(1)).unwrap_err();
    assert!(matches!(
        err,
        ComponentError::Property(PropertyError::TypeMismatch { .. })
    ));
    assert!(manager.component(Body::component_type(), EntityId(1)).is_err());
}

#[test]
fn failed_spawn_removes_components_it_created() {
    let mut manager = manager();
    let spawner = Spawner::new("half")
        .with_component(
            Body::component_type(),
            PropertyGroup::new().with(sid("Mass"), 2.0f32),
        )
        .with_component(
            Sensor::component_type(),
            PropertyGroup::new().with(sid("Range"), "far"),
        );
    let entity = EntityId(1);
    assert!(spawner.spawn(&mut manager, entity).is_err());
    assert!(manager.component(Body::component_type(), entity).is_err());
    assert!(manager.component(Sensor::component_type(), entity).is_err());
    assert_eq!(manager.delete_entity(entity), 0);
}

#[test]
fn failed_spawn_restores_reused_components() {
    let mut manager = manager();
    let entity = EntityId(1);
    manager.start(Body::component_type()).unwrap();
    manager
        .create_component(Body::component_type(), entity)
        .unwrap()
        .set(sid("Mass"), 5.0f32)
        .unwrap();

    let spawner = Spawner::new("overwrite")
        .with_component(
            Body::component_type(),
            PropertyGroup::new().with(sid("Mass"), 80.0f32),
        )
        .with_component(
            Sensor::component_type(),
            PropertyGroup::new().with(sid("Range"), 1i32),
        );
    assert!(spawner.spawn(&mut manager, entity).is_err());

    let body = manager.component(Body::component_type(), entity).unwrap();
    assert_eq!(body.get::<f32>(sid("Mass")).unwrap(), 5.0);
    assert!(manager.component(Sensor::component_type(), entity).is_err());
}

#[test]
fn spawner_keeps_insertion_order() {
    let spawner = Spawner::new("ordered")
        .with_component(sid("test_order_zeta"), PropertyGroup::new())
        .with_component(Sensor::component_type(), PropertyGroup::new())
        .with_component(sid("test_order_alpha"), PropertyGroup::new())
        .with_component(Sensor::component_type(), PropertyGroup::new());
    assert_eq!(
        spawner.component_types(),
        vec![
            sid("test_order_zeta"),
            Sensor::component_type(),
            sid("test_order_alpha"),
        ]
    );

    let child = Spawner::new("ordered_child")
        .with_parent(Arc::new(spawner))
        .with_component(Body::component_type(), PropertyGroup::new());
    assert_eq!(child.component_types().last(), Some(&Body::component_type()));
}

#[test]
fn delete_entity_detaches_everything() {
    let mut manager = manager();
    let spawner = Spawner::new("rover")
        .with_component(Body::component_type(), PropertyGroup::new())
        .with_component(Sensor::component_type(), PropertyGroup::new());
    let entity = EntityId(4);
    spawner.spawn(&mut manager, entity).unwrap();

    assert_eq!(manager.delete_entity(entity), 2);
    assert!(manager.component(Body::component_type(), entity).is_err());
    assert_eq!(manager.delete_entity(entity), 0);
}

#[test]
fn stop_drops_components() {
    let mut manager = manager();
    manager.start(Body::component_type()).unwrap();
    manager
        .create_component(Body::component_type(), EntityId(1))
        .unwrap();
    assert!(manager.stop(Body::component_type()));
    assert!(!manager.is_running(Body::component_type()));
    assert!(!manager.stop(Body::component_type()));
}

#[test]
fn duplicate_entity_copies_all_components() {
    let mut manager = manager();
    let spawner = Spawner::new("rover")
        .with_component(
            Body::component_type(),
            PropertyGroup::new().with(sid("Mass"), 3.0f32),
        )
        .with_component(
            Sensor::component_type(),
            PropertyGroup::new().with(sid("Range"), 9.0f64),
        );
    let source = EntityId(1);
    let target = EntityId(2);
    spawner.spawn(&mut manager, source).unwrap();

    assert_eq!(manager.duplicate_entity(source, target).unwrap(), 2);
    manager
        .component_mut(Body::component_type(), target)
        .unwrap()
        .set(sid("Mass"), 1.0f32)
        .unwrap();

    let original = manager.component(Body::component_type(), source).unwrap();
    assert_eq!(original.get::<f32>(sid("Mass")).unwrap(), 3.0);
    let copy = manager.component(Sensor::component_type(), target).unwrap();
    assert_eq!(copy.get::<f64>(sid("Range")).unwrap(), 9.0);
}

#[test]
fn failed_duplicate_leaves_target_as_it_was() {
    let mut manager = manager();
    let spawner = Spawner::new("pair")
        .with_component(Body::component_type(), PropertyGroup::new())
        .with_component(Sensor::component_type(), PropertyGroup::new());
    let source = EntityId(1);
    let target = EntityId(2);
    spawner.spawn(&mut manager, source).unwrap();
    manager
        .create_component(Sensor::component_type(), target)
        .unwrap();

    let err = manager.duplicate_entity(source, target).unwrap_err();
    assert!(matches!(err, ComponentError::DuplicateComponent { .. }));
    assert!(manager.component(Body::component_type(), target).is_err());
    assert!(manager.component(Sensor::component_type(), target).is_ok());
}

fn map_registry() -> MapRegistry {
    let mut registry = MapRegistry::new();
    let vehicle = Arc::new(Spawner::new("vehicle").with_component(
        Body::component_type(),
        PropertyGroup::new().with(sid("Mass"), 900.0f32),
    ));
    let truck = Arc::new(
        Spawner::new("truck")
            .with_parent(Arc::clone(&vehicle))
            .with_component(
                MapComponent::component_type(),
                PropertyGroup::new().with(sid(MapComponent::ENTITY_NAME), "Truck"),
            ),
    );
    let gate = Arc::new(Spawner::new("gate").with_component(
        MapComponent::component_type(),
        PropertyGroup::new().with(sid(MapComponent::UNIQUE_ID), "gate"),
    ));
    registry.add_spawner(vehicle);
    registry.add_spawner(truck);
    registry.add_spawner(gate);
    registry
}

#[test]
fn registry_spawn_records_origin() {
    let registry = map_registry();
    let mut manager = manager();
    registry.spawn(&mut manager, "truck", EntityId(1)).unwrap();
    registry.spawn(&mut manager, "vehicle", EntityId(2)).unwrap();

    let map = manager
        .component(MapComponent::component_type(), EntityId(1))
        .unwrap();
    assert_eq!(
        map.get::<String>(sid(MapComponent::SPAWNER_NAME)).unwrap(),
        "truck"
    );
    assert_eq!(
        map.get::<String>(sid(MapComponent::ENTITY_NAME)).unwrap(),
        "Truck"
    );
    let body = manager.component(Body::component_type(), EntityId(1)).unwrap();
    assert_eq!(body.get::<f32>(sid("Mass")).unwrap(), 900.0);

    assert!(registry.is_spawn_of(&manager, EntityId(1), "truck"));
    assert!(registry.is_spawn_of(&manager, EntityId(1), "vehicle"));
    assert!(!registry.is_spawn_of(&manager, EntityId(2), "truck"));
    assert!(!registry.is_spawn_of(&manager, EntityId(9), "vehicle"));

    assert_eq!(
        registry.spawner_created_entities(&manager, "vehicle", false),
        vec![EntityId(2)]
    );
    assert_eq!(
        registry.spawner_created_entities(&manager, "vehicle", true),
        vec![EntityId(1), EntityId(2)]
    );
}

#[test]
fn registry_unique_ids_get_suffixes() {
    let registry = map_registry();
    let mut manager = manager();
    registry.spawn(&mut manager, "gate", EntityId(1)).unwrap();
    registry.spawn(&mut manager, "gate", EntityId(2)).unwrap();

    assert_eq!(
        MapRegistry::unique_id(&manager, EntityId(2)).as_deref(),
        Some("gate_1")
    );
    assert_eq!(
        MapRegistry::entity_by_unique_id(&manager, "gate"),
        Some(EntityId(1))
    );
    assert_eq!(
        MapRegistry::entity_by_unique_id(&manager, "gate_1"),
        Some(EntityId(2))
    );
    assert_eq!(MapRegistry::entity_by_unique_id(&manager, ""), None);

    // Keeping the id it already has is not a collision.
    assert_eq!(
        MapRegistry::set_unique_id(&mut manager, EntityId(1), "gate").unwrap(),
        "gate"
    );
}

#[test]
fn registry_duplicate_gets_fresh_unique_id() {
    let registry = map_registry();
    let mut manager = manager();
    registry.spawn(&mut manager, "gate", EntityId(1)).unwrap();

    assert_eq!(
        MapRegistry::duplicate(&mut manager, EntityId(1), EntityId(2)).unwrap(),
        1
    );
    assert_eq!(
        MapRegistry::unique_id(&manager, EntityId(2)).as_deref(),
        Some("gate_1")
    );
    assert!(registry.is_spawn_of(&manager, EntityId(2), "gate"));
}

#[test]
fn registry_delete_spawner_clears_origin() {
    let mut registry = map_registry();
    let mut manager = manager();
    registry.spawn(&mut manager, "vehicle", EntityId(1)).unwrap();

    assert!(registry.delete_spawner(&mut manager, "vehicle"));
    assert!(!registry.delete_spawner(&mut manager, "vehicle"));
    assert_eq!(registry.spawner_names(), vec!["gate", "truck"]);
    assert!(!registry.is_spawn_of(&manager, EntityId(1), "vehicle"));
    let map = manager
        .component(MapComponent::component_type(), EntityId(1))
        .unwrap();
    assert_eq!(map.get::<String>(sid(MapComponent::SPAWNER_NAME)).unwrap(), "");
    assert_eq!(
        registry.spawn(&mut manager, "vehicle", EntityId(2)),
        Err(ComponentError::UnknownSpawner("vehicle".to_owned()))
    );
}
