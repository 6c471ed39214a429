//! Component and entity-system errors.

use engine_property::{ComponentType, PropertyError};

use crate::entity::EntityId;

/// Errors raised by entity systems, the plugin manager and spawners.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComponentError {
    /// No running entity system handles this component type.
    #[error("no entity system running for component type '{0}'")]
    UnknownSystem(ComponentType),

    /// No factory is registered for this component type.
    #[error("no factory registered for component type '{0}'")]
    UnknownFactory(ComponentType),

    /// No spawner is registered under this name.
    #[error("no spawner named '{0}'")]
    UnknownSpawner(String),

    /// Starting a system would require starting it again first.
    #[error("dependency cycle: {}", format_cycle(.0))]
    DependencyCycle(Vec<ComponentType>),

    /// The entity has no component of this type.
    #[error("{entity} has no '{component_type}' component")]
    MissingComponent {
        component_type: ComponentType,
        entity: EntityId,
    },

    /// The entity already has a component of this type.
    #[error("{entity} already has a '{component_type}' component")]
    DuplicateComponent {
        component_type: ComponentType,
        entity: EntityId,
    },

    /// A property could not be read or written.
    #[error(transparent)]
    Property(#[from] PropertyError),
}

fn format_cycle(path: &[ComponentType]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
