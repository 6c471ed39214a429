//! Hit-point component used by the demo prototypes.

use std::sync::LazyLock;

use engine_component::Component;
use engine_property::{Property, PropertyContainer, PropertyError, PropertyKind, PropertyTable, StringId, sid};

/// Current and maximum hit points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

static HEALTH_PROPERTIES: LazyLock<PropertyTable<Health>> = LazyLock::new(|| {
    PropertyTable::new()
        .with_field(Health::CURRENT, |h: &Health| &h.current, |h| &mut h.current)
        .with_field(Health::MAX, |h: &Health| &h.max, |h| &mut h.max)
        .with_read_only(Health::ALIVE, |h: &Health| h.is_alive())
});

impl Health {
    pub const CURRENT: &'static str = "Current";
    pub const MAX: &'static str = "Max";
    pub const ALIVE: &'static str = "Alive";

    /// Full health at `max` hit points.
    #[must_use]
    pub fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    fn clamp(&mut self) {
        self.max = self.max.max(0.0);
        self.current = self.current.clamp(0.0, self.max);
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::full(100.0)
    }
}

impl PropertyContainer for Health {
    fn property_ids(&self) -> Vec<StringId> {
        HEALTH_PROPERTIES.ids().collect()
    }

    fn property(&self, id: StringId) -> Result<Property, PropertyError> {
        HEALTH_PROPERTIES.get(self, id)
    }

    fn set_property(&mut self, id: StringId, value: Property) -> Result<(), PropertyError> {
        HEALTH_PROPERTIES.set(self, id, value)
    }

    fn property_kind(&self, id: StringId) -> Option<PropertyKind> {
        HEALTH_PROPERTIES.kind(id)
    }

    fn on_property_changed(&mut self, id: StringId) {
        if id == sid(Self::CURRENT) || id == sid(Self::MAX) {
            self.clamp();
        }
    }

    fn finished(&mut self) {
        self.clamp();
    }
}

impl Component for Health {
    fn type_name() -> &'static str {
        "Health"
    }
}
