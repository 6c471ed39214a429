//! Entity identifiers and allocation.
//!
//! An [`EntityId`] is a plain serial number with no data of its own.
//! Components are attached to entities by the entity systems.

use serde::{Deserialize, Serialize};

/// A unique entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The null / invalid entity sentinel.
    pub const INVALID: EntityId = EntityId(0);

    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` for any id other than [`EntityId::INVALID`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Hands out monotonically increasing entity ids, starting at 1.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    pub fn allocate(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        EntityId(id)
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id - 1
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_sentinel() {
        assert!(!EntityId::INVALID.is_valid());
        assert!(EntityId::from_raw(7).is_valid());
        assert_eq!(EntityId::from_raw(7).id(), 7);
    }

    #[test]
    fn test_allocator_starts_at_one() {
        let mut alloc = EntityAllocator::new();
        assert_eq!(alloc.allocate(), EntityId(1));
        assert_eq!(alloc.allocate(), EntityId(2));
        assert_eq!(alloc.count(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(EntityId(12).to_string(), "Entity(12)");
    }

    #[test]
    fn test_entity_json() {
        let json = serde_json::to_string(&EntityId(5)).unwrap();
        assert_eq!(json, "5");
    }
}
