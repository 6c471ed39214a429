//! Symbolic identifiers.
//!
//! A [`StringId`] is an interned handle for a name string. Property names,
//! component types and message types are all identified this way so that
//! lookups compare and hash a single `u32` instead of a string.
//!
//! Ids are allocated sequentially by a single process-wide table, so two
//! different strings can never share an id. Ids are only meaningful inside the process
//! that created them; anything persisted (see the `serde` impls below) is
//! written as the source string and re-interned on load.

use std::fmt;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use dashmap::DashMap;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An interned name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId(u32);

/// Identifies a component type (and the entity system owning it).
pub type ComponentType = StringId;

/// Identifies a message type.
pub type MessageType = StringId;

static GLOBAL: LazyLock<StringTable> = LazyLock::new(StringTable::new);

/// Interns `name` in the process-wide table.
///
/// Shorthand for [`StringId::new`].
pub fn sid(name: &str) -> StringId {
    GLOBAL.intern(name)
}

impl StringId {
    /// Interns `name` in the process-wide table.
    pub fn new(name: &str) -> Self {
        sid(name)
    }

    /// Returns the raw interned index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Returns the id of `name` if it has been interned, without interning it.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        GLOBAL.lookup(name)
    }

    /// Resolves the source string in the process-wide table.
    ///
    /// Every `StringId` is handed out by that table, so this is `Some` for
    /// any id obtained through [`sid`], [`StringId::new`] or deserialization.
    #[must_use]
    pub fn resolve(self) -> Option<Arc<str>> {
        GLOBAL.resolve(self)
    }
}

/// The id of the empty string.
impl Default for StringId {
    fn default() -> Self {
        sid("")
    }
}

impl From<&str> for StringId {
    fn from(name: &str) -> Self {
        sid(name)
    }
}

impl fmt::Display for StringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resolve() {
            Some(name) => f.write_str(&name),
            None => write!(f, "#{}", self.0),
        }
    }
}

impl Serialize for StringId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let name = self
            .resolve()
            .ok_or_else(|| S::Error::custom(format!("string id #{} is not interned", self.0)))?;
        serializer.serialize_str(&name)
    }
}

impl<'de> Deserialize<'de> for StringId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(sid(&name))
    }
}

/// A bidirectional name ↔ id table.
///
/// Only the process-wide instance hands ids to callers outside this module;
/// private instances exist for tests, whose ids would otherwise resolve
/// against the wrong table.
///
/// Interning is safe from any thread: the forward map is sharded and the
/// allocation of a new id happens while the shard entry is held, so two
/// threads racing on the same new name observe the same id.
#[derive(Debug, Default)]
pub(crate) struct StringTable {
    ids: DashMap<Arc<str>, StringId>,
    names: RwLock<Vec<Arc<str>>>,
}

impl StringTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name`, allocating the next free id on first use.
    pub fn intern(&self, name: &str) -> StringId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        *self.ids.entry(Arc::from(name)).or_insert_with(|| {
            let mut names = self.names.write().unwrap_or_else(PoisonError::into_inner);
            let id = StringId(names.len() as u32);
            names.push(Arc::from(name));
            id
        })
    }

    /// Returns the id for `name` without interning it.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<StringId> {
        self.ids.get(name).map(|id| *id)
    }

    /// Returns the string an id was interned from.
    #[must_use]
    pub fn resolve(&self, id: StringId) -> Option<Arc<str>> {
        let names = self.names.read().unwrap_or_else(PoisonError::into_inner);
        names.get(id.0 as usize).cloned()
    }

    /// Number of distinct strings interned so far.
    #[cfg(test)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing has been interned yet.
    #[cfg(test)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_id() {
        let table = StringTable::new();
        let a = table.intern("Position");
        let b = table.intern("Position");
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_different_names_different_ids() {
        let table = StringTable::new();
        let a = table.intern("Position");
        let b = table.intern("Rotation");
        let c = table.intern("");
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_ids_are_sequential() {
        let table = StringTable::new();
        assert_eq!(table.intern("a").index(), 0);
        assert_eq!(table.intern("b").index(), 1);
        assert_eq!(table.intern("a").index(), 0);
        assert_eq!(table.intern("c").index(), 2);
    }

    #[test]
    fn test_lookup_does_not_intern() {
        let table = StringTable::new();
        assert_eq!(table.lookup("Scale"), None);
        assert!(table.is_empty());
        let id = table.intern("Scale");
        assert_eq!(table.lookup("Scale"), Some(id));
    }

    #[test]
    fn test_resolve_round_trip() {
        let table = StringTable::new();
        let id = table.intern("EntityName");
        assert_eq!(table.resolve(id).as_deref(), Some("EntityName"));
    }

    #[test]
    fn test_global_sid_display() {
        let id = sid("test_global_sid_display");
        assert_eq!(id, StringId::new("test_global_sid_display"));
        assert_eq!(id.to_string(), "test_global_sid_display");
        assert_eq!(StringId::from("test_global_sid_display"), id);
    }

    #[test]
    fn test_concurrent_interning_agrees() {
        let table = Arc::new(StringTable::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = Arc::clone(&table);
                std::thread::spawn(move || {
                    (0..100)
                        .map(|i| table.intern(&format!("name-{i}")))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let results: Vec<Vec<StringId>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        for other in &results[1..] {
            assert_eq!(&results[0], other);
        }
        assert_eq!(table.len(), 100);
    }

    #[test]
    fn test_private_table_does_not_leak_into_global() {
        let first = sid("test_private_table_global_first");
        let table = StringTable::new();
        let private = table.intern("test_private_table_only_name");
        assert_eq!(private.index(), 0);
        assert_eq!(StringId::lookup("test_private_table_only_name"), None);
        assert_eq!(
            first.resolve().as_deref(),
            Some("test_private_table_global_first")
        );
    }

    #[test]
    fn test_lookup_does_not_intern_globally() {
        assert_eq!(StringId::lookup("test_lookup_never_interned"), None);
        let id = sid("test_lookup_interned");
        assert_eq!(StringId::lookup("test_lookup_interned"), Some(id));
    }

    #[test]
    fn test_serializes_as_name() {
        let id = sid("MapName");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"MapName\"");
        let restored: StringId = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, id);
    }
}
