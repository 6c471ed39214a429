//! Property containers.
//!
//! A container exposes the typed values of an object under symbolic
//! identifiers so that scripting, persistence and editors can read and write
//! them without knowing the concrete type.
//!
//! Concrete types usually describe their properties once, in a static
//! [`PropertyTable`], and implement [`PropertyContainer`] by delegating to it:
//!
//! ```rust
//! use std::sync::LazyLock;
//! use engine_property::{PropertyAccess, PropertyContainer, PropertyError, PropertyTable, Property, StringId, sid};
//!
//! #[derive(Default)]
//! struct Light {
//!     intensity: f32,
//! }
//!
//! static LIGHT_PROPERTIES: LazyLock<PropertyTable<Light>> = LazyLock::new(|| {
//!     PropertyTable::new().with_field("Intensity", |l: &Light| &l.intensity, |l| &mut l.intensity)
//! });
//!
//! impl PropertyContainer for Light {
//!     fn property_ids(&self) -> Vec<StringId> {
//!         LIGHT_PROPERTIES.ids().collect()
//!     }
//!     fn property(&self, id: StringId) -> Result<Property, PropertyError> {
//!         LIGHT_PROPERTIES.get(self, id)
//!     }
//!     fn set_property(&mut self, id: StringId, value: Property) -> Result<(), PropertyError> {
//!         LIGHT_PROPERTIES.set(self, id, value)
//!     }
//! }
//!
//! let mut light = Light::default();
//! light.set(sid("Intensity"), 0.5f32).unwrap();
//! assert_eq!(light.get::<f32>(sid("Intensity")).unwrap(), 0.5);
//! ```

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::PropertyError;
use crate::property::{Property, PropertyGroup, PropertyKind, PropertyValue};
use crate::stringid::StringId;

type Getter<T> = Box<dyn Fn(&T) -> Property + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Property) + Send + Sync>;

struct Accessor<T> {
    kind: PropertyKind,
    get: Getter<T>,
    /// `None` for read-only properties.
    set: Option<Setter<T>>,
    /// Derived views are reachable by id but left out of [`PropertyTable::ids`].
    derived: bool,
}

/// The registered properties of a type `T`, in registration order.
///
/// Each entry pairs an identifier with a getter and (optionally) a setter
/// operating on a `T`. Registration happens once per type; instances share
/// the table, so values always live in the owning struct itself.
pub struct PropertyTable<T> {
    entries: Vec<(StringId, Accessor<T>)>,
    index: HashMap<StringId, usize>,
}

impl<T: 'static> PropertyTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registers a stored field, reached through a pair of lenses.
    pub fn register<V>(
        &mut self,
        id: impl Into<StringId>,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> Result<(), PropertyError>
    where
        V: PropertyValue + Clone + 'static,
    {
        self.insert(
            id.into(),
            Accessor {
                kind: V::KIND,
                get: Box::new(move |owner: &T| get(owner).clone().into_property()),
                set: Some(Box::new(move |owner: &mut T, value: Property| {
                    if let Some(value) = V::from_property(value) {
                        *get_mut(owner) = value;
                    }
                })),
                derived: false,
            },
        )
    }

    /// Registers a computed property whose reads and writes go through
    /// callbacks instead of a stored field.
    pub fn register_dynamic<V>(
        &mut self,
        id: impl Into<StringId>,
        getter: fn(&T) -> V,
        setter: fn(&mut T, V),
    ) -> Result<(), PropertyError>
    where
        V: PropertyValue + 'static,
    {
        self.insert(id.into(), Self::computed(getter, setter, false))
    }

    /// Registers a computed view over state other properties already expose,
    /// such as Euler angles over a stored quaternion.
    ///
    /// A derived property reads and writes like a dynamic one but is not
    /// listed by [`ids`](Self::ids). Copies and snapshots therefore carry the
    /// underlying state once, instead of writing it a second time through a
    /// lossy conversion.
    pub fn register_derived<V>(
        &mut self,
        id: impl Into<StringId>,
        getter: fn(&T) -> V,
        setter: fn(&mut T, V),
    ) -> Result<(), PropertyError>
    where
        V: PropertyValue + 'static,
    {
        self.insert(id.into(), Self::computed(getter, setter, true))
    }

    fn computed<V>(getter: fn(&T) -> V, setter: fn(&mut T, V), derived: bool) -> Accessor<T>
    where
        V: PropertyValue + 'static,
    {
        Accessor {
            kind: V::KIND,
            get: Box::new(move |owner: &T| getter(owner).into_property()),
            set: Some(Box::new(move |owner: &mut T, value: Property| {
                if let Some(value) = V::from_property(value) {
                    setter(owner, value);
                }
            })),
            derived,
        }
    }

    /// Registers a computed property that rejects writes.
    pub fn register_read_only<V>(
        &mut self,
        id: impl Into<StringId>,
        getter: fn(&T) -> V,
    ) -> Result<(), PropertyError>
    where
        V: PropertyValue + 'static,
    {
        self.insert(
            id.into(),
            Accessor {
                kind: V::KIND,
                get: Box::new(move |owner: &T| getter(owner).into_property()),
                set: None,
                derived: false,
            },
        )
    }

    /// Builder form of [`register`](Self::register).
    ///
    /// # Panics
    ///
    /// Panics if `id` is already registered.
    #[must_use]
    pub fn with_field<V>(
        mut self,
        id: impl Into<StringId>,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> Self
    where
        V: PropertyValue + Clone + 'static,
    {
        if let Err(err) = self.register(id, get, get_mut) {
            panic!("{err}");
        }
        self
    }

    /// Builder form of [`register_dynamic`](Self::register_dynamic).
    ///
    /// # Panics
    ///
    /// Panics if `id` is already registered.
    #[must_use]
    pub fn with_dynamic<V>(
        mut self,
        id: impl Into<StringId>,
        getter: fn(&T) -> V,
        setter: fn(&mut T, V),
    ) -> Self
    where
        V: PropertyValue + 'static,
    {
        if let Err(err) = self.register_dynamic(id, getter, setter) {
            panic!("{err}");
        }
        self
    }

    /// Builder form of [`register_derived`](Self::register_derived).
    ///
    /// # Panics
    ///
    /// Panics if `id` is already registered.
    #[must_use]
    pub fn with_derived<V>(
        mut self,
        id: impl Into<StringId>,
        getter: fn(&T) -> V,
        setter: fn(&mut T, V),
    ) -> Self
    where
        V: PropertyValue + 'static,
    {
        if let Err(err) = self.register_derived(id, getter, setter) {
            panic!("{err}");
        }
        self
    }

    /// Builder form of [`register_read_only`](Self::register_read_only).
    ///
    /// # Panics
    ///
    /// Panics if `id` is already registered.
    #[must_use]
    pub fn with_read_only<V>(mut self, id: impl Into<StringId>, getter: fn(&T) -> V) -> Self
    where
        V: PropertyValue + 'static,
    {
        if let Err(err) = self.register_read_only(id, getter) {
            panic!("{err}");
        }
        self
    }

    fn insert(&mut self, id: StringId, accessor: Accessor<T>) -> Result<(), PropertyError> {
        if self.index.contains_key(&id) {
            return Err(PropertyError::Duplicate(id));
        }
        self.index.insert(id, self.entries.len());
        self.entries.push((id, accessor));
        Ok(())
    }

    fn accessor(&self, id: StringId) -> Result<&Accessor<T>, PropertyError> {
        self.index
            .get(&id)
            .map(|&slot| &self.entries[slot].1)
            .ok_or(PropertyError::NotFound(id))
    }

    /// Reads the property `id` of `owner`.
    pub fn get(&self, owner: &T, id: StringId) -> Result<Property, PropertyError> {
        let accessor = self.accessor(id)?;
        Ok((accessor.get)(owner))
    }

    /// Writes the property `id` of `owner`.
    ///
    /// The variant of `value` is checked before anything is written.
    pub fn set(&self, owner: &mut T, id: StringId, value: Property) -> Result<(), PropertyError> {
        let accessor = self.accessor(id)?;
        if value.kind() != accessor.kind {
            return Err(PropertyError::TypeMismatch {
                property: id,
                expected: accessor.kind,
                found: value.kind(),
            });
        }
        let setter = accessor.set.as_ref().ok_or(PropertyError::ReadOnly(id))?;
        setter(owner, value);
        Ok(())
    }

    /// Registered identifiers in registration order, derived views excluded.
    pub fn ids(&self) -> impl Iterator<Item = StringId> + '_ {
        self.entries
            .iter()
            .filter(|(_, accessor)| !accessor.derived)
            .map(|(id, _)| *id)
    }

    /// The variant registered under `id`.
    #[must_use]
    pub fn kind(&self, id: StringId) -> Option<PropertyKind> {
        self.accessor(id).ok().map(|accessor| accessor.kind)
    }

    /// Returns `true` if `id` is registered without a setter.
    #[must_use]
    pub fn is_read_only(&self, id: StringId) -> bool {
        self.accessor(id).is_ok_and(|accessor| accessor.set.is_none())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: 'static> Default for PropertyTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for PropertyTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(id, accessor)| (id, accessor.kind)))
            .finish()
    }
}

/// An object whose values are reachable by symbolic identifier.
///
/// Implementors provide untyped access; the typed helpers and container-level
/// operations live on [`PropertyAccess`], which every container gets for free.
///
/// Containers have a single owner and no internal locking.
pub trait PropertyContainer {
    /// The identifiers that carry state, in registration order.
    ///
    /// Derived views (see [`PropertyTable::register_derived`]) stay reachable
    /// through [`property`](Self::property) but are not listed, so
    /// `init_from`, `clone_container` and `to_group` never write the same
    /// state twice.
    fn property_ids(&self) -> Vec<StringId>;

    /// Reads a property by identifier.
    fn property(&self, id: StringId) -> Result<Property, PropertyError>;

    /// Writes a property by identifier. Must fail with
    /// [`PropertyError::TypeMismatch`] rather than change the variant.
    fn set_property(&mut self, id: StringId, value: Property) -> Result<(), PropertyError>;

    /// The variant stored under `id`, if registered.
    fn property_kind(&self, id: StringId) -> Option<PropertyKind> {
        self.property(id).ok().map(|value| value.kind())
    }

    fn has_property(&self, id: StringId) -> bool {
        self.property_kind(id).is_some()
    }

    /// Hook for reacting to an external change of `id`.
    ///
    /// Nothing calls this automatically: whoever mutates a property is
    /// responsible for invoking it afterwards (see
    /// [`PropertyAccess::set_and_notify`]).
    fn on_property_changed(&mut self, _id: StringId) {}

    /// Hook called after a batch of interdependent properties was changed.
    fn finished(&mut self) {}
}

/// Typed and whole-container operations available on every
/// [`PropertyContainer`], including trait objects.
pub trait PropertyAccess: PropertyContainer {
    /// Reads `id` as a `V`.
    fn get<V: PropertyValue>(&self, id: StringId) -> Result<V, PropertyError> {
        let value = self.property(id)?;
        let found = value.kind();
        V::from_property(value).ok_or(PropertyError::TypeMismatch {
            property: id,
            expected: V::KIND,
            found,
        })
    }

    /// Writes `id` from a `V`.
    fn set<V: PropertyValue>(&mut self, id: StringId, value: V) -> Result<(), PropertyError> {
        self.set_property(id, value.into_property())
    }

    /// Writes `id` and then calls
    /// [`on_property_changed`](PropertyContainer::on_property_changed).
    fn set_and_notify<V: PropertyValue>(
        &mut self,
        id: StringId,
        value: V,
    ) -> Result<(), PropertyError> {
        self.set(id, value)?;
        self.on_property_changed(id);
        Ok(())
    }

    /// Copies the value of every property `other` shares with `self`.
    ///
    /// Identifiers present on only one side are left alone, as are
    /// read-only properties of `self`. Variants are checked for every shared
    /// identifier before the first write, so on error `self` is unchanged.
    /// Returns the number of properties copied.
    fn init_from<O>(&mut self, other: &O) -> Result<usize, PropertyError>
    where
        O: PropertyContainer + ?Sized,
    {
        let mut updates = Vec::new();
        for id in other.property_ids() {
            let Some(expected) = self.property_kind(id) else {
                continue;
            };
            let value = other.property(id)?;
            if value.kind() != expected {
                return Err(PropertyError::TypeMismatch {
                    property: id,
                    expected,
                    found: value.kind(),
                });
            }
            updates.push((id, value));
        }

        let mut copied = 0;
        for (id, value) in updates {
            match self.set_property(id, value) {
                Ok(()) => copied += 1,
                Err(PropertyError::ReadOnly(_)) => {}
                Err(err) => return Err(err),
            }
        }
        debug!(copied, "initialised container from source");
        Ok(copied)
    }

    /// Default-constructs a `T` and copies this container's values into it.
    fn clone_container<T>(&self) -> Result<T, PropertyError>
    where
        T: PropertyContainer + Default,
    {
        let mut clone = T::default();
        clone.init_from(self)?;
        Ok(clone)
    }

    /// Snapshots every property into an owned group.
    fn to_group(&self) -> Result<PropertyGroup, PropertyError> {
        self.property_ids()
            .into_iter()
            .map(|id| self.property(id).map(|value| (id, value)))
            .collect()
    }
}

impl<C: PropertyContainer + ?Sized> PropertyAccess for C {}

impl PropertyContainer for PropertyGroup {
    fn property_ids(&self) -> Vec<StringId> {
        self.iter().map(|(id, _)| id).collect()
    }

    fn property(&self, id: StringId) -> Result<Property, PropertyError> {
        self.get_ref(id).cloned().ok_or(PropertyError::NotFound(id))
    }

    fn set_property(&mut self, id: StringId, value: Property) -> Result<(), PropertyError> {
        let slot = self.get_mut(id).ok_or(PropertyError::NotFound(id))?;
        if slot.kind() != value.kind() {
            return Err(PropertyError::TypeMismatch {
                property: id,
                expected: slot.kind(),
                found: value.kind(),
            });
        }
        *slot = value;
        Ok(())
    }

    fn property_kind(&self, id: StringId) -> Option<PropertyKind> {
        self.get_ref(id).map(Property::kind)
    }
}
