//! The [`Property`] value type.
//!
//! A property is a tagged union over every value type a component may expose
//! for reflection. [`PropertyValue`] bridges between the union and the plain
//! Rust payload types so that typed accessors can be written generically.

use std::collections::BTreeMap;
use std::fmt;

use glam::{DVec2, DVec3, DVec4, Mat4, Quat, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::stringid::StringId;

/// A single typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Property {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    Double(f64),
    String(String),
    StringId(StringId),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    DVec2(DVec2),
    DVec3(DVec3),
    DVec4(DVec4),
    Matrix(Mat4),
    Quat(Quat),
    Array(Vec<Property>),
    Group(PropertyGroup),
}

/// The variant tag of a [`Property`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Bool,
    Int,
    UInt,
    Float,
    Double,
    String,
    StringId,
    Vec2,
    Vec3,
    Vec4,
    DVec2,
    DVec3,
    DVec4,
    Matrix,
    Quat,
    Array,
    Group,
}

impl Property {
    /// Returns the variant tag.
    #[must_use]
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Bool(_) => PropertyKind::Bool,
            Self::Int(_) => PropertyKind::Int,
            Self::UInt(_) => PropertyKind::UInt,
            Self::Float(_) => PropertyKind::Float,
            Self::Double(_) => PropertyKind::Double,
            Self::String(_) => PropertyKind::String,
            Self::StringId(_) => PropertyKind::StringId,
            Self::Vec2(_) => PropertyKind::Vec2,
            Self::Vec3(_) => PropertyKind::Vec3,
            Self::Vec4(_) => PropertyKind::Vec4,
            Self::DVec2(_) => PropertyKind::DVec2,
            Self::DVec3(_) => PropertyKind::DVec3,
            Self::DVec4(_) => PropertyKind::DVec4,
            Self::Matrix(_) => PropertyKind::Matrix,
            Self::Quat(_) => PropertyKind::Quat,
            Self::Array(_) => PropertyKind::Array,
            Self::Group(_) => PropertyKind::Group,
        }
    }

    /// Extracts the payload if the variant matches `V`.
    pub fn into_value<V: PropertyValue>(self) -> Option<V> {
        V::from_property(self)
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::StringId => "stringid",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::DVec2 => "dvec2",
            Self::DVec3 => "dvec3",
            Self::DVec4 => "dvec4",
            Self::Matrix => "matrix",
            Self::Quat => "quat",
            Self::Array => "array",
            Self::Group => "group",
        };
        f.write_str(name)
    }
}

/// A Rust type that maps onto exactly one [`Property`] variant.
pub trait PropertyValue: Sized {
    /// The variant this type is stored as.
    const KIND: PropertyKind;

    /// Wraps the value in its variant.
    fn into_property(self) -> Property;

    /// Unwraps the payload, or returns `None` for any other variant.
    fn from_property(property: Property) -> Option<Self>;
}

macro_rules! property_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl PropertyValue for $ty {
                const KIND: PropertyKind = PropertyKind::$variant;

                fn into_property(self) -> Property {
                    Property::$variant(self)
                }

                fn from_property(property: Property) -> Option<Self> {
                    match property {
                        Property::$variant(value) => Some(value),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Property {
                fn from(value: $ty) -> Self {
                    Property::$variant(value)
                }
            }
        )*
    };
}

property_value! {
    bool => Bool,
    i32 => Int,
    u32 => UInt,
    f32 => Float,
    f64 => Double,
    String => String,
    StringId => StringId,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    DVec2 => DVec2,
    DVec3 => DVec3,
    DVec4 => DVec4,
    Mat4 => Matrix,
    Quat => Quat,
    Vec<Property> => Array,
    PropertyGroup => Group,
}

impl From<&str> for Property {
    fn from(value: &str) -> Self {
        Property::String(value.to_owned())
    }
}

/// An owned identifier → property map, ordered by identifier.
///
/// This is the payload of [`Property::Group`] and doubles as a free-standing
/// container for property snapshots (see
/// [`PropertyContainer::to_group`](crate::PropertyContainer::to_group)).
/// Entries are registered by [`insert`](Self::insert); writes through the
/// container interface must keep the variant of the existing entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyGroup {
    entries: BTreeMap<StringId, Property>,
}

impl PropertyGroup {
    /// Creates an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry, returning the previous value.
    pub fn insert(&mut self, id: StringId, value: impl Into<Property>) -> Option<Property> {
        self.entries.insert(id, value.into())
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, id: StringId, value: impl Into<Property>) -> Self {
        self.insert(id, value);
        self
    }

    /// Borrows the entry for `id`.
    #[must_use]
    pub fn get_ref(&self, id: StringId) -> Option<&Property> {
        self.entries.get(&id)
    }

    /// Mutably borrows the entry for `id`.
    pub fn get_mut(&mut self, id: StringId) -> Option<&mut Property> {
        self.entries.get_mut(&id)
    }

    /// Removes an entry.
    pub fn remove(&mut self, id: StringId) -> Option<Property> {
        self.entries.remove(&id)
    }

    #[must_use]
    pub fn contains(&self, id: StringId) -> bool {
        self.entries.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (StringId, &Property)> {
        self.entries.iter().map(|(id, value)| (*id, value))
    }
}

impl FromIterator<(StringId, Property)> for PropertyGroup {
    fn from_iter<I: IntoIterator<Item = (StringId, Property)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stringid::sid;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Property::from(true).kind(), PropertyKind::Bool);
        assert_eq!(Property::from(-3i32).kind(), PropertyKind::Int);
        assert_eq!(Property::from(3u32).kind(), PropertyKind::UInt);
        assert_eq!(Property::from(1.5f32).kind(), PropertyKind::Float);
        assert_eq!(Property::from(1.5f64).kind(), PropertyKind::Double);
        assert_eq!(Property::from("hi").kind(), PropertyKind::String);
        assert_eq!(Property::from(Mat4::IDENTITY).kind(), PropertyKind::Matrix);
        assert_eq!(Property::from(Vec::<Property>::new()).kind(), PropertyKind::Array);
        assert_eq!(
            Property::from(PropertyGroup::new()).kind(),
            PropertyKind::Group
        );
    }

    #[test]
    fn test_into_value_wrong_variant_is_none() {
        let p = Property::Float(2.0);
        assert_eq!(p.clone().into_value::<f32>(), Some(2.0));
        assert_eq!(p.clone().into_value::<f64>(), None);
        assert_eq!(p.into_value::<i32>(), None);
    }

    #[test]
    fn test_nested_array_and_group() {
        let inner = PropertyGroup::new()
            .with(sid("x"), 1i32)
            .with(sid("name"), "inner");
        let array = vec![Property::from(inner.clone()), Property::from(Vec3::ONE)];
        let p = Property::from(array);
        let items = p.into_value::<Vec<Property>>().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Property::Group(inner));
    }

    #[test]
    fn test_group_insert_replaces() {
        let mut group = PropertyGroup::new();
        assert_eq!(group.insert(sid("Speed"), 1.0f32), None);
        assert_eq!(
            group.insert(sid("Speed"), 2.0f32),
            Some(Property::Float(1.0))
        );
        assert_eq!(group.len(), 1);
        assert_eq!(group.get_ref(sid("Speed")), Some(&Property::Float(2.0)));
    }

    #[test]
    fn test_group_json_uses_names() {
        let group = PropertyGroup::new().with(sid("Visible"), true);
        let json = serde_json::to_string(&group).unwrap();
        assert_eq!(json, r#"{"Visible":{"Bool":true}}"#);
        let restored: PropertyGroup = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, group);
    }

    #[test]
    fn test_property_msgpack() {
        let p = Property::Quat(Quat::from_rotation_y(0.5));
        let bytes = rmp_serde::to_vec(&p).unwrap();
        let restored: Property = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(p, restored);
    }
}
