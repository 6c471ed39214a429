//! Property access errors.

use crate::property::PropertyKind;
use crate::stringid::StringId;

/// Errors produced by property registration and typed access.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    /// No property is registered under the identifier.
    #[error("property '{0}' not found")]
    NotFound(StringId),

    /// The property holds a different variant than the one requested.
    #[error("property '{property}' is {found}, not {expected}")]
    TypeMismatch {
        property: StringId,
        expected: PropertyKind,
        found: PropertyKind,
    },

    /// The identifier is already registered in this container.
    #[error("property '{0}' is already registered")]
    Duplicate(StringId),

    /// The property has a getter but no setter.
    #[error("property '{0}' is read-only")]
    ReadOnly(StringId),
}
