//! 3D transform component.
//!
//! [`Transform3D`] represents position, rotation, and scale in 3D space and
//! exposes them as the `Position`, `Rotation` and `Scale` properties. Two
//! computed properties are derived from them: `EulerAngles` (read/write,
//! radians, YXZ order) and `Matrix` (read-only model matrix). `EulerAngles`
//! is a derived view, so copies carry the quaternion exactly.

use std::sync::LazyLock;

use engine_component::Component;
use engine_property::{Property, PropertyContainer, PropertyError, PropertyKind, PropertyTable, StringId, sid};
use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A 3D transform representing position, rotation, and per-axis scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform3D {
    /// World-space position.
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Per-axis scale factor.
    pub scale: Vec3,
}

static TRANSFORM_PROPERTIES: LazyLock<PropertyTable<Transform3D>> = LazyLock::new(|| {
    PropertyTable::new()
        .with_field(
            Transform3D::POSITION,
            |t: &Transform3D| &t.position,
            |t| &mut t.position,
        )
        .with_field(
            Transform3D::ROTATION,
            |t: &Transform3D| &t.rotation,
            |t| &mut t.rotation,
        )
        .with_field(Transform3D::SCALE, |t: &Transform3D| &t.scale, |t| &mut t.scale)
        .with_derived(
            Transform3D::EULER_ANGLES,
            Transform3D::euler_angles,
            Transform3D::set_euler_angles,
        )
        .with_read_only(Transform3D::MATRIX, |t: &Transform3D| t.to_matrix())
});

impl Transform3D {
    pub const POSITION: &'static str = "Position";
    pub const ROTATION: &'static str = "Rotation";
    pub const SCALE: &'static str = "Scale";
    pub const EULER_ANGLES: &'static str = "EulerAngles";
    pub const MATRIX: &'static str = "Matrix";

    /// The identity transform: origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a new transform with the given position and default rotation/scale.
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Compute the 4×4 model matrix for this transform.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Rotation as (yaw, pitch, roll) in radians.
    #[must_use]
    pub fn euler_angles(&self) -> Vec3 {
        let (yaw, pitch, roll) = self.rotation.to_euler(EulerRot::YXZ);
        Vec3::new(yaw, pitch, roll)
    }

    pub fn set_euler_angles(&mut self, angles: Vec3) {
        self.rotation = Quat::from_euler(EulerRot::YXZ, angles.x, angles.y, angles.z);
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl PropertyContainer for Transform3D {
    fn property_ids(&self) -> Vec<StringId> {
        TRANSFORM_PROPERTIES.ids().collect()
    }

    fn property(&self, id: StringId) -> Result<Property, PropertyError> {
        TRANSFORM_PROPERTIES.get(self, id)
    }

    fn set_property(&mut self, id: StringId, value: Property) -> Result<(), PropertyError> {
        TRANSFORM_PROPERTIES.set(self, id, value)
    }

    fn property_kind(&self, id: StringId) -> Option<PropertyKind> {
        TRANSFORM_PROPERTIES.kind(id)
    }

    /// Scripts may write a non-unit quaternion; keep the rotation valid.
    fn on_property_changed(&mut self, id: StringId) {
        if id == sid(Self::ROTATION) {
            self.rotation = self.rotation.normalize();
        }
    }
}

impl Component for Transform3D {
    fn type_name() -> &'static str {
        "Transform3D"
    }
}
