//! Transform component for the ECS system
//!
//! Pure data component. Rotation is stored and persisted as a quaternion;
//! Euler angles only appear in the inspector.

use crate::ecs::Component;
use crate::foundation::math::{Quat, Vec3};
use crate::registry::{Inspector, ReflectComponent};
use crate::serialization::SerializedObject;

/// ECS Transform component
///
/// Spatial transformation in world space, Y-up right-handed.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    /// World space position
    pub position: Vec3,

    /// World space rotation quaternion
    pub rotation: Quat,

    /// World space scale factors
    pub scale: Vec3,
}

impl Component for TransformComponent {}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl TransformComponent {
    /// Create identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder pattern: Set rotation from quaternion
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: Set scale (uniform)
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::new(scale, scale, scale);
        self
    }

    /// Builder pattern: Set scale (non-uniform)
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

impl ReflectComponent for TransformComponent {
    fn serialize(&self, out: &mut SerializedObject) {
        out.set("Position", self.position);
        out.set("Rotation", self.rotation);
        out.set("Scale", self.scale);
    }

    fn deserialize(&mut self, data: &SerializedObject) {
        data.read_into("Position", &mut self.position);
        data.read_into("Rotation", &mut self.rotation);
        data.read_into("Scale", &mut self.scale);
    }

    fn draw_inspector(&mut self, ui: &mut dyn Inspector) -> bool {
        let mut changed = ui.edit_vec3("Position", &mut self.position);
        changed |= ui.edit_rotation("Rotation", &mut self.rotation);
        changed |= ui.edit_vec3("Scale", &mut self.scale);
        changed
    }
}
