//! Movement component for entities that can move in 3D space

use crate::ecs::Component;
use crate::foundation::math::Vec3;
use crate::registry::{Inspector, ReflectComponent};
use crate::serialization::SerializedObject;

/// Component for entities that can move
#[derive(Debug, Clone, PartialEq)]
pub struct MovementComponent {
    /// Linear velocity in units per second
    pub velocity: Vec3,

    /// Angular velocity in radians per second
    pub angular_velocity: Vec3,

    /// Damping factor for velocity (0 = no damping, 1 = instant stop)
    pub linear_damping: f32,

    /// Whether movement is enabled
    pub enabled: bool,
}

impl Component for MovementComponent {}

impl Default for MovementComponent {
    fn default() -> Self {
        Self {
            velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            linear_damping: 0.0,
            enabled: true,
        }
    }
}

impl MovementComponent {
    /// Create a movement component with initial velocity
    pub fn with_velocity(velocity: Vec3) -> Self {
        Self {
            velocity,
            ..Self::default()
        }
    }

    /// Builder pattern: Set angular velocity
    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Set linear damping
    pub fn set_linear_damping(&mut self, damping: f32) {
        self.linear_damping = damping.clamp(0.0, 1.0);
    }
}

impl ReflectComponent for MovementComponent {
    fn serialize(&self, out: &mut SerializedObject) {
        out.set("Velocity", self.velocity);
        out.set("AngularVelocity", self.angular_velocity);
        out.set("LinearDamping", self.linear_damping);
        out.set("Enabled", self.enabled);
    }

    fn deserialize(&mut self, data: &SerializedObject) {
        data.read_into("Velocity", &mut self.velocity);
        data.read_into("AngularVelocity", &mut self.angular_velocity);
        if let Some(damping) = data.get("LinearDamping") {
            self.set_linear_damping(damping);
        }
        data.read_into("Enabled", &mut self.enabled);
    }

    fn draw_inspector(&mut self, ui: &mut dyn Inspector) -> bool {
        let mut changed = ui.edit_bool("Enabled", &mut self.enabled);
        changed |= ui.edit_vec3("Velocity", &mut self.velocity);
        changed |= ui.edit_vec3("Angular Velocity", &mut self.angular_velocity);

        let mut damping = self.linear_damping;
        if ui.edit_f32("Linear Damping", &mut damping) {
            self.set_linear_damping(damping);
            changed = true;
        }
        changed
    }
}
