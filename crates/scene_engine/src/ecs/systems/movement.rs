//! Movement system
//!
//! Integrates [`MovementComponent`] velocities into [`TransformComponent`]s
//! at the fixed simulation rate. Only runs in play mode.

use crate::ecs::components::{MovementComponent, TransformComponent};
use crate::ecs::system::{FrameContext, System};
use crate::ecs::World;
use crate::foundation::math::Quat;
use crate::registry::Inspector;

/// Fixed-step kinematic integrator
#[derive(Debug, Clone)]
pub struct MovementSystem {
    /// Multiplier applied to every step
    pub time_scale: f32,
    steps: u64,
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            steps: 0,
        }
    }
}

impl MovementSystem {
    /// Create the system with a time scale of 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fixed steps integrated since creation
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Advance every moving entity by `dt` seconds
    pub fn integrate(world: &mut World, dt: f32) -> usize {
        let mut moved = 0;

        for entity in world.query::<MovementComponent>() {
            let Some(movement) = world.try_get_component_mut::<MovementComponent>(entity) else {
                continue;
            };
            if !movement.enabled {
                continue;
            }

            let damping = (1.0 - movement.linear_damping * dt).max(0.0);
            movement.velocity *= damping;
            let velocity = movement.velocity;
            let angular_velocity = movement.angular_velocity;

            let Some(transform) = world.try_get_component_mut::<TransformComponent>(entity) else {
                continue;
            };

            transform.position += velocity * dt;
            if angular_velocity.norm_squared() > 0.0 {
                let delta = Quat::from_scaled_axis(angular_velocity * dt);
                transform.rotation = delta * transform.rotation;
            }
            moved += 1;
        }

        moved
    }
}

impl System for MovementSystem {
    fn fixed_update(&mut self, world: &mut World, ctx: &FrameContext) {
        let dt = ctx.delta_time * self.time_scale;
        let moved = Self::integrate(world, dt);
        self.steps += 1;
        log::trace!("Movement step {}: {} entities moved", self.steps, moved);
    }

    fn draw_inspector(&mut self, ui: &mut dyn Inspector) -> bool {
        let mut scale = self.time_scale;
        if ui.edit_f32("Time Scale", &mut scale) {
            self.time_scale = scale.max(0.0);
            return true;
        }
        false
    }
}
