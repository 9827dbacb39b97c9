//! Built-in type registration
//!
//! Engine types are registered before any user type. Since the first
//! registration of a name wins, user types can never replace them.

use crate::ecs::components::{
    MovementComponent, NameComponent, SpriteComponent, TransformComponent,
};
use crate::ecs::systems::MovementSystem;

use super::{ComponentTypeFlags, ComponentTypeFunctions, TypeRegistry};

/// Register every engine-provided component and system
pub fn register_builtin_types(registry: &mut TypeRegistry) {
    // Name is implicit on editor-created entities, so it stays out of the add menu
    registry.register_component_type::<NameComponent>(
        "Name",
        ComponentTypeFunctions::reflected::<NameComponent>()
            .with_flags(ComponentTypeFlags::DRAW_IN_INSPECTOR),
    );
    registry.register_reflected_component::<TransformComponent>("Transform");
    registry.register_reflected_component::<MovementComponent>("Movement");
    registry.register_reflected_component::<SpriteComponent>("Sprite");
    registry.register_formerly_known_type_name("Velocity", "Movement");

    registry.register_system_instance("MovementSystem", MovementSystem::new());

    log::info!(
        "Registered {} built-in component types and {} systems",
        registry.component_type_count(),
        registry.system_count()
    );
}
