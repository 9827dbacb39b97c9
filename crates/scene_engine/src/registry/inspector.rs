//! Inspector boundary
//!
//! The editor UI implements [`Inspector`]; component and system draw
//! callbacks only talk to this trait. Every edit method returns whether the
//! value changed so the host can mark the scene dirty or record undo.

use std::path::PathBuf;

use crate::ecs::{Entity, World};
use crate::foundation::math::{Color, Quat, Vec2, Vec3};

use super::TypeRegistry;

/// Immediate-mode property editor supplied by the host UI
pub trait Inspector {
    /// Read-only line of text
    fn text(&mut self, text: &str);

    /// Collapsible section header; returns whether the section is expanded
    fn header(&mut self, label: &str) -> bool;

    /// Checkbox
    fn edit_bool(&mut self, label: &str, value: &mut bool) -> bool;

    /// Integer field
    fn edit_i32(&mut self, label: &str, value: &mut i32) -> bool;

    /// Float field
    fn edit_f32(&mut self, label: &str, value: &mut f32) -> bool;

    /// Two-component vector field
    fn edit_vec2(&mut self, label: &str, value: &mut Vec2) -> bool;

    /// Three-component vector field
    fn edit_vec3(&mut self, label: &str, value: &mut Vec3) -> bool;

    /// Color picker
    fn edit_color(&mut self, label: &str, value: &mut Color) -> bool;

    /// Single-line text field
    fn edit_string(&mut self, label: &str, value: &mut String) -> bool;

    /// File path field
    fn edit_path(&mut self, label: &str, value: &mut PathBuf) -> bool {
        let mut text = value.to_string_lossy().into_owned();
        let changed = self.edit_string(label, &mut text);
        if changed {
            *value = PathBuf::from(text);
        }
        changed
    }

    /// Rotation field shown as Euler angles in degrees
    ///
    /// Euler angles are only a display hint. The quaternion stays the source
    /// of truth and is rewritten only when the user edits the angles.
    fn edit_rotation(&mut self, label: &str, value: &mut Quat) -> bool {
        let (roll, pitch, yaw) = value.euler_angles();
        let mut degrees = Vec3::new(roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees());
        let changed = self.edit_vec3(label, &mut degrees);
        if changed {
            *value = Quat::from_euler_angles(
                degrees.x.to_radians(),
                degrees.y.to_radians(),
                degrees.z.to_radians(),
            );
        }
        changed
    }

    /// Placeholder for a type without an inspector
    fn unsupported(&mut self, type_name: &str) {
        self.text(&format!("Inspector for '{type_name}' is not supported"));
    }
}

/// Draw the inspector body of a registered component
///
/// Falls back to the unsupported placeholder when the type is unknown or
/// has no draw callback. Returns whether the component changed.
pub fn draw_component_inspector(
    registry: &TypeRegistry,
    world: &mut World,
    entity: Entity,
    type_name: &str,
    ui: &mut dyn Inspector,
) -> bool {
    let Some(functions) = registry.try_get_component_type_functions(type_name) else {
        ui.unsupported(type_name);
        return false;
    };

    match functions.draw_inspector {
        Some(draw) => draw(world, entity, ui),
        None => {
            log::debug!("Component type '{}' has no inspector", type_name);
            ui.unsupported(type_name);
            false
        }
    }
}

/// Outcome of drawing a component section header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComponentHeader {
    /// Whether the section is open and its body should be drawn
    pub expanded: bool,
    /// Whether the header edited component data
    pub changed: bool,
}

/// Draw the section header of a registered component
///
/// Without a custom header callback a plain collapsible header named after
/// the type is drawn. Unknown types get a collapsed header.
pub fn draw_component_header(
    registry: &TypeRegistry,
    world: &mut World,
    entity: Entity,
    type_name: &str,
    ui: &mut dyn Inspector,
) -> ComponentHeader {
    let Some(functions) = registry.try_get_component_type_functions(type_name) else {
        ui.header(type_name);
        return ComponentHeader::default();
    };

    match functions.draw_header {
        Some(draw) => draw(world, entity, ui),
        None => ComponentHeader {
            expanded: ui.header(type_name),
            changed: false,
        },
    }
}

/// Draw the settings of a registered system
pub fn draw_system_inspector(registry: &TypeRegistry, name: &str, ui: &mut dyn Inspector) -> bool {
    match registry.try_get_system_instance(name) {
        Some(system) => match system.try_borrow_mut() {
            Ok(mut system) => system.draw_inspector(ui),
            Err(_) => {
                log::warn!("System '{}' is busy and cannot be inspected", name);
                false
            }
        },
        None => {
            ui.unsupported(name);
            false
        }
    }
}
