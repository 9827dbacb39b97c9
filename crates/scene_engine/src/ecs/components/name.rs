//! Name component

use crate::ecs::Component;
use crate::registry::{Inspector, ReflectComponent};
use crate::serialization::SerializedObject;

/// Human-readable entity name shown in the editor hierarchy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameComponent {
    /// Display name
    pub name: String,
}

impl NameComponent {
    /// Create a name component
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Component for NameComponent {}

impl ReflectComponent for NameComponent {
    fn serialize(&self, out: &mut SerializedObject) {
        out.set("Name", self.name.clone());
    }

    fn deserialize(&mut self, data: &SerializedObject) {
        data.read_into("Name", &mut self.name);
    }

    fn draw_inspector(&mut self, ui: &mut dyn Inspector) -> bool {
        ui.edit_string("Name", &mut self.name)
    }
}
