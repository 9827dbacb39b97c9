//! Component type function bundles
//!
//! The registry never sees concrete component types. Registration
//! instantiates small generic trampolines once per type and stores them as
//! plain function pointers; everything downstream works through those.

use bitflags::bitflags;

use crate::ecs::{Component, Entity, World};
use crate::serialization::SerializedObject;

use super::{ComponentHeader, Inspector};

/// Whether the entity has the component
pub type HasFn = fn(&World, Entity) -> bool;
/// Attach a freshly constructed component
pub type AddFn = fn(&mut World, Entity);
/// Detach the component, returning how many were removed
pub type RemoveFn = fn(&mut World, Entity) -> usize;
/// Write the component's fields into a document table
pub type SerializeFn = fn(&World, Entity, &mut SerializedObject);
/// Read the component's fields from a document table
pub type DeserializeFn = fn(&mut World, Entity, &SerializedObject);
/// Draw the inspector body, returning whether data changed
pub type DrawInspectorFn = fn(&mut World, Entity, &mut dyn Inspector) -> bool;
/// Draw the inspector section header
pub type DrawHeaderFn = fn(&mut World, Entity, &mut dyn Inspector) -> ComponentHeader;

bitflags! {
    /// Editor presentation flags of a component type
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ComponentTypeFlags: u8 {
        /// Listed in the editor's "Add Component" menu
        const SHOW_IN_ADD_MENU = 1 << 0;
        /// Drawn in the entity inspector
        const DRAW_IN_INSPECTOR = 1 << 1;
    }
}

impl Default for ComponentTypeFlags {
    fn default() -> Self {
        Self::SHOW_IN_ADD_MENU | Self::DRAW_IN_INSPECTOR
    }
}

/// Behavior bundle of one component type
///
/// `None` marks a function as not provided. `has`, `add` and `remove` are
/// filled in generically at registration when missing; the rest degrade to
/// warnings or placeholders when absent.
#[derive(Clone, Copy, Default)]
pub struct ComponentTypeFunctions {
    /// Existence check
    pub has: Option<HasFn>,
    /// Factory
    pub add: Option<AddFn>,
    /// Removal
    pub remove: Option<RemoveFn>,
    /// Field writer
    pub serialize: Option<SerializeFn>,
    /// Field reader
    pub deserialize: Option<DeserializeFn>,
    /// Inspector body
    pub draw_inspector: Option<DrawInspectorFn>,
    /// Inspector header
    pub draw_header: Option<DrawHeaderFn>,
    /// Editor presentation flags
    pub flags: ComponentTypeFlags,
}

impl ComponentTypeFunctions {
    /// Empty bundle with default flags
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete bundle for a type implementing [`ReflectComponent`]
    pub fn reflected<T: ReflectComponent>() -> Self {
        Self::new()
            .with_serialize(serialize_reflected::<T>)
            .with_deserialize(deserialize_reflected::<T>)
            .with_draw_inspector(draw_reflected::<T>)
            .with_generic_defaults::<T>()
    }

    /// Fill `has`, `add` and `remove` with generic trampolines where unset
    pub fn with_generic_defaults<T: Component + Default>(mut self) -> Self {
        self.has.get_or_insert(has_component::<T>);
        self.add.get_or_insert(add_default_component::<T>);
        self.remove.get_or_insert(remove_component::<T>);
        self
    }

    /// Builder pattern: set the existence check
    pub fn with_has(mut self, has: HasFn) -> Self {
        self.has = Some(has);
        self
    }

    /// Builder pattern: set the factory
    pub fn with_add(mut self, add: AddFn) -> Self {
        self.add = Some(add);
        self
    }

    /// Builder pattern: set the removal
    pub fn with_remove(mut self, remove: RemoveFn) -> Self {
        self.remove = Some(remove);
        self
    }

    /// Builder pattern: set the field writer
    pub fn with_serialize(mut self, serialize: SerializeFn) -> Self {
        self.serialize = Some(serialize);
        self
    }

    /// Builder pattern: set the field reader
    pub fn with_deserialize(mut self, deserialize: DeserializeFn) -> Self {
        self.deserialize = Some(deserialize);
        self
    }

    /// Builder pattern: set the inspector body
    pub fn with_draw_inspector(mut self, draw: DrawInspectorFn) -> Self {
        self.draw_inspector = Some(draw);
        self
    }

    /// Builder pattern: set the inspector header
    pub fn with_draw_header(mut self, draw: DrawHeaderFn) -> Self {
        self.draw_header = Some(draw);
        self
    }

    /// Builder pattern: replace the presentation flags
    pub fn with_flags(mut self, flags: ComponentTypeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Whether the type is offered in the "Add Component" menu
    pub fn show_in_add_menu(&self) -> bool {
        self.flags.contains(ComponentTypeFlags::SHOW_IN_ADD_MENU)
    }

    /// Whether the type is drawn in the inspector
    pub fn draw_in_inspector(&self) -> bool {
        self.flags.contains(ComponentTypeFlags::DRAW_IN_INSPECTOR)
    }

    /// Names of the functions left unset, for diagnostics
    pub fn missing_functions(&self) -> Vec<&'static str> {
        [
            ("has", self.has.is_none()),
            ("add", self.add.is_none()),
            ("remove", self.remove.is_none()),
            ("serialize", self.serialize.is_none()),
            ("deserialize", self.deserialize.is_none()),
            ("draw_inspector", self.draw_inspector.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}

impl std::fmt::Debug for ComponentTypeFunctions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentTypeFunctions")
            .field("missing", &self.missing_functions())
            .field("custom_header", &self.draw_header.is_some())
            .field("flags", &self.flags)
            .finish()
    }
}

/// Component whose persistence and inspection are written as methods
///
/// This is the shape registration code generators emit: implement the
/// trait, then register with [`ComponentTypeFunctions::reflected`].
pub trait ReflectComponent: Component + Default {
    /// Write fields into `out`
    fn serialize(&self, out: &mut SerializedObject);

    /// Read fields from `data`, keeping current values for absent keys
    fn deserialize(&mut self, data: &SerializedObject);

    /// Draw editable fields; returns whether anything changed
    fn draw_inspector(&mut self, ui: &mut dyn Inspector) -> bool {
        ui.unsupported(std::any::type_name::<Self>());
        false
    }
}

fn has_component<T: Component>(world: &World, entity: Entity) -> bool {
    world.has_component::<T>(entity)
}

fn add_default_component<T: Component + Default>(world: &mut World, entity: Entity) {
    world.add_component(entity, T::default());
}

fn remove_component<T: Component>(world: &mut World, entity: Entity) -> usize {
    world.remove_component::<T>(entity)
}

fn serialize_reflected<T: ReflectComponent>(
    world: &World,
    entity: Entity,
    out: &mut SerializedObject,
) {
    if let Some(component) = world.try_get_component::<T>(entity) {
        component.serialize(out);
    }
}

fn deserialize_reflected<T: ReflectComponent>(
    world: &mut World,
    entity: Entity,
    data: &SerializedObject,
) {
    world.add_or_get_component::<T>(entity).deserialize(data);
}

fn draw_reflected<T: ReflectComponent>(
    world: &mut World,
    entity: Entity,
    ui: &mut dyn Inspector,
) -> bool {
    world
        .try_get_component_mut::<T>(entity)
        .is_some_and(|component| component.draw_inspector(ui))
}
