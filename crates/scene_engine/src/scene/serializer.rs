//! Scene serialization
//!
//! Converts scenes and entities to and from the persisted TOML document.
//! Concrete component and system types are only reached through the type
//! registry. Anything the registry cannot resolve is carried along verbatim
//! and written back on save.
//!
//! ```toml
//! Name = "Level 1"
//! SystemGroups = ["Gameplay"]
//!
//! [[Systems]]
//! Type = "MovementSystem"
//! Phase = "FixedUpdate"
//! Enabled = true
//! Group = "Gameplay"
//!
//! [[Entities]]
//! [[Entities.Components]]
//! Type = "Name"
//! Name = "Player"
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use toml::{Table, Value};

use crate::ecs::system::ExecutionPhase;
use crate::ecs::{Component, Entity, World};
use crate::registry::{ComponentTypeFunctions, TypeRegistry};
use crate::serialization::{SerializedObject, TYPE_KEY};

use super::descriptor::{GroupId, SystemDescriptor, UnrecognizedSystemDescriptor};
use super::error::{SceneError, SceneResult};
use super::model::{group_id_for, Scene};

const NAME_KEY: &str = "Name";
const SYSTEM_GROUPS_KEY: &str = "SystemGroups";
const SYSTEMS_KEY: &str = "Systems";
const ENTITIES_KEY: &str = "Entities";
const COMPONENTS_KEY: &str = "Components";
const PHASE_KEY: &str = "Phase";
const ENABLED_KEY: &str = "Enabled";
const GROUP_KEY: &str = "Group";

/// Entity data this build could not interpret
///
/// Attached to an entity on load when needed and drained back into the
/// entity's table on save. It is never registered, so it never appears as a
/// component of its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreservedEntityData {
    /// Component tables whose type is not registered
    pub unrecognized_components: Vec<Table>,
    /// Entity-level keys other than `Components`
    pub extra_fields: Table,
    /// Keys of recognized component tables their serializer does not write,
    /// by registered type name
    pub component_extra_fields: BTreeMap<String, Table>,
    /// `Type` of every loaded component table in document order
    ///
    /// Left empty when the document already lists components in the order
    /// they are written by default.
    pub component_order: Vec<String>,
}

impl Component for PreservedEntityData {}

impl PreservedEntityData {
    /// Whether there is nothing to preserve
    pub fn is_empty(&self) -> bool {
        self.unrecognized_components.is_empty()
            && self.extra_fields.is_empty()
            && self.component_extra_fields.is_empty()
            && self.component_order.is_empty()
    }
}

fn invalid(message: impl Into<String>) -> SceneError {
    SceneError::InvalidDocument(message.into())
}

pub(crate) fn component_type(table: &Table) -> Option<&str> {
    table.get(TYPE_KEY).and_then(Value::as_str)
}

fn has_component(functions: &ComponentTypeFunctions, world: &World, entity: Entity) -> bool {
    functions.has.is_some_and(|has| has(world, entity))
}

// ----------------------------------------------------------------------
// Entities
// ----------------------------------------------------------------------

/// Write an entity and its components into a document table
///
/// Components keep the order they were loaded in. Components added since
/// follow in registry order, then any preserved unrecognized tables.
pub fn serialize_entity(world: &World, entity: Entity, registry: &TypeRegistry) -> Table {
    let preserved = world.try_get_component::<PreservedEntityData>(entity);
    let mut unrecognized: Vec<Option<&Table>> = preserved
        .map(|preserved| preserved.unrecognized_components.iter().map(Some).collect())
        .unwrap_or_default();
    let mut written = BTreeSet::new();
    let mut components = Vec::new();

    let loaded_order = preserved.map_or(&[][..], |preserved| &preserved.component_order[..]);
    for type_name in loaded_order {
        if let Some((name, functions)) = registry.resolve_component_type(type_name) {
            if !written.contains(name) && has_component(functions, world, entity) {
                written.insert(name);
                let table = write_component(world, entity, name, functions, preserved);
                components.push(Value::Table(table));
                continue;
            }
        }

        let slot = unrecognized.iter_mut().find(|slot| {
            slot.is_some_and(|table| component_type(table) == Some(type_name.as_str()))
        });
        if let Some(table) = slot.and_then(Option::take) {
            components.push(Value::Table(table.clone()));
        }
    }

    for (name, functions) in registry.component_types() {
        if !written.contains(name) && has_component(functions, world, entity) {
            let table = write_component(world, entity, name, functions, preserved);
            components.push(Value::Table(table));
        }
    }
    components.extend(unrecognized.into_iter().flatten().cloned().map(Value::Table));

    let mut table = Table::new();
    table.insert(COMPONENTS_KEY.to_string(), Value::Array(components));
    if let Some(preserved) = preserved {
        for (key, value) in &preserved.extra_fields {
            table.insert(key.clone(), value.clone());
        }
    }
    table
}

fn write_component(
    world: &World,
    entity: Entity,
    name: &str,
    functions: &ComponentTypeFunctions,
    preserved: Option<&PreservedEntityData>,
) -> Table {
    let mut object = SerializedObject::with_type(name);
    match functions.serialize {
        Some(serialize) => serialize(world, entity, &mut object),
        None => log::warn!(
            "Component type '{}' has no serializer; writing its type only",
            name
        ),
    }

    let mut table = object.into_table();
    if let Some(extra) = preserved.and_then(|p| p.component_extra_fields.get(name)) {
        for (key, value) in extra {
            if !table.contains_key(key) {
                table.insert(key.clone(), value.clone());
            }
        }
    }
    table
}

/// Populate an entity from a document table
///
/// Recognized components are added when missing and then deserialized, so
/// values already present on the entity are updated rather than replaced.
/// Unrecognized component tables, keys a component does not write back and
/// unknown entity keys are kept on the entity as [`PreservedEntityData`].
pub fn deserialize_entity(
    world: &mut World,
    entity: Entity,
    table: &Table,
    registry: &TypeRegistry,
) -> SceneResult<()> {
    let mut preserved = PreservedEntityData::default();

    for (key, value) in table {
        if key != COMPONENTS_KEY {
            preserved.extra_fields.insert(key.clone(), value.clone());
        }
    }

    let components: &[Value] = match table.get(COMPONENTS_KEY) {
        None => &[],
        Some(Value::Array(items)) => items,
        Some(_) => return Err(invalid("entity 'Components' must be an array of tables")),
    };

    // (type name, recognized) in document order
    let mut order = Vec::with_capacity(components.len());
    for component in components {
        let Value::Table(component) = component else {
            return Err(invalid("entity 'Components' must be an array of tables"));
        };
        let Some(type_name) = component_type(component) else {
            return Err(invalid("component table without a string 'Type'"));
        };

        let instantiated = match registry.resolve_component_type(type_name) {
            Some((name, functions)) => {
                instantiate_component(world, entity, name, functions, component)
                    .map(|leftover| (name, leftover))
            }
            None => {
                log::warn!("Unrecognized component type '{}'; keeping its data", type_name);
                None
            }
        };
        match instantiated {
            Some((name, leftover)) => {
                if !leftover.is_empty() {
                    preserved.component_extra_fields.insert(name.to_string(), leftover);
                }
                order.push((name.to_string(), true));
            }
            None => {
                preserved.unrecognized_components.push(component.clone());
                order.push((type_name.to_string(), false));
            }
        }
    }

    if !is_default_component_order(&order) {
        preserved.component_order = order.into_iter().map(|(name, _)| name).collect();
    }
    if !preserved.is_empty() {
        *world.add_or_get_component::<PreservedEntityData>(entity) = preserved;
    }
    Ok(())
}

/// Whether `serialize_entity` would reproduce `order` without help
fn is_default_component_order(order: &[(String, bool)]) -> bool {
    let recognized = order.iter().take_while(|(_, recognized)| *recognized).count();
    let (registered, rest) = order.split_at(recognized);
    rest.iter().all(|(_, recognized)| !recognized)
        && registered.windows(2).all(|pair| pair[0].0 < pair[1].0)
}

/// Add (when missing) and deserialize one component
///
/// Returns the keys of `data` the component does not write back, or `None`
/// if the type cannot be constructed.
pub(crate) fn instantiate_component(
    world: &mut World,
    entity: Entity,
    type_name: &str,
    functions: &ComponentTypeFunctions,
    data: &Table,
) -> Option<Table> {
    if !has_component(functions, world, entity) {
        let Some(add) = functions.add else {
            log::warn!(
                "Component type '{}' cannot be constructed; keeping its data",
                type_name
            );
            return None;
        };
        add(world, entity);
    }

    let Some(deserialize) = functions.deserialize else {
        log::warn!("Component type '{}' has no deserializer; using defaults", type_name);
        return Some(unwritten_fields(data, &Table::new()));
    };
    deserialize(world, entity, &SerializedObject::from_table(data.clone()));

    let mut written = SerializedObject::with_type(type_name);
    if let Some(serialize) = functions.serialize {
        serialize(world, entity, &mut written);
    }
    Some(unwritten_fields(data, &written.into_table()))
}

fn unwritten_fields(data: &Table, written: &Table) -> Table {
    data.iter()
        .filter(|(key, _)| key.as_str() != TYPE_KEY && !written.contains_key(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

// ----------------------------------------------------------------------
// Systems
// ----------------------------------------------------------------------

/// Outcome of reading one `Systems` entry
pub(crate) enum SystemEntry {
    Recognized(ExecutionPhase, SystemDescriptor),
    Unrecognized(UnrecognizedSystemDescriptor),
}

/// Read one `Systems` entry, resolving its type through the registry
///
/// Group names not yet in `groups` are appended to it.
pub(crate) fn read_system_entry(
    table: &Table,
    registry: &TypeRegistry,
    groups: &mut Vec<String>,
) -> SceneResult<SystemEntry> {
    let Some(name) = table.get(TYPE_KEY).and_then(Value::as_str) else {
        return Err(invalid("system entry without a string 'Type'"));
    };
    let unrecognized = || {
        SystemEntry::Unrecognized(UnrecognizedSystemDescriptor::new(name, table.clone()))
    };

    let Some(phase) = table
        .get(PHASE_KEY)
        .and_then(Value::as_str)
        .and_then(ExecutionPhase::from_name)
    else {
        log::warn!("System '{}' has no valid 'Phase'; keeping it unrecognized", name);
        return Ok(unrecognized());
    };

    let (Some(instance), Some(current_name)) = (
        registry.try_get_system_instance(name),
        registry.resolve_system_name(name),
    ) else {
        return Ok(unrecognized());
    };

    let mut descriptor = SystemDescriptor::new(current_name, instance);
    for (key, value) in table {
        match key.as_str() {
            TYPE_KEY | PHASE_KEY => {}
            ENABLED_KEY => match value.as_bool() {
                Some(enabled) => descriptor.enabled = enabled,
                None => log::warn!("System '{}': 'Enabled' is not a boolean", name),
            },
            GROUP_KEY => match value.as_str() {
                Some(group) => descriptor.group = Some(group_id_for(groups, group)),
                None => log::warn!("System '{}': 'Group' is not a string", name),
            },
            _ => {
                descriptor.extra_fields.insert(key.clone(), value.clone());
            }
        }
    }

    Ok(SystemEntry::Recognized(phase, descriptor))
}

fn write_system_entry(
    phase: ExecutionPhase,
    descriptor: &SystemDescriptor,
    groups: &[String],
) -> Table {
    let mut table = Table::new();
    table.insert(TYPE_KEY.to_string(), Value::String(descriptor.name.clone()));
    table.insert(PHASE_KEY.to_string(), Value::String(phase.name().to_string()));
    table.insert(ENABLED_KEY.to_string(), Value::Boolean(descriptor.enabled));

    if let Some(group) = descriptor.group.and_then(|id: GroupId| groups.get(id)) {
        table.insert(GROUP_KEY.to_string(), Value::String(group.clone()));
    }
    for (key, value) in &descriptor.extra_fields {
        table.insert(key.clone(), value.clone());
    }
    table
}

// ----------------------------------------------------------------------
// Scenes
// ----------------------------------------------------------------------

fn array_of_tables(value: Value, key: &str) -> SceneResult<Vec<Table>> {
    let Value::Array(items) = value else {
        return Err(invalid(format!("'{key}' must be an array of tables")));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Table(table) => Ok(table),
            _ => Err(invalid(format!("'{key}' must be an array of tables"))),
        })
        .collect()
}

impl Scene {
    /// Build the persisted document of this scene
    pub fn to_document(&self, registry: &TypeRegistry) -> Table {
        let mut document = Table::new();
        document.insert(NAME_KEY.to_string(), Value::String(self.name().to_string()));
        document.insert(
            SYSTEM_GROUPS_KEY.to_string(),
            Value::Array(self.system_group_names().iter().cloned().map(Value::String).collect()),
        );

        let mut systems: Vec<(u64, Table)> = self
            .unrecognized_systems()
            .iter()
            .map(|entry| (entry.document_order, entry.raw.clone()))
            .collect();
        for phase in ExecutionPhase::ALL {
            // Moving a system within its phase reshuffles the slots that
            // phase already holds in the document
            let descriptors = self.system_descriptors(phase);
            let mut slots: Vec<u64> = descriptors.iter().map(|d| d.document_order).collect();
            slots.sort_unstable();
            for (slot, descriptor) in slots.into_iter().zip(descriptors) {
                let entry = write_system_entry(phase, descriptor, self.system_group_names());
                systems.push((slot, entry));
            }
        }
        systems.sort_by_key(|(slot, _)| *slot);
        document.insert(
            SYSTEMS_KEY.to_string(),
            Value::Array(systems.into_iter().map(|(_, entry)| Value::Table(entry)).collect()),
        );

        let world = self.world();
        let entities = world
            .entities()
            .into_iter()
            .map(|entity| Value::Table(serialize_entity(world, entity, registry)))
            .collect();
        document.insert(ENTITIES_KEY.to_string(), Value::Array(entities));

        for (key, value) in &self.extra_fields {
            document.insert(key.clone(), value.clone());
        }
        document
    }

    /// Build a scene from a persisted document
    pub fn from_document(mut document: Table, registry: &TypeRegistry) -> SceneResult<Scene> {
        let name = match document.remove(NAME_KEY) {
            Some(Value::String(name)) => name,
            Some(_) => return Err(invalid("'Name' must be a string")),
            None => {
                log::warn!("Scene document has no 'Name'");
                Scene::default().name().to_string()
            }
        };
        let mut scene = Scene::new(name);

        if let Some(groups) = document.remove(SYSTEM_GROUPS_KEY) {
            let Value::Array(groups) = groups else {
                return Err(invalid("'SystemGroups' must be an array of strings"));
            };
            for group in groups {
                let Value::String(group) = group else {
                    return Err(invalid("'SystemGroups' must be an array of strings"));
                };
                scene.add_system_group(&group);
            }
        }

        if let Some(systems) = document.remove(SYSTEMS_KEY) {
            for entry in array_of_tables(systems, SYSTEMS_KEY)? {
                match read_system_entry(&entry, registry, &mut scene.system_group_names)? {
                    SystemEntry::Recognized(phase, descriptor) => {
                        scene.add_system_descriptor(phase, descriptor);
                    }
                    SystemEntry::Unrecognized(descriptor) => {
                        scene.add_unrecognized_system(descriptor);
                    }
                }
            }
        }

        if let Some(entities) = document.remove(ENTITIES_KEY) {
            for entry in array_of_tables(entities, ENTITIES_KEY)? {
                let world = scene.world_mut();
                let entity = world.create_entity();
                deserialize_entity(world, entity, &entry, registry)?;
            }
        }

        scene.extra_fields = document;

        log::debug!(
            "Loaded scene '{}': {} entities, {} systems, {} unrecognized",
            scene.name(),
            scene.world().entity_count(),
            scene.system_count(),
            scene.unrecognized_systems().len()
        );
        Ok(scene)
    }

    /// Render the scene as TOML text
    pub fn to_toml_string(&self, registry: &TypeRegistry) -> SceneResult<String> {
        Ok(toml::to_string(&self.to_document(registry))?)
    }

    /// Parse a scene from TOML text
    pub fn from_toml_str(text: &str, registry: &TypeRegistry) -> SceneResult<Scene> {
        let document: Table = toml::from_str(text)?;
        Self::from_document(document, registry)
    }

    /// Load a scene file
    pub fn load_from_file(path: impl AsRef<Path>, registry: &TypeRegistry) -> SceneResult<Scene> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let scene = Self::from_toml_str(&text, registry)?;
        log::info!("Loaded scene '{}' from {}", scene.name(), path.display());
        Ok(scene)
    }

    /// Save the scene to a file, creating parent directories as needed
    pub fn save_to_file(&self, path: impl AsRef<Path>, registry: &TypeRegistry) -> SceneResult<()> {
        let path = path.as_ref();
        let text = self.to_toml_string(registry)?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)?;
        log::info!("Saved scene '{}' to {}", self.name(), path.display());
        Ok(())
    }
}
