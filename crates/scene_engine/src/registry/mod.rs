//! Type registry
//!
//! Catalog of component and system types keyed by stable string names. The
//! serializer, the inspector and the scheduler only ever reach concrete types
//! through the function bundles and instances stored here.
//!
//! ## Lifecycle
//!
//! Registration happens at startup (built-in types first, then user types)
//! and again after [`TypeRegistry::clear`] when the editor switches project.
//! Registration never interleaves with scene ticks.
//!
//! ## Collisions
//!
//! The first registration under a name wins. Later attempts are logged and
//! ignored.

mod builtin;
mod component_type;
mod inspector;

pub use builtin::register_builtin_types;
pub use component_type::{
    AddFn, ComponentTypeFlags, ComponentTypeFunctions, DeserializeFn, DrawHeaderFn,
    DrawInspectorFn, HasFn, ReflectComponent, RemoveFn, SerializeFn,
};
pub use inspector::{
    draw_component_header, draw_component_inspector, draw_system_inspector, ComponentHeader,
    Inspector,
};

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::ecs::system::{same_system, system_handle, System, SystemHandle};
use crate::ecs::Component;

/// Longest chain of renames followed before giving up
const MAX_ALIAS_HOPS: usize = 16;

/// Registry of component and system types
#[derive(Default)]
pub struct TypeRegistry {
    component_types: BTreeMap<String, ComponentTypeFunctions>,
    systems: BTreeMap<String, SystemHandle>,
    formerly_known_names: HashMap<String, String>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type under `name`
    ///
    /// Missing `has`, `add` and `remove` functions are generated for `T`.
    /// Returns `false` (and keeps the existing entry) if `name` is taken.
    pub fn register_component_type<T: Component + Default>(
        &mut self,
        name: &str,
        functions: ComponentTypeFunctions,
    ) -> bool {
        self.insert_component_type(name, functions.with_generic_defaults::<T>())
    }

    /// Register a component type whose bundle is already complete
    pub fn register_reflected_component<T: ReflectComponent>(&mut self, name: &str) -> bool {
        self.insert_component_type(name, ComponentTypeFunctions::reflected::<T>())
    }

    /// Register a bundle without a concrete type to derive defaults from
    ///
    /// Missing functions stay missing; callers relying on them get degraded
    /// behavior.
    pub fn register_component_type_functions(
        &mut self,
        name: &str,
        functions: ComponentTypeFunctions,
    ) -> bool {
        self.insert_component_type(name, functions)
    }

    fn insert_component_type(&mut self, name: &str, functions: ComponentTypeFunctions) -> bool {
        if self.component_types.contains_key(name) {
            log::warn!(
                "Component type '{}' is already registered; ignoring the new registration",
                name
            );
            return false;
        }

        let missing = functions.missing_functions();
        if !missing.is_empty() {
            log::warn!(
                "Component type '{}' registered without: {}",
                name,
                missing.join(", ")
            );
        }

        log::debug!("Registered component type '{}'", name);
        self.component_types.insert(name.to_string(), functions);
        true
    }

    /// Register a system instance under `name`
    ///
    /// Returns `false` (and keeps the existing instance) if `name` is taken.
    pub fn register_system(&mut self, name: &str, instance: SystemHandle) -> bool {
        if self.systems.contains_key(name) {
            log::warn!(
                "System '{}' is already registered; ignoring the new registration",
                name
            );
            return false;
        }

        log::debug!("Registered system '{}'", name);
        self.systems.insert(name.to_string(), instance);
        true
    }

    /// Wrap `system` into a handle and register it
    pub fn register_system_instance<S: System + 'static>(&mut self, name: &str, system: S) -> bool {
        self.register_system(name, system_handle(system))
    }

    /// Record that `old_name` now goes by `current_name`
    ///
    /// Lookups of `old_name` resolve to whatever `current_name` resolves to.
    /// An alias for a name that is itself registered never shadows it.
    pub fn register_formerly_known_type_name(
        &mut self,
        old_name: &str,
        current_name: &str,
    ) -> bool {
        if old_name == current_name {
            log::warn!("Ignoring alias of '{}' to itself", old_name);
            return false;
        }

        if let Some(existing) = self.formerly_known_names.get(old_name) {
            log::warn!(
                "'{}' is already known as '{}'; ignoring alias to '{}'",
                old_name,
                existing,
                current_name
            );
            return false;
        }

        log::debug!("'{}' was formerly known as '{}'", current_name, old_name);
        self.formerly_known_names
            .insert(old_name.to_string(), current_name.to_string());
        true
    }

    /// Current registered component type name for a possibly renamed name
    pub fn resolve_component_type_name(&self, name: &str) -> Option<&str> {
        self.resolve_component_type(name).map(|(key, _)| key)
    }

    /// Current registered system name for a possibly renamed name
    pub fn resolve_system_name(&self, name: &str) -> Option<&str> {
        resolve(&self.systems, &self.formerly_known_names, name).map(|(key, _)| key.as_str())
    }

    /// Function bundle for a possibly renamed component type
    pub fn try_get_component_type_functions(
        &self,
        name: &str,
    ) -> Option<&ComponentTypeFunctions> {
        self.resolve_component_type(name).map(|(_, functions)| functions)
    }

    /// Current name and function bundle of a possibly renamed component type
    pub(crate) fn resolve_component_type(
        &self,
        name: &str,
    ) -> Option<(&str, &ComponentTypeFunctions)> {
        resolve(&self.component_types, &self.formerly_known_names, name)
            .map(|(key, functions)| (key.as_str(), functions))
    }

    /// Shared instance of a possibly renamed system
    pub fn try_get_system_instance(&self, name: &str) -> Option<SystemHandle> {
        resolve(&self.systems, &self.formerly_known_names, name)
            .map(|(_, system)| Rc::clone(system))
    }

    /// Registered name of a system instance
    pub fn system_name_of(&self, instance: &SystemHandle) -> Option<&str> {
        self.systems
            .iter()
            .find(|(_, registered)| same_system(registered, instance))
            .map(|(name, _)| name.as_str())
    }

    /// Snapshot of every component type, sorted by name
    ///
    /// Allocates on every call; UI code should cache the result.
    pub fn component_types_names_and_functions(&self) -> Vec<(String, ComponentTypeFunctions)> {
        self.component_types
            .iter()
            .map(|(name, functions)| (name.clone(), *functions))
            .collect()
    }

    /// Snapshot of every system, sorted by name
    ///
    /// Allocates on every call; UI code should cache the result.
    pub fn system_names_and_instances(&self) -> Vec<(String, SystemHandle)> {
        self.systems
            .iter()
            .map(|(name, system)| (name.clone(), Rc::clone(system)))
            .collect()
    }

    /// Iterate over component types in name order without allocating
    pub(crate) fn component_types(&self) -> impl Iterator<Item = (&str, &ComponentTypeFunctions)> {
        self.component_types
            .iter()
            .map(|(name, functions)| (name.as_str(), functions))
    }

    /// Number of registered component types
    pub fn component_type_count(&self) -> usize {
        self.component_types.len()
    }

    /// Number of registered systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Forget every component type
    pub fn clear_registered_component_types(&mut self) {
        log::info!("Clearing {} registered component types", self.component_types.len());
        self.component_types.clear();
    }

    /// Forget every system
    pub fn clear_registered_systems(&mut self) {
        log::info!("Clearing {} registered systems", self.systems.len());
        self.systems.clear();
    }

    /// Forget every rename
    pub fn clear_formerly_known_type_names(&mut self) {
        self.formerly_known_names.clear();
    }

    /// Reset the registry to empty
    pub fn clear(&mut self) {
        self.clear_registered_component_types();
        self.clear_registered_systems();
        self.clear_formerly_known_type_names();
    }
}

fn resolve<'a, V>(
    entries: &'a BTreeMap<String, V>,
    aliases: &HashMap<String, String>,
    name: &str,
) -> Option<(&'a String, &'a V)> {
    let mut current = name;
    for _ in 0..=MAX_ALIAS_HOPS {
        if let Some(entry) = entries.get_key_value(current) {
            return Some(entry);
        }
        current = aliases.get(current).map(String::as_str)?;
    }

    log::warn!("Gave up resolving '{}': rename chain too long or cyclic", name);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Entity, World};
    use crate::serialization::SerializedObject;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    impl Component for Position {}

    fn serialize_first(_world: &World, _entity: Entity, out: &mut SerializedObject) {
        out.set("Which", "first".to_string());
    }

    fn serialize_second(_world: &World, _entity: Entity, out: &mut SerializedObject) {
        out.set("Which", "second".to_string());
    }

    fn which(registry: &TypeRegistry, name: &str) -> Option<String> {
        let functions = registry.try_get_component_type_functions(name)?;
        let world = World::new();
        let mut out = SerializedObject::new();
        (functions.serialize?)(&world, Entity::default(), &mut out);
        out.get("Which")
    }

    struct Idle;
    impl System for Idle {}

    #[test]
    fn test_first_registration_wins() {
        let mut registry = TypeRegistry::new();

        assert!(registry.register_component_type::<Position>(
            "Position",
            ComponentTypeFunctions::new().with_serialize(serialize_first),
        ));
        assert!(!registry.register_component_type::<Position>(
            "Position",
            ComponentTypeFunctions::new().with_serialize(serialize_second),
        ));

        assert_eq!(which(&registry, "Position").as_deref(), Some("first"));
        assert_eq!(registry.component_type_count(), 1);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut registry = TypeRegistry::new();
        registry.register_component_type::<Position>("Position", ComponentTypeFunctions::new());

        assert!(registry.try_get_component_type_functions("position").is_none());
    }

    #[test]
    fn test_generic_defaults_are_installed() {
        let mut registry = TypeRegistry::new();
        registry.register_component_type::<Position>("Position", ComponentTypeFunctions::new());
        let functions = *registry.try_get_component_type_functions("Position").unwrap();

        let mut world = World::new();
        let entity = world.create_entity();
        (functions.add.unwrap())(&mut world, entity);

        assert!((functions.has.unwrap())(&world, entity));
        assert_eq!(world.get_component::<Position>(entity), &Position::default());
        assert_eq!((functions.remove.unwrap())(&mut world, entity), 1);
        assert!(functions.serialize.is_none());
    }

    #[test]
    fn test_alias_resolves_to_same_descriptor() {
        let mut registry = TypeRegistry::new();
        registry.register_component_type::<Position>(
            "New",
            ComponentTypeFunctions::new().with_serialize(serialize_first),
        );
        registry.register_formerly_known_type_name("Old", "New");

        assert_eq!(registry.resolve_component_type_name("Old"), Some("New"));
        assert_eq!(which(&registry, "Old"), which(&registry, "New"));
        assert!(which(&registry, "Old").is_some());
    }

    #[test]
    fn test_alias_chain_and_cycle() {
        let mut registry = TypeRegistry::new();
        registry.register_component_type::<Position>("C", ComponentTypeFunctions::new());
        registry.register_formerly_known_type_name("A", "B");
        registry.register_formerly_known_type_name("B", "C");
        registry.register_formerly_known_type_name("X", "Y");
        registry.register_formerly_known_type_name("Y", "X");

        assert_eq!(registry.resolve_component_type_name("A"), Some("C"));
        assert_eq!(registry.resolve_component_type_name("X"), None);
    }

    #[test]
    fn test_registered_name_is_not_shadowed_by_alias() {
        let mut registry = TypeRegistry::new();
        registry.register_component_type::<Position>("A", ComponentTypeFunctions::new());
        registry.register_component_type::<Position>("B", ComponentTypeFunctions::new());
        registry.register_formerly_known_type_name("A", "B");

        assert_eq!(registry.resolve_component_type_name("A"), Some("A"));
    }

    #[test]
    fn test_duplicate_alias_keeps_first() {
        let mut registry = TypeRegistry::new();
        assert!(registry.register_formerly_known_type_name("Old", "New"));
        assert!(!registry.register_formerly_known_type_name("Old", "Other"));
        assert!(!registry.register_formerly_known_type_name("Same", "Same"));
    }

    #[test]
    fn test_unknown_lookups_return_none() {
        let registry = TypeRegistry::new();
        assert!(registry.try_get_component_type_functions("Missing").is_none());
        assert!(registry.try_get_system_instance("Missing").is_none());
    }

    #[test]
    fn test_system_registration_and_reverse_lookup() {
        let mut registry = TypeRegistry::new();
        let idle = system_handle(Idle);

        assert!(registry.register_system("Idle", Rc::clone(&idle)));
        assert!(!registry.register_system_instance("Idle", Idle));
        registry.register_formerly_known_type_name("Lazy", "Idle");

        let resolved = registry.try_get_system_instance("Lazy").unwrap();
        assert!(same_system(&resolved, &idle));
        assert_eq!(registry.system_name_of(&idle), Some("Idle"));
        assert_eq!(registry.system_names_and_instances().len(), 1);
    }

    #[test]
    fn test_snapshots_are_sorted() {
        let mut registry = TypeRegistry::new();
        registry.register_component_type::<Position>("Zeta", ComponentTypeFunctions::new());
        registry.register_component_type::<Position>("Alpha", ComponentTypeFunctions::new());

        let names: Vec<_> = registry
            .component_types_names_and_functions()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["Alpha".to_string(), "Zeta".to_string()]);
    }

    #[test]
    fn test_clear_resets_state() {
        let mut registry = TypeRegistry::new();
        registry.register_component_type::<Position>("Position", ComponentTypeFunctions::new());
        registry.register_system_instance("Idle", Idle);

        registry.clear_registered_component_types();
        assert_eq!(registry.component_type_count(), 0);
        assert_eq!(registry.system_count(), 1);

        registry.clear();
        assert_eq!(registry.system_count(), 0);
        assert!(registry
            .register_component_type::<Position>("Position", ComponentTypeFunctions::new()));
    }
}
