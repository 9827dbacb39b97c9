//! ECS World implementation
//!
//! The world owns entity lifetimes and one [`ComponentStorage`] column per
//! component type. Component access goes through generic methods; generic
//! engine code that only knows a type by name reaches it through the type
//! registry's function bundles instead.

use super::components::NameComponent;
use super::storage::{ComponentStorage, ErasedStorage};
use super::{Component, Entity};
use slotmap::SlotMap;
use std::any::TypeId;
use std::collections::HashMap;

/// ECS World containing all entities and components
pub struct World {
    entities: SlotMap<Entity, ()>,
    component_storages: HashMap<TypeId, Box<dyn ErasedStorage>>,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            component_storages: HashMap::new(),
        }
    }

    /// Create a new entity with no components
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.entities.insert(());
        log::trace!("Created entity {}", entity);
        entity
    }

    /// Create a new entity carrying a [`NameComponent`]
    pub fn create_named_entity(&mut self, name: impl Into<String>) -> Entity {
        let entity = self.create_entity();
        self.add_component(entity, NameComponent::new(name));
        entity
    }

    /// Destroy an entity and every component attached to it
    ///
    /// Destroying a dead handle is a no-op.
    pub fn destroy_entity(&mut self, entity: Entity) {
        if self.entities.remove(entity).is_none() {
            return;
        }

        for storage in self.component_storages.values_mut() {
            storage.remove(entity);
        }
        log::trace!("Destroyed entity {}", entity);
    }

    /// Check if entity is alive
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains_key(entity)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Add a component to an entity
    ///
    /// # Panics
    /// If the entity is dead or already has a `T`. Use
    /// [`World::add_or_get_component`] when the component may already exist.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> &mut T {
        assert!(self.is_alive(entity), "add_component on dead entity {entity}");
        assert!(
            !self.has_component::<T>(entity),
            "entity {entity} already has component {}",
            std::any::type_name::<T>()
        );

        let storage = self.storage_mut_or_insert::<T>();
        storage.insert(entity, component);
        storage
            .get_mut(entity)
            .unwrap_or_else(|| unreachable!("component inserted above"))
    }

    /// Return the entity's `T`, default-constructing it first if absent
    ///
    /// # Panics
    /// If the entity is dead.
    pub fn add_or_get_component<T: Component + Default>(&mut self, entity: Entity) -> &mut T {
        if !self.has_component::<T>(entity) {
            return self.add_component(entity, T::default());
        }
        self.get_component_mut::<T>(entity)
    }

    /// Borrow a component the entity is known to have
    ///
    /// # Panics
    /// If the entity has no `T`. Check [`World::has_component`] or use
    /// [`World::try_get_component`] when unsure.
    pub fn get_component<T: Component>(&self, entity: Entity) -> &T {
        self.try_get_component::<T>(entity).unwrap_or_else(|| {
            panic!(
                "entity {entity} has no component {}",
                std::any::type_name::<T>()
            )
        })
    }

    /// Mutably borrow a component the entity is known to have
    ///
    /// # Panics
    /// If the entity has no `T`.
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> &mut T {
        self.try_get_component_mut::<T>(entity).unwrap_or_else(|| {
            panic!(
                "entity {entity} has no component {}",
                std::any::type_name::<T>()
            )
        })
    }

    /// Borrow the entity's `T` if it has one
    pub fn try_get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.storage::<T>()?.get(entity)
    }

    /// Mutably borrow the entity's `T` if it has one
    pub fn try_get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.storage_mut::<T>()?.get_mut(entity)
    }

    /// Check if entity has a component
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.component_storages
            .get(&TypeId::of::<T>())
            .is_some_and(|storage| storage.contains(entity))
    }

    /// Remove the entity's `T`, returning how many components were removed (0 or 1)
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> usize {
        self.component_storages
            .get_mut(&TypeId::of::<T>())
            .map_or(0, |storage| usize::from(storage.remove(entity)))
    }

    /// Visit every live entity
    ///
    /// The visitor sees a snapshot of the handles alive when iteration
    /// started, so it may create or destroy entities. Order is storage order
    /// and carries no meaning.
    pub fn for_each_entity(&mut self, mut visitor: impl FnMut(&mut World, Entity)) {
        for entity in self.entities() {
            if self.is_alive(entity) {
                visitor(self, entity);
            }
        }
    }

    /// Snapshot of all live entities in storage order
    pub fn entities(&self) -> Vec<Entity> {
        self.entities.keys().collect()
    }

    /// Snapshot of entities carrying a `T`
    pub fn query<T: Component>(&self) -> Vec<Entity> {
        self.storage::<T>()
            .map(|storage| storage.iter().map(|(entity, _)| entity).collect())
            .unwrap_or_default()
    }

    /// Typed column for `T`, if any entity ever had one
    pub fn storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
        self.component_storages
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<ComponentStorage<T>>()
    }

    /// Mutable typed column for `T`
    pub fn storage_mut<T: Component>(&mut self) -> Option<&mut ComponentStorage<T>> {
        self.component_storages
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
    }

    /// Destroy every entity and component
    pub fn clear(&mut self) {
        self.entities.clear();
        for storage in self.component_storages.values_mut() {
            storage.clear();
        }
    }

    fn storage_mut_or_insert<T: Component>(&mut self) -> &mut ComponentStorage<T> {
        self.component_storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStorage::<T>::new()))
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
            .unwrap_or_else(|| unreachable!("storage keyed by its own TypeId"))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
