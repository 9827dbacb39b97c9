//! Component Storage
//!
//! One sparse column per component type, keyed by entity. The world keeps the
//! columns behind the type-erased [`ErasedStorage`] so it can drop an entity's
//! components without knowing their types.

use std::any::Any;

use slotmap::SecondaryMap;

use super::{Component, Entity};

/// Type-erased view of a component column
pub trait ErasedStorage: Any + Send + Sync {
    /// Remove the entity's component, returning whether one was present
    fn remove(&mut self, entity: Entity) -> bool;

    /// Whether the entity has a component in this column
    fn contains(&self, entity: Entity) -> bool;

    /// Drop every component in the column
    fn clear(&mut self);

    /// Number of stored components
    fn len(&self) -> usize;

    /// Whether the column is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upcast for downcasting to the concrete column
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete column
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Concrete column for a single component type
pub struct ComponentStorage<T: Component> {
    components: SecondaryMap<Entity, T>,
}

impl<T: Component> ComponentStorage<T> {
    /// Create an empty column
    pub fn new() -> Self {
        Self {
            components: SecondaryMap::new(),
        }
    }

    /// Insert or overwrite the entity's component, returning the previous value
    pub fn insert(&mut self, entity: Entity, component: T) -> Option<T> {
        self.components.insert(entity, component)
    }

    /// Borrow the entity's component
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.components.get(entity)
    }

    /// Mutably borrow the entity's component
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.components.get_mut(entity)
    }

    /// Take the entity's component out of the column
    pub fn take(&mut self, entity: Entity) -> Option<T> {
        self.components.remove(entity)
    }

    /// Iterate over (entity, component) pairs in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.components.iter()
    }

    /// Mutably iterate over (entity, component) pairs in slot order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.components.iter_mut()
    }
}

impl<T: Component> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ErasedStorage for ComponentStorage<T> {
    fn remove(&mut self, entity: Entity) -> bool {
        self.components.remove(entity).is_some()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.components.contains_key(entity)
    }

    fn clear(&mut self) {
        self.components.clear();
    }

    fn len(&self) -> usize {
        self.components.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
