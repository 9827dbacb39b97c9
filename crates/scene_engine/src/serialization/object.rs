//! Serialized object
//!
//! A typed key/value view over one document table. Component serializers
//! write into it, deserializers read from it with a fallback default so that
//! older files missing a key still load.

use toml::{Table, Value};

use super::SerializedValue;

/// Key under which every component and system table records its type name
pub const TYPE_KEY: &str = "Type";

/// One table of a persisted document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SerializedObject {
    table: Table,
}

impl SerializedObject {
    /// Create an empty object
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an object tagged with a type name
    pub fn with_type(type_name: &str) -> Self {
        let mut object = Self::new();
        object.set(TYPE_KEY, type_name.to_string());
        object
    }

    /// Wrap an existing table
    pub fn from_table(table: Table) -> Self {
        Self { table }
    }

    /// Borrow the underlying table
    pub fn as_table(&self) -> &Table {
        &self.table
    }

    /// Unwrap into the underlying table
    pub fn into_table(self) -> Table {
        self.table
    }

    /// Type tag, if present and a string
    pub fn type_name(&self) -> Option<&str> {
        self.table.get(TYPE_KEY).and_then(Value::as_str)
    }

    /// Write a value, replacing any previous value under `key`
    pub fn set<T: SerializedValue>(&mut self, key: &str, value: T) {
        self.table.insert(key.to_string(), value.to_value());
    }

    /// Read a value, `None` when absent or of the wrong shape
    pub fn get<T: SerializedValue>(&self, key: &str) -> Option<T> {
        let value = self.table.get(key)?;
        let decoded = T::from_value(value);
        if decoded.is_none() {
            log::warn!(
                "Key '{}' holds {} which is not a {}",
                key,
                value.type_str(),
                std::any::type_name::<T>()
            );
        }
        decoded
    }

    /// Read a value, falling back to `default` when absent or malformed
    pub fn get_or<T: SerializedValue>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Overwrite `target` only if `key` holds a well-formed value
    ///
    /// Returns whether `target` was written.
    pub fn read_into<T: SerializedValue>(&self, key: &str, target: &mut T) -> bool {
        match self.get(key) {
            Some(value) => {
                *target = value;
                true
            }
            None => false,
        }
    }

    /// Whether `key` is present
    pub fn contains(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    /// Remove and return the raw value under `key`
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.table.remove(key)
    }

    /// Nested object under `key`
    pub fn child(&self, key: &str) -> Option<Self> {
        self.table
            .get(key)
            .and_then(Value::as_table)
            .map(|table| Self::from_table(table.clone()))
    }

    /// Store a nested object under `key`
    pub fn set_child(&mut self, key: &str, child: Self) {
        self.table.insert(key.to_string(), Value::Table(child.table));
    }

    /// Keys in document order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the object has no keys
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl From<Table> for SerializedObject {
    fn from(table: Table) -> Self {
        Self::from_table(table)
    }
}

impl From<SerializedObject> for Table {
    fn from(object: SerializedObject) -> Self {
        object.table
    }
}
