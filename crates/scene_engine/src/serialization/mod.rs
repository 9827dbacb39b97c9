//! Serialization primitives
//!
//! Scenes persist as TOML documents: tables of tables and arrays of tables
//! holding primitive values. Component code never touches TOML directly; it
//! reads and writes typed values through [`SerializedObject`].

mod object;
mod value;

pub use object::{SerializedObject, TYPE_KEY};
pub use value::SerializedValue;
