//! Scenes and their execution
//!
//! ## Architecture
//!
//! ```text
//! Scene file (TOML)
//!      ↓  serializer + TypeRegistry
//! Scene (World + per-phase SystemDescriptors)
//!      ↓
//! SceneManager (phase-ordered ticks, play mode, deferred loads)
//! ```
//!
//! Systems and component types the registry cannot resolve never reach the
//! scheduler. Their data rides along with the scene and is written back
//! unchanged on save.

mod descriptor;
mod error;
mod model;
mod scene_manager;
mod serializer;

#[cfg(test)]
mod tests;

pub use descriptor::{GroupId, SystemDescriptor, SystemFilter, UnrecognizedSystemDescriptor};
pub use error::{SceneError, SceneResult};
pub use model::Scene;
pub use scene_manager::{FrameStats, SceneManager};
pub use serializer::{deserialize_entity, serialize_entity, PreservedEntityData};
