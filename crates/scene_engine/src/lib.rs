//! # Scene Engine
//!
//! Editor-facing core of a game engine: a type registry, an entity world,
//! scenes with phase-ordered systems, and the serializer that moves scenes
//! in and out of TOML documents.
//!
//! ## Features
//!
//! - **Type Registry**: components and systems registered by name, with renames
//! - **ECS Architecture**: generational entities and per-type component columns
//! - **Scene Scheduler**: fixed-step and per-frame phases, edit and play mode
//! - **Forward-Compatible Scenes**: unknown types survive a load/save cycle
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut registry = TypeRegistry::new();
//!     register_builtin_types(&mut registry);
//!
//!     let mut manager = SceneManager::with_config(RuntimeConfig::standalone());
//!     manager.request_load_file("assets/scenes/sample.toml");
//!
//!     for _ in 0..60 {
//!         manager.tick(&registry, 1.0 / 60.0);
//!     }
//!     manager.shutdown(&registry);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod foundation;
pub mod registry;
pub mod scene;
pub mod serialization;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, RuntimeConfig, RuntimeMode},
        ecs::{
            components::{MovementComponent, NameComponent, SpriteComponent, TransformComponent},
            Component, Entity, ExecutionPhase, FrameContext, System, SystemHandle, World,
        },
        foundation::math::{Color, Quat, Vec2, Vec3, Vec4},
        registry::{
            register_builtin_types, ComponentTypeFunctions, Inspector, ReflectComponent,
            TypeRegistry,
        },
        scene::{FrameStats, Scene, SceneError, SceneManager},
        serialization::{SerializedObject, SerializedValue},
    };
}
