//! Entity-Component-System
//!
//! Entities are generational handles, components live in one column per
//! type, and systems are phase-driven behavior shared between scenes.

pub mod component;
pub mod components;
pub mod entity;
pub mod storage;
pub mod system;
pub mod systems;
pub mod world;

pub use component::Component;
pub use entity::Entity;
pub use storage::{ComponentStorage, ErasedStorage};
pub use system::{ExecutionPhase, FrameContext, System, SystemHandle};
pub use world::World;
