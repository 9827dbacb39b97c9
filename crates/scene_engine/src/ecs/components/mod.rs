//! ECS Components module
//!
//! Built-in engine components. Each one is plain data plus its persisted
//! and inspector representation.

pub mod movement;
pub mod name;
pub mod sprite;
pub mod transform;

pub use movement::MovementComponent;
pub use name::NameComponent;
pub use sprite::SpriteComponent;
pub use transform::TransformComponent;
