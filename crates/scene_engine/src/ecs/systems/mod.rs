//! ECS Systems module

pub mod movement;

pub use movement::MovementSystem;
