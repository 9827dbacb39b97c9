//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math value types persisted by components
//! - Time management and fixed-step accumulation
//! - Logging utilities

pub mod math;
pub mod time;
pub mod logging;
