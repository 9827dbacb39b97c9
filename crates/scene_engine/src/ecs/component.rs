//! Component trait

/// Marker trait for components
///
/// Components are plain data. An entity holds at most one instance of any
/// given component type.
pub trait Component: 'static + Send + Sync {}
