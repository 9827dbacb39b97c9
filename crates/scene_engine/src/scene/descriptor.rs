//! System descriptors
//!
//! A descriptor places one registered system into one phase of a scene.
//! Systems the registry cannot resolve never become descriptors; they are
//! kept as [`UnrecognizedSystemDescriptor`]s in a separate list so the
//! scheduler can never invoke them.

use std::fmt;

use toml::Table;

use crate::ecs::system::{System, SystemHandle};

/// Index into a scene's system group names
pub type GroupId = usize;

/// Entry of a scene's per-phase system list
#[derive(Clone)]
pub struct SystemDescriptor {
    /// Registered system name
    pub name: String,
    /// Editor grouping, `None` for ungrouped
    pub group: Option<GroupId>,
    /// Disabled descriptors are skipped without side effects
    pub enabled: bool,
    /// Shared instance from the type registry
    pub instance: SystemHandle,
    /// Keys of the persisted entry this build does not understand
    pub(crate) extra_fields: Table,
    /// Position among the scene's persisted system entries
    pub(crate) document_order: u64,
}

impl SystemDescriptor {
    /// Enabled, ungrouped descriptor
    pub fn new(name: impl Into<String>, instance: SystemHandle) -> Self {
        Self {
            name: name.into(),
            group: None,
            enabled: true,
            instance,
            extra_fields: Table::new(),
            document_order: 0,
        }
    }

    /// Builder pattern: place into a group
    pub fn with_group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    /// Builder pattern: set enabled state
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl fmt::Debug for SystemDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemDescriptor")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// System entry whose type the registry could not resolve
///
/// The persisted table is kept untouched and written back on save.
#[derive(Debug, Clone, PartialEq)]
pub struct UnrecognizedSystemDescriptor {
    /// Name as written in the document
    pub name: String,
    /// The entry exactly as loaded
    pub raw: Table,
    /// Position among the scene's persisted system entries
    pub(crate) document_order: u64,
}

impl UnrecognizedSystemDescriptor {
    /// Keep `raw` under the name it was written with
    pub fn new(name: impl Into<String>, raw: Table) -> Self {
        Self {
            name: name.into(),
            raw,
            document_order: 0,
        }
    }
}

/// Which systems a phase run admits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemFilter {
    /// Every enabled system
    All,
    /// Only systems that opted into running while editing
    EditMode,
    /// Only systems that do not run while editing
    PlayOnly,
}

impl SystemFilter {
    /// Whether `system` runs under this filter
    pub fn admits(self, system: &dyn System) -> bool {
        match self {
            Self::All => true,
            Self::EditMode => system.execute_in_edit_mode(),
            Self::PlayOnly => !system.execute_in_edit_mode(),
        }
    }
}
