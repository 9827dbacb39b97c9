//! Scene model
//!
//! A scene owns its world, one ordered descriptor list per execution phase,
//! the names of its system groups and the systems it could not resolve.
//! List order within a phase is the execution order.

use toml::Table;

use crate::ecs::system::{run_system_phase, ExecutionPhase, FrameContext};
use crate::ecs::{Entity, World};
use crate::registry::TypeRegistry;

use super::descriptor::{GroupId, SystemDescriptor, SystemFilter, UnrecognizedSystemDescriptor};
use super::serializer::{
    component_type, instantiate_component, read_system_entry, PreservedEntityData, SystemEntry,
};

/// Loadable unit of world state and scheduled systems
pub struct Scene {
    name: String,
    world: World,
    pub(super) system_group_names: Vec<String>,
    phases: [Vec<SystemDescriptor>; ExecutionPhase::COUNT],
    unrecognized_systems: Vec<UnrecognizedSystemDescriptor>,
    pub(super) extra_fields: Table,
    next_document_order: u64,
}

impl Scene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            world: World::new(),
            system_group_names: Vec::new(),
            phases: Default::default(),
            unrecognized_systems: Vec::new(),
            extra_fields: Table::new(),
            next_document_order: 0,
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the scene
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Entity world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable entity world
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    // ------------------------------------------------------------------
    // Systems
    // ------------------------------------------------------------------

    /// Descriptors of one phase in execution order
    pub fn system_descriptors(&self, phase: ExecutionPhase) -> &[SystemDescriptor] {
        &self.phases[phase.index()]
    }

    /// Every descriptor with its phase, phases in execution order
    pub fn systems(&self) -> impl Iterator<Item = (ExecutionPhase, &SystemDescriptor)> {
        ExecutionPhase::ALL
            .into_iter()
            .flat_map(move |phase| self.phases[phase.index()].iter().map(move |d| (phase, d)))
    }

    /// Total number of executable descriptors
    pub fn system_count(&self) -> usize {
        self.phases.iter().map(Vec::len).sum()
    }

    /// Append a registered system to a phase
    ///
    /// Returns the descriptor index, or `None` if the registry does not know
    /// `name`.
    pub fn add_system(
        &mut self,
        registry: &TypeRegistry,
        phase: ExecutionPhase,
        name: &str,
    ) -> Option<usize> {
        let Some(instance) = registry.try_get_system_instance(name) else {
            log::warn!("Cannot add unknown system '{}' to {}", name, phase);
            return None;
        };
        let current_name = registry.resolve_system_name(name).unwrap_or(name);
        Some(self.add_system_descriptor(phase, SystemDescriptor::new(current_name, instance)))
    }

    /// Append a descriptor to a phase, returning its index
    pub fn add_system_descriptor(
        &mut self,
        phase: ExecutionPhase,
        mut descriptor: SystemDescriptor,
    ) -> usize {
        descriptor.document_order = self.take_document_order();
        let list = &mut self.phases[phase.index()];
        log::debug!("Scene '{}': {} += '{}'", self.name, phase, descriptor.name);
        list.push(descriptor);
        list.len() - 1
    }

    fn take_document_order(&mut self) -> u64 {
        let order = self.next_document_order;
        self.next_document_order += 1;
        order
    }

    /// Remove the descriptor at `index`
    pub fn remove_system(
        &mut self,
        phase: ExecutionPhase,
        index: usize,
    ) -> Option<SystemDescriptor> {
        let list = &mut self.phases[phase.index()];
        (index < list.len()).then(|| list.remove(index))
    }

    /// Move a descriptor to a new position within its phase
    pub fn move_system(&mut self, phase: ExecutionPhase, from: usize, to: usize) -> bool {
        let list = &mut self.phases[phase.index()];
        if from >= list.len() || to >= list.len() {
            return false;
        }
        let descriptor = list.remove(from);
        list.insert(to, descriptor);
        true
    }

    /// Index of the first descriptor named `name` in a phase
    pub fn find_system(&self, phase: ExecutionPhase, name: &str) -> Option<usize> {
        self.phases[phase.index()].iter().position(|d| d.name == name)
    }

    /// Enable or disable a descriptor; takes effect on the next phase run
    pub fn set_system_enabled(
        &mut self,
        phase: ExecutionPhase,
        index: usize,
        enabled: bool,
    ) -> bool {
        match self.phases[phase.index()].get_mut(index) {
            Some(descriptor) => {
                descriptor.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Assign a descriptor to a group, or ungroup it with `None`
    pub fn set_system_group(
        &mut self,
        phase: ExecutionPhase,
        index: usize,
        group: Option<GroupId>,
    ) -> bool {
        if group.is_some_and(|id| id >= self.system_group_names.len()) {
            return false;
        }
        match self.phases[phase.index()].get_mut(index) {
            Some(descriptor) => {
                descriptor.group = group;
                true
            }
            None => false,
        }
    }

    /// Drop every descriptor and unrecognized system
    pub fn clear_systems(&mut self) {
        self.phases.iter_mut().for_each(Vec::clear);
        self.unrecognized_systems.clear();
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    /// Group names, indexed by [`GroupId`]
    pub fn system_group_names(&self) -> &[String] {
        &self.system_group_names
    }

    /// Id of the group called `name`, creating it if needed
    pub fn add_system_group(&mut self, name: &str) -> GroupId {
        group_id_for(&mut self.system_group_names, name)
    }

    /// Id of an existing group
    pub fn find_system_group(&self, name: &str) -> Option<GroupId> {
        self.system_group_names.iter().position(|g| g == name)
    }

    /// Rename a group; fails if the id is unknown or the name is taken
    pub fn rename_system_group(&mut self, group: GroupId, name: &str) -> bool {
        if group >= self.system_group_names.len() || self.find_system_group(name).is_some() {
            return false;
        }
        self.system_group_names[group] = name.to_string();
        true
    }

    /// Delete a group, ungrouping its members
    ///
    /// Ids above the removed one shift down by one.
    pub fn remove_system_group(&mut self, group: GroupId) -> Option<String> {
        if group >= self.system_group_names.len() {
            return None;
        }
        let removed = self.system_group_names.remove(group);

        for descriptor in self.phases.iter_mut().flatten() {
            descriptor.group = match descriptor.group {
                Some(id) if id == group => None,
                Some(id) if id > group => Some(id - 1),
                other => other,
            };
        }

        Some(removed)
    }

    /// Enable or disable every member of a group, returning how many changed
    pub fn set_group_enabled(&mut self, group: GroupId, enabled: bool) -> usize {
        let mut changed = 0;
        for descriptor in self.phases.iter_mut().flatten() {
            if descriptor.group == Some(group) && descriptor.enabled != enabled {
                descriptor.enabled = enabled;
                changed += 1;
            }
        }
        changed
    }

    // ------------------------------------------------------------------
    // Unrecognized systems
    // ------------------------------------------------------------------

    /// Systems the registry could not resolve at load time
    pub fn unrecognized_systems(&self) -> &[UnrecognizedSystemDescriptor] {
        &self.unrecognized_systems
    }

    /// Keep an unresolvable system entry
    pub fn add_unrecognized_system(&mut self, mut descriptor: UnrecognizedSystemDescriptor) {
        log::warn!(
            "Scene '{}' references unrecognized system '{}'",
            self.name,
            descriptor.name
        );
        descriptor.document_order = self.take_document_order();
        self.unrecognized_systems.push(descriptor);
    }

    /// Delete an unrecognized entry for good
    pub fn remove_unrecognized_system(
        &mut self,
        index: usize,
    ) -> Option<UnrecognizedSystemDescriptor> {
        (index < self.unrecognized_systems.len()).then(|| self.unrecognized_systems.remove(index))
    }

    /// Delete every unrecognized entry
    pub fn clear_unrecognized_systems(&mut self) {
        self.unrecognized_systems.clear();
    }

    /// Resolve unrecognized entries again after the registry changed
    ///
    /// A resolved entry takes the place in its phase that its position in
    /// the document implies. Returns how many were resolved.
    pub fn retry_unrecognized_systems(&mut self, registry: &TypeRegistry) -> usize {
        let pending = std::mem::take(&mut self.unrecognized_systems);
        let mut resolved = 0;

        for entry in pending {
            match read_system_entry(&entry.raw, registry, &mut self.system_group_names) {
                Ok(SystemEntry::Recognized(phase, mut descriptor)) => {
                    log::info!("Resolved previously unrecognized system '{}'", entry.name);
                    descriptor.document_order = entry.document_order;
                    let list = &mut self.phases[phase.index()];
                    let index = list
                        .iter()
                        .position(|d| d.document_order > entry.document_order)
                        .unwrap_or(list.len());
                    list.insert(index, descriptor);
                    resolved += 1;
                }
                Ok(SystemEntry::Unrecognized(_)) | Err(_) => self.unrecognized_systems.push(entry),
            }
        }

        resolved
    }

    // ------------------------------------------------------------------
    // Unrecognized components
    // ------------------------------------------------------------------

    /// Number of preserved component tables across all entities
    pub fn unrecognized_component_count(&self) -> usize {
        let world = &self.world;
        world
            .query::<PreservedEntityData>()
            .into_iter()
            .map(|entity| {
                world
                    .get_component::<PreservedEntityData>(entity)
                    .unrecognized_components
                    .len()
            })
            .sum()
    }

    /// Instantiate preserved component tables whose type is now registered
    ///
    /// Returns how many tables became components.
    pub fn retry_unrecognized_components(&mut self, registry: &TypeRegistry) -> usize {
        let world = &mut self.world;
        let mut resolved = 0;

        for entity in world.query::<PreservedEntityData>() {
            let pending = std::mem::take(
                &mut world
                    .get_component_mut::<PreservedEntityData>(entity)
                    .unrecognized_components,
            );
            let mut kept = Vec::new();
            let mut leftovers = Vec::new();

            for table in pending {
                let instantiated = component_type(&table)
                    .and_then(|type_name| registry.resolve_component_type(type_name))
                    .and_then(|(name, functions)| {
                        instantiate_component(world, entity, name, functions, &table)
                            .map(|leftover| (name, leftover))
                    });
                match instantiated {
                    Some((name, leftover)) => {
                        log::info!("Resolved previously unrecognized component '{}'", name);
                        if !leftover.is_empty() {
                            leftovers.push((name.to_string(), leftover));
                        }
                        resolved += 1;
                    }
                    None => kept.push(table),
                }
            }

            let preserved = world.get_component_mut::<PreservedEntityData>(entity);
            preserved.unrecognized_components = kept;
            preserved.component_extra_fields.extend(leftovers);
            if preserved.is_empty() {
                world.remove_component::<PreservedEntityData>(entity);
            }
        }

        resolved
    }

    /// Delete one preserved component table of `entity` for good
    pub fn remove_unrecognized_component(&mut self, entity: Entity, index: usize) -> Option<Table> {
        let preserved = self.world.try_get_component_mut::<PreservedEntityData>(entity)?;
        if index >= preserved.unrecognized_components.len() {
            return None;
        }
        let removed = preserved.unrecognized_components.remove(index);
        if preserved.is_empty() {
            self.world.remove_component::<PreservedEntityData>(entity);
        }
        Some(removed)
    }

    /// Delete every preserved component table, returning how many were dropped
    pub fn clear_unrecognized_components(&mut self) -> usize {
        let world = &mut self.world;
        let mut dropped = 0;

        for entity in world.query::<PreservedEntityData>() {
            let preserved = world.get_component_mut::<PreservedEntityData>(entity);
            dropped += preserved.unrecognized_components.len();
            preserved.unrecognized_components.clear();
            if preserved.is_empty() {
                world.remove_component::<PreservedEntityData>(entity);
            }
        }

        dropped
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Run every enabled, admitted descriptor of `ctx.phase` in list order
    ///
    /// Returns the number of systems invoked. A system instance that is
    /// already borrowed (listed twice and re-entered) is skipped.
    pub fn execute_phase(&mut self, ctx: &FrameContext, filter: SystemFilter) -> usize {
        let Self { phases, world, .. } = self;
        let mut invoked = 0;

        for descriptor in &phases[ctx.phase.index()] {
            if !descriptor.enabled {
                continue;
            }
            let Ok(mut system) = descriptor.instance.try_borrow_mut() else {
                log::warn!(
                    "System '{}' is already running; skipped in {}",
                    descriptor.name,
                    ctx.phase
                );
                continue;
            };
            if !filter.admits(&*system) {
                continue;
            }

            run_system_phase(&mut *system, world, ctx);
            invoked += 1;
        }

        invoked
    }

    /// Reset to an empty scene, keeping the name
    pub fn clear(&mut self) {
        self.world.clear();
        self.clear_systems();
        self.system_group_names.clear();
        self.extra_fields.clear();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

pub(crate) fn group_id_for(groups: &mut Vec<String>, name: &str) -> GroupId {
    match groups.iter().position(|g| g == name) {
        Some(id) => id,
        None => {
            groups.push(name.to_string());
            groups.len() - 1
        }
    }
}
