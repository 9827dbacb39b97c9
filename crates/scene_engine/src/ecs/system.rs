//! System trait and execution phases
//!
//! A system is a behavior unit invoked once per relevant [`ExecutionPhase`]
//! against a scene's world. Instances are registered once with the type
//! registry and shared by every scene that lists them, so they are handed
//! around as [`SystemHandle`]s.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ecs::World;
use crate::registry::Inspector;

/// System execution phases with explicit ordering
///
/// `Initialize` and `TearDown` bracket a scene's lifetime; the phases between
/// them repeat every frame in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExecutionPhase {
    /// Scene became active
    Initialize = 0,
    /// Fixed-rate simulation, zero or more times per frame
    FixedUpdate = 1,
    /// Variable-rate game logic
    Update = 2,
    /// Logic that must observe the results of `Update`
    LateUpdate = 3,
    /// Render submission
    Render = 4,
    /// Work after render submission
    PostRender = 5,
    /// Immediate-mode editor and debug UI
    ImGui = 6,
    /// End of frame housekeeping
    Cleanup = 7,
    /// Scene is being unloaded
    TearDown = 8,
}

impl ExecutionPhase {
    /// Number of phases
    pub const COUNT: usize = 9;

    /// Every phase in execution order
    pub const ALL: [Self; Self::COUNT] = [
        Self::Initialize,
        Self::FixedUpdate,
        Self::Update,
        Self::LateUpdate,
        Self::Render,
        Self::PostRender,
        Self::ImGui,
        Self::Cleanup,
        Self::TearDown,
    ];

    /// Phases that run once per frame after the fixed-update loop
    pub const PER_FRAME: [Self; 6] = [
        Self::Update,
        Self::LateUpdate,
        Self::Render,
        Self::PostRender,
        Self::ImGui,
        Self::Cleanup,
    ];

    /// Position in execution order
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable name used in scene files
    pub const fn name(self) -> &'static str {
        match self {
            Self::Initialize => "Initialize",
            Self::FixedUpdate => "FixedUpdate",
            Self::Update => "Update",
            Self::LateUpdate => "LateUpdate",
            Self::Render => "Render",
            Self::PostRender => "PostRender",
            Self::ImGui => "ImGui",
            Self::Cleanup => "Cleanup",
            Self::TearDown => "TearDown",
        }
    }

    /// Parse a phase name as written by [`ExecutionPhase::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|phase| phase.name() == name)
    }
}

impl fmt::Display for ExecutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-invocation information handed to systems
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Phase being executed
    pub phase: ExecutionPhase,
    /// Seconds covered by this invocation (the fixed step during `FixedUpdate`)
    pub delta_time: f32,
    /// Length of one fixed step in seconds
    pub fixed_delta_time: f32,
    /// Index of the current frame
    pub frame: u64,
    /// Whether the scene is in play mode
    pub is_playing: bool,
}

/// System trait for processing entities and components
///
/// Every phase hook defaults to doing nothing; a system overrides the hooks
/// of the phases it is listed under.
pub trait System {
    /// Whether the system also runs while the editor is not in play mode
    fn execute_in_edit_mode(&self) -> bool {
        false
    }

    /// Scene became active
    fn initialize(&mut self, _world: &mut World, _ctx: &FrameContext) {}

    /// Fixed-rate step
    fn fixed_update(&mut self, _world: &mut World, _ctx: &FrameContext) {}

    /// Per-frame update
    fn update(&mut self, _world: &mut World, _ctx: &FrameContext) {}

    /// Per-frame late update
    fn late_update(&mut self, _world: &mut World, _ctx: &FrameContext) {}

    /// Render submission
    fn render(&mut self, _world: &mut World, _ctx: &FrameContext) {}

    /// After render submission
    fn post_render(&mut self, _world: &mut World, _ctx: &FrameContext) {}

    /// Immediate-mode UI
    fn imgui(&mut self, _world: &mut World, _ctx: &FrameContext) {}

    /// End of frame
    fn cleanup(&mut self, _world: &mut World, _ctx: &FrameContext) {}

    /// Scene is being unloaded
    fn tear_down(&mut self, _world: &mut World, _ctx: &FrameContext) {}

    /// Draw the system's settings; returns whether anything changed
    fn draw_inspector(&mut self, ui: &mut dyn Inspector) -> bool {
        ui.unsupported(std::any::type_name::<Self>());
        false
    }
}

/// Shared, single-threaded handle to a registered system instance
pub type SystemHandle = Rc<RefCell<dyn System>>;

/// Wrap a system into a shareable handle
pub fn system_handle<S: System + 'static>(system: S) -> SystemHandle {
    Rc::new(RefCell::new(system))
}

/// Whether two handles refer to the same instance
pub fn same_system(a: &SystemHandle, b: &SystemHandle) -> bool {
    std::ptr::eq(Rc::as_ptr(a).cast::<()>(), Rc::as_ptr(b).cast::<()>())
}

/// Invoke the hook matching `ctx.phase`
pub fn run_system_phase(system: &mut dyn System, world: &mut World, ctx: &FrameContext) {
    match ctx.phase {
        ExecutionPhase::Initialize => system.initialize(world, ctx),
        ExecutionPhase::FixedUpdate => system.fixed_update(world, ctx),
        ExecutionPhase::Update => system.update(world, ctx),
        ExecutionPhase::LateUpdate => system.late_update(world, ctx),
        ExecutionPhase::Render => system.render(world, ctx),
        ExecutionPhase::PostRender => system.post_render(world, ctx),
        ExecutionPhase::ImGui => system.imgui(world, ctx),
        ExecutionPhase::Cleanup => system.cleanup(world, ctx),
        ExecutionPhase::TearDown => system.tear_down(world, ctx),
    }
}
