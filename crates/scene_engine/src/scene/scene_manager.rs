//! Scene Manager - drives the active scene one frame at a time
//!
//! Per tick:
//! 1. `on_pre_application_run` once before the first frame (pending load)
//! 2. `FixedUpdate` zero or more times from the fixed-step accumulator
//! 3. `Update`, `LateUpdate`, `Render`, `PostRender`, `ImGui`, `Cleanup`
//! 4. deferred play-mode change, then deferred scene load or unload
//!
//! `Initialize` runs when a scene becomes active and `TearDown` right before
//! it is replaced or unloaded. In editor mode, systems that did not opt into
//! edit mode only run while playing.

use std::path::PathBuf;

use toml::Table;

use crate::config::{RuntimeConfig, RuntimeMode};
use crate::ecs::system::{ExecutionPhase, FrameContext};
use crate::foundation::time::FixedTimestep;
use crate::registry::TypeRegistry;

use super::descriptor::SystemFilter;
use super::error::SceneError;
use super::model::Scene;

/// Deferred scene change, applied at the end of a frame
enum SceneOperation {
    LoadFile(PathBuf),
    LoadDocument(Table),
    LoadScene(Box<Scene>),
    Unload,
}

impl SceneOperation {
    fn describe(&self) -> String {
        match self {
            Self::LoadFile(path) => format!("load {}", path.display()),
            Self::LoadDocument(_) => "load document".to_string(),
            Self::LoadScene(scene) => format!("load scene '{}'", scene.name()),
            Self::Unload => "unload".to_string(),
        }
    }
}

/// Counters of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Index of the frame that was run
    pub frame: u64,
    /// Fixed steps executed this frame
    pub fixed_steps: u32,
    /// System hook invocations this frame, fixed steps included
    pub systems_invoked: usize,
}

/// Scene scheduler
pub struct SceneManager {
    config: RuntimeConfig,
    scene: Option<Scene>,
    playing: bool,
    pending_play_mode: Option<bool>,
    pending_operation: Option<SceneOperation>,
    play_snapshot: Option<Table>,
    fixed_timestep: FixedTimestep,
    frame: u64,
    started: bool,
    last_scene_error: Option<SceneError>,
}

impl SceneManager {
    /// Create a scheduler with default settings (editor mode)
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a scheduler with custom settings
    pub fn with_config(config: RuntimeConfig) -> Self {
        let fixed_timestep =
            FixedTimestep::new(config.fixed_timestep, config.max_fixed_steps_per_frame);
        let playing = config.mode == RuntimeMode::Standalone;
        Self {
            config,
            scene: None,
            playing,
            pending_play_mode: None,
            pending_operation: None,
            play_snapshot: None,
            fixed_timestep,
            frame: 0,
            started: false,
            last_scene_error: None,
        }
    }

    /// Settings in use
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Whether play-mode systems run
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Number of frames ticked so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// The running scene
    pub fn active_scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// The running scene, mutably
    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    /// Error of the most recent failed scene load
    pub fn last_scene_error(&self) -> Option<&SceneError> {
        self.last_scene_error.as_ref()
    }

    /// Take the most recent scene load error, clearing it
    pub fn take_last_scene_error(&mut self) -> Option<SceneError> {
        self.last_scene_error.take()
    }

    fn filter(&self) -> SystemFilter {
        match (self.config.mode, self.playing) {
            (RuntimeMode::Standalone, _) | (RuntimeMode::Editor, true) => SystemFilter::All,
            (RuntimeMode::Editor, false) => SystemFilter::EditMode,
        }
    }

    fn context(&self, phase: ExecutionPhase, delta_time: f32) -> FrameContext {
        FrameContext {
            phase,
            delta_time,
            fixed_delta_time: self.fixed_timestep.step(),
            frame: self.frame,
            is_playing: self.playing,
        }
    }

    // ------------------------------------------------------------------
    // Requests
    // ------------------------------------------------------------------

    /// Enter or leave play mode at the end of the current frame
    ///
    /// Ignored in standalone mode, which is always playing.
    pub fn request_play_mode(&mut self, playing: bool) {
        if self.config.mode == RuntimeMode::Standalone {
            log::warn!("Play mode requests are ignored in standalone mode");
            return;
        }
        self.pending_play_mode = Some(playing);
    }

    /// Load a scene file at the end of the current frame
    pub fn request_load_file(&mut self, path: impl Into<PathBuf>) {
        self.queue_operation(SceneOperation::LoadFile(path.into()));
    }

    /// Load a scene from an in-memory document at the end of the current frame
    pub fn request_load_document(&mut self, document: Table) {
        self.queue_operation(SceneOperation::LoadDocument(document));
    }

    /// Switch to an already built scene at the end of the current frame
    pub fn request_load_scene(&mut self, scene: Scene) {
        self.queue_operation(SceneOperation::LoadScene(Box::new(scene)));
    }

    /// Unload the active scene at the end of the current frame
    pub fn request_unload(&mut self) {
        self.queue_operation(SceneOperation::Unload);
    }

    fn queue_operation(&mut self, operation: SceneOperation) {
        if let Some(replaced) = self.pending_operation.replace(operation) {
            log::debug!("Pending scene operation '{}' superseded", replaced.describe());
        }
    }

    // ------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------

    /// Resolve the pending scene load before the first frame
    ///
    /// Called by the first [`SceneManager::tick`] if the host has not called
    /// it already. Later calls do nothing.
    pub fn on_pre_application_run(&mut self, registry: &TypeRegistry) {
        if self.started {
            return;
        }
        self.started = true;

        self.apply_pending_operation(registry);

        if self.config.start_in_play_mode && self.config.mode == RuntimeMode::Editor {
            self.set_playing(registry, true);
        }
        log::info!("Scene manager started in {:?} mode", self.config.mode);
    }

    /// Run one frame of `delta_time` seconds
    ///
    /// A negative or non-finite delta runs the frame with zero elapsed time.
    pub fn tick(&mut self, registry: &TypeRegistry, delta_time: f32) -> FrameStats {
        let delta_time = if delta_time.is_finite() {
            delta_time.max(0.0)
        } else {
            log::warn!("Frame {}: non-finite delta {} treated as zero", self.frame, delta_time);
            0.0
        };
        if !self.started {
            self.on_pre_application_run(registry);
        }

        let mut stats = FrameStats {
            frame: self.frame,
            ..FrameStats::default()
        };

        if self.scene.is_some() {
            let filter = self.filter();
            let steps = self.fixed_timestep.advance(delta_time);
            let fixed_ctx = self.context(ExecutionPhase::FixedUpdate, self.fixed_timestep.step());
            let frame_contexts =
                ExecutionPhase::PER_FRAME.map(|phase| self.context(phase, delta_time));

            if let Some(scene) = self.scene.as_mut() {
                for _ in 0..steps {
                    stats.systems_invoked += scene.execute_phase(&fixed_ctx, filter);
                }
                for ctx in &frame_contexts {
                    stats.systems_invoked += scene.execute_phase(ctx, filter);
                }
            }
            stats.fixed_steps = steps;
        }

        if let Some(playing) = self.pending_play_mode.take() {
            self.set_playing(registry, playing);
        }
        self.apply_pending_operation(registry);

        log::trace!(
            "Frame {}: {} fixed steps, {} system calls",
            stats.frame,
            stats.fixed_steps,
            stats.systems_invoked
        );
        self.frame += 1;
        stats
    }

    /// Tear down and drop the active scene immediately
    pub fn shutdown(&mut self, registry: &TypeRegistry) {
        self.pending_operation = None;
        self.pending_play_mode = None;
        if self.playing && self.config.mode == RuntimeMode::Editor {
            self.set_playing(registry, false);
        }
        self.deactivate_scene();
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    fn run_phase(&mut self, phase: ExecutionPhase, filter: SystemFilter) -> usize {
        let ctx = self.context(phase, 0.0);
        self.scene
            .as_mut()
            .map_or(0, |scene| scene.execute_phase(&ctx, filter))
    }

    fn set_playing(&mut self, registry: &TypeRegistry, playing: bool) {
        if playing == self.playing {
            return;
        }

        if playing {
            self.play_snapshot = self.scene.as_ref().map(|scene| scene.to_document(registry));
            self.playing = true;
            self.fixed_timestep.reset();
            self.run_phase(ExecutionPhase::Initialize, SystemFilter::PlayOnly);
            log::info!("Entered play mode");
            return;
        }

        self.run_phase(ExecutionPhase::TearDown, SystemFilter::All);
        self.playing = false;

        if let Some(snapshot) = self.play_snapshot.take() {
            match Scene::from_document(snapshot, registry) {
                Ok(restored) => {
                    if let Some(scene) = self.scene.as_mut() {
                        scene.world_mut().clear();
                    }
                    self.scene = Some(restored);
                }
                Err(error) => {
                    log::error!("Failed to restore the edit-time scene: {}", error);
                    self.last_scene_error = Some(error);
                }
            }
        }

        self.run_phase(ExecutionPhase::Initialize, SystemFilter::EditMode);
        log::info!("Left play mode");
    }

    fn apply_pending_operation(&mut self, registry: &TypeRegistry) {
        let Some(operation) = self.pending_operation.take() else {
            return;
        };
        log::debug!("Applying scene operation '{}'", operation.describe());

        let loaded = match operation {
            SceneOperation::Unload => {
                self.deactivate_scene();
                self.play_snapshot = None;
                return;
            }
            SceneOperation::LoadFile(path) => Scene::load_from_file(&path, registry),
            SceneOperation::LoadDocument(document) => Scene::from_document(document, registry),
            SceneOperation::LoadScene(scene) => Ok(*scene),
        };

        match loaded {
            Ok(scene) => self.activate_scene(registry, scene),
            Err(error) => {
                log::error!("Scene load failed, keeping the current scene: {}", error);
                self.last_scene_error = Some(error);
            }
        }
    }

    fn deactivate_scene(&mut self) {
        let filter = self.filter();
        self.run_phase(ExecutionPhase::TearDown, filter);
        if let Some(mut scene) = self.scene.take() {
            scene.world_mut().clear();
            log::info!("Unloaded scene '{}'", scene.name());
        }
    }

    fn activate_scene(&mut self, registry: &TypeRegistry, scene: Scene) {
        self.deactivate_scene();

        if self.playing && self.config.mode == RuntimeMode::Editor {
            self.play_snapshot = Some(scene.to_document(registry));
        }

        log::info!("Activated scene '{}'", scene.name());
        self.scene = Some(scene);
        self.last_scene_error = None;
        self.fixed_timestep.reset();

        let filter = self.filter();
        self.run_phase(ExecutionPhase::Initialize, filter);
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}
