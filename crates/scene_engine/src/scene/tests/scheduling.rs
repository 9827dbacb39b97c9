//! Scheduler behavior against real scenes

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;

use crate::config::RuntimeConfig;
use crate::ecs::components::{MovementComponent, NameComponent, TransformComponent};
use crate::ecs::system::{ExecutionPhase, FrameContext, System};
use crate::ecs::World;
use crate::foundation::math::Vec3;
use crate::registry::{register_builtin_types, TypeRegistry};
use crate::scene::{Scene, SceneError, SceneManager};

type CallLog = Rc<RefCell<Vec<&'static str>>>;

/// Records its tag for every phase hook it is invoked for
struct Tagged {
    tag: &'static str,
    edit: bool,
    log: CallLog,
}

impl Tagged {
    fn push(&self) {
        self.log.borrow_mut().push(self.tag);
    }
}

impl System for Tagged {
    fn execute_in_edit_mode(&self) -> bool {
        self.edit
    }

    fn fixed_update(&mut self, _world: &mut World, _ctx: &FrameContext) {
        self.push();
    }

    fn update(&mut self, _world: &mut World, _ctx: &FrameContext) {
        self.push();
    }

    fn late_update(&mut self, _world: &mut World, _ctx: &FrameContext) {
        self.push();
    }
}

fn register_tagged(registry: &mut TypeRegistry, log: &CallLog, tag: &'static str, edit: bool) {
    registry.register_system_instance(
        tag,
        Tagged {
            tag,
            edit,
            log: Rc::clone(log),
        },
    );
}

#[test]
fn test_phases_run_in_order_regardless_of_insertion() {
    let log = CallLog::default();
    let mut registry = TypeRegistry::new();
    register_tagged(&mut registry, &log, "C", false);
    register_tagged(&mut registry, &log, "B", false);
    register_tagged(&mut registry, &log, "A", false);

    let mut scene = Scene::new("Phases");
    scene.add_system(&registry, ExecutionPhase::LateUpdate, "C");
    scene.add_system(&registry, ExecutionPhase::Update, "B");
    scene.add_system(&registry, ExecutionPhase::FixedUpdate, "A");

    let config = RuntimeConfig::standalone().with_fixed_timestep(0.5);
    let mut manager = SceneManager::with_config(config);
    manager.request_load_scene(scene);

    let stats = manager.tick(&registry, 0.5);
    assert_eq!(*log.borrow(), vec!["A", "B", "C"]);
    assert_eq!(stats.fixed_steps, 1);
    assert_eq!(stats.systems_invoked, 3);
}

#[test]
fn test_disabling_takes_effect_next_tick() {
    let log = CallLog::default();
    let mut registry = TypeRegistry::new();
    register_tagged(&mut registry, &log, "Spin", true);

    let mut scene = Scene::new("Toggle");
    let index = scene.add_system(&registry, ExecutionPhase::Update, "Spin").unwrap();

    let mut manager = SceneManager::new();
    manager.request_load_scene(scene);
    manager.tick(&registry, 0.016);
    assert_eq!(log.borrow().len(), 1);

    manager
        .active_scene_mut()
        .unwrap()
        .set_system_enabled(ExecutionPhase::Update, index, false);
    manager.tick(&registry, 0.016);
    assert_eq!(log.borrow().len(), 1);

    manager
        .active_scene_mut()
        .unwrap()
        .set_system_enabled(ExecutionPhase::Update, index, true);
    manager.tick(&registry, 0.016);
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn test_play_only_system_waits_for_play_mode() {
    let log = CallLog::default();
    let mut registry = TypeRegistry::new();
    register_tagged(&mut registry, &log, "Gameplay", false);

    let mut scene = Scene::new("Edit");
    scene.add_system(&registry, ExecutionPhase::Update, "Gameplay");

    let mut manager = SceneManager::new();
    manager.request_load_scene(scene);
    manager.tick(&registry, 0.016);
    manager.tick(&registry, 0.016);
    assert!(log.borrow().is_empty());

    manager.request_play_mode(true);
    manager.tick(&registry, 0.016);
    assert!(log.borrow().is_empty());

    manager.tick(&registry, 0.016);
    assert_eq!(*log.borrow(), vec!["Gameplay"]);
}

fn moving_scene(registry: &TypeRegistry) -> Scene {
    let mut scene = Scene::new("Drift");
    scene.add_system(registry, ExecutionPhase::FixedUpdate, "MovementSystem");

    let world = scene.world_mut();
    let probe = world.create_named_entity("Probe");
    world.add_component(probe, TransformComponent::from_position(Vec3::new(1.0, 0.0, 0.0)));
    world.add_component(probe, MovementComponent::with_velocity(Vec3::new(0.0, 2.0, 0.0)));
    scene
}

fn probe_position(manager: &SceneManager) -> Vec3 {
    let world = manager.active_scene().unwrap().world();
    let probe = world
        .query::<NameComponent>()
        .into_iter()
        .find(|&entity| world.get_component::<NameComponent>(entity).name == "Probe")
        .unwrap();
    world.get_component::<TransformComponent>(probe).position
}

#[test]
fn test_play_session_changes_are_rolled_back() {
    let mut registry = TypeRegistry::new();
    register_builtin_types(&mut registry);

    let config = RuntimeConfig::default().with_fixed_timestep(0.25);
    let mut manager = SceneManager::with_config(config);
    manager.request_load_scene(moving_scene(&registry));

    // Movement is play-only, so nothing moves while editing
    manager.tick(&registry, 1.0);
    assert_eq!(probe_position(&manager), Vec3::new(1.0, 0.0, 0.0));

    manager.request_play_mode(true);
    manager.tick(&registry, 0.0);
    manager.tick(&registry, 1.0);
    let played = probe_position(&manager);
    assert_relative_eq!(played.y, 2.0, epsilon = 1e-5);

    manager.request_play_mode(false);
    manager.tick(&registry, 0.0);
    assert!(!manager.is_playing());
    assert_eq!(probe_position(&manager), Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn test_standalone_runs_play_systems_immediately() {
    let mut registry = TypeRegistry::new();
    register_builtin_types(&mut registry);

    let config = RuntimeConfig::standalone().with_fixed_timestep(0.5);
    let mut manager = SceneManager::with_config(config);
    manager.request_load_scene(moving_scene(&registry));

    manager.tick(&registry, 1.0);
    assert_relative_eq!(probe_position(&manager).y, 2.0, epsilon = 1e-5);
}

#[test]
fn test_non_finite_delta_does_not_stall_fixed_update() {
    let mut registry = TypeRegistry::new();
    register_builtin_types(&mut registry);

    let config = RuntimeConfig::standalone().with_fixed_timestep(0.5);
    let mut manager = SceneManager::with_config(config);
    manager.request_load_scene(moving_scene(&registry));

    let stats = manager.tick(&registry, f32::INFINITY);
    assert_eq!(stats.fixed_steps, 0);
    assert_eq!(manager.tick(&registry, f32::NAN).fixed_steps, 0);

    assert_eq!(manager.tick(&registry, 0.5).fixed_steps, 1);
    assert_relative_eq!(probe_position(&manager).y, 1.0, epsilon = 1e-5);
}

#[test]
fn test_deferred_file_load_and_bad_file() {
    let mut registry = TypeRegistry::new();
    register_builtin_types(&mut registry);

    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.toml");
    let bad = dir.path().join("bad.toml");
    moving_scene(&registry).save_to_file(&good, &registry).unwrap();
    std::fs::write(&bad, "Name = \"Broken\"\n[[Entities]\n").unwrap();

    let mut manager = SceneManager::new();
    manager.request_load_file(&good);
    assert!(manager.active_scene().is_none());

    manager.tick(&registry, 0.016);
    assert_eq!(manager.active_scene().map(Scene::name), Some("Drift"));

    manager.request_load_file(&bad);
    manager.tick(&registry, 0.016);
    assert_eq!(manager.active_scene().map(Scene::name), Some("Drift"));
    assert!(matches!(manager.take_last_scene_error(), Some(SceneError::Parse(_))));
    assert!(manager.last_scene_error().is_none());
}
