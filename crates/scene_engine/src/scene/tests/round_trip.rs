//! Scene documents through load/save cycles

use std::path::PathBuf;

use toml::{Table, Value};

use crate::ecs::components::{MovementComponent, NameComponent, SpriteComponent, TransformComponent};
use crate::ecs::system::{ExecutionPhase, System};
use crate::ecs::{Component, Entity, World};
use crate::foundation::math::{quat_from_xyzw, Color, Vec3, Vec4};
use crate::registry::{register_builtin_types, ComponentTypeFunctions, TypeRegistry};
use crate::scene::{PreservedEntityData, Scene, SceneError};
use crate::serialization::SerializedObject;

fn builtin_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    register_builtin_types(&mut registry);
    registry
}

fn find_named(world: &World, name: &str) -> Option<Entity> {
    world
        .query::<NameComponent>()
        .into_iter()
        .find(|&entity| world.get_component::<NameComponent>(entity).name == name)
}

fn sample_scene(registry: &TypeRegistry) -> Scene {
    let mut scene = Scene::new("Asteroid Field");
    let physics = scene.add_system_group("Physics");
    let index = scene
        .add_system(registry, ExecutionPhase::FixedUpdate, "MovementSystem")
        .unwrap();
    scene.set_system_group(ExecutionPhase::FixedUpdate, index, Some(physics));

    let world = scene.world_mut();
    let ship = world.create_named_entity("Ship");
    world.add_component(
        ship,
        TransformComponent::from_position(Vec3::new(0.1, -2.5, 1e-3))
            .with_rotation(quat_from_xyzw(0.0, 0.0, 0.70710677, 0.70710677))
            .with_scale(Vec3::new(1.0, 2.0, 0.5)),
    );
    world.add_component(
        ship,
        MovementComponent::with_velocity(Vec3::new(3.0, 0.0, 0.0))
            .with_angular_velocity(Vec3::new(0.0, 0.0, 0.3)),
    );
    let sprite = world.add_component(
        ship,
        SpriteComponent::new(PathBuf::from("textures/ship.png"))
            .with_tint(Color::new(0.9, 0.8, 0.7, 1.0))
            .with_layer(2),
    );
    sprite.sort_key = -(1 << 40);
    sprite.uv_rect = Vec4::new(0.0, 0.5, 0.5, 0.5);

    let rock = world.create_named_entity("Rock");
    world.add_component(rock, TransformComponent::default());

    scene
}

#[test]
fn test_document_round_trip_is_idempotent() {
    let registry = builtin_registry();
    let scene = sample_scene(&registry);

    let document = scene.to_document(&registry);
    let reloaded = Scene::from_document(document.clone(), &registry).unwrap();

    assert_eq!(reloaded.to_document(&registry), document);
    assert_eq!(reloaded.name(), "Asteroid Field");
    assert_eq!(reloaded.system_group_names(), ["Physics".to_string()]);
    assert_eq!(reloaded.world().entity_count(), 2);
}

#[test]
fn test_toml_text_round_trip_preserves_values() {
    let registry = builtin_registry();
    let scene = sample_scene(&registry);

    let text = scene.to_toml_string(&registry).unwrap();
    let reloaded = Scene::from_toml_str(&text, &registry).unwrap();

    let world = reloaded.world();
    let ship = find_named(world, "Ship").expect("ship survives");
    let original_ship = find_named(scene.world(), "Ship").unwrap();

    assert_eq!(
        world.get_component::<TransformComponent>(ship),
        scene.world().get_component::<TransformComponent>(original_ship)
    );
    assert_eq!(
        world.get_component::<SpriteComponent>(ship),
        scene.world().get_component::<SpriteComponent>(original_ship)
    );
    assert_eq!(
        world.get_component::<MovementComponent>(ship),
        scene.world().get_component::<MovementComponent>(original_ship)
    );

    let descriptors = reloaded.system_descriptors(ExecutionPhase::FixedUpdate);
    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0].name, "MovementSystem");
    assert_eq!(descriptors[0].group, Some(0));
}

const FORWARD_COMPATIBLE_SCENE: &str = r#"
Name = "From The Future"
SystemGroups = []
EditorCamera = { Position = [0.0, 5.0, -10.0], Fov = 60.0 }

[[Systems]]
Type = "MovementSystem"
Phase = "FixedUpdate"
Enabled = true

[[Systems]]
Type = "WeatherSystem"
Phase = "Update"
Enabled = true
Intensity = 0.75

[[Entities]]
Layer = "Background"

[[Entities.Components]]
Type = "Name"
Name = "Cloud"

[[Entities.Components]]
Type = "Precipitation"
Kind = "Snow"
Rate = 42
Gusts = [[1.0, 2.0], [3.0, 4.0]]
"#;

#[test]
fn test_unknown_data_survives_file_cycle() {
    let registry = builtin_registry();
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("future.toml");
    let target = dir.path().join("nested/saved.toml");
    std::fs::write(&source, FORWARD_COMPATIBLE_SCENE).unwrap();

    let scene = Scene::load_from_file(&source, &registry).unwrap();
    assert_eq!(scene.unrecognized_systems().len(), 1);
    assert_eq!(scene.unrecognized_systems()[0].name, "WeatherSystem");
    assert_eq!(scene.system_count(), 1);

    let cloud = find_named(scene.world(), "Cloud").unwrap();
    let preserved = scene.world().get_component::<PreservedEntityData>(cloud);
    assert_eq!(preserved.unrecognized_components.len(), 1);

    scene.save_to_file(&target, &registry).unwrap();

    let original: Table = toml::from_str(FORWARD_COMPATIBLE_SCENE).unwrap();
    let saved: Table = toml::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(saved, original);
}

#[test]
fn test_renamed_component_loads_under_new_name() {
    let registry = builtin_registry();
    let scene = Scene::from_toml_str(
        r#"
        Name = "Legacy"
        [[Entities]]
        [[Entities.Components]]
        Type = "Velocity"
        Velocity = [1.0, 2.0, 3.0]
        "#,
        &registry,
    )
    .unwrap();

    let world = scene.world();
    let entity = world.entities()[0];
    assert_eq!(
        world.get_component::<MovementComponent>(entity).velocity,
        Vec3::new(1.0, 2.0, 3.0)
    );

    let document = scene.to_document(&registry);
    let components = document["Entities"][0]["Components"].as_array().unwrap();
    assert_eq!(components[0]["Type"].as_str(), Some("Movement"));
}

#[test]
fn test_unrecognized_system_resolves_after_registration() {
    struct Weather;
    impl System for Weather {}

    let mut registry = builtin_registry();
    let mut scene = Scene::from_toml_str(FORWARD_COMPATIBLE_SCENE, &registry).unwrap();
    assert_eq!(scene.retry_unrecognized_systems(&registry), 0);

    registry.register_system_instance("WeatherSystem", Weather);
    assert_eq!(scene.retry_unrecognized_systems(&registry), 1);

    assert!(scene.unrecognized_systems().is_empty());
    let update = scene.system_descriptors(ExecutionPhase::Update);
    assert_eq!(update[0].name, "WeatherSystem");

    let document = scene.to_document(&registry);
    let systems = document["Systems"].as_array().unwrap();
    assert_eq!(systems[1]["Intensity"].as_float(), Some(0.75));
}

#[test]
fn test_malformed_documents_are_errors() {
    let registry = builtin_registry();

    let parse = Scene::from_toml_str("Name = [", &registry);
    assert!(matches!(parse, Err(SceneError::Parse(_))));

    let wrong_name = Scene::from_toml_str("Name = 5", &registry);
    assert!(matches!(wrong_name, Err(SceneError::InvalidDocument(_))));

    let wrong_systems = Scene::from_toml_str("Systems = \"none\"", &registry);
    assert!(matches!(wrong_systems, Err(SceneError::InvalidDocument(_))));

    let missing = Scene::load_from_file("/no/such/scene.toml", &registry);
    assert!(matches!(missing, Err(SceneError::Io(_))));
}

const ANNOTATED_SCENE: &str = r#"
Name = "Annotated"
SystemGroups = []
Systems = []

[[Entities]]

[[Entities.Components]]
Type = "Name"
Name = "Ship"
Tooltip = "added by a newer build"

[[Entities.Components]]
Type = "Transform"
Position = [1.0, 2.0, 3.0]
Rotation = [0.0, 0.0, 0.0, 1.0]
Scale = [1.0, 1.0, 1.0]
Locked = true
"#;

#[test]
fn test_unknown_keys_in_known_components_survive() {
    let registry = builtin_registry();
    let original: Table = toml::from_str(ANNOTATED_SCENE).unwrap();
    let mut scene = Scene::from_document(original.clone(), &registry).unwrap();
    assert_eq!(scene.to_document(&registry), original);

    let ship = find_named(scene.world(), "Ship").unwrap();
    scene
        .world_mut()
        .get_component_mut::<TransformComponent>(ship)
        .position = Vec3::new(5.0, 0.0, 0.0);

    let document = scene.to_document(&registry);
    let transform = &document["Entities"][0]["Components"][1];
    assert_eq!(transform["Locked"].as_bool(), Some(true));
    assert_eq!(transform["Position"][0].as_float(), Some(5.0));
}

struct Camera;

impl System for Camera {}

const HAND_WRITTEN_SCENE: &str = r#"
Name = "Hand Written"
SystemGroups = ["Simulation"]

[[Systems]]
Type = "CameraSystem"
Phase = "LateUpdate"
Enabled = true

[[Systems]]
Type = "WeatherSystem"
Phase = "Update"
Enabled = false

[[Systems]]
Type = "MovementSystem"
Phase = "FixedUpdate"
Enabled = true
Group = "Simulation"

[[Entities]]

[[Entities.Components]]
Type = "Transform"
Position = [0.5, -1.0, 2.0]
Rotation = [0.0, 0.0, 0.0, 1.0]
Scale = [2.0, 2.0, 2.0]

[[Entities.Components]]
Type = "Precipitation"
Kind = "Rain"

[[Entities.Components]]
Type = "Name"
Name = "Storm"
"#;

#[test]
fn test_hand_written_order_survives() {
    let mut registry = builtin_registry();
    registry.register_system_instance("CameraSystem", Camera);
    let original: Table = toml::from_str(HAND_WRITTEN_SCENE).unwrap();

    let mut scene = Scene::from_document(original.clone(), &registry).unwrap();
    assert_eq!(scene.system_count(), 2);
    assert_eq!(scene.to_document(&registry), original);

    registry.register_system_instance("WeatherSystem", Camera);
    assert_eq!(scene.retry_unrecognized_systems(&registry), 1);
    assert!(!scene.system_descriptors(ExecutionPhase::Update)[0].enabled);
    assert_eq!(scene.to_document(&registry), original);
}

#[test]
fn test_moved_system_keeps_its_phase_slots() {
    let mut registry = builtin_registry();
    registry.register_system_instance("CameraSystem", Camera);
    registry.register_system_instance("AudioSystem", Camera);

    let mut scene = Scene::new("Moves");
    scene.add_system(&registry, ExecutionPhase::Update, "CameraSystem");
    scene.add_system(&registry, ExecutionPhase::FixedUpdate, "MovementSystem");
    scene.add_system(&registry, ExecutionPhase::Update, "AudioSystem");
    assert!(scene.move_system(ExecutionPhase::Update, 1, 0));

    let document = scene.to_document(&registry);
    let types: Vec<&str> = document["Systems"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["Type"].as_str())
        .collect();
    assert_eq!(types, ["AudioSystem", "MovementSystem", "CameraSystem"]);
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Precipitation {
    kind: String,
    rate: i64,
}

impl Component for Precipitation {}

fn write_precipitation(world: &World, entity: Entity, out: &mut SerializedObject) {
    let precipitation = world.get_component::<Precipitation>(entity);
    out.set("Kind", precipitation.kind.clone());
    out.set("Rate", precipitation.rate);
}

fn read_precipitation(world: &mut World, entity: Entity, data: &SerializedObject) {
    let precipitation = world.get_component_mut::<Precipitation>(entity);
    data.read_into("Kind", &mut precipitation.kind);
    data.read_into("Rate", &mut precipitation.rate);
}

#[test]
fn test_unrecognized_component_resolves_after_registration() {
    let mut registry = builtin_registry();
    let original: Table = toml::from_str(FORWARD_COMPATIBLE_SCENE).unwrap();
    let mut scene = Scene::from_document(original.clone(), &registry).unwrap();
    assert_eq!(scene.unrecognized_component_count(), 1);
    assert_eq!(scene.retry_unrecognized_components(&registry), 0);

    registry.register_component_type::<Precipitation>(
        "Precipitation",
        ComponentTypeFunctions::new()
            .with_serialize(write_precipitation)
            .with_deserialize(read_precipitation),
    );
    assert_eq!(scene.retry_unrecognized_components(&registry), 1);
    assert_eq!(scene.unrecognized_component_count(), 0);

    let cloud = find_named(scene.world(), "Cloud").unwrap();
    assert_eq!(
        scene.world().get_component::<Precipitation>(cloud),
        &Precipitation {
            kind: "Snow".to_string(),
            rate: 42
        }
    );
    assert_eq!(scene.to_document(&registry), original);
}

#[test]
fn test_unrecognized_components_can_be_deleted() {
    let registry = builtin_registry();
    let mut scene = Scene::from_toml_str(FORWARD_COMPATIBLE_SCENE, &registry).unwrap();
    let cloud = find_named(scene.world(), "Cloud").unwrap();

    assert_eq!(scene.remove_unrecognized_component(cloud, 1), None);
    let removed = scene.remove_unrecognized_component(cloud, 0).unwrap();
    assert_eq!(removed["Kind"].as_str(), Some("Snow"));
    assert_eq!(scene.clear_unrecognized_components(), 0);

    let document = scene.to_document(&registry);
    let components = document["Entities"][0]["Components"].as_array().unwrap();
    assert_eq!(components.len(), 1);
    assert_eq!(document["Entities"][0]["Layer"].as_str(), Some("Background"));

    let mut fresh = Scene::from_toml_str(FORWARD_COMPATIBLE_SCENE, &registry).unwrap();
    assert_eq!(fresh.clear_unrecognized_components(), 1);
    assert_eq!(fresh.unrecognized_component_count(), 0);
}

#[derive(Debug, Clone, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

impl Component for Position {}

impl Default for Position {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

#[test]
fn test_position_add_or_get_keeps_values() {
    let mut registry = TypeRegistry::new();
    assert!(registry
        .register_component_type::<Position>("Position", ComponentTypeFunctions::new()));

    let mut world = World::new();
    let entity = world.create_entity();

    let add = registry
        .try_get_component_type_functions("Position")
        .and_then(|functions| functions.add)
        .unwrap();
    add(&mut world, entity);
    assert_eq!(world.get_component::<Position>(entity), &Position::default());

    let position = world.add_or_get_component::<Position>(entity);
    position.x = 4.0;
    position.y = -1.5;

    let again = world.add_or_get_component::<Position>(entity).clone();
    assert_eq!(again, Position { x: 4.0, y: -1.5 });
}

#[test]
#[should_panic(expected = "already has component")]
fn test_position_add_twice_panics() {
    let mut world = World::new();
    let entity = world.create_entity();
    world.add_component(entity, Position::default());
    world.add_component(entity, Position { x: 1.0, y: 1.0 });
}
