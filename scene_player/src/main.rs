//! Headless scene player
//!
//! Loads a scene file, runs it in standalone mode for a fixed number of
//! frames and optionally writes the resulting scene back out.
//!
//! ```text
//! scene_player <scene.toml> [--frames N] [--config runtime.toml] [--save out.toml]
//! ```

use std::path::PathBuf;

use clap::Parser;
use scene_engine::config::{Config, ConfigError, RuntimeConfig, RuntimeMode};
use scene_engine::foundation::logging;
use scene_engine::foundation::time::Timer;
use scene_engine::registry::{register_builtin_types, TypeRegistry};
use scene_engine::scene::{SceneError, SceneManager};

/// Player errors
#[derive(thiserror::Error, Debug)]
enum PlayerError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Runs a scene headless in standalone mode
#[derive(Parser, Debug)]
#[command(name = "scene_player", version)]
struct Options {
    /// Scene file to play
    scene: PathBuf,

    /// Number of frames to run
    #[arg(long, value_name = "N", default_value_t = 600)]
    frames: u64,

    /// Runtime configuration file
    #[arg(long, value_name = "FILE", default_value = "scene_player.toml")]
    config: PathBuf,

    /// Write the scene here after the last frame
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,
}

fn run(options: &Options) -> Result<(), PlayerError> {
    let mut config = RuntimeConfig::load_or_default(&options.config)?;
    config.mode = RuntimeMode::Standalone;
    logging::init_with_level(&config.log_level);

    let mut registry = TypeRegistry::new();
    register_builtin_types(&mut registry);

    let frame_time = config.fixed_timestep;
    let mut manager = SceneManager::with_config(config);
    manager.request_load_file(&options.scene);
    manager.on_pre_application_run(&registry);

    if let Some(error) = manager.take_last_scene_error() {
        return Err(error.into());
    }
    if let Some(scene) = manager.active_scene() {
        log::info!(
            "Playing '{}': {} entities, {} systems ({} unrecognized)",
            scene.name(),
            scene.world().entity_count(),
            scene.system_count(),
            scene.unrecognized_systems().len()
        );
    }

    let mut timer = Timer::new();
    let mut fixed_steps = 0u64;
    let mut invocations = 0usize;
    for _ in 0..options.frames {
        let stats = manager.tick(&registry, frame_time);
        fixed_steps += u64::from(stats.fixed_steps);
        invocations += stats.systems_invoked;
        timer.update();
    }
    log::info!(
        "Ran {} frames ({} fixed steps, {} system calls) in {:.3}s",
        timer.frame_count(),
        fixed_steps,
        invocations,
        timer.total_time()
    );

    if let (Some(path), Some(scene)) = (&options.save, manager.active_scene()) {
        scene.save_to_file(path, &registry)?;
    }

    manager.shutdown(&registry);
    Ok(())
}

fn main() {
    let options = Options::parse();

    if let Err(error) = run(&options) {
        log::error!("{}", error);
        eprintln!("{error}");
        std::process::exit(1);
    }
}
