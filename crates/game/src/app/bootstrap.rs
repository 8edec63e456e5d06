use engine::{LoopConfig, SceneSet};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay;
use super::tuning::{Tuning, TuningError};

const WINDOW_TITLE: &str = "Archivist Platformer";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scenes: SceneSet,
}

pub(crate) fn build_app() -> Result<AppWiring, TuningError> {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "startup");

    let tuning = Tuning::load_from_env()?;
    Ok(wire(&tuning))
}

fn wire(tuning: &Tuning) -> AppWiring {
    AppWiring {
        config: LoopConfig {
            window_title: WINDOW_TITLE.to_string(),
            physics: tuning.physics,
            ..LoopConfig::default()
        },
        scenes: gameplay::build_scene_set(tuning),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
