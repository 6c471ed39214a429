//! # engine_app — Prototype demo
//!
//! Spawns entities from named prototypes, edits their properties by name
//! and prints the resulting component values.
//!
//! ## Sequence
//!
//! 1. Parse the command line (`--count`, `--spawner`, `--set`, `--json`).
//! 2. Start the entity systems the prototype needs and spawn the entities.
//! 3. Apply `Component.Property=value` overrides through reflection.
//! 4. Duplicate the first entity and print every entity's snapshot.

mod config;
mod health;
mod scene;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use engine_log::{LogLevel, LogManager, MemoryListener, TracingListener};

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let config = AppConfig::parse();
    info!(count = config.count, spawner = %config.spawner, "engine demo starting");

    let log = LogManager::new();
    let memory = Arc::new(MemoryListener::new());
    log.add_listener(Arc::new(TracingListener));
    log.add_listener(memory.clone());

    let snapshots = scene::run(&config, &log)?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
    } else {
        for snapshot in &snapshots {
            for (component_type, values) in &snapshot.components {
                info!(entity = %snapshot.entity, %component_type, "{}", serde_json::to_string(values)?);
            }
        }
    }

    let warnings = memory.count_at_least(LogLevel::Warning);
    if warnings > 0 {
        warn!(warnings, "demo finished with warnings");
    }
    info!(entities = snapshots.len(), "engine demo finished");
    Ok(())
}
