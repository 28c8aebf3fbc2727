use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use walkto_core::db::Database;
use walkto_core::object::DefinitionCache;
use walkto_core::{ObjectDefinitions, SearchOptions, StaticDefinitions};

use crate::config::Config;
use crate::interaction::ActionRegistry;
use crate::simulation::Simulation;
use crate::world::{Notifier, WorldState};

/// Builds the world from the configured database, or an empty one without it.
/// Loaded objects are registered as-is: their clipping is already in the collision table.
pub fn load_simulation(cfg: &Config, notifier: Arc<dyn Notifier>) -> anyhow::Result<Simulation> {
    let options = SearchOptions { max_expansions: cfg.max_expansions, ..SearchOptions::default() };
    let world = match &cfg.db_path {
        Some(path) => {
            let db = Database::open_read_only(path).with_context(|| format!("open world db {}", path.display()))?;
            let grid = db.load_collision(cfg.height).context("load collision")?;
            let objects = db.iter_objects(cfg.height).context("load objects")?;
            info!(db = %path.display(), height = cfg.height, flagged_tiles = grid.len(), objects = objects.len(), "world loaded");
            let defs: Arc<dyn ObjectDefinitions> = Arc::new(DefinitionCache::new(db));
            let mut world = WorldState::new(defs, notifier).with_collision(grid);
            for object in objects {
                world.register_object(object);
            }
            world
        }
        None => {
            info!("no world database configured; starting with open ground");
            WorldState::new(Arc::new(StaticDefinitions::new()), notifier)
        }
    };
    let world = world.with_options(options).with_debug_objects(cfg.debug_objects);
    Ok(Simulation::new(world, ActionRegistry::new()))
}
