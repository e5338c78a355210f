//! Persistence layer for the colony planner.
//!
//! Captures every registered `Saveable` resource into a headered, checksummed
//! file image and restores it on startup. `SavePlugin` expects
//! `planner::PlannerPlugin` to be added first: it relies on the planner's
//! `SaveableRegistry`, `TickCounter`, and `SimulationSet` phases.

pub mod atomic_write;
pub mod codec;
pub mod error;
pub mod file_header;

use std::path::{Path, PathBuf};

use bevy::prelude::*;

use planner::consensus::sweep_expired_ballots;
use planner::{SaveableRegistry, SimulationSet, TickCounter};

use crate::codec::SaveData;
use crate::error::SaveError;

/// Ticks between save flushes.
pub const FLUSH_INTERVAL: u64 = 100;

/// Where the planner image lives on disk.
#[derive(Resource, Debug, Clone)]
pub struct SavePath(pub PathBuf);

impl Default for SavePath {
    fn default() -> Self {
        Self(PathBuf::from("saves/colony.plan"))
    }
}

/// Snapshot every registered resource plus the current tick.
pub fn capture(world: &mut World) -> SaveData {
    let tick = world.resource::<TickCounter>().0;
    let extensions = world
        .resource_scope(|world, registry: Mut<SaveableRegistry>| registry.save_all(world));
    SaveData::new(tick, extensions)
}

/// Apply a snapshot: registered resources reset to defaults first, so keys
/// absent from the image land in a clean state rather than stale one.
pub fn restore(world: &mut World, data: &SaveData) {
    world.resource_scope(|world, registry: Mut<SaveableRegistry>| {
        registry.reset_all(world);
        registry.load_all(world, &data.extensions);
    });
    world.resource_mut::<TickCounter>().0 = data.tick;
}

pub fn write_save_file(path: &Path, data: &SaveData) -> Result<(), SaveError> {
    atomic_write::atomic_write(path, &codec::encode_save(data))?;
    Ok(())
}

pub fn read_save_file(path: &Path) -> Result<SaveData, SaveError> {
    let bytes = std::fs::read(path)?;
    codec::decode_save(&bytes)
}

fn load_on_startup(world: &mut World) {
    let path = world.resource::<SavePath>().0.clone();
    if !path.exists() {
        info!("no save at {}, starting fresh", path.display());
        return;
    }
    match read_save_file(&path) {
        Ok(data) => {
            info!(
                "restored planner state from {} (tick {})",
                path.display(),
                data.tick
            );
            restore(world, &data);
        }
        Err(err) => {
            warn!("failed to load {}: {err}; starting fresh", path.display());
        }
    }
}

fn flush_planner_state(world: &mut World) {
    let tick = world.resource::<TickCounter>().0;
    if tick == 0 || !tick.is_multiple_of(FLUSH_INTERVAL) {
        return;
    }
    let data = capture(world);
    let path = world.resource::<SavePath>().0.clone();
    if let Err(err) = write_save_file(&path, &data) {
        warn!("save flush failed at tick {tick}: {err}");
    }
}

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SavePath>();
        app.add_systems(Startup, load_on_startup);
        // Flush after the ballot sweep so the image never carries ballots
        // the same tick already pruned.
        app.add_systems(
            FixedUpdate,
            flush_planner_state
                .in_set(SimulationSet::PostSim)
                .after(sweep_expired_ballots),
        );
    }
}
