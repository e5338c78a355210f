//! Colony construction planner.
//!
//! Headless Bevy crate that decides where a colony builds. Three pillars:
//! the ring placement search ([`placement`]), the persistent priority work
//! queues with a capacity-limited drain ([`queue`], [`scheduler`]), and the
//! consensus-gated route planner ([`consensus`], [`routing`]). The
//! [`orchestrator`] drives all three against the [`engine`] model each
//! planning pass, and [`memory`] carries what must survive a restart.

use std::collections::BTreeMap;

use bevy::prelude::*;

pub mod config;
pub mod consensus;
pub mod engine;
pub mod facility;
pub mod memory;
pub mod occupancy;
pub mod orchestrator;
pub mod placement;
pub mod plans;
pub mod queue;
pub mod rings;
pub mod routing;
pub mod scheduler;
pub mod tile;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

// ---------------------------------------------------------------------------
// Simulation phases
// ---------------------------------------------------------------------------

/// Ordered phases for systems running in the `FixedUpdate` schedule,
/// configured as a chain: `PreSim` → `Simulation` → `PostSim`. Plugins put
/// their systems into a set and add `.after()` constraints within it where
/// ordering matters.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Tick counter, per-tick cache resets, the zone planning pass.
    PreSim,
    /// The queue drain: orders become engine build sites here.
    Simulation,
    /// Housekeeping that only reads or prunes: ballot sweep, save flush.
    PostSim,
}

/// Global tick counter incremented each `FixedUpdate`, used for throttling
/// and as the timestamp on ballot votes.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

pub fn advance_tick(mut tick: ResMut<TickCounter>) {
    tick.0 = tick.0.wrapping_add(1);
}

// ---------------------------------------------------------------------------
// Save/load registry
// ---------------------------------------------------------------------------

/// A resource that participates in save/load via the extension map.
pub trait Saveable: Resource + Default + Send + Sync + 'static {
    /// Key for this resource in the save file's extension map. Must stay
    /// stable across versions.
    const SAVE_KEY: &'static str;

    /// Serialize to bytes. Return `None` to skip saving (e.g. when the
    /// resource is at its default state).
    fn save_to_bytes(&self) -> Option<Vec<u8>>;

    /// Deserialize from bytes, returning the restored resource.
    fn load_from_bytes(bytes: &[u8]) -> Self;
}

/// Decode via `bitcode::decode`, logging a warning and falling back to the
/// default on failure. For use in `Saveable::load_from_bytes` impls.
pub fn decode_or_warn<T: bitcode::DecodeOwned + Default>(key: &str, bytes: &[u8]) -> T {
    match bitcode::decode(bytes) {
        Ok(v) => v,
        Err(e) => {
            warn!(
                "Saveable {}: failed to decode {} bytes, falling back to default: {}",
                key,
                bytes.len(),
                e
            );
            T::default()
        }
    }
}

pub type SaveFn = Box<dyn Fn(&World) -> Option<Vec<u8>> + Send + Sync>;
pub type LoadFn = Box<dyn Fn(&mut World, &[u8]) + Send + Sync>;
pub type ResetFn = Box<dyn Fn(&mut World) + Send + Sync>;

/// Type-erased save/load/reset operations for one registered resource.
pub struct SaveableEntry {
    pub key: String,
    pub save_fn: SaveFn,
    pub load_fn: LoadFn,
    pub reset_fn: ResetFn,
}

/// Registry the save layer walks without knowing individual resource types.
#[derive(Resource, Default)]
pub struct SaveableRegistry {
    pub entries: Vec<SaveableEntry>,
}

impl SaveableRegistry {
    /// Register a `Saveable` resource type. A duplicate `SAVE_KEY` is a bug;
    /// the second registration is ignored with a warning.
    pub fn register<T: Saveable>(&mut self) {
        let key = T::SAVE_KEY.to_string();
        if self.entries.iter().any(|e| e.key == key) {
            warn!("SaveableRegistry: duplicate key '{key}', ignoring second registration");
            debug_assert!(false, "SaveableRegistry: duplicate key '{key}'");
            return;
        }
        self.entries.push(SaveableEntry {
            key,
            save_fn: Box::new(|world: &World| {
                world.get_resource::<T>().and_then(|r| r.save_to_bytes())
            }),
            load_fn: Box::new(|world: &mut World, bytes: &[u8]| {
                let value = T::load_from_bytes(bytes);
                world.insert_resource(value);
            }),
            reset_fn: Box::new(|world: &mut World| {
                world.insert_resource(T::default());
            }),
        });
    }

    /// Save every registered resource into an extension map.
    pub fn save_all(&self, world: &World) -> BTreeMap<String, Vec<u8>> {
        let mut extensions = BTreeMap::new();
        for entry in &self.entries {
            if let Some(bytes) = (entry.save_fn)(world) {
                extensions.insert(entry.key.clone(), bytes);
            }
        }
        extensions
    }

    /// Load registered resources from an extension map. Resources whose key
    /// is absent keep their `init_resource` default.
    pub fn load_all(&self, world: &mut World, extensions: &BTreeMap<String, Vec<u8>>) {
        for entry in &self.entries {
            if let Some(bytes) = extensions.get(&entry.key) {
                (entry.load_fn)(world, bytes);
            }
        }
    }

    /// Reset every registered resource to its default.
    pub fn reset_all(&self, world: &mut World) {
        for entry in &self.entries {
            (entry.reset_fn)(world);
        }
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct PlannerPlugin;

impl Plugin for PlannerPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::PreSim,
                SimulationSet::Simulation,
                SimulationSet::PostSim,
            )
                .chain(),
        );

        app.init_resource::<TickCounter>()
            .init_resource::<engine::ZoneEngine>()
            .init_resource::<memory::PlannerMemory>()
            .init_resource::<SaveableRegistry>();

        app.world_mut()
            .resource_mut::<SaveableRegistry>()
            .register::<memory::PlannerMemory>();

        app.add_systems(FixedUpdate, advance_tick.in_set(SimulationSet::PreSim));

        app.add_plugins((
            orchestrator::OrchestratorPlugin,
            scheduler::SchedulerPlugin,
            consensus::ConsensusPlugin,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default, PartialEq, Debug, Clone, bitcode::Encode, bitcode::Decode)]
    struct Marker(u32);

    impl Saveable for Marker {
        const SAVE_KEY: &'static str = "marker";

        fn save_to_bytes(&self) -> Option<Vec<u8>> {
            (*self != Self::default()).then(|| bitcode::encode(self))
        }

        fn load_from_bytes(bytes: &[u8]) -> Self {
            decode_or_warn(Self::SAVE_KEY, bytes)
        }
    }

    #[test]
    fn test_registry_round_trip() {
        let mut registry = SaveableRegistry::default();
        registry.register::<Marker>();

        let mut world = World::new();
        world.insert_resource(Marker(7));
        let extensions = registry.save_all(&world);
        assert!(extensions.contains_key("marker"));

        let mut restored = World::new();
        restored.insert_resource(Marker::default());
        registry.load_all(&mut restored, &extensions);
        assert_eq!(*restored.resource::<Marker>(), Marker(7));

        registry.reset_all(&mut restored);
        assert_eq!(*restored.resource::<Marker>(), Marker::default());
    }

    #[test]
    fn test_default_resources_are_skipped() {
        let mut registry = SaveableRegistry::default();
        registry.register::<Marker>();
        let mut world = World::new();
        world.insert_resource(Marker::default());
        assert!(registry.save_all(&world).is_empty());
    }

    #[test]
    fn test_absent_key_keeps_the_default() {
        let mut registry = SaveableRegistry::default();
        registry.register::<Marker>();
        let mut world = World::new();
        world.insert_resource(Marker(3));
        registry.load_all(&mut world, &BTreeMap::new());
        assert_eq!(*world.resource::<Marker>(), Marker(3));
    }

    #[test]
    fn test_decode_or_warn_falls_back_on_garbage() {
        let v: Marker = decode_or_warn("marker", &[0xde, 0xad, 0xbe]);
        assert_eq!(v, Marker::default());
    }
}
