//! # TestColony — headless integration test harness
//!
//! Fluent builder wrapping `bevy::app::App` + `PlannerPlugin` for running the
//! planner against a synthetic colony without a real engine attached.

use bevy::app::App;
use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::engine::{Terrain, ZoneEngine};
use crate::facility::FacilityKind;
use crate::memory::PlannerMemory;
use crate::orchestrator::PlanSet;
use crate::queue::BuildOrder;
use crate::scheduler::{self, PlannerStats};
use crate::tile::{Tile, ZoneId};
use crate::{PlannerPlugin, TickCounter};

/// A headless Bevy App wrapping `PlannerPlugin`.
///
/// Use builder methods to lay out zones, then call `tick()` to advance the
/// planner and assert on engine and memory state.
pub struct TestColony {
    app: App,
}

impl Default for TestColony {
    fn default() -> Self {
        Self::new()
    }
}

impl TestColony {
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        // One fixed step per tick() call.
        app.insert_resource(Time::<Fixed>::from_seconds(0.1));
        app.add_plugins(PlannerPlugin);
        // Run Startup once before any builder touches the world.
        app.update();
        // Advance time by exactly one fixed step per subsequent update; the
        // automatic strategy would overwrite manual virtual-time advances.
        app.insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(
            std::time::Duration::from_millis(100),
        ));
        Self { app }
    }

    // -----------------------------------------------------------------------
    // World setup (builder pattern, consumes and returns Self)
    // -----------------------------------------------------------------------

    pub fn with_zone(mut self, name: &str, tier: u8) -> Self {
        self.engine_mut().add_zone(ZoneId::new(name), tier);
        self
    }

    pub fn with_tier(mut self, zone: &str, tier: u8) -> Self {
        self.engine_mut().set_tier(&ZoneId::new(zone), tier);
        self
    }

    pub fn with_deposit(mut self, zone: &str, x: u8, y: u8) -> Self {
        self.engine_mut()
            .add_deposit(&ZoneId::new(zone), Tile::new(x, y));
        self
    }

    pub fn with_terrain(mut self, zone: &str, x: u8, y: u8, terrain: Terrain) -> Self {
        self.engine_mut()
            .set_terrain(&ZoneId::new(zone), Tile::new(x, y), terrain);
        self
    }

    pub fn with_structure(mut self, zone: &str, x: u8, y: u8, kind: FacilityKind) -> Self {
        self.engine_mut()
            .add_structure(&ZoneId::new(zone), Tile::new(x, y), kind);
        self
    }

    /// Scatter `count` swamp tiles over the zone's valid band with a seeded
    /// generator, for reproducible rough-terrain fixtures.
    pub fn with_swamp_scatter(mut self, zone: &str, seed: u64, count: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let id = ZoneId::new(zone);
        let mut engine = self.engine_mut();
        for _ in 0..count {
            let tile = Tile::new(rng.gen_range(2..=47), rng.gen_range(2..=47));
            engine.set_terrain(&id, tile, Terrain::Swamp);
        }
        drop(engine);
        self
    }

    /// Replace the default plan set.
    pub fn with_plans(mut self, plans: PlanSet) -> Self {
        self.app.world_mut().insert_resource(plans);
        self
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Advance the planner by `n` ticks. The fixed step is 100ms, so each
    /// call advances virtual time by 100ms per tick and runs `FixedUpdate`.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.update();
        }
    }

    /// Admit an order directly, bypassing the planning pass.
    pub fn schedule(&mut self, order: BuildOrder) -> bool {
        self.app
            .world_mut()
            .resource_scope(|_world, mut memory: Mut<PlannerMemory>| {
                scheduler::schedule(&mut memory, order)
            })
    }

    /// Finish every active build site, as a cooperative engine would over
    /// time.
    pub fn complete_all_sites(&mut self) {
        let mut engine = self.engine_mut();
        let zones: Vec<ZoneId> = engine.zone_ids().cloned().collect();
        for zone in zones {
            let pending: Vec<Tile> = (0..50u8)
                .flat_map(|y| (0..50u8).map(move |x| Tile::new(x, y)))
                .filter(|&t| engine.contents_at(&zone, t).pending.is_some())
                .collect();
            for tile in pending {
                engine.complete_project(&zone, tile);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn engine(&self) -> &ZoneEngine {
        self.app.world().resource::<ZoneEngine>()
    }

    pub fn engine_mut(&mut self) -> Mut<'_, ZoneEngine> {
        self.app.world_mut().resource_mut::<ZoneEngine>()
    }

    pub fn memory(&self) -> &PlannerMemory {
        self.app.world().resource::<PlannerMemory>()
    }

    pub fn memory_mut(&mut self) -> Mut<'_, PlannerMemory> {
        self.app.world_mut().resource_mut::<PlannerMemory>()
    }

    pub fn stats(&self) -> &PlannerStats {
        self.app.world().resource::<PlannerStats>()
    }

    pub fn tick_count(&self) -> u64 {
        self.app.world().resource::<TickCounter>().0
    }

    // -----------------------------------------------------------------------
    // Assertion helpers
    // -----------------------------------------------------------------------

    pub fn assert_site_at(&self, zone: &str, x: u8, y: u8, kind: FacilityKind) {
        let contents = self
            .engine()
            .contents_at(&ZoneId::new(zone), Tile::new(x, y));
        assert_eq!(
            contents.pending,
            Some(kind),
            "expected a {} site at ({x},{y}) in {zone}",
            kind.name()
        );
    }

    pub fn assert_queue_len(&self, zone: &str, expected: usize) {
        let len = self.memory().load_queue(&ZoneId::new(zone)).len();
        assert_eq!(len, expected, "queue length for {zone}");
    }
}
