//! PLN-047: the zone planning pass.
//!
//! Walks every zone's points of interest with the active building plans,
//! turns placement hits into queued orders, and asks the route planner to
//! connect each point of interest to what was just placed. The pass is
//! incremental: it never blocks on shortfalls, it just logs them and picks
//! up where it left off on the next pass.

use bevy::prelude::*;

use crate::engine::ZoneEngine;
use crate::memory::PlannerMemory;
use crate::placement::PlacementSearch;
use crate::plans::{self, search_radius, BuildingPlan};
use crate::queue::BuildOrder;
use crate::routing;
use crate::scheduler;
use crate::tile::ZoneId;
use crate::{SimulationSet, TickCounter};

/// Ticks between planning passes. Must stay small enough that the passes a
/// route needs to reach vote quorum all land inside the vote window.
pub const PLAN_INTERVAL: u64 = 10;

/// Run one plan against one zone.
///
/// The shortfall is desired count minus everything already accounted for:
/// finished structures the plan's filter accepts, active sites, and queued
/// orders. Each deposit is searched in turn until the shortfall is filled
/// or the plan's per-POI cap stops it; accepted tiles are connected back to
/// their deposit. Returns true when the zone is fully planned for this kind.
pub fn plan_zone(
    engine: &ZoneEngine,
    memory: &mut PlannerMemory,
    zone: &ZoneId,
    plan: &BuildingPlan,
    now: u64,
) -> bool {
    let tier = engine.zone_tier(zone);
    let Some(radius) = search_radius(tier, plan.kind) else {
        return true; // kind not planned at this tier
    };

    let desired = ZoneEngine::desired_count(tier, plan.kind) as usize;
    let accounted = plan.structure_filter.count_existing(engine, zone, plan.kind)
        + engine.pending_count(zone, plan.kind)
        + memory.queued_count(zone, plan.kind);
    let mut togo = desired.saturating_sub(accounted);
    if togo == 0 {
        return true;
    }

    for poi in engine.deposits(zone) {
        let mut accepted = Vec::new();
        for tile in PlacementSearch::new(engine, zone, poi, radius, plan) {
            if scheduler::schedule(memory, BuildOrder::new(plan.kind, zone.clone(), tile)) {
                togo -= 1;
                accepted.push(tile);
            }
            if togo == 0 || plan.poi_limit.is_some_and(|cap| accepted.len() >= cap) {
                break;
            }
        }
        routing::connect(engine, memory, zone, poi, &accepted, now);
        if togo == 0 {
            break;
        }
    }

    if togo > 0 {
        debug!(
            "{zone}: {togo} {} placement(s) unfilled this pass",
            plan.kind.name()
        );
    }
    togo == 0
}

/// The building plans a colony runs with.
#[derive(Resource, Debug, Clone)]
pub struct PlanSet {
    pub plans: Vec<BuildingPlan>,
}

impl Default for PlanSet {
    fn default() -> Self {
        Self {
            plans: vec![
                plans::container_plan(),
                plans::extension_plan(),
                plans::tower_plan(),
                plans::storage_plan(),
            ],
        }
    }
}

pub fn plan_zones(
    tick: Res<TickCounter>,
    engine: Res<ZoneEngine>,
    plan_set: Res<PlanSet>,
    mut memory: ResMut<PlannerMemory>,
) {
    if !tick.0.is_multiple_of(PLAN_INTERVAL) {
        return;
    }
    for zone in engine.zone_ids() {
        for plan in &plan_set.plans {
            plan_zone(&engine, &mut memory, zone, plan, tick.0);
        }
    }
}

pub struct OrchestratorPlugin;

impl Plugin for OrchestratorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlanSet>().add_systems(
            FixedUpdate,
            plan_zones
                .in_set(SimulationSet::PreSim)
                .after(crate::advance_tick),
        );
    }
}
