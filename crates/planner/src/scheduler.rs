//! PLN-045: order admission and the per-tick queue drain.
//!
//! `schedule` is the single admission point into the work queues; the drain
//! runs once per tick and converts as many queued orders into engine build
//! sites as the capacity limits allow. Site counts come from a per-tick
//! cache so a zone planned early in the tick cannot overshoot its limit
//! later in the same tick.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::config::{GLOBAL_SITE_LIMIT, GLOBAL_SITE_SOFT_LIMIT, ZONE_SITE_LIMIT};
use crate::engine::ZoneEngine;
use crate::facility::FacilityKind;
use crate::memory::PlannerMemory;
use crate::queue::BuildOrder;
use crate::tile::ZoneId;
use crate::SimulationSet;

// ---------------------------------------------------------------------------
// Admission
// ---------------------------------------------------------------------------

/// Admit an order into its zone's queue.
///
/// At most one order per tile: a duplicate is rejected, except that a queued
/// path order yields to a facility order for the same tile. The facility
/// replaces the path and the route planner re-routes around the tile on its
/// next pass. Returns whether the order was admitted.
pub fn schedule(memory: &mut PlannerMemory, order: BuildOrder) -> bool {
    let mut queue = memory.load_queue(&order.zone);
    if let Some((index, existing)) = queue.find(|o| o.tile == order.tile) {
        if existing.kind.is_path() && !order.kind.is_path() {
            debug!(
                "{}: {} at {} supersedes the queued path",
                order.zone,
                order.kind.name(),
                order.tile
            );
            queue.remove(index);
        } else {
            return false;
        }
    }
    queue.insert(order.clone());
    memory.save_queue(&order.zone, &queue);
    true
}

// ---------------------------------------------------------------------------
// Per-tick site counts
// ---------------------------------------------------------------------------

/// Site counts valid for the current tick only.
///
/// Lazily built from the engine on first use, then kept exact by hand as the
/// drain opens sites. Cleared at the top of every tick.
#[derive(Resource, Debug, Default)]
pub struct SiteCountCache {
    counts: Option<Counts>,
}

#[derive(Debug, Default)]
struct Counts {
    global: usize,
    zones: BTreeMap<ZoneId, usize>,
}

impl SiteCountCache {
    pub fn clear(&mut self) {
        self.counts = None;
    }

    fn ensure(&mut self, engine: &ZoneEngine) -> &mut Counts {
        self.counts.get_or_insert_with(|| Counts {
            global: engine.site_count(),
            zones: engine
                .zone_ids()
                .map(|z| (z.clone(), engine.zone_site_count(z)))
                .collect(),
        })
    }

    pub fn global(&mut self, engine: &ZoneEngine) -> usize {
        self.ensure(engine).global
    }

    pub fn zone(&mut self, engine: &ZoneEngine, zone: &ZoneId) -> usize {
        *self.ensure(engine).zones.entry(zone.clone()).or_default()
    }

    /// Record a site the drain just opened.
    pub fn record_created(&mut self, zone: &ZoneId) {
        if let Some(counts) = self.counts.as_mut() {
            counts.global += 1;
            *counts.zones.entry(zone.clone()).or_default() += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Drain
// ---------------------------------------------------------------------------

/// What one drain pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Build sites opened.
    pub created: usize,
    /// Orders that hit a retryable refusal and went back into their queue.
    pub requeued: usize,
    /// Orders dropped for good.
    pub dropped: usize,
}

/// Drain every zone's queue against the capacity limits.
///
/// A zone is skipped outright once the colony is at the soft global limit or
/// the zone is already over its own site limit; otherwise orders pop until
/// either ceiling is reached. Retryable refusals (capacity, tier) put the
/// order back; anything else drops it.
pub fn run_tick(
    engine: &mut ZoneEngine,
    memory: &mut PlannerMemory,
    cache: &mut SiteCountCache,
) -> TickReport {
    let mut report = TickReport::default();

    for zone in memory.queued_zones() {
        let global = cache.global(engine);
        let zone_sites = cache.zone(engine, &zone);
        if global >= GLOBAL_SITE_SOFT_LIMIT || zone_sites > ZONE_SITE_LIMIT {
            debug!(
                "{zone}: drain skipped, {global} sites colony-wide / {zone_sites} in zone"
            );
            continue;
        }

        let mut queue = memory.load_queue(&zone);
        let mut delayed = Vec::new();
        while cache.global(engine) < GLOBAL_SITE_LIMIT
            && cache.zone(engine, &zone) < ZONE_SITE_LIMIT
        {
            let Some(order) = queue.pop_front() else { break };
            match engine.create_project(&zone, order.tile, order.kind) {
                Ok(()) => {
                    cache.record_created(&zone);
                    report.created += 1;
                    // The new facility paves over any path already there.
                    if !order.kind.is_path()
                        && engine
                            .contents_at(&zone, order.tile)
                            .structures
                            .iter()
                            .any(|s| s.is_path())
                    {
                        engine.remove_structure(&zone, order.tile, FacilityKind::Path);
                    }
                }
                Err(err) if err.is_retryable() => {
                    debug!(
                        "{zone}: {} at {} deferred ({err})",
                        order.kind.name(),
                        order.tile
                    );
                    delayed.push(order);
                    report.requeued += 1;
                }
                Err(err) => {
                    warn!(
                        "{zone}: dropping {} order at {} ({err})",
                        order.kind.name(),
                        order.tile
                    );
                    report.dropped += 1;
                }
            }
        }
        for order in delayed {
            queue.insert(order);
        }
        memory.save_queue(&zone, &queue);
    }

    report
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Running totals across the colony's lifetime, for logging and tests.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PlannerStats {
    pub sites_created: u64,
    pub orders_requeued: u64,
    pub orders_dropped: u64,
}

impl PlannerStats {
    fn absorb(&mut self, report: &TickReport) {
        self.sites_created += report.created as u64;
        self.orders_requeued += report.requeued as u64;
        self.orders_dropped += report.dropped as u64;
    }
}

pub fn reset_site_cache(mut cache: ResMut<SiteCountCache>) {
    cache.clear();
}

pub fn drain_queues(
    mut engine: ResMut<ZoneEngine>,
    mut memory: ResMut<PlannerMemory>,
    mut cache: ResMut<SiteCountCache>,
    mut stats: ResMut<PlannerStats>,
) {
    let report = run_tick(&mut engine, &mut memory, &mut cache);
    stats.absorb(&report);
    if report != TickReport::default() {
        debug!(
            "drain: {} sites opened, {} deferred, {} dropped",
            report.created, report.requeued, report.dropped
        );
    }
}

pub struct SchedulerPlugin;

impl Plugin for SchedulerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SiteCountCache>()
            .init_resource::<PlannerStats>()
            .add_systems(
                FixedUpdate,
                reset_site_cache.in_set(SimulationSet::PreSim),
            )
            .add_systems(FixedUpdate, drain_queues.in_set(SimulationSet::Simulation));
    }
}
