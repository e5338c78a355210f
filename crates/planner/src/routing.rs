//! PLN-052: route planning and pavement requests.
//!
//! Connects facilities back to their anchor with a weighted search over the
//! zone grid, then feeds every unpaved tile on the route through the path
//! consensus. Movement agents use [`request_pavement`] directly: one call per
//! tile crossed, and the ballots decide which desire lines become real.

use bevy::prelude::*;
use pathfinding::prelude::astar;

use crate::config::{MIN_PAVING_TIER, PAVE_VOTE_EXPIRATION, PAVE_VOTE_THRESHOLD};
use crate::consensus::{self, VoteOutcome};
use crate::engine::{Terrain, ZoneEngine};
use crate::facility::FacilityKind;
use crate::memory::PlannerMemory;
use crate::queue::BuildOrder;
use crate::scheduler;
use crate::tile::{Tile, ZoneId};

/// How the search prices each tile.
pub enum CostProfile<'a> {
    /// Laying out a paved route: paved tiles, path sites, and queued path
    /// orders cost 1; blocking structures, sites, and queued orders are
    /// impassable unless the facility kind is permeable; open ground costs
    /// plain 2 / swamp 4.
    RoadBuilding(&'a PlannerMemory),
    /// Raw ground only: plain 1 / swamp 5, everything on top ignored. Used
    /// by the placement detour check, which wants walkability before any
    /// facility exists.
    TerrainOnly,
}

impl<'a> CostProfile<'a> {
    pub fn road_building(memory: &'a PlannerMemory) -> Self {
        Self::RoadBuilding(memory)
    }

    pub fn terrain_only() -> CostProfile<'static> {
        CostProfile::TerrainOnly
    }

    /// Cost of stepping onto a tile, `None` when impassable.
    fn tile_cost(&self, engine: &ZoneEngine, zone: &ZoneId, tile: Tile) -> Option<u32> {
        let terrain = engine.terrain_at(zone, tile);
        if terrain.is_wall() {
            return None;
        }
        match self {
            Self::TerrainOnly => Some(match terrain {
                Terrain::Plain => 1,
                Terrain::Swamp => 5,
                Terrain::Wall => unreachable!(),
            }),
            Self::RoadBuilding(memory) => {
                let contents = engine.contents_at(zone, tile);
                if contents.has_path() {
                    return Some(1);
                }
                if contents.deposit {
                    return None;
                }
                let blocking = |kind: FacilityKind| !kind.is_path() && !kind.is_permeable();
                if contents.structures.iter().copied().any(blocking)
                    || contents.pending.is_some_and(blocking)
                {
                    return None;
                }
                if let Some(order) = memory.order_at(zone, tile) {
                    if order.kind.is_path() {
                        return Some(1);
                    }
                    if blocking(order.kind) {
                        return None;
                    }
                }
                Some(match terrain {
                    Terrain::Plain => 2,
                    Terrain::Swamp => 4,
                    Terrain::Wall => unreachable!(),
                })
            }
        }
    }
}

/// Weighted shortest path from `from` to within `range` of `to`, 8-connected.
/// The returned path starts at `from`; `None` when no route exists.
pub fn path_between(
    engine: &ZoneEngine,
    zone: &ZoneId,
    from: Tile,
    to: Tile,
    range: u8,
    profile: &CostProfile<'_>,
) -> Option<Vec<Tile>> {
    if from.chebyshev(to) <= range {
        return Some(vec![from]);
    }
    let result = astar(
        &from,
        |&tile| {
            let mut next = Vec::with_capacity(8);
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let Some(neighbor) = tile.offset(dx, dy) else {
                        continue;
                    };
                    if let Some(cost) = profile.tile_cost(engine, zone, neighbor) {
                        next.push((neighbor, cost));
                    }
                }
            }
            next
        },
        // Admissible: every step costs at least 1, diagonal moves allowed.
        |&tile| tile.chebyshev(to).saturating_sub(range) as u32,
        |&tile| tile.chebyshev(to) <= range,
    );
    result.map(|(path, _cost)| path)
}

/// Number of steps from `from` to within `range` of `to`, `None` when
/// unreachable.
pub fn step_count(
    engine: &ZoneEngine,
    zone: &ZoneId,
    from: Tile,
    to: Tile,
    range: u8,
    profile: &CostProfile<'_>,
) -> Option<usize> {
    path_between(engine, zone, from, to, range, profile).map(|path| path.len() - 1)
}

/// Connect an anchor to each destination with a candidate paved route.
///
/// Every traversed tile that is not already paved gets a consensus vote;
/// tiles whose ballot confirms get a path order scheduled. Unreachable
/// destinations are skipped, the rest still proceed. Returns the number of
/// path orders scheduled.
pub fn connect(
    engine: &ZoneEngine,
    memory: &mut PlannerMemory,
    zone: &ZoneId,
    anchor: Tile,
    destinations: &[Tile],
    now: u64,
) -> usize {
    let mut scheduled = 0;
    for &destination in destinations {
        let profile = CostProfile::road_building(memory);
        let Some(path) = path_between(engine, zone, anchor, destination, 1, &profile) else {
            debug!("{zone}: no route from {anchor} to {destination}, skipping");
            continue;
        };
        for &tile in path.iter().skip(1) {
            if engine.contents_at(zone, tile).has_path() {
                continue;
            }
            let key = consensus::ballot_key(zone, tile);
            let outcome = consensus::vote(
                memory,
                &key,
                PAVE_VOTE_THRESHOLD,
                PAVE_VOTE_EXPIRATION,
                now,
            );
            if outcome == VoteOutcome::Confirmed
                && scheduler::schedule(
                    memory,
                    BuildOrder::new(FacilityKind::Path, zone.clone(), tile),
                )
            {
                scheduled += 1;
            }
        }
    }
    scheduled
}

/// Footfall entry point: an agent crossed `tile` and would like it paved.
///
/// Low-tier zones never pave. Already-paved tiles are skipped without
/// spending a vote. Returns true when this call scheduled the path order.
pub fn request_pavement(
    engine: &ZoneEngine,
    memory: &mut PlannerMemory,
    zone: &ZoneId,
    tile: Tile,
    now: u64,
) -> bool {
    if engine.zone_tier(zone) < MIN_PAVING_TIER {
        return false;
    }
    if engine.contents_at(zone, tile).has_path() {
        return false;
    }
    let key = consensus::ballot_key(zone, tile);
    let outcome = consensus::vote(
        memory,
        &key,
        PAVE_VOTE_THRESHOLD,
        PAVE_VOTE_EXPIRATION,
        now,
    );
    outcome == VoteOutcome::Confirmed
        && scheduler::schedule(
            memory,
            BuildOrder::new(FacilityKind::Path, zone.clone(), tile),
        )
}
