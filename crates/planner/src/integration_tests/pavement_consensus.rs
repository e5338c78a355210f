//! Footfall voting through to paved routes.

use bevy::prelude::*;

use crate::config::{PAVE_VOTE_EXPIRATION, PAVE_VOTE_THRESHOLD};
use crate::engine::ZoneEngine;
use crate::facility::FacilityKind;
use crate::memory::PlannerMemory;
use crate::routing;
use crate::test_harness::TestColony;
use crate::tile::{Tile, ZoneId};

/// One agent crossing `tile` in `zone` at the colony's current tick.
fn footfall(colony: &mut TestColony, zone: &ZoneId, tile: Tile) -> bool {
    let now = colony.tick_count();
    colony
        .world_mut()
        .resource_scope(|world, mut memory: Mut<PlannerMemory>| {
            let engine = world.resource::<ZoneEngine>();
            routing::request_pavement(engine, &mut memory, zone, tile, now)
        })
}

#[test]
fn repeated_footfall_paves_a_desire_line() {
    let mut colony = TestColony::new().with_zone("Z1", 2);
    let zone = ZoneId::new("Z1");
    let line: Vec<Tile> = (10..15u8).map(|x| Tile::new(x, 10)).collect();

    // Quorum is five votes; the fifth crossing confirms every tile.
    for round in 1..=PAVE_VOTE_THRESHOLD {
        colony.tick(1);
        for &tile in &line {
            let confirmed = footfall(&mut colony, &zone, tile);
            assert_eq!(confirmed, round == PAVE_VOTE_THRESHOLD, "round {round} at {tile}");
        }
    }
    assert_eq!(colony.memory().load_queue(&zone).len(), line.len());

    // The drain converts them into path sites over the next ticks.
    colony.tick(1);
    assert_eq!(colony.engine().zone_site_count(&zone), 4, "zone cap first");
    colony.complete_all_sites();
    colony.tick(1);
    assert_eq!(
        colony.engine().zone_site_count(&zone) + 4,
        line.len(),
        "the rest follows once capacity frees up"
    );
}

#[test]
fn stale_votes_never_confirm() {
    let mut colony = TestColony::new().with_zone("Z1", 2);
    let zone = ZoneId::new("Z1");
    let tile = Tile::new(10, 10);

    // Four votes, then a long quiet spell, then more votes: the early ones
    // have expired, so quorum needs five fresh ones.
    for _ in 0..4 {
        colony.tick(1);
        assert!(!footfall(&mut colony, &zone, tile));
    }
    colony.tick(PAVE_VOTE_EXPIRATION as u32 + 1);
    for _ in 0..4 {
        assert!(!footfall(&mut colony, &zone, tile));
        colony.tick(1);
    }
    assert!(colony.memory().load_queue(&zone).is_empty());
}

#[test]
fn low_tier_zones_never_pave() {
    let mut colony = TestColony::new().with_zone("outpost", 1);
    let zone = ZoneId::new("outpost");
    for _ in 0..10 {
        colony.tick(1);
        assert!(!footfall(&mut colony, &zone, Tile::new(10, 10)));
    }
    assert_eq!(colony.memory().ballot_count(), 0);
}

#[test]
fn ballots_are_independent_per_zone() {
    let mut colony = TestColony::new().with_zone("A", 2).with_zone("B", 2);
    let tile = Tile::new(10, 10);

    for _ in 0..4 {
        colony.tick(1);
        footfall(&mut colony, &ZoneId::new("A"), tile);
    }
    colony.tick(1);
    // Zone B's first vote cannot ride on A's four.
    assert!(!footfall(&mut colony, &ZoneId::new("B"), tile));
    assert!(footfall(&mut colony, &ZoneId::new("A"), tile));
}

#[test]
fn dead_ballots_are_swept() {
    let mut colony = TestColony::new().with_zone("Z1", 2);
    let zone = ZoneId::new("Z1");

    colony.tick(1);
    footfall(&mut colony, &zone, Tile::new(10, 10));
    footfall(&mut colony, &zone, Tile::new(11, 10));
    assert_eq!(colony.memory().ballot_count(), 2);

    // Run past the sweep interval; both ballots have long expired.
    colony.tick(1000);
    assert_eq!(colony.memory().ballot_count(), 0);
}

#[test]
fn confirmed_path_orders_survive_into_sites_with_paths_removed_under_facilities() {
    let mut colony = TestColony::new().with_zone("Z1", 3);
    let zone = ZoneId::new("Z1");
    let tile = Tile::new(20, 20);

    for _ in 0..PAVE_VOTE_THRESHOLD {
        colony.tick(1);
        footfall(&mut colony, &zone, tile);
    }
    // A tower order for the same tile supersedes the queued path.
    assert!(colony.schedule(crate::queue::BuildOrder::new(
        FacilityKind::Tower,
        zone.clone(),
        tile
    )));
    colony.tick(1);
    colony.assert_site_at("Z1", 20, 20, FacilityKind::Tower);
}
