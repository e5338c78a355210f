//! Colony-wide and per-zone site limits under load.

use crate::config::{GLOBAL_SITE_SOFT_LIMIT, ZONE_SITE_LIMIT};
use crate::facility::FacilityKind;
use crate::queue::BuildOrder;
use crate::test_harness::TestColony;
use crate::tile::{Tile, ZoneId};

#[test]
fn a_zone_never_runs_more_than_its_site_limit() {
    let mut colony = TestColony::new().with_zone("Z1", 8);
    let zone = ZoneId::new("Z1");
    for x in 10..30u8 {
        assert!(colony.schedule(BuildOrder::new(
            FacilityKind::Path,
            zone.clone(),
            Tile::new(x, 10)
        )));
    }

    colony.tick(5);
    assert_eq!(colony.engine().zone_site_count(&zone), ZONE_SITE_LIMIT);
    colony.assert_queue_len("Z1", 20 - ZONE_SITE_LIMIT);

    // Completing sites reopens capacity on the very next tick.
    colony.complete_all_sites();
    colony.tick(1);
    assert_eq!(colony.engine().zone_site_count(&zone), ZONE_SITE_LIMIT);
    colony.assert_queue_len("Z1", 20 - 2 * ZONE_SITE_LIMIT);
}

#[test]
fn the_soft_global_limit_freezes_every_zone() {
    let mut colony = TestColony::new().with_zone("busy", 8).with_zone("idle", 8);
    let busy = ZoneId::new("busy");
    let idle = ZoneId::new("idle");

    // Fill the colony to the soft limit directly through the engine.
    {
        let mut engine = colony.engine_mut();
        let mut opened = 0;
        'outer: for y in 2..=47u8 {
            for x in 2..=47u8 {
                if opened == GLOBAL_SITE_SOFT_LIMIT {
                    break 'outer;
                }
                engine
                    .create_project(&busy, Tile::new(x, y), FacilityKind::Path)
                    .unwrap();
                opened += 1;
            }
        }
    }

    assert!(colony.schedule(BuildOrder::new(
        FacilityKind::Path,
        idle.clone(),
        Tile::new(10, 10)
    )));
    colony.tick(3);
    assert_eq!(colony.engine().zone_site_count(&idle), 0);
    colony.assert_queue_len("idle", 1);
    assert_eq!(colony.stats().sites_created, 0);

    // Draining the backlog below the soft limit releases the freeze.
    colony.complete_all_sites();
    colony.tick(1);
    assert_eq!(colony.engine().zone_site_count(&idle), 1);
    colony.assert_queue_len("idle", 0);
}

#[test]
fn deferred_orders_are_retried_not_lost() {
    // Tier 3 allows a single tower; the second order waits for a tier-up.
    let mut colony = TestColony::new().with_zone("Z1", 3);
    let zone = ZoneId::new("Z1");
    assert!(colony.schedule(BuildOrder::new(
        FacilityKind::Tower,
        zone.clone(),
        Tile::new(10, 10)
    )));
    assert!(colony.schedule(BuildOrder::new(
        FacilityKind::Tower,
        zone.clone(),
        Tile::new(20, 10)
    )));

    colony.tick(3);
    assert_eq!(colony.engine().zone_site_count(&zone), 1);
    colony.assert_queue_len("Z1", 1);
    assert!(colony.stats().orders_requeued > 0);

    colony = colony.with_tier("Z1", 5);
    colony.tick(1);
    colony.assert_site_at("Z1", 20, 10, FacilityKind::Tower);
    colony.assert_queue_len("Z1", 0);
}

#[test]
fn blocked_orders_are_dropped() {
    let mut colony = TestColony::new()
        .with_zone("Z1", 3)
        .with_terrain("Z1", 10, 10, crate::engine::Terrain::Wall);
    let zone = ZoneId::new("Z1");
    assert!(colony.schedule(BuildOrder::new(
        FacilityKind::Path,
        zone.clone(),
        Tile::new(10, 10)
    )));

    colony.tick(1);
    colony.assert_queue_len("Z1", 0);
    assert_eq!(colony.engine().zone_site_count(&zone), 0);
    assert_eq!(colony.stats().orders_dropped, 1);
}
