//! End-to-end placement: planning pass → work queue → engine build sites.

use crate::engine::Terrain;
use crate::facility::FacilityKind;
use crate::orchestrator::PLAN_INTERVAL;
use crate::test_harness::TestColony;
use crate::tile::{Tile, ZoneId};

fn pending_tiles(colony: &TestColony, zone: &str, kind: FacilityKind) -> Vec<Tile> {
    let id = ZoneId::new(zone);
    let engine = colony.engine();
    (0..50u8)
        .flat_map(|y| (0..50u8).map(move |x| Tile::new(x, y)))
        .filter(|&t| engine.contents_at(&id, t).pending == Some(kind))
        .collect()
}

#[test]
fn container_site_opens_next_to_its_deposit() {
    let mut colony = TestColony::new()
        .with_zone("Z1", 1)
        .with_deposit("Z1", 25, 25);

    colony.tick(PLAN_INTERVAL as u32);

    let sites = pending_tiles(&colony, "Z1", FacilityKind::Container);
    assert_eq!(sites.len(), 1, "exactly one container per deposit");
    assert_eq!(sites[0].chebyshev(Tile::new(25, 25)), 1);
    assert_eq!(colony.stats().sites_created, 1);
}

#[test]
fn second_deposit_gets_its_own_container() {
    let mut colony = TestColony::new()
        .with_zone("Z1", 1)
        .with_deposit("Z1", 15, 15)
        .with_deposit("Z1", 35, 35);

    colony.tick(PLAN_INTERVAL as u32);

    let sites = pending_tiles(&colony, "Z1", FacilityKind::Container);
    assert_eq!(sites.len(), 2);
    // One per deposit: the deposits are 20 apart, well past the container
    // avoidance radius.
    assert!(sites.iter().any(|t| t.chebyshev(Tile::new(15, 15)) == 1));
    assert!(sites.iter().any(|t| t.chebyshev(Tile::new(35, 35)) == 1));
}

#[test]
fn extensions_fill_out_over_several_rounds() {
    let mut colony = TestColony::new()
        .with_zone("Z1", 2)
        .with_deposit("Z1", 25, 25);

    // Planning passes queue work; completing sites between rounds frees the
    // per-zone capacity for the rest of the queue.
    for _ in 0..4 {
        colony.tick(PLAN_INTERVAL as u32);
        colony.complete_all_sites();
    }

    let zone = ZoneId::new("Z1");
    let engine = colony.engine();
    assert_eq!(
        engine.structure_count(&zone, FacilityKind::Extension),
        5,
        "tier 2 wants five extensions"
    );
    assert_eq!(engine.structure_count(&zone, FacilityKind::Container), 1);
}

#[test]
fn extension_sites_keep_their_distance_from_the_deposit() {
    let mut colony = TestColony::new()
        .with_zone("Z1", 2)
        .with_deposit("Z1", 25, 25);

    colony.tick(PLAN_INTERVAL as u32);

    for tile in pending_tiles(&colony, "Z1", FacilityKind::Extension) {
        assert!(
            tile.chebyshev(Tile::new(25, 25)) > 2,
            "extension at {tile} violates the deposit exclusion radius"
        );
        assert!(tile.is_valid());
        assert!(!tile.is_near_edge());
    }
}

#[test]
fn extension_sites_are_never_orthogonally_adjacent() {
    let mut colony = TestColony::new()
        .with_zone("Z1", 2)
        .with_deposit("Z1", 25, 25);

    for _ in 0..4 {
        colony.tick(PLAN_INTERVAL as u32);
        colony.complete_all_sites();
    }

    let zone = ZoneId::new("Z1");
    let engine = colony.engine();
    let extensions: Vec<Tile> = (0..50u8)
        .flat_map(|y| (0..50u8).map(move |x| Tile::new(x, y)))
        .filter(|&t| {
            engine
                .contents_at(&zone, t)
                .structures
                .contains(&FacilityKind::Extension)
        })
        .collect();
    assert!(!extensions.is_empty());
    for (i, a) in extensions.iter().enumerate() {
        for b in extensions.iter().skip(i + 1) {
            let orthogonal = a.chebyshev(*b) == 1 && (a.x == b.x || a.y == b.y);
            assert!(
                !orthogonal,
                "checkered lattice broken: {a} and {b} touch orthogonally"
            );
        }
    }
}

#[test]
fn sealed_deposit_gets_a_container_but_no_extensions() {
    let mut colony = TestColony::new()
        .with_zone("Z1", 2)
        .with_deposit("Z1", 25, 25);
    // Wall ring at Chebyshev distance 2: candidates outside cannot reach
    // the deposit, candidates inside sit in its exclusion radius.
    for d in -2i32..=2 {
        for (dx, dy) in [(d, -2), (d, 2), (-2, d), (2, d)] {
            let t = Tile::new(25, 25).offset(dx, dy).unwrap();
            colony = colony.with_terrain("Z1", t.x, t.y, Terrain::Wall);
        }
    }

    colony.tick(PLAN_INTERVAL as u32);

    assert_eq!(pending_tiles(&colony, "Z1", FacilityKind::Container).len(), 1);
    assert!(pending_tiles(&colony, "Z1", FacilityKind::Extension).is_empty());
}

#[test]
fn rough_terrain_still_converges() {
    let mut colony = TestColony::new()
        .with_zone("Z1", 2)
        .with_swamp_scatter("Z1", 42, 400)
        .with_deposit("Z1", 25, 25);

    for _ in 0..4 {
        colony.tick(PLAN_INTERVAL as u32);
        colony.complete_all_sites();
    }

    // Swamp is slow but placeable: the zone still fills out.
    let zone = ZoneId::new("Z1");
    assert_eq!(
        colony
            .engine()
            .structure_count(&zone, FacilityKind::Extension),
        5
    );
}
