//! Seeded property tests for the ring traversal and the placement search.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::engine::{Terrain, ZoneEngine};
use crate::facility::FacilityKind;
use crate::placement::PlacementSearch;
use crate::plans::BuildingPlan;
use crate::rings::RingCoords;
use crate::tile::{Tile, ZoneId};

const NUM_SAMPLES: u64 = 32;
const SEED: u64 = 0x00C0_FFEE;

fn random_anchor(rng: &mut ChaCha8Rng) -> Tile {
    Tile::new(rng.gen_range(2..=47), rng.gen_range(2..=47))
}

/// A zone with random walls, swamps, and a few standing structures.
fn random_colony(rng: &mut ChaCha8Rng) -> (ZoneEngine, ZoneId) {
    let mut engine = ZoneEngine::default();
    let zone = ZoneId::new("Z1");
    engine.add_zone(zone.clone(), 4);
    for _ in 0..rng.gen_range(20..120) {
        let tile = random_anchor(rng);
        let terrain = if rng.gen_bool(0.4) {
            Terrain::Wall
        } else {
            Terrain::Swamp
        };
        engine.set_terrain(&zone, tile, terrain);
    }
    for _ in 0..rng.gen_range(0..10) {
        engine.add_structure(&zone, random_anchor(rng), FacilityKind::Extension);
    }
    (engine, zone)
}

#[test]
fn rings_visit_inner_to_outer_without_duplicates() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    for sample in 0..NUM_SAMPLES {
        let origin = random_anchor(&mut rng);
        let radius = rng.gen_range(0..=12u8);
        let mut seen = std::collections::BTreeSet::new();
        let mut last_ring = 0;
        for tile in RingCoords::new(origin, radius) {
            assert!(tile.is_valid(), "sample {sample}: {tile} out of band");
            assert!(seen.insert(tile), "sample {sample}: duplicate {tile}");
            let ring = tile.chebyshev(origin);
            assert!(
                ring >= last_ring,
                "sample {sample}: ring order broke at {tile}"
            );
            assert!(ring <= radius, "sample {sample}: {tile} beyond radius");
            last_ring = ring;
        }
    }
}

#[test]
fn placement_yields_hold_their_invariants_on_random_terrain() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED ^ 0x5EED);
    for sample in 0..NUM_SAMPLES {
        let (engine, zone) = random_colony(&mut rng);
        let anchor = random_anchor(&mut rng);
        let plan = BuildingPlan::new(FacilityKind::Tower).with_min_spacing(3);

        let yields: Vec<Tile> = PlacementSearch::new(&engine, &zone, anchor, 6, &plan).collect();
        for (i, &a) in yields.iter().enumerate() {
            assert!(a.is_valid() && !a.is_near_edge(), "sample {sample}: {a}");
            assert!(
                !engine.terrain_at(&zone, a).is_wall(),
                "sample {sample}: yielded a wall at {a}"
            );
            assert!(
                !engine.contents_at(&zone, a).blocks_site(),
                "sample {sample}: yielded an occupied tile at {a}"
            );
            assert!(
                a.chebyshev(anchor) <= 6,
                "sample {sample}: {a} outside the search radius"
            );
            for &b in yields.iter().skip(i + 1) {
                assert!(
                    a.chebyshev(b) >= 3,
                    "sample {sample}: {a} and {b} violate the spacing floor"
                );
            }
        }
    }
}

#[test]
fn placement_yields_are_ordered_closest_first() {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED ^ 0xD157);
    for sample in 0..NUM_SAMPLES {
        let (engine, zone) = random_colony(&mut rng);
        let anchor = random_anchor(&mut rng);
        let plan = BuildingPlan::new(FacilityKind::Extension);

        let mut last = 0;
        for tile in PlacementSearch::new(&engine, &zone, anchor, 8, &plan) {
            let d = tile.chebyshev(anchor);
            assert!(
                d >= last,
                "sample {sample}: {tile} at distance {d} yielded after distance {last}"
            );
            last = d;
        }
    }
}
