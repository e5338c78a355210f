//! Planner memory through the saveable registry.

use bevy::prelude::*;

use crate::facility::FacilityKind;
use crate::memory::PlannerMemory;
use crate::queue::BuildOrder;
use crate::test_harness::TestColony;
use crate::tile::{Tile, ZoneId};
use crate::{Saveable, SaveableRegistry};

fn save_extensions(colony: &mut TestColony) -> std::collections::BTreeMap<String, Vec<u8>> {
    colony
        .world_mut()
        .resource_scope(|world, registry: Mut<SaveableRegistry>| registry.save_all(world))
}

#[test]
fn planner_memory_round_trips_through_the_registry() {
    let mut colony = TestColony::new().with_zone("Z1", 2);
    let zone = ZoneId::new("Z1");
    assert!(colony.schedule(BuildOrder::new(
        FacilityKind::Tower,
        zone.clone(),
        Tile::new(10, 10)
    )));
    assert!(colony.schedule(BuildOrder::new(
        FacilityKind::Path,
        zone.clone(),
        Tile::new(11, 10)
    )));
    colony
        .memory_mut()
        .put_ballot("Z1-12-10".to_owned(), vec![3, 4]);

    let extensions = save_extensions(&mut colony);
    assert!(extensions.contains_key(PlannerMemory::SAVE_KEY));
    let saved = colony.memory().clone();

    // Restore into a fresh colony.
    let mut restored = TestColony::new();
    restored
        .world_mut()
        .resource_scope(|world, registry: Mut<SaveableRegistry>| {
            registry.load_all(world, &extensions);
        });
    assert_eq!(*restored.memory(), saved);

    // The restored queue drains exactly like the original would.
    let queue = restored.memory().load_queue(&zone);
    assert_eq!(queue.peek().map(|o| o.kind), Some(FacilityKind::Tower));
    assert_eq!(queue.len(), 2);
    assert_eq!(restored.memory().ballot("Z1-12-10"), Some(&[3, 4][..]));
}

#[test]
fn default_memory_is_skipped_in_the_save() {
    let mut colony = TestColony::new();
    let extensions = save_extensions(&mut colony);
    assert!(
        !extensions.contains_key(PlannerMemory::SAVE_KEY),
        "an empty planner memory writes no extension entry"
    );
}

#[test]
fn restored_orders_become_sites_after_a_restart() {
    let mut colony = TestColony::new().with_zone("Z1", 3);
    let zone = ZoneId::new("Z1");
    assert!(colony.schedule(BuildOrder::new(
        FacilityKind::Tower,
        zone.clone(),
        Tile::new(10, 10)
    )));
    let extensions = save_extensions(&mut colony);

    // Same engine world, fresh planner state: the reloaded queue picks up
    // where it left off.
    let mut restored = TestColony::new().with_zone("Z1", 3);
    restored
        .world_mut()
        .resource_scope(|world, registry: Mut<SaveableRegistry>| {
            registry.load_all(world, &extensions);
        });
    restored.tick(1);
    restored.assert_site_at("Z1", 10, 10, FacilityKind::Tower);
}
