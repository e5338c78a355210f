//! Harness bootstrap: an empty colony does nothing, and ticks advance.

use crate::test_harness::TestColony;
use crate::tile::ZoneId;

#[test]
fn empty_colony_plans_nothing() {
    let mut colony = TestColony::new();
    colony.tick(25);
    assert_eq!(colony.engine().site_count(), 0);
    assert!(colony.memory().queued_zones().is_empty());
    assert_eq!(colony.stats().sites_created, 0);
}

#[test]
fn ticks_advance_once_per_fixed_step() {
    let mut colony = TestColony::new();
    assert_eq!(colony.tick_count(), 0);
    colony.tick(7);
    assert_eq!(colony.tick_count(), 7);
}

#[test]
fn zone_without_deposits_stays_idle() {
    let mut colony = TestColony::new().with_zone("barren", 3);
    colony.tick(30);
    assert!(colony
        .memory()
        .load_queue(&ZoneId::new("barren"))
        .is_empty());
    assert_eq!(colony.engine().site_count(), 0);
}
