//! Integration tests using the `TestColony` harness.
//!
//! These spin up a headless Bevy App with `PlannerPlugin` and verify the
//! full pipeline: planning pass, queue drain, consensus, and persistence
//! working together across ticks.

mod capacity_limits;
mod colony_bootstrap;
mod container_pipeline;
mod pavement_consensus;
mod persistence;
mod placement_properties;
