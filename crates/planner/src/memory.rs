//! Durable planner memory.
//!
//! One resource carries everything the planner persists: per-zone work queue
//! images and the path ballots. Queues are stored as raw order lists and
//! materialized through [`PlannerMemory::load_queue`] / written back through
//! [`PlannerMemory::save_queue`], so every mutation path leaves a sorted
//! image behind and a hand-edited save heals itself on load.

use std::collections::BTreeMap;

use bevy::prelude::*;
use bitcode::{Decode, Encode};

use crate::facility::FacilityKind;
use crate::queue::{BuildOrder, WorkQueue};
use crate::tile::{Tile, ZoneId};
use crate::{decode_or_warn, Saveable};

#[derive(Resource, Debug, Clone, Default, PartialEq, Encode, Decode)]
pub struct PlannerMemory {
    queues: BTreeMap<ZoneId, Vec<BuildOrder>>,
    ballots: BTreeMap<String, Vec<u64>>,
}

impl PlannerMemory {
    // -----------------------------------------------------------------------
    // Work queues
    // -----------------------------------------------------------------------

    /// Materialize a zone's queue from its stored image.
    pub fn load_queue(&self, zone: &ZoneId) -> WorkQueue {
        WorkQueue::from_orders(self.queues.get(zone).cloned().unwrap_or_default())
    }

    /// Store a queue image back. Empty queues drop their entry so the save
    /// holds only zones with actual work.
    pub fn save_queue(&mut self, zone: &ZoneId, queue: &WorkQueue) {
        if queue.is_empty() {
            self.queues.remove(zone);
        } else {
            self.queues.insert(zone.clone(), queue.snapshot());
        }
    }

    /// Zones that currently have orders waiting.
    pub fn queued_zones(&self) -> Vec<ZoneId> {
        self.queues.keys().cloned().collect()
    }

    /// The stored order sitting on a tile, if any.
    pub fn order_at(&self, zone: &ZoneId, tile: Tile) -> Option<&BuildOrder> {
        self.queues.get(zone)?.iter().find(|o| o.tile == tile)
    }

    /// How many orders of `kind` a zone has queued.
    pub fn queued_count(&self, zone: &ZoneId, kind: FacilityKind) -> usize {
        self.queues
            .get(zone)
            .map(|q| q.iter().filter(|o| o.kind == kind).count())
            .unwrap_or(0)
    }

    // -----------------------------------------------------------------------
    // Path ballots
    // -----------------------------------------------------------------------

    /// A ballot's vote timestamps.
    pub fn ballot(&self, key: &str) -> Option<&[u64]> {
        self.ballots.get(key).map(Vec::as_slice)
    }

    pub fn ballot_count(&self) -> usize {
        self.ballots.len()
    }

    /// Remove a ballot, returning its timestamps.
    pub fn take_ballot(&mut self, key: &str) -> Option<Vec<u64>> {
        self.ballots.remove(key)
    }

    pub fn put_ballot(&mut self, key: String, votes: Vec<u64>) {
        self.ballots.insert(key, votes);
    }

    /// Keep only the ballots the predicate approves.
    pub fn retain_ballots(&mut self, mut keep: impl FnMut(&str, &[u64]) -> bool) {
        self.ballots.retain(|k, v| keep(k, v));
    }
}

impl Saveable for PlannerMemory {
    const SAVE_KEY: &'static str = "planner_memory";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        if *self == Self::default() {
            return None; // nothing queued, nothing voted
        }
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        decode_or_warn(Self::SAVE_KEY, bytes)
    }
}
