//! Path consensus ballots.
//!
//! Movement agents and the route planner cast votes for paving a tile; the
//! tile is only committed once enough recent votes pile up inside the
//! expiration window. Confirmed ballots are deleted on the spot, and a slow
//! sweep drops ballots whose votes have all aged out so abandoned desire
//! lines do not sit in memory forever.

use bevy::prelude::*;

use crate::config::{BALLOT_SWEEP_INTERVAL, PAVE_VOTE_EXPIRATION};
use crate::memory::PlannerMemory;
use crate::tile::{Tile, ZoneId};
use crate::{SimulationSet, TickCounter};

/// Ballot key for paving a tile.
pub fn ballot_key(zone: &ZoneId, tile: Tile) -> String {
    format!("{zone}-{}-{}", tile.x, tile.y)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Quorum reached; the ballot has been deleted.
    Confirmed,
    /// Vote recorded, quorum not reached yet.
    Pending,
}

/// Drop timestamps that have fallen out of the expiration window. A vote
/// cast at `t` stays live while `t + expiration > now`.
pub fn expire_votes(votes: &mut Vec<u64>, expiration: u64, now: u64) {
    votes.retain(|&t| t + expiration > now);
}

/// Cast one vote on a ballot.
///
/// The first vote only opens the ballot. Later votes purge expired
/// timestamps, then record the new one; surviving timestamps keep the tick
/// they were cast at. Reaching `threshold` live votes deletes the ballot
/// and confirms.
pub fn vote(
    memory: &mut PlannerMemory,
    key: &str,
    threshold: usize,
    expiration: u64,
    now: u64,
) -> VoteOutcome {
    let Some(mut votes) = memory.take_ballot(key) else {
        memory.put_ballot(key.to_owned(), vec![now]);
        return VoteOutcome::Pending;
    };
    expire_votes(&mut votes, expiration, now);
    votes.push(now);
    if votes.len() >= threshold {
        debug!("ballot {key} confirmed with {} live votes", votes.len());
        return VoteOutcome::Confirmed;
    }
    memory.put_ballot(key.to_owned(), votes);
    VoteOutcome::Pending
}

/// Drop every ballot whose votes have all expired. Returns the number
/// dropped.
pub fn sweep_ballots(memory: &mut PlannerMemory, now: u64) -> usize {
    let before = memory.ballot_count();
    memory.retain_ballots(|_, votes| votes.iter().any(|&t| t + PAVE_VOTE_EXPIRATION > now));
    before - memory.ballot_count()
}

pub fn sweep_expired_ballots(tick: Res<TickCounter>, mut memory: ResMut<PlannerMemory>) {
    if !tick.0.is_multiple_of(BALLOT_SWEEP_INTERVAL) {
        return;
    }
    let dropped = sweep_ballots(&mut memory, tick.0);
    if dropped > 0 {
        debug!("swept {dropped} dead path ballots at tick {}", tick.0);
    }
}

pub struct ConsensusPlugin;

impl Plugin for ConsensusPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            sweep_expired_ballots.in_set(SimulationSet::PostSim),
        );
    }
}
