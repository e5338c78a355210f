//! Priority-ordered build queues.
//!
//! A `WorkQueue` holds one zone's pending construction requests sorted by
//! ascending priority value. Insertion is stable: an order with the same
//! priority as existing ones goes behind them, so arrival order breaks ties
//! and nothing ever starves.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::facility::FacilityKind;
use crate::tile::{Tile, ZoneId};

/// One queued construction request.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct BuildOrder {
    pub kind: FacilityKind,
    pub zone: ZoneId,
    pub tile: Tile,
    pub priority: u8,
}

impl BuildOrder {
    /// An order at its kind's default priority.
    pub fn new(kind: FacilityKind, zone: ZoneId, tile: Tile) -> Self {
        Self {
            kind,
            zone,
            tile,
            priority: kind.priority(),
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }
}

/// A zone's pending build orders, lowest priority value first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct WorkQueue {
    orders: Vec<BuildOrder>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a queue from a raw order list, restoring the sort in case the
    /// stored image was edited or predates a priority change. The sort is
    /// stable, so equal-priority orders keep their stored sequence.
    pub fn from_orders(mut orders: Vec<BuildOrder>) -> Self {
        orders.sort_by_key(|o| o.priority);
        Self { orders }
    }

    /// Insert behind every order whose priority is less than or equal to the
    /// new order's.
    pub fn insert(&mut self, order: BuildOrder) {
        let at = self
            .orders
            .iter()
            .position(|o| o.priority > order.priority)
            .unwrap_or(self.orders.len());
        self.orders.insert(at, order);
    }

    /// First order matching the predicate, with its index.
    pub fn find<F>(&self, mut pred: F) -> Option<(usize, &BuildOrder)>
    where
        F: FnMut(&BuildOrder) -> bool,
    {
        self.orders.iter().enumerate().find(|(_, o)| pred(o))
    }

    /// Remove by index. Out-of-range indices are a caller bug; they are
    /// logged and leave the queue untouched.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.orders.len() {
            warn!(
                "work queue remove out of range: {index} >= {}",
                self.orders.len()
            );
            return false;
        }
        self.orders.remove(index);
        true
    }

    /// Take the highest-priority order.
    pub fn pop_front(&mut self) -> Option<BuildOrder> {
        if self.orders.is_empty() {
            None
        } else {
            Some(self.orders.remove(0))
        }
    }

    pub fn peek(&self) -> Option<&BuildOrder> {
        self.orders.first()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BuildOrder> {
        self.orders.iter()
    }

    /// Owned copy of the ordered contents, the form the queue is stored in.
    pub fn snapshot(&self) -> Vec<BuildOrder> {
        self.orders.clone()
    }
}
