//! Zone-local coordinates.
//!
//! Every zone is a ZONE_SIZE x ZONE_SIZE grid. Tiles are stored as `u8`
//! pairs; arithmetic that can go negative happens in `i32` and is converted
//! back only after a bounds check.

use std::fmt;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::config::{EDGE_MARGIN, VALID_MAX, VALID_MIN, ZONE_SIZE};

/// Identifier of a zone, unique across the colony.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub struct ZoneId(pub String);

impl ZoneId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single cell of a zone grid.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Encode,
    Decode,
    Serialize,
    Deserialize,
)]
pub struct Tile {
    pub x: u8,
    pub y: u8,
}

impl Tile {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are inside the zone grid at all.
    pub fn in_bounds(self) -> bool {
        self.x < ZONE_SIZE && self.y < ZONE_SIZE
    }

    /// Whether a facility may legally sit here (outside the transit band).
    pub fn is_valid(self) -> bool {
        self.x >= VALID_MIN && self.x <= VALID_MAX && self.y >= VALID_MIN && self.y <= VALID_MAX
    }

    /// Tiles hugging the zone edge are kept clear even when valid-adjacent.
    pub fn is_near_edge(self) -> bool {
        self.x < EDGE_MARGIN
            || self.x > ZONE_SIZE - 1 - EDGE_MARGIN
            || self.y < EDGE_MARGIN
            || self.y > ZONE_SIZE - 1 - EDGE_MARGIN
    }

    /// Chebyshev (king-move) distance to another tile.
    pub fn chebyshev(self, other: Tile) -> u8 {
        let dx = (self.x as i32 - other.x as i32).unsigned_abs();
        let dy = (self.y as i32 - other.y as i32).unsigned_abs();
        dx.max(dy) as u8
    }

    /// Checkering predicate: true when this tile sits on the same lattice
    /// parity as `origin`. Checkered avoidance rules skip matching tiles so
    /// every other diagonal stays open for walking between facilities.
    pub fn parity_matches(self, origin: Tile) -> bool {
        (self.x + origin.x) % 2 == (self.y + origin.y) % 2
    }

    /// Offset by a signed delta, `None` when the result leaves the grid.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Tile> {
        let nx = self.x as i32 + dx;
        let ny = self.y as i32 + dy;
        if nx < 0 || ny < 0 || nx >= ZONE_SIZE as i32 || ny >= ZONE_SIZE as i32 {
            return None;
        }
        Some(Tile::new(nx as u8, ny as u8))
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}
