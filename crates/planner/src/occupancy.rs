//! Occupancy classification grid used by placement searches.
//!
//! A search seeds only the tiles its bordered window visits; everything else
//! stays unseeded (`None`). Unseeded tiles are deliberately treated as open
//! when counting a candidate's free neighbors: the window edge must not make
//! tiles look more cramped than they are.

use std::fmt;

use crate::config::ZONE_SIZE;
use crate::rings::RingCoords;
use crate::tile::Tile;

const ZONE_AREA: usize = ZONE_SIZE as usize * ZONE_SIZE as usize;

/// What a tile means to the placement pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Structurally open and still eligible to receive a facility.
    Free,
    /// Open ground that must stay open: never selected, but neighbors still
    /// count it as breathing room.
    DisqualifiedFree,
    /// Physically taken: wall terrain, a blocking structure or site, or a
    /// deposit.
    Occupied,
    /// Inside some facility's exclusion area; pushes Free neighbors out
    /// during the spread pass.
    AvoidZone,
}

/// A classified tile. `radius` is the exclusion radius of whatever rule won
/// the tile (0 for plain occupancy), and drives the precedence comparison:
/// a later rule only takes the tile over when its radius is strictly larger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyCell {
    pub class: Classification,
    pub radius: u8,
    pub checkered: bool,
}

impl OccupancyCell {
    pub const FREE: Self = Self {
        class: Classification::Free,
        radius: 0,
        checkered: false,
    };
    pub const DISQUALIFIED: Self = Self {
        class: Classification::DisqualifiedFree,
        radius: 0,
        checkered: false,
    };
    pub const OCCUPIED: Self = Self {
        class: Classification::Occupied,
        radius: 0,
        checkered: false,
    };

    /// Only untouched Free cells may be yielded or downgraded.
    pub fn is_free(self) -> bool {
        self.class == Classification::Free
    }

    fn glyph(self) -> char {
        match self.class {
            Classification::Free => '.',
            Classification::DisqualifiedFree => '-',
            Classification::Occupied => '#',
            Classification::AvoidZone => 'x',
        }
    }
}

/// Per-search snapshot of tile classifications over one zone.
pub struct OccupancyGrid {
    cells: Vec<Option<OccupancyCell>>,
}

impl Default for OccupancyGrid {
    fn default() -> Self {
        Self {
            cells: vec![None; ZONE_AREA],
        }
    }
}

impl OccupancyGrid {
    pub fn new() -> Self {
        Self::default()
    }

    fn idx(tile: Tile) -> usize {
        tile.y as usize * ZONE_SIZE as usize + tile.x as usize
    }

    pub fn get(&self, tile: Tile) -> Option<OccupancyCell> {
        if !tile.in_bounds() {
            return None;
        }
        self.cells[Self::idx(tile)]
    }

    pub fn set(&mut self, tile: Tile, cell: OccupancyCell) {
        if tile.in_bounds() {
            self.cells[Self::idx(tile)] = Some(cell);
        }
    }

    /// Downgrade Free cells within `radius` of `origin` to DisqualifiedFree.
    /// The origin itself is left alone. With `checkered` set, cells on the
    /// origin's lattice parity are skipped so a walkable weave remains.
    pub fn mark_nearby(&mut self, origin: Tile, radius: u8, checkered: bool) {
        for tile in RingCoords::new(origin, radius) {
            if tile == origin {
                continue;
            }
            let Some(cell) = self.get(tile) else {
                continue;
            };
            if !cell.is_free() {
                continue;
            }
            if checkered && tile.parity_matches(origin) {
                continue;
            }
            self.set(tile, OccupancyCell::DISQUALIFIED);
        }
    }

    /// Count neighbors within `radius` that leave room to operate: anything
    /// not Occupied and not an AvoidZone qualifies, including unseeded tiles
    /// beyond the window. Stops early once `max` is reached.
    pub fn count_qualifying_neighbors(&self, origin: Tile, radius: u8, max: usize) -> usize {
        let mut qualifying = 0;
        for tile in RingCoords::new(origin, radius) {
            if tile == origin {
                continue;
            }
            let qualifies = match self.get(tile) {
                None => true,
                Some(cell) => !matches!(
                    cell.class,
                    Classification::Occupied | Classification::AvoidZone
                ),
            };
            if qualifies {
                qualifying += 1;
                if qualifying >= max {
                    return qualifying;
                }
            }
        }
        qualifying
    }
}

impl fmt::Display for OccupancyGrid {
    /// Compact dump for trace logs: `.` free, `-` disqualified, `#`
    /// occupied, `x` avoid zone, space for unseeded.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..ZONE_SIZE {
            for x in 0..ZONE_SIZE {
                let c = match self.get(Tile::new(x, y)) {
                    Some(cell) => cell.glyph(),
                    None => ' ',
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
