//! Expanding ring traversal around an anchor tile.
//!
//! Placement scans want "closest first" in a stable, reproducible order: the
//! anchor itself, then each Chebyshev shell outward. Within shell `r` the
//! top and bottom row segments come first (x ascending, top before bottom
//! per column), then the full left and right columns (y ascending, left
//! before right per row). Coordinates outside the valid placement band are
//! skipped by the traversal itself, so callers never see them.

use crate::config::{VALID_MAX, VALID_MIN};
use crate::tile::Tile;

enum Stage {
    Origin,
    /// Top/bottom row segments of ring `r`: x in [ox-(r-1), ox+(r-1)].
    Rows { r: i32, x: i32 },
    /// Left/right columns of ring `r`: y in [oy-r, oy+r], corners included.
    Cols { r: i32, y: i32 },
    Done,
}

/// Iterator over ring-ordered coordinates around an origin.
pub struct RingCoords {
    ox: i32,
    oy: i32,
    radius: i32,
    stage: Stage,
    /// Second half of a top/bottom or left/right pair, yielded next.
    pending: Option<(i32, i32)>,
}

impl RingCoords {
    pub fn new(origin: Tile, radius: u8) -> Self {
        Self {
            ox: origin.x as i32,
            oy: origin.y as i32,
            radius: radius as i32,
            stage: Stage::Origin,
            pending: None,
        }
    }

    fn checked(x: i32, y: i32) -> Option<Tile> {
        let lo = VALID_MIN as i32;
        let hi = VALID_MAX as i32;
        if x < lo || x > hi || y < lo || y > hi {
            return None;
        }
        Some(Tile::new(x as u8, y as u8))
    }
}

impl Iterator for RingCoords {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        loop {
            if let Some((x, y)) = self.pending.take() {
                if let Some(tile) = Self::checked(x, y) {
                    return Some(tile);
                }
                continue;
            }
            match self.stage {
                Stage::Origin => {
                    self.stage = if self.radius == 0 {
                        Stage::Done
                    } else {
                        Stage::Rows { r: 1, x: self.ox }
                    };
                    if let Some(tile) = Self::checked(self.ox, self.oy) {
                        return Some(tile);
                    }
                }
                Stage::Rows { r, x } => {
                    if x > self.ox + (r - 1) {
                        self.stage = Stage::Cols { r, y: self.oy - r };
                        continue;
                    }
                    self.stage = Stage::Rows { r, x: x + 1 };
                    self.pending = Some((x, self.oy + r));
                    if let Some(tile) = Self::checked(x, self.oy - r) {
                        return Some(tile);
                    }
                }
                Stage::Cols { r, y } => {
                    if y > self.oy + r {
                        self.stage = if r == self.radius {
                            Stage::Done
                        } else {
                            Stage::Rows {
                                r: r + 1,
                                x: self.ox - r,
                            }
                        };
                        continue;
                    }
                    self.stage = Stage::Cols { r, y: y + 1 };
                    self.pending = Some((self.ox + r, y));
                    if let Some(tile) = Self::checked(self.ox - r, y) {
                        return Some(tile);
                    }
                }
                Stage::Done => return None,
            }
        }
    }
}
