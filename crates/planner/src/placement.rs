//! PLN-041: ring placement search.
//!
//! Finds tiles near an anchor (usually a resource deposit) where a facility
//! can go. The search classifies a window of tiles around the anchor, spreads
//! exclusion areas, then yields surviving tiles closest-first. Yielding is
//! pull-based: consumers stop as soon as they have scheduled enough, and
//! every yield immediately reserves spacing around itself so later yields
//! keep their distance.

use bevy::prelude::*;

use crate::engine::{TileItem, ZoneEngine};
use crate::facility::FacilityKind;
use crate::occupancy::{Classification, OccupancyCell, OccupancyGrid};
use crate::plans::BuildingPlan;
use crate::rings::RingCoords;
use crate::routing::{self, CostProfile};
use crate::tile::{Tile, ZoneId};

// ---------------------------------------------------------------------------
// Avoidance rules
// ---------------------------------------------------------------------------

/// What a rule reacts to on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(unpredictable_function_pointer_comparisons)]
pub enum AvoidMatcher {
    /// A finished structure or pending site of this kind.
    Facility(FacilityKind),
    /// A resource deposit.
    Deposit,
    /// An arbitrary predicate over tile items, for one-off plan rules that
    /// have no dedicated matcher. Function pointers keep the matcher `Copy`
    /// and comparable.
    Custom(fn(TileItem) -> bool),
}

/// Declares an exclusion area around matching tile contents.
///
/// Precedence between rules (and against plain occupancy) is by radius
/// alone: a rule takes a tile only when its radius is strictly greater than
/// whatever radius the tile already carries. Occupied verdicts carry radius
/// 0, so a wide rule overwrites them, and a radius-0 rule can never fire.
#[derive(Debug, Clone, Copy)]
pub struct AvoidanceRule {
    pub matcher: AvoidMatcher,
    pub radius: u8,
    pub resolve_to: Classification,
    pub checkered: bool,
}

impl AvoidanceRule {
    pub fn facility(kind: FacilityKind, radius: u8) -> Self {
        Self {
            matcher: AvoidMatcher::Facility(kind),
            radius,
            resolve_to: Classification::AvoidZone,
            checkered: false,
        }
    }

    pub fn deposit(radius: u8) -> Self {
        Self {
            matcher: AvoidMatcher::Deposit,
            radius,
            resolve_to: Classification::AvoidZone,
            checkered: false,
        }
    }

    pub fn custom(predicate: fn(TileItem) -> bool, radius: u8) -> Self {
        Self {
            matcher: AvoidMatcher::Custom(predicate),
            radius,
            resolve_to: Classification::AvoidZone,
            checkered: false,
        }
    }

    pub fn checkered(mut self) -> Self {
        self.checkered = true;
        self
    }

    pub fn resolving_to(mut self, class: Classification) -> Self {
        self.resolve_to = class;
        self
    }

    pub fn matches(&self, item: TileItem) -> bool {
        match (self.matcher, item) {
            (AvoidMatcher::Facility(kind), TileItem::Structure(s)) => s == kind,
            (AvoidMatcher::Facility(kind), TileItem::PendingSite(s)) => s == kind,
            (AvoidMatcher::Deposit, TileItem::Deposit) => true,
            (AvoidMatcher::Custom(predicate), item) => predicate(item),
            _ => false,
        }
    }
}

/// Colony-wide default exclusion areas. Plans start from these and override
/// per facility kind.
pub fn default_avoidance() -> Vec<AvoidanceRule> {
    vec![
        AvoidanceRule::facility(FacilityKind::Path, 0)
            .resolving_to(Classification::DisqualifiedFree),
        AvoidanceRule::facility(FacilityKind::Base, 1),
        AvoidanceRule::facility(FacilityKind::Extension, 1).checkered(),
        AvoidanceRule::facility(FacilityKind::Container, 2),
        AvoidanceRule::facility(FacilityKind::Storage, 2),
        AvoidanceRule::facility(FacilityKind::Tower, 7),
        AvoidanceRule::deposit(2),
    ]
}

// ---------------------------------------------------------------------------
// Window classification
// ---------------------------------------------------------------------------

/// Whether an item physically takes the tile. Paths never do; they are
/// paved over when something better wants the spot.
fn occupies(item: TileItem) -> bool {
    match item {
        TileItem::Terrain(t) => t.is_wall(),
        TileItem::Structure(kind) => !kind.is_path(),
        TileItem::PendingSite(kind) => !kind.is_path(),
        TileItem::Deposit => true,
    }
}

/// The window edge: the context ring one step beyond the search radius.
/// Seeded as DisqualifiedFree so it is never yielded but still counts as
/// breathing room for candidates on the rim.
fn on_window_edge(tile: Tile, anchor: Tile, bordered: u8) -> bool {
    let dx = (tile.x as i32 - anchor.x as i32).unsigned_abs();
    let dy = (tile.y as i32 - anchor.y as i32).unsigned_abs();
    dx == bordered as u32 || dy == bordered as u32
}

/// Classify every tile the bordered window visits.
///
/// Seeds Free (or DisqualifiedFree on the window edge and near the zone
/// edge), folds tile contents through the avoidance rules, then runs the
/// spread pass over the inner radius: AvoidZone tiles push Free tiles within
/// their radius out, and Free tiles with too few qualifying neighbors are
/// dropped as tight spaces. The fold and the spread both run in ring order.
pub fn classify_window(
    engine: &ZoneEngine,
    zone: &ZoneId,
    anchor: Tile,
    radius: u8,
    min_free_adjacent: usize,
    rules: &[AvoidanceRule],
) -> OccupancyGrid {
    let mut grid = OccupancyGrid::new();
    let bordered = radius + 1;

    for tile in RingCoords::new(anchor, bordered) {
        let seed = if on_window_edge(tile, anchor, bordered) || tile.is_near_edge() {
            OccupancyCell::DISQUALIFIED
        } else {
            OccupancyCell::FREE
        };
        let mut cell = seed;
        for item in engine.look_at(zone, tile) {
            if cell.class != Classification::AvoidZone && occupies(item) {
                cell = OccupancyCell::OCCUPIED;
            }
            for rule in rules {
                // Radius precedence: of two matching rules the wider wins,
                // and a wide rule overrides even an Occupied verdict.
                if rule.matches(item) && rule.radius > cell.radius {
                    cell = OccupancyCell {
                        class: rule.resolve_to,
                        radius: rule.radius,
                        checkered: rule.checkered,
                    };
                }
            }
        }
        grid.set(tile, cell);
    }

    trace!("occupancy for {zone} around {anchor} after contents fold:\n{grid}");

    for tile in RingCoords::new(anchor, radius) {
        let Some(cell) = grid.get(tile) else { continue };
        match cell.class {
            Classification::AvoidZone => {
                grid.mark_nearby(tile, cell.radius, cell.checkered);
            }
            Classification::Free => {
                let free = grid.count_qualifying_neighbors(tile, 1, min_free_adjacent);
                if free < min_free_adjacent {
                    grid.set(tile, OccupancyCell::DISQUALIFIED);
                }
            }
            _ => {}
        }
    }

    trace!("occupancy for {zone} around {anchor} after spread pass:\n{grid}");

    grid
}

// ---------------------------------------------------------------------------
// Placement search iterator
// ---------------------------------------------------------------------------

/// Pull-based placement search. The occupancy snapshot is taken once at
/// construction; a consumed search cannot be restarted.
pub struct PlacementSearch<'a> {
    engine: &'a ZoneEngine,
    zone: &'a ZoneId,
    anchor: Tile,
    radius: u8,
    min_spacing: u8,
    checkered: bool,
    grid: OccupancyGrid,
    scan: RingCoords,
}

impl<'a> PlacementSearch<'a> {
    pub fn new(
        engine: &'a ZoneEngine,
        zone: &'a ZoneId,
        anchor: Tile,
        radius: u8,
        plan: &BuildingPlan,
    ) -> Self {
        let grid = classify_window(
            engine,
            zone,
            anchor,
            radius,
            plan.min_free_adjacent,
            &plan.avoid,
        );
        Self {
            engine,
            zone,
            anchor,
            radius,
            min_spacing: plan.min_spacing,
            checkered: plan.checkered,
            grid,
            scan: RingCoords::new(anchor, radius),
        }
    }

    /// The classified window, for callers that want to inspect or dump it.
    pub fn occupancy(&self) -> &OccupancyGrid {
        &self.grid
    }
}

impl Iterator for PlacementSearch<'_> {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        for tile in self.scan.by_ref() {
            if self.grid.get(tile) != Some(OccupancyCell::FREE) {
                continue;
            }

            // A candidate must actually reach the anchor's side within the
            // search radius. A longer walk means a wall is forcing a detour;
            // no walk at all means the candidate is sealed off.
            let steps = routing::step_count(
                self.engine,
                self.zone,
                tile,
                self.anchor,
                1,
                &CostProfile::terrain_only(),
            );
            match steps {
                Some(steps) if steps <= self.radius as usize => {}
                _ => continue,
            }

            self.grid.mark_nearby(tile, self.min_spacing, self.checkered);
            return Some(tile);
        }
        None
    }
}
