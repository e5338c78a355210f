//! In-memory model of the zone engine the planner runs against.
//!
//! The engine owns ground truth: terrain, finished structures, active build
//! sites, resource deposits, and each zone's tier. The planner only reads
//! tile contents and asks for projects to be opened; it never mutates zone
//! state directly. Keeping this surface narrow is what lets the planner be
//! tested against a fully synthetic colony.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use bevy::prelude::*;

use crate::config::{GLOBAL_SITE_LIMIT, ZONE_SIZE};
use crate::facility::FacilityKind;
use crate::tile::{Tile, ZoneId};

const ZONE_AREA: usize = ZONE_SIZE as usize * ZONE_SIZE as usize;

// ---------------------------------------------------------------------------
// Terrain and tile contents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Terrain {
    #[default]
    Plain,
    Swamp,
    Wall,
}

impl Terrain {
    pub fn is_wall(self) -> bool {
        matches!(self, Self::Wall)
    }
}

/// One observable thing on a tile. `look_at` streams these in a stable
/// order: terrain, structures, pending site, deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileItem {
    Terrain(Terrain),
    Structure(FacilityKind),
    PendingSite(FacilityKind),
    Deposit,
}

/// Snapshot of everything sitting on a single tile.
#[derive(Debug, Clone, Default)]
pub struct TileContents {
    pub structures: Vec<FacilityKind>,
    pub pending: Option<FacilityKind>,
    pub deposit: bool,
}

impl TileContents {
    /// Whether a path structure or path site already covers the tile.
    pub fn has_path(&self) -> bool {
        self.structures.iter().any(|s| s.is_path()) || self.pending.is_some_and(|p| p.is_path())
    }

    /// Whether anything here blocks a new build site: a non-path structure,
    /// any existing site, or a deposit.
    pub fn blocks_site(&self) -> bool {
        self.structures.iter().any(|s| !s.is_path()) || self.pending.is_some() || self.deposit
    }
}

// ---------------------------------------------------------------------------
// Project creation errors
// ---------------------------------------------------------------------------

/// Why the engine refused to open a build site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateProjectError {
    /// The colony-wide active site ceiling has been hit.
    CapacityExhausted,
    /// The zone's tier does not allow another facility of this kind yet.
    TierTooLow,
    /// The tile cannot host a site (wall, occupied, deposit, or out of the
    /// valid band).
    Blocked,
    /// The zone is not known to the engine.
    UnknownZone,
}

impl CreateProjectError {
    /// Retryable errors resolve on their own as sites finish or the zone
    /// tiers up; the order should be kept and tried again later.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::CapacityExhausted | Self::TierTooLow)
    }
}

impl fmt::Display for CreateProjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExhausted => write!(f, "global build site capacity exhausted"),
            Self::TierTooLow => write!(f, "zone tier too low for another facility of this kind"),
            Self::Blocked => write!(f, "tile is blocked"),
            Self::UnknownZone => write!(f, "unknown zone"),
        }
    }
}

impl std::error::Error for CreateProjectError {}

// ---------------------------------------------------------------------------
// Zone state
// ---------------------------------------------------------------------------

/// Ground truth for one zone.
#[derive(Debug, Clone)]
pub struct ZoneState {
    terrain: Vec<Terrain>,
    structures: BTreeMap<Tile, Vec<FacilityKind>>,
    pending: BTreeMap<Tile, FacilityKind>,
    deposits: BTreeSet<Tile>,
    tier: u8,
}

impl ZoneState {
    fn new(tier: u8) -> Self {
        Self {
            terrain: vec![Terrain::Plain; ZONE_AREA],
            structures: BTreeMap::new(),
            pending: BTreeMap::new(),
            deposits: BTreeSet::new(),
            tier,
        }
    }

    fn idx(tile: Tile) -> usize {
        tile.y as usize * ZONE_SIZE as usize + tile.x as usize
    }

    pub fn terrain_at(&self, tile: Tile) -> Terrain {
        if !tile.in_bounds() {
            return Terrain::Wall;
        }
        self.terrain[Self::idx(tile)]
    }

    pub fn contents_at(&self, tile: Tile) -> TileContents {
        TileContents {
            structures: self.structures.get(&tile).cloned().unwrap_or_default(),
            pending: self.pending.get(&tile).copied(),
            deposit: self.deposits.contains(&tile),
        }
    }

    pub fn tier(&self) -> u8 {
        self.tier
    }

    pub fn site_count(&self) -> usize {
        self.pending.len()
    }

    pub fn deposits(&self) -> impl Iterator<Item = Tile> + '_ {
        self.deposits.iter().copied()
    }

    fn count_structures(&self, kind: FacilityKind) -> usize {
        self.structures
            .values()
            .flat_map(|v| v.iter())
            .filter(|&&s| s == kind)
            .count()
    }

    fn count_pending(&self, kind: FacilityKind) -> usize {
        self.pending.values().filter(|&&p| p == kind).count()
    }
}

// ---------------------------------------------------------------------------
// ZoneEngine resource
// ---------------------------------------------------------------------------

/// The whole colony as the engine sees it.
#[derive(Resource, Debug, Clone, Default)]
pub struct ZoneEngine {
    zones: BTreeMap<ZoneId, ZoneState>,
}

impl ZoneEngine {
    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn zone(&self, id: &ZoneId) -> Option<&ZoneState> {
        self.zones.get(id)
    }

    pub fn zone_ids(&self) -> impl Iterator<Item = &ZoneId> {
        self.zones.keys()
    }

    /// Terrain query; unknown zones and out-of-bounds tiles read as wall so
    /// callers can treat them as impassable without special cases.
    pub fn terrain_at(&self, zone: &ZoneId, tile: Tile) -> Terrain {
        self.zones
            .get(zone)
            .map(|z| z.terrain_at(tile))
            .unwrap_or(Terrain::Wall)
    }

    pub fn contents_at(&self, zone: &ZoneId, tile: Tile) -> TileContents {
        self.zones
            .get(zone)
            .map(|z| z.contents_at(tile))
            .unwrap_or_default()
    }

    /// Everything on a tile as an item stream, terrain first. This is the
    /// form the occupancy fold and avoidance matchers consume.
    pub fn look_at(&self, zone: &ZoneId, tile: Tile) -> Vec<TileItem> {
        let mut items = vec![TileItem::Terrain(self.terrain_at(zone, tile))];
        let contents = self.contents_at(zone, tile);
        items.extend(contents.structures.iter().map(|&s| TileItem::Structure(s)));
        if let Some(p) = contents.pending {
            items.push(TileItem::PendingSite(p));
        }
        if contents.deposit {
            items.push(TileItem::Deposit);
        }
        items
    }

    /// Active build sites across every zone.
    pub fn site_count(&self) -> usize {
        self.zones.values().map(|z| z.site_count()).sum()
    }

    pub fn zone_site_count(&self, zone: &ZoneId) -> usize {
        self.zones.get(zone).map(|z| z.site_count()).unwrap_or(0)
    }

    pub fn zone_tier(&self, zone: &ZoneId) -> u8 {
        self.zones.get(zone).map(|z| z.tier()).unwrap_or(0)
    }

    pub fn deposits(&self, zone: &ZoneId) -> Vec<Tile> {
        self.zones
            .get(zone)
            .map(|z| z.deposits().collect())
            .unwrap_or_default()
    }

    pub fn structure_count(&self, zone: &ZoneId, kind: FacilityKind) -> usize {
        self.zones
            .get(zone)
            .map(|z| z.count_structures(kind))
            .unwrap_or(0)
    }

    pub fn pending_count(&self, zone: &ZoneId, kind: FacilityKind) -> usize {
        self.zones
            .get(zone)
            .map(|z| z.count_pending(kind))
            .unwrap_or(0)
    }

    /// How many facilities of `kind` a zone at `tier` may have in total,
    /// finished and in progress combined. This table belongs to the engine;
    /// the planner treats it as opaque.
    pub fn desired_count(tier: u8, kind: FacilityKind) -> u16 {
        let t = tier.min(8) as usize;
        let table: [u16; 9] = match kind {
            FacilityKind::Base => [0, 1, 1, 1, 1, 1, 1, 2, 3],
            FacilityKind::Storage => [0, 0, 0, 0, 1, 1, 1, 1, 1],
            FacilityKind::Tower => [0, 0, 0, 1, 1, 2, 2, 3, 6],
            FacilityKind::Extension => [0, 0, 5, 10, 20, 30, 40, 50, 60],
            FacilityKind::Container => [5, 5, 5, 5, 5, 5, 5, 5, 5],
            FacilityKind::Link => [0, 0, 0, 0, 0, 2, 3, 4, 6],
            FacilityKind::Wall => [0, 0, 2500, 2500, 2500, 2500, 2500, 2500, 2500],
            FacilityKind::Extractor => [0, 0, 0, 0, 0, 0, 1, 1, 1],
            FacilityKind::Terminal => [0, 0, 0, 0, 0, 0, 1, 1, 1],
            FacilityKind::Lab => [0, 0, 0, 0, 0, 0, 3, 6, 10],
            FacilityKind::Rampart => [0, 0, 2500, 2500, 2500, 2500, 2500, 2500, 2500],
            FacilityKind::Observer => [0, 0, 0, 0, 0, 0, 0, 0, 1],
            FacilityKind::Nuker => [0, 0, 0, 0, 0, 0, 0, 0, 1],
            FacilityKind::PowerPlant => [0, 0, 0, 0, 0, 0, 0, 0, 1],
            FacilityKind::Path => [2500; 9],
        };
        table[t]
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Open a build site. Enforces the hard global ceiling, the per-kind
    /// tier allowance, and tile legality.
    pub fn create_project(
        &mut self,
        zone: &ZoneId,
        tile: Tile,
        kind: FacilityKind,
    ) -> Result<(), CreateProjectError> {
        if self.site_count() >= GLOBAL_SITE_LIMIT {
            return Err(CreateProjectError::CapacityExhausted);
        }
        let state = self
            .zones
            .get_mut(zone)
            .ok_or(CreateProjectError::UnknownZone)?;

        if !tile.is_valid() || state.terrain_at(tile).is_wall() {
            return Err(CreateProjectError::Blocked);
        }
        if state.contents_at(tile).blocks_site() {
            return Err(CreateProjectError::Blocked);
        }

        let allowed = Self::desired_count(state.tier, kind) as usize;
        if state.count_structures(kind) + state.count_pending(kind) >= allowed {
            return Err(CreateProjectError::TierTooLow);
        }

        state.pending.insert(tile, kind);
        Ok(())
    }

    /// Remove a finished structure of the given kind from a tile.
    pub fn remove_structure(&mut self, zone: &ZoneId, tile: Tile, kind: FacilityKind) -> bool {
        let Some(state) = self.zones.get_mut(zone) else {
            return false;
        };
        let Some(list) = state.structures.get_mut(&tile) else {
            return false;
        };
        let Some(pos) = list.iter().position(|&s| s == kind) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            state.structures.remove(&tile);
        }
        true
    }

    // -----------------------------------------------------------------------
    // World setup (fixtures, harness, and site completion)
    // -----------------------------------------------------------------------

    pub fn add_zone(&mut self, id: ZoneId, tier: u8) {
        self.zones.insert(id, ZoneState::new(tier));
    }

    pub fn set_tier(&mut self, zone: &ZoneId, tier: u8) {
        if let Some(state) = self.zones.get_mut(zone) {
            state.tier = tier;
        }
    }

    pub fn set_terrain(&mut self, zone: &ZoneId, tile: Tile, terrain: Terrain) {
        if let Some(state) = self.zones.get_mut(zone) {
            if tile.in_bounds() {
                let idx = ZoneState::idx(tile);
                state.terrain[idx] = terrain;
            }
        }
    }

    pub fn add_structure(&mut self, zone: &ZoneId, tile: Tile, kind: FacilityKind) {
        if let Some(state) = self.zones.get_mut(zone) {
            state.structures.entry(tile).or_default().push(kind);
        }
    }

    pub fn add_deposit(&mut self, zone: &ZoneId, tile: Tile) {
        if let Some(state) = self.zones.get_mut(zone) {
            state.deposits.insert(tile);
        }
    }

    /// Finish an active site, turning it into a real structure.
    pub fn complete_project(&mut self, zone: &ZoneId, tile: Tile) -> bool {
        let Some(state) = self.zones.get_mut(zone) else {
            return false;
        };
        let Some(kind) = state.pending.remove(&tile) else {
            return false;
        };
        state.structures.entry(tile).or_default().push(kind);
        true
    }
}
