//! PLN-043: building plans.
//!
//! A plan bundles everything the placement search and the orchestrator need
//! to know about one facility kind: spacing, breathing room, avoidance
//! rules, which existing structures already satisfy it, and how far from a
//! point of interest the search may roam at each zone tier.

use crate::engine::ZoneEngine;
use crate::facility::FacilityKind;
use crate::placement::{default_avoidance, AvoidanceRule};
use crate::tile::ZoneId;

/// Which finished structures count toward a plan's desired total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureFilter {
    /// Only the plan's own facility kind.
    SameKind,
    /// Any of the listed kinds. A storage next to a deposit serves the same
    /// purpose as a container, so the container plan accepts either.
    AnyOf(Vec<FacilityKind>),
}

impl StructureFilter {
    pub fn matches(&self, plan_kind: FacilityKind, kind: FacilityKind) -> bool {
        match self {
            Self::SameKind => kind == plan_kind,
            Self::AnyOf(kinds) => kinds.contains(&kind),
        }
    }

    /// Finished structures in the zone that satisfy the filter.
    pub fn count_existing(
        &self,
        engine: &ZoneEngine,
        zone: &ZoneId,
        plan_kind: FacilityKind,
    ) -> usize {
        FacilityKind::ALL
            .iter()
            .filter(|&&kind| self.matches(plan_kind, kind))
            .map(|&kind| engine.structure_count(zone, kind))
            .sum()
    }
}

/// Placement recipe for one facility kind.
#[derive(Debug, Clone)]
pub struct BuildingPlan {
    pub kind: FacilityKind,
    /// Free neighbors a candidate needs to stay qualified.
    pub min_free_adjacent: usize,
    /// Spacing reserved around each accepted candidate.
    pub min_spacing: u8,
    /// Checkered spacing leaves parity-matching diagonals open.
    pub checkered: bool,
    pub avoid: Vec<AvoidanceRule>,
    pub structure_filter: StructureFilter,
    /// Cap on placements accepted per point of interest in one planning
    /// pass, `None` for no cap.
    pub poi_limit: Option<usize>,
}

impl BuildingPlan {
    pub fn new(kind: FacilityKind) -> Self {
        Self {
            kind,
            min_free_adjacent: 3,
            min_spacing: 3,
            checkered: false,
            avoid: default_avoidance(),
            structure_filter: StructureFilter::SameKind,
            poi_limit: None,
        }
    }

    pub fn with_min_free_adjacent(mut self, count: usize) -> Self {
        self.min_free_adjacent = count;
        self
    }

    pub fn with_min_spacing(mut self, spacing: u8) -> Self {
        self.min_spacing = spacing;
        self
    }

    pub fn with_checkered(mut self) -> Self {
        self.checkered = true;
        self
    }

    pub fn with_avoid(mut self, rules: Vec<AvoidanceRule>) -> Self {
        self.avoid = rules;
        self
    }

    pub fn with_structure_filter(mut self, filter: StructureFilter) -> Self {
        self.structure_filter = filter;
        self
    }

    pub fn with_poi_limit(mut self, limit: usize) -> Self {
        self.poi_limit = Some(limit);
        self
    }
}

/// One container per deposit, close in, with room for a single hauler.
/// Storage counts as a container for accounting so mature zones do not get a
/// redundant container next to their storage.
pub fn container_plan() -> BuildingPlan {
    BuildingPlan::new(FacilityKind::Container)
        .with_min_free_adjacent(1)
        .with_min_spacing(7)
        .with_avoid(vec![AvoidanceRule::facility(FacilityKind::Container, 7)])
        .with_structure_filter(StructureFilter::AnyOf(vec![
            FacilityKind::Container,
            FacilityKind::Storage,
        ]))
        .with_poi_limit(1)
}

/// Extensions pack tight on a checkered lattice so haulers can thread
/// between them.
pub fn extension_plan() -> BuildingPlan {
    BuildingPlan::new(FacilityKind::Extension)
        .with_min_spacing(1)
        .with_checkered()
}

pub fn tower_plan() -> BuildingPlan {
    BuildingPlan::new(FacilityKind::Tower)
}

pub fn storage_plan() -> BuildingPlan {
    BuildingPlan::new(FacilityKind::Storage)
}

/// How far from a point of interest the placement search roams for `kind`
/// at a given zone tier. `None` means the kind is not planned at that tier.
///
/// Containers always hug their deposit. Extensions fan out as the zone
/// grows. Towers jump to long range at the top tier, when the zone can
/// afford to anchor its perimeter.
pub fn search_radius(tier: u8, kind: FacilityKind) -> Option<u8> {
    match kind {
        FacilityKind::Container => Some(1),
        FacilityKind::Extension => match tier {
            0..=1 => None,
            2..=3 => Some(5),
            4..=5 => Some(8),
            _ => Some(11),
        },
        FacilityKind::Tower => match tier {
            0..=2 => None,
            3..=7 => Some(5),
            _ => Some(15),
        },
        FacilityKind::Storage => (tier >= 4).then_some(5),
        FacilityKind::Base => (tier >= 7).then_some(13),
        _ => None,
    }
}
