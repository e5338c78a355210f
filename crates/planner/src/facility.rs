//! Facility kinds and their build priority.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Everything the planner knows how to place. Declaration order IS the build
/// priority order: the scheduler drains lower `priority()` values first, so
/// a base outranks storage, storage outranks towers, and paths always come
/// last.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub enum FacilityKind {
    Base,
    Storage,
    Tower,
    Extension,
    Container,
    Link,
    Wall,
    Extractor,
    Terminal,
    Lab,
    Rampart,
    Observer,
    Nuker,
    PowerPlant,
    Path,
}

impl FacilityKind {
    pub const ALL: [FacilityKind; 15] = [
        Self::Base,
        Self::Storage,
        Self::Tower,
        Self::Extension,
        Self::Container,
        Self::Link,
        Self::Wall,
        Self::Extractor,
        Self::Terminal,
        Self::Lab,
        Self::Rampart,
        Self::Observer,
        Self::Nuker,
        Self::PowerPlant,
        Self::Path,
    ];

    /// Default scheduling priority. Lower is drained first.
    pub fn priority(self) -> u8 {
        match self {
            Self::Base => 0,
            Self::Storage => 1,
            Self::Tower => 2,
            Self::Extension => 3,
            Self::Container => 4,
            Self::Link => 5,
            Self::Wall => 6,
            Self::Extractor => 7,
            Self::Terminal => 8,
            Self::Lab => 9,
            Self::Rampart => 10,
            Self::Observer => 11,
            Self::Nuker => 12,
            Self::PowerPlant => 13,
            Self::Path => 14,
        }
    }

    /// Facilities agents can walk through. Routing treats tiles holding only
    /// permeable facilities as open ground.
    pub fn is_permeable(self) -> bool {
        matches!(self, Self::Container | Self::Rampart)
    }

    /// Paths never block placement or routing and are cheap to traverse.
    pub fn is_path(self) -> bool {
        matches!(self, Self::Path)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Storage => "storage",
            Self::Tower => "tower",
            Self::Extension => "extension",
            Self::Container => "container",
            Self::Link => "link",
            Self::Wall => "wall",
            Self::Extractor => "extractor",
            Self::Terminal => "terminal",
            Self::Lab => "lab",
            Self::Rampart => "rampart",
            Self::Observer => "observer",
            Self::Nuker => "nuker",
            Self::PowerPlant => "power plant",
            Self::Path => "path",
        }
    }
}
