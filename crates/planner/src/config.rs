/// Side length of a zone grid. Tiles are addressed 0..ZONE_SIZE on both axes.
pub const ZONE_SIZE: u8 = 50;

/// Lowest coordinate a planned facility may occupy. Tiles 0 and 1 border the
/// zone seam and are reserved for transit.
pub const VALID_MIN: u8 = 2;
/// Highest coordinate a planned facility may occupy.
pub const VALID_MAX: u8 = 47;

/// Tiles closer to the zone edge than this never qualify for placement, even
/// when structurally free. Matches the reserved transit band plus one tile.
pub const EDGE_MARGIN: u8 = 3;

/// Hard ceiling on concurrently active build sites across all zones.
pub const GLOBAL_SITE_LIMIT: usize = 100;
/// Soft threshold: once the global site count reaches this, the scheduler
/// stops opening new sites until some complete.
pub const GLOBAL_SITE_SOFT_LIMIT: usize = 95;
/// Per-zone ceiling on concurrently active build sites.
pub const ZONE_SITE_LIMIT: usize = 4;

/// Number of live votes a pavement ballot needs before a path order is cut.
pub const PAVE_VOTE_THRESHOLD: usize = 5;
/// A vote cast at tick `t` stays live while `t + PAVE_VOTE_EXPIRATION > now`.
pub const PAVE_VOTE_EXPIRATION: u64 = 100;
/// How often (in ticks) fully-expired ballots are swept from memory.
pub const BALLOT_SWEEP_INTERVAL: u64 = 1000;

/// Zones below this tier never pave: early zones have too little traffic to
/// justify spending build capacity on paths.
pub const MIN_PAVING_TIER: u8 = 2;
