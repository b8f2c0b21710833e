// Piece tables are indexed by Role, pawn first, king last.

// --- Evaluation weights ---
pub const DEFAULT_MATERIAL_VALUES: [i32; 6] = [30, 90, 90, 150, 270, 0];
pub const DEFAULT_CONTROL_VALUES: [i32; 6] = [10, 30, 30, 50, 90, 0];

// Central files and ranks outweigh the edges, symmetrically.
pub const DEFAULT_CENTER_FILE_WEIGHTS: [i32; 8] = [1, 2, 3, 4, 4, 3, 2, 1];
pub const DEFAULT_CENTER_RANK_WEIGHTS: [i32; 8] = [1, 2, 3, 4, 4, 3, 2, 1];

pub const DEFAULT_PAWN_RANK_MOD: i32 = 2;
pub const DEFAULT_KING_RING_CONTROL_WEIGHT: i32 = 0;

// --- Search ---
pub const MATE_SCORE: i32 = 1_000_000;

/// Assigned to non-queen promotions so they rank below every real line but
/// above the no-move sentinel.
pub const DISQUALIFIED_PROMOTION_SCORE: i32 = 2 * MATE_SCORE;

pub const DEFAULT_TURNS_AHEAD: u32 = 3;
pub const DEFAULT_DEPTH_PLY_DIVISOR: u32 = 30;
pub const DEFAULT_SEARCH_WIDTH: usize = 3;
pub const DEFAULT_WIDTH_MATERIAL_DIVISOR: i32 = 250;

// --- Clock management ---
pub const DEFAULT_TIME_FRACTION: u32 = 50;
pub const DEFAULT_LOW_CLOCK_MS: u64 = 2000;

// --- Score cache ---
pub const DEFAULT_SCORE_CACHE_CAPACITY: usize = 262_144;
