//! Constants for board geometry and search parameters.
//!
//! The board is a fixed 11x11 grid. Adjacency and shape offsets wrap around
//! modulo [`N`] in both directions, so every cell has exactly four neighbours.

use std::time::Duration;

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN).
pub const N: usize = 11;

/// Number of cells on the board.
pub const CELLS: usize = N * N;

/// Number of cells in one placed piece.
pub const PIECE_CELLS: usize = 4;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// UCB1 exploration constant (approximately sqrt(2)).
pub const EXPLORATION: f64 = 1.41;

/// Maximum number of plies in a random playout before it is scored as a non-win.
pub const MAX_PLAYOUT_DEPTH: usize = 10;

/// Wall-clock budget for one decision, kept below the external hard limit.
pub const TIME_BUDGET: Duration = Duration::from_secs(170);

/// Default number of search iterations per move.
pub const DEFAULT_ITERATIONS: usize = 200;
