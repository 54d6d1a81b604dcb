//! Error types for move validation, move selection and sessions.

use thiserror::Error;

use crate::board::{Color, Coord};

/// Why a submitted placement was rejected. The board is never touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("exactly 4 coordinates required, got {0}")]
    WrongCount(usize),

    #[error("coordinate ({0}, {1}) is off the board")]
    OutOfRange(usize, usize),

    #[error("coordinate {0} appears more than once")]
    DuplicateCoord(Coord),

    #[error("cell {0} is already occupied")]
    Occupied(Coord),

    #[error("move must be adjacent to an existing {0} piece")]
    NotAdjacent(Color),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// The agent was asked to move in a position where it has no legal move.
    /// Callers must detect game over with `GameState::has_won` first.
    #[error("no legal moves available for {0}")]
    NoLegalMoves(Color),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("illegal move: {0}")]
    Move(#[from] MoveError),

    #[error("internal error: {0}")]
    Agent(#[from] AgentError),

    #[error("game is already over, {0} won")]
    GameOver(Color),

    #[error("unknown session {0}")]
    UnknownSession(u64),
}
