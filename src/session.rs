//! Game sessions between a remote player and the agent.
//!
//! A [`Session`] validates the remote player's placements, drives the agent and
//! tracks the winner. The remote player is RED and moves first; the agent is
//! BLUE. [`SessionRegistry`] keeps many sessions apart, each behind its own
//! lock, so calls for one session are serialized while different sessions
//! proceed independently.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::agent::{Agent, SearchConfig};
use crate::board::{Board, Color, Coord};
use crate::constants::{N, PIECE_CELLS};
use crate::error::{MoveError, SessionError};
use crate::shapes::Placement;
use crate::state::GameState;

/// Colour of the player submitting moves from outside.
pub const REMOTE: Color = Color::Red;

/// Colour the agent plays.
pub const AGENT: Color = Color::Blue;

/// Display grid: one optional colour per cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardSnapshot(pub [[Option<Color>; N]; N]);

impl From<&Board> for BoardSnapshot {
    fn from(board: &Board) -> Self {
        let mut grid = [[None; N]; N];
        for (coord, color) in board.occupied() {
            grid[coord.row()][coord.col()] = Some(color);
        }
        BoardSnapshot(grid)
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.0 {
            let line: Vec<String> = row
                .iter()
                .map(|cell| cell.map_or('.', Color::marker).to_string())
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// Board after a move, plus the winner if the move ended the game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveReport {
    pub placement: Placement,
    pub board: BoardSnapshot,
    pub winner: Option<Color>,
}

/// One game between the remote player and the agent.
pub struct Session {
    agent: Agent,
    winner: Option<Color>,
}

impl Session {
    /// Start a game with `iterations` search iterations per agent move.
    pub fn start(iterations: usize) -> (Self, BoardSnapshot) {
        Self::with_config(SearchConfig::with_iterations(iterations))
    }

    pub fn with_config(config: SearchConfig) -> (Self, BoardSnapshot) {
        let session = Self {
            agent: Agent::new(AGENT, config),
            winner: None,
        };
        let board = session.board();
        (session, board)
    }

    pub fn board(&self) -> BoardSnapshot {
        BoardSnapshot::from(self.agent.board())
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Check and play a placement for the remote player.
    ///
    /// `cells` are `(row, column)` pairs. On any error the board is unchanged.
    pub fn submit_opponent_move(
        &mut self,
        cells: &[(usize, usize)],
    ) -> Result<MoveReport, SessionError> {
        self.ensure_running()?;
        let placement = validate(self.agent.board(), REMOTE, cells).inspect_err(|err| {
            warn!(%err, "rejected move");
        })?;
        self.commit(REMOTE, placement)
    }

    /// Let the agent choose and play its move.
    pub fn request_agent_move(&mut self) -> Result<MoveReport, SessionError> {
        self.ensure_running()?;
        let placement = self.agent.action()?;
        self.commit(AGENT, placement)
    }

    fn ensure_running(&self) -> Result<(), SessionError> {
        match self.winner {
            Some(winner) => Err(SessionError::GameOver(winner)),
            None => Ok(()),
        }
    }

    fn commit(&mut self, color: Color, placement: Placement) -> Result<MoveReport, SessionError> {
        self.agent.update(color, &placement)?;
        info!(%color, %placement, turn = self.agent.turn_count(), "move played");

        let state = GameState::new(
            *self.agent.board(),
            color.opponent(),
            self.agent.turn_count(),
        );
        if state.has_won(color) {
            info!(winner = %color, "game over");
            self.winner = Some(color);
        }

        Ok(MoveReport {
            placement,
            board: self.board(),
            winner: self.winner,
        })
    }
}

/// Check a raw placement for `color` against `board`.
///
/// Malformed input (count, range, duplicates) is rejected before occupancy and
/// adjacency are looked at. Adjacency is only required once `color` owns a cell.
pub fn validate(
    board: &Board,
    color: Color,
    cells: &[(usize, usize)],
) -> Result<Placement, MoveError> {
    if cells.len() != PIECE_CELLS {
        return Err(MoveError::WrongCount(cells.len()));
    }

    let mut coords = [Coord::new(0, 0); PIECE_CELLS];
    for (slot, &(r, c)) in coords.iter_mut().zip(cells) {
        *slot = Coord::checked(r, c).ok_or(MoveError::OutOfRange(r, c))?;
    }
    let placement = Placement::new(coords)?;

    if let Some(&taken) = coords.iter().find(|&&c| board.is_occupied(c)) {
        return Err(MoveError::Occupied(taken));
    }

    if board.has_color(color) {
        let touches = coords
            .iter()
            .any(|c| c.neighbors().iter().any(|&n| board.get(n) == Some(color)));
        if !touches {
            return Err(MoveError::NotAdjacent(color));
        }
    }

    Ok(placement)
}

/// Opaque handle for a session in a [`SessionRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sessions keyed by id, each guarded by its own mutex.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>,
    next_id: Mutex<u64>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_session(&self, config: SearchConfig) -> (SessionId, BoardSnapshot) {
        let (session, board) = Session::with_config(config);
        let id = {
            let mut next = self.next_id.lock();
            *next += 1;
            SessionId(*next)
        };
        self.sessions.write().insert(id, Arc::new(Mutex::new(session)));
        info!(session = %id, "session started");
        (id, board)
    }

    fn get(&self, id: SessionId) -> Result<Arc<Mutex<Session>>, SessionError> {
        self.sessions
            .read()
            .get(&id)
            .cloned()
            .ok_or(SessionError::UnknownSession(id.0))
    }

    pub fn submit_opponent_move(
        &self,
        id: SessionId,
        cells: &[(usize, usize)],
    ) -> Result<MoveReport, SessionError> {
        self.get(id)?.lock().submit_opponent_move(cells)
    }

    pub fn request_agent_move(&self, id: SessionId) -> Result<MoveReport, SessionError> {
        self.get(id)?.lock().request_agent_move()
    }

    pub fn board(&self, id: SessionId) -> Result<BoardSnapshot, SessionError> {
        Ok(self.get(id)?.lock().board())
    }

    /// Drop a session. Returns whether it existed.
    pub fn end(&self, id: SessionId) -> bool {
        self.sessions.write().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Shape, ShapeKind};

    fn cells(coords: [(usize, usize); PIECE_CELLS]) -> Placement {
        Placement::new(coords.map(|(r, c)| Coord::new(r, c))).unwrap()
    }

    fn quick_session() -> Session {
        let config = SearchConfig {
            iterations: 5,
            playout_depth: 2,
            seed: Some(9),
            ..SearchConfig::default()
        };
        Session::with_config(config).0
    }

    #[test]
    fn test_validate_order_of_checks() {
        let board = Board::new();
        assert_eq!(
            validate(&board, REMOTE, &[(0, 0), (0, 1)]),
            Err(MoveError::WrongCount(2))
        );
        assert_eq!(
            validate(&board, REMOTE, &[(0, 0), (0, 1), (0, 2), (11, 3)]),
            Err(MoveError::OutOfRange(11, 3))
        );
        assert_eq!(
            validate(&board, REMOTE, &[(0, 0), (0, 1), (0, 0), (0, 3)]),
            Err(MoveError::DuplicateCoord(Coord::new(0, 0)))
        );
    }

    #[test]
    fn test_validate_occupied_and_adjacency() {
        let mut board = Board::new();
        board.set(Coord::new(5, 5), Color::Red);
        board.set(Coord::new(0, 0), Color::Blue);

        assert_eq!(
            validate(&board, REMOTE, &[(0, 0), (0, 1), (0, 2), (0, 3)]),
            Err(MoveError::Occupied(Coord::new(0, 0)))
        );
        assert_eq!(
            validate(&board, REMOTE, &[(8, 0), (8, 1), (8, 2), (8, 3)]),
            Err(MoveError::NotAdjacent(Color::Red))
        );
        assert!(validate(&board, REMOTE, &[(5, 6), (5, 7), (5, 8), (5, 9)]).is_ok());
    }

    #[test]
    fn test_adjacency_wraps_around() {
        let mut board = Board::new();
        board.set(Coord::new(0, 0), Color::Red);
        assert!(validate(&board, REMOTE, &[(10, 0), (9, 0), (8, 0), (7, 0)]).is_ok());
    }

    #[test]
    fn test_rejected_move_leaves_board() {
        let (mut session, _) = Session::start(1);
        let err = session.submit_opponent_move(&[(1, 1)]).unwrap_err();
        assert_eq!(err, SessionError::Move(MoveError::WrongCount(1)));
        assert!(session.agent().board().is_empty());
    }

    #[test]
    fn test_snapshot_projection() {
        let mut board = Board::new();
        board.set(Coord::new(3, 4), Color::Blue);
        let snap = BoardSnapshot::from(&board);
        assert_eq!(snap.0[3][4], Some(Color::Blue));
        assert_eq!(snap.0.iter().flatten().filter(|c| c.is_some()).count(), 1);
        assert!(snap.to_string().lines().nth(3).unwrap().starts_with(". . . . B"));
    }

    #[test]
    fn test_remote_move_that_walls_in_agent_wins() {
        let mut session = quick_session();
        let blue = Shape::new(ShapeKind::O, 0, Coord::new(0, 0)).placement();
        session.agent.update(AGENT, &blue).unwrap();
        let red = cells([(10, 0), (10, 1), (0, 10), (2, 0)]);
        session.agent.update(REMOTE, &red).unwrap();

        let report = session
            .submit_opponent_move(&[(1, 10), (2, 1), (1, 2), (0, 2)])
            .unwrap();
        assert_eq!(report.winner, Some(REMOTE));
        assert_eq!(session.winner(), Some(REMOTE));

        assert_eq!(
            session.request_agent_move(),
            Err(SessionError::GameOver(REMOTE))
        );
        assert_eq!(
            session.submit_opponent_move(&[(5, 5), (5, 6), (5, 7), (5, 8)]),
            Err(SessionError::GameOver(REMOTE))
        );
    }

    #[test]
    fn test_agent_move_reports_agent_win() {
        let mut session = quick_session();
        let red = Shape::new(ShapeKind::O, 0, Coord::new(5, 5)).placement();
        session.agent.update(REMOTE, &red).unwrap();
        // Every neighbour of the red square is blue, so red has no move left
        let walls = [
            cells([(4, 5), (4, 6), (5, 4), (6, 4)]),
            cells([(7, 5), (7, 6), (5, 7), (6, 7)]),
        ];
        for wall in &walls {
            session.agent.update(AGENT, wall).unwrap();
        }
        assert_eq!(session.winner(), None);

        let report = session.request_agent_move().unwrap();
        assert_eq!(report.winner, Some(AGENT));
        assert_eq!(
            session.submit_opponent_move(&[(0, 0), (0, 1), (0, 2), (0, 3)]),
            Err(SessionError::GameOver(AGENT))
        );
    }
}
