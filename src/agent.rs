//! The playing agent: owns the real board across turns and picks moves by MCTS.

use std::time::Duration;

use fastrand::Rng;
use tracing::{debug, warn};

use crate::board::{Board, Color};
use crate::constants::{DEFAULT_ITERATIONS, EXPLORATION, MAX_PLAYOUT_DEPTH, TIME_BUDGET};
use crate::error::{AgentError, MoveError};
use crate::mcts::{tree_search, SearchLimits};
use crate::shapes::Placement;
use crate::state::{FullLines, GameState};

/// Search settings for an [`Agent`].
#[derive(Clone, Copy, Debug)]
pub struct SearchConfig {
    /// Maximum MCTS iterations per decision
    pub iterations: usize,
    /// Wall-clock limit per decision
    pub time_budget: Duration,
    /// UCB1 exploration constant
    pub exploration: f64,
    /// Plies per random playout
    pub playout_depth: usize,
    /// Seed for all search randomness; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            time_budget: TIME_BUDGET,
            exploration: EXPLORATION,
            playout_depth: MAX_PLAYOUT_DEPTH,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn with_iterations(iterations: usize) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }

    fn limits(&self) -> SearchLimits {
        SearchLimits {
            iterations: self.iterations,
            time_budget: self.time_budget,
            exploration: self.exploration,
            playout_depth: self.playout_depth,
        }
    }
}

pub struct Agent {
    color: Color,
    board: Board,
    turn_count: usize,
    config: SearchConfig,
    rng: Rng,
}

impl Agent {
    pub fn new(color: Color, config: SearchConfig) -> Self {
        let rng = config.seed.map_or_else(Rng::new, Rng::with_seed);
        debug!(%color, iterations = config.iterations, "agent created");
        Self {
            color,
            board: Board::new(),
            turn_count: 0,
            config,
            rng,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// The authoritative board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn_count(&self) -> usize {
        self.turn_count
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Snapshot of the real game with this agent to move.
    pub fn game_state(&self) -> GameState {
        GameState::new(self.board, self.color, self.turn_count)
    }

    /// Choose a placement for this agent's colour.
    ///
    /// Returns the most-visited root child after the search budget is spent.
    /// The board is not modified; feed the result back through [`Agent::update`].
    ///
    /// # Errors
    /// [`AgentError::NoLegalMoves`] if the agent has no move at all. Callers
    /// are expected to have checked for game over first.
    pub fn action(&mut self) -> Result<Placement, AgentError> {
        let state = self.game_state();
        let tree = tree_search(state, &self.config.limits(), &mut self.rng);

        if let Some(best) = tree.best_child() {
            let node = tree.get(best);
            if let Some(placement) = node.action {
                debug!(
                    %placement,
                    visits = node.visits,
                    winrate = node.winrate().unwrap_or_default(),
                    root_visits = tree.root().visits,
                    children = tree.root().children.len(),
                    "agent move chosen"
                );
                return Ok(placement);
            }
        }

        warn!(color = %self.color, "search produced no children, picking a random move");
        let moves = state.legal_moves(self.color);
        if moves.is_empty() {
            return Err(AgentError::NoLegalMoves(self.color));
        }
        Ok(moves[self.rng.usize(..moves.len())].placement())
    }

    /// Record `placement` for `color` on the authoritative board and clear any
    /// lines it completes.
    ///
    /// Only occupancy is checked here; adjacency is the caller's concern.
    ///
    /// # Errors
    /// [`MoveError::Occupied`] if any cell is already taken. The board is left
    /// unchanged.
    pub fn update(&mut self, color: Color, placement: &Placement) -> Result<FullLines, MoveError> {
        if let Some(&taken) = placement
            .coords()
            .iter()
            .find(|&&c| self.board.is_occupied(c))
        {
            return Err(MoveError::Occupied(taken));
        }
        let mut state = GameState::new(self.board, color, self.turn_count);
        let full = state.commit(placement, color);
        self.board = state.board;
        self.turn_count += 1;
        if !full.is_empty() {
            debug!(rows = ?full.rows, cols = ?full.cols, "lines cleared");
        }
        Ok(full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Coord;
    use crate::shapes::{Shape, ShapeKind};

    fn seeded(iterations: usize) -> SearchConfig {
        SearchConfig {
            iterations,
            playout_depth: 2,
            seed: Some(42),
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_update_writes_and_counts_turns() {
        let mut agent = Agent::new(Color::Blue, seeded(1));
        let placement = Shape::new(ShapeKind::O, 0, Coord::new(5, 5)).placement();
        agent.update(Color::Red, &placement).unwrap();
        assert_eq!(agent.board().len(), 4);
        assert_eq!(agent.board().get(Coord::new(6, 6)), Some(Color::Red));
        assert_eq!(agent.turn_count(), 1);
    }

    #[test]
    fn test_action_is_legal_and_adjacent() {
        let mut agent = Agent::new(Color::Blue, seeded(20));
        let red = Shape::new(ShapeKind::I, 0, Coord::new(0, 0)).placement();
        let blue = Shape::new(ShapeKind::O, 0, Coord::new(5, 5)).placement();
        agent.update(Color::Red, &red).unwrap();
        agent.update(Color::Blue, &blue).unwrap();

        let placement = agent.action().unwrap();
        let board = agent.board();
        assert!(placement.coords().iter().all(|&c| !board.is_occupied(c)));
        assert!(placement.coords().iter().any(|c| {
            c.neighbors()
                .iter()
                .any(|&n| board.get(n) == Some(Color::Blue))
        }));
    }

    #[test]
    fn test_zero_iterations_falls_back_to_random_move() {
        let mut agent = Agent::new(Color::Red, seeded(0));
        let placement = agent.action().unwrap();
        assert!(Placement::new(*placement.coords()).is_ok());
    }

    #[test]
    fn test_overlapping_update_is_rejected() {
        let mut agent = Agent::new(Color::Blue, seeded(1));
        let red = Shape::new(ShapeKind::O, 0, Coord::new(5, 5)).placement();
        agent.update(Color::Red, &red).unwrap();

        let blue = Shape::new(ShapeKind::I, 0, Coord::new(6, 3)).placement();
        let err = agent.update(Color::Blue, &blue).unwrap_err();
        assert_eq!(err, MoveError::Occupied(Coord::new(6, 5)));
        assert_eq!(agent.board().len(), 4);
        assert_eq!(agent.board().get(Coord::new(6, 5)), Some(Color::Red));
        assert_eq!(agent.turn_count(), 1);
    }

    #[test]
    fn test_exhausted_time_budget_falls_back_to_random_move() {
        let config = SearchConfig {
            time_budget: Duration::ZERO,
            ..seeded(10_000)
        };
        let mut agent = Agent::new(Color::Blue, config);
        let red = Shape::new(ShapeKind::I, 0, Coord::new(0, 0)).placement();
        let blue = Shape::new(ShapeKind::O, 0, Coord::new(5, 5)).placement();
        agent.update(Color::Red, &red).unwrap();
        agent.update(Color::Blue, &blue).unwrap();

        let placement = agent.action().unwrap();
        let legal: Vec<Placement> = agent
            .game_state()
            .legal_moves(Color::Blue)
            .iter()
            .map(|mv| mv.placement())
            .collect();
        assert!(legal.contains(&placement));
    }

    #[test]
    fn test_no_moves_is_an_error() {
        let mut agent = Agent::new(Color::Red, seeded(5));
        agent.board.set(Coord::new(5, 5), Color::Red);
        agent.board.place(&Coord::new(5, 5).neighbors(), Color::Blue);
        assert_eq!(agent.action(), Err(AgentError::NoLegalMoves(Color::Red)));
    }
}
