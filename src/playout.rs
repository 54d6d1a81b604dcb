//! Random playouts for evaluating positions.
//!
//! A playout plays uniformly random legal moves, clearing completed lines after
//! each one, until a player has no move or the depth cap is reached.

use fastrand::Rng;

use crate::board::Color;
use crate::state::GameState;

/// Result of one playout, seen from the player to move at its start.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Player to move when the playout started.
    pub player: Color,
    /// Whether `player` won. A playout cut off by the depth cap is not a win.
    pub won: bool,
}

/// Play out `state` for at most `max_depth` plies.
///
/// The player who has no legal move on their turn loses.
pub fn mcplayout(state: &GameState, max_depth: usize, rng: &mut Rng) -> Outcome {
    let mut sim = *state;
    let player = sim.current_player;

    for _ in 0..max_depth {
        let moves = sim.legal_moves(sim.current_player);
        if moves.is_empty() {
            let winner = sim.current_player.opponent();
            return Outcome {
                player,
                won: winner == player,
            };
        }

        let mv = moves[rng.usize(..moves.len())];
        sim.apply(&mv.placement());
    }

    Outcome { player, won: false }
}
