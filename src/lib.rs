//! Tetress-MCTS: a Monte Carlo Tree Search agent for Tetress.
//!
//! Two players take turns placing tetromino pieces on an 11x11 board whose
//! edges wrap around. After its first piece a player must place next to one of
//! their own cells. Filling a whole row or column clears it. A player with no
//! legal placement loses.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions and search parameters
//! - [`board`] - Colours, coordinates and the cell map
//! - [`shapes`] - Tetromino rotation tables and placements
//! - [`state`] - Game rules: move generation, line clears, game over
//! - [`playout`] - Random game simulation for position evaluation
//! - [`mcts`] - Monte Carlo Tree Search with UCB1
//! - [`agent`] - Move selection over the authoritative board
//! - [`session`] - Validated games against a remote player
//! - [`protocol`] - Text protocol front end for a session
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```
//! use tetress_mcts::agent::{Agent, SearchConfig};
//! use tetress_mcts::board::{Color, Coord};
//! use tetress_mcts::shapes::{Shape, ShapeKind};
//!
//! let config = SearchConfig { iterations: 10, seed: Some(1), ..SearchConfig::default() };
//! let mut agent = Agent::new(Color::Blue, config);
//!
//! // The opponent opens with an O piece
//! let opening = Shape::new(ShapeKind::O, 0, Coord::new(5, 5)).placement();
//! agent.update(Color::Red, &opening).unwrap();
//!
//! // Search for a reply and play it
//! let reply = agent.action().unwrap();
//! agent.update(Color::Blue, &reply).unwrap();
//! println!("Agent played {reply}");
//! ```

pub mod agent;
pub mod board;
pub mod constants;
pub mod error;
pub mod mcts;
pub mod playout;
pub mod protocol;
pub mod session;
pub mod shapes;
pub mod state;
