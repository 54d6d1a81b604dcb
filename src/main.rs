//! Tetress-MCTS: a Monte Carlo Tree Search agent for Tetress.
//!
//! ## Usage
//!
//! - `tetress-mcts` - Show a demo
//! - `tetress-mcts play` - Play against the agent over stdin/stdout
//! - `tetress-mcts demo` - Watch two agents play each other
//!
//! Log output goes to stderr and is controlled by `RUST_LOG`.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tetress_mcts::agent::{Agent, SearchConfig};
use tetress_mcts::board::Color;
use tetress_mcts::constants::{DEFAULT_ITERATIONS, TIME_BUDGET};
use tetress_mcts::protocol::TextEngine;

/// Tetress-MCTS: a Monte Carlo Tree Search agent for Tetress
#[derive(Parser)]
#[command(name = "tetress-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    search: SearchArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct SearchArgs {
    /// MCTS iterations per move
    #[arg(long, global = true, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,

    /// Time budget per move, in seconds
    #[arg(long, global = true, default_value_t = TIME_BUDGET.as_secs_f64())]
    time_budget: f64,

    /// Seed for reproducible searches
    #[arg(long, global = true)]
    seed: Option<u64>,
}

impl SearchArgs {
    fn config(&self) -> Result<SearchConfig> {
        let time_budget = Duration::try_from_secs_f64(self.time_budget)
            .with_context(|| format!("invalid time budget {}", self.time_budget))?;
        Ok(SearchConfig {
            iterations: self.iterations,
            time_budget,
            seed: self.seed,
            ..SearchConfig::default()
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the agent using the text protocol on stdin/stdout
    Play,
    /// Let two agents play a game against each other
    Demo {
        /// Stop after this many moves
        #[arg(long, default_value_t = 40)]
        max_moves: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tetress_mcts=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.search.config()?;

    match cli.command {
        Some(Commands::Play) => {
            let mut engine = TextEngine::with_config(config);
            engine.run().context("protocol loop failed")?;
        }
        Some(Commands::Demo { max_moves }) => run_demo(config, max_moves)?,
        None => run_demo(config, 40)?,
    }
    Ok(())
}

fn run_demo(config: SearchConfig, max_moves: usize) -> Result<()> {
    println!("Tetress-MCTS: Monte Carlo Tree Search self-play\n");

    // Each agent keeps its own copy of the board; both see every move.
    let red_config = config;
    let blue_config = SearchConfig {
        seed: config.seed.map(|s| s.wrapping_add(1)),
        ..config
    };
    let mut red = Agent::new(Color::Red, red_config);
    let mut blue = Agent::new(Color::Blue, blue_config);

    let mut to_move = Color::Red;
    for turn in 1..=max_moves {
        let (mover, other) = match to_move {
            Color::Red => (&mut red, &mut blue),
            Color::Blue => (&mut blue, &mut red),
        };

        if mover.game_state().has_won(to_move.opponent()) {
            println!("{to_move} has no legal move. {} wins.", to_move.opponent());
            return Ok(());
        }

        let placement = mover
            .action()
            .with_context(|| format!("{to_move} failed to choose a move"))?;
        let cleared = mover.update(to_move, &placement)?;
        other.update(to_move, &placement)?;

        println!("Turn {turn}: {to_move} plays {placement}");
        if !cleared.is_empty() {
            println!("  cleared rows {:?} cols {:?}", cleared.rows, cleared.cols);
        }
        println!("{}", mover.board());

        to_move = to_move.opponent();
    }

    info!(max_moves, "demo stopped at move limit");
    println!("Stopped after {max_moves} moves.");
    Ok(())
}
