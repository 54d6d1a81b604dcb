//! Line-oriented text protocol for playing against the agent.
//!
//! Each line is an optional numeric id, a command and its arguments.
//! Successful responses start with `=`, failures with `?`, and both end with a
//! blank line. The remote player is RED and moves
//! first; the engine plays BLUE.
//!
//! ## Supported Commands
//!
//! - `name` - Return engine name
//! - `version` - Return engine version
//! - `protocol_version` - Return protocol version (1)
//! - `list_commands` - List all supported commands
//! - `known_command <cmd>` - Check if a command is supported
//! - `quit` - Exit the program
//! - `new [iterations]` - Start a fresh game
//! - `play r,c r,c r,c r,c` - Play four cells for RED
//! - `genmove` - Let the engine move for BLUE
//! - `showboard` - Print the board
//!
//! ## Example
//!
//! ```ignore
//! use tetress_mcts::protocol::TextEngine;
//! let mut engine = TextEngine::new();
//! engine.run();
//! ```

use std::io::{self, BufRead, Write};

use crate::agent::SearchConfig;
use crate::session::{MoveReport, Session};

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "genmove",
    "known_command",
    "list_commands",
    "name",
    "new",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// Protocol engine state.
pub struct TextEngine {
    /// Current game
    session: Session,
    /// Settings used when a new game starts
    config: SearchConfig,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEngine {
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default())
    }

    pub fn with_config(config: SearchConfig) -> Self {
        let (session, _) = Session::with_config(config);
        Self { session, config }
    }

    /// Run the command loop, reading from stdin and writing to stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line?;

            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);

            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let args = &parts[1..];

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(stdout, "{prefix}{id_str} {message}\n")?;
            stdout.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());

        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Parse `r,c` cell arguments.
    fn parse_cells(args: &[&str]) -> Result<Vec<(usize, usize)>, String> {
        args.iter()
            .map(|arg| {
                let (r, c) = arg
                    .split_once(',')
                    .ok_or_else(|| format!("expected r,c but got '{arg}'"))?;
                let r = r.trim().parse().map_err(|_| format!("bad row in '{arg}'"))?;
                let c = c.trim().parse().map_err(|_| format!("bad column in '{arg}'"))?;
                Ok((r, c))
            })
            .collect()
    }

    fn report(report: MoveReport) -> String {
        let mut out = format!("{}\n{}", report.placement, report.board);
        if let Some(winner) = report.winner {
            out.push_str(&format!("winner {winner}"));
        }
        out.trim_end().to_string()
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, "tetress-mcts".to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "1".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let known = KNOWN_COMMANDS.contains(&args[0].to_lowercase().as_str());
                (true, if known { "true" } else { "false" }.to_string())
            }

            "quit" => (true, String::new()),

            "new" => {
                let mut config = self.config;
                if let Some(arg) = args.first() {
                    match arg.parse::<usize>() {
                        Ok(iterations) => config.iterations = iterations,
                        Err(_) => return (false, "invalid iteration count".to_string()),
                    }
                }
                let (session, board) = Session::with_config(config);
                self.session = session;
                (true, board.to_string().trim_end().to_string())
            }

            "play" => {
                let cells = match Self::parse_cells(args) {
                    Ok(cells) => cells,
                    Err(msg) => return (false, msg),
                };
                match self.session.submit_opponent_move(&cells) {
                    Ok(report) => (true, Self::report(report)),
                    Err(err) => (false, err.to_string()),
                }
            }

            "genmove" => match self.session.request_agent_move() {
                Ok(report) => (true, Self::report(report)),
                Err(err) => (false, err.to_string()),
            },

            "showboard" => (true, self.session.board().to_string().trim_end().to_string()),

            _ => (false, format!("unknown command: {command}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> TextEngine {
        TextEngine::with_config(SearchConfig {
            iterations: 5,
            playout_depth: 2,
            seed: Some(3),
            ..SearchConfig::default()
        })
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = TextEngine::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = TextEngine::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_cells() {
        let cells = TextEngine::parse_cells(&["1,2", "3, 4"]).unwrap();
        assert_eq!(cells, vec![(1, 2), (3, 4)]);
        assert!(TextEngine::parse_cells(&["12"]).is_err());
        assert!(TextEngine::parse_cells(&["a,1"]).is_err());
    }

    #[test]
    fn test_known_command() {
        let mut engine = engine();

        let (success, response) = engine.execute("known_command", &["genmove"]);
        assert!(success);
        assert_eq!(response, "true");

        let (success, response) = engine.execute("known_command", &["boardsize"]);
        assert!(success);
        assert_eq!(response, "false");
    }

    #[test]
    fn test_play_then_genmove() {
        let mut engine = engine();

        let (success, _) = engine.execute("play", &["5,5", "5,6", "6,5", "6,6"]);
        assert!(success);

        let (success, response) = engine.execute("genmove", &[]);
        assert!(success, "{response}");
        assert_eq!(engine.session.agent().board().len(), 8);
    }

    #[test]
    fn test_illegal_play_rejected() {
        let mut engine = engine();
        engine.execute("play", &["5,5", "5,6", "6,5", "6,6"]);

        let (success, response) = engine.execute("play", &["5,5", "5,6", "6,5", "6,6"]);
        assert!(!success);
        assert!(response.contains("occupied"), "{response}");
    }

    #[test]
    fn test_new_resets_board() {
        let mut engine = engine();
        engine.execute("play", &["0,0", "0,1", "0,2", "0,3"]);

        let (success, _) = engine.execute("new", &["10"]);
        assert!(success);
        assert!(engine.session.agent().board().is_empty());
        assert_eq!(engine.session.agent().config().iterations, 10);
    }
}
