//! Command-line interface for strictly_baduk.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Baduk - Go sessions with enforced rules
#[derive(Parser, Debug)]
#[command(name = "strictly_baduk")]
#[command(about = "Go rules engine and session state machine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a move script through a local session and print its events
    Replay {
        /// Whitespace-separated moves, e.g. "D4 Q16 pass pass"
        #[arg(short, long)]
        moves: String,

        /// Path to a server config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Board size override (9, 13 or 19)
        #[arg(long)]
        size: Option<u8>,
    },

    /// Print the effective default ruleset as TOML
    Rules {
        /// Path to a server config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

impl Command {
    /// Config file named on the command line, if any.
    pub fn config_path(&self) -> Option<&PathBuf> {
        match self {
            Command::Replay { config, .. } | Command::Rules { config } => config.as_ref(),
        }
    }
}
