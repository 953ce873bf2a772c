//! Strictly Baduk - CLI
//!
//! Replays move scripts through a session registry and prints the events.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use strictly_baduk::{BoardSize, Ruleset};
use strictly_server::{
    BroadcastSink, Cli, Command, EventSink, ServerConfig, SessionEvent, SessionRegistry,
    SessionSnapshot, TracingSink, play_script,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = match cli.command.config_path() {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    match cli.command {
        Command::Replay { moves, size, .. } => run_replay(config, moves, size).await,
        Command::Rules { .. } => print_rules(&config),
    }
}

/// Plays the script and prints each event as a JSON line.
#[instrument(skip(config, moves))]
async fn run_replay(config: ServerConfig, moves: String, size: Option<u8>) -> Result<()> {
    let mut ruleset: Ruleset = *config.default_ruleset();
    if let Some(size) = size {
        ruleset.board_size = BoardSize::try_from(size)?;
    }

    let broadcast = BroadcastSink::new(*config.event_capacity());
    let mut events = broadcast.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!(error = %e, "Event not serializable"),
                },
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Printer lagged behind"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let sink = move |event: SessionEvent| {
        TracingSink.emit(event.clone());
        broadcast.emit(event);
    };
    let registry = SessionRegistry::with_config(&config, Arc::new(sink));
    let outcome = play_script(&registry, ruleset, &moves);
    // Dropping the last sender closes the channel and ends the printer.
    drop(registry);
    printer.await.context("Event printer failed")?;

    let snapshot = outcome?;
    print_summary(&snapshot);
    info!(session_id = %snapshot.id(), "Replay finished");
    Ok(())
}

fn print_summary(snapshot: &SessionSnapshot) {
    println!("{}", snapshot.board_text());
    match snapshot.result() {
        Some(result) => println!("{} ({})", result, snapshot.phase()),
        None => println!("phase: {}", snapshot.phase()),
    }
}

fn print_rules(config: &ServerConfig) -> Result<()> {
    let text = toml::to_string_pretty(config.default_ruleset())
        .context("Failed to render ruleset")?;
    print!("{text}");
    Ok(())
}
