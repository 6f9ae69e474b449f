//! Puzzle simulation server (default binary).
//!
//! Loads a puzzle configuration, validates it, and serves remote agents
//! over TCP. Configuration defects are fatal here, before the listener
//! binds; a session never starts on a half-valid scene.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use puzzle_sim::adapter::runtime::{run_simulation, SimRequest};
use puzzle_sim::adapter::server::{run_server, ServerConfig};
use puzzle_sim::capture::BoardRenderer;
use puzzle_sim::core::turn::TurnEngine;
use puzzle_sim::PuzzleConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PUZZLE_CONFIG").ok())
        .context("usage: puzzle-sim <config.json> (or set PUZZLE_CONFIG)")?;

    let text = std::fs::read_to_string(&config_path)
        .with_context(|| format!("could not read {config_path}"))?;
    let config = PuzzleConfig::from_json(&text)
        .with_context(|| format!("invalid puzzle configuration in {config_path}"))?;
    println!(
        "[Main] loaded experiment '{}' on a {}x{} board with {} objects",
        config.experiment_id,
        config.grid_size,
        config.grid_size,
        config.board_data.len()
    );

    let server_config = ServerConfig::from_env();
    let capture_timeout = Duration::from_millis(server_config.capture_timeout_ms);

    let engine = TurnEngine::new(config)?;
    let (sim_tx, sim_rx) = mpsc::channel::<SimRequest>(1);
    tokio::spawn(run_simulation(
        engine,
        Arc::new(BoardRenderer),
        sim_rx,
        capture_timeout,
    ));

    run_server(server_config, sim_tx, None).await
}
