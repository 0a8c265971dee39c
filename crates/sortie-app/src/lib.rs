//! Host process for the sortie simulation.
//!
//! Reads `InputCommand`s as JSON lines on stdin, runs the engine at a fixed
//! frame rate and writes host events (or full frames) as JSON lines on
//! stdout. Decision requests go to an HTTP service when one is configured.

pub mod config;
pub mod decision_client;
pub mod game_loop;
pub mod input;
pub mod narrator;
pub mod state;
pub mod telemetry;

pub use sortie_core as core;

use tokio::io::BufReader;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::state::GameLoopCommand;

pub const COMMAND_CHANNEL_CAPACITY: usize = 1024;

/// Wire stdin, Ctrl-C and stdout to the game loop and run it to completion.
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    let (tx, rx) = mpsc::channel::<GameLoopCommand>(COMMAND_CHANNEL_CAPACITY);

    tokio::spawn(input::forward_commands(
        BufReader::new(tokio::io::stdin()),
        tx.clone(),
    ));

    let interrupt = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted");
            let _ = interrupt.send(GameLoopCommand::Shutdown).await;
        }
    });

    game_loop::run_game_loop(
        &config,
        tx,
        rx,
        state::latest_snapshot(),
        tokio::io::stdout(),
    )
    .await
}
