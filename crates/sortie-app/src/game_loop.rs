//! Game loop task: ticks the engine at the configured frame rate and writes
//! the frame stream as JSON lines.
//!
//! Commands arrive on an `mpsc` channel and are queued into the engine
//! between frames. Each frame's host events go to the decision dispatcher
//! and the narrator, then out to the writer.

use std::time::Instant;

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use sortie_core::commands::InputCommand;
use sortie_core::events::SimEvent;
use sortie_core::state::FrameSnapshot;
use sortie_sim::SimulationEngine;

use crate::config::AppConfig;
use crate::decision_client::{DecisionClient, DecisionDispatcher};
use crate::narrator::Narrator;
use crate::state::{GameLoopCommand, LatestSnapshot};

/// One line of output.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum OutputLine<'a> {
    Event { event: &'a SimEvent },
    Frame { snapshot: &'a FrameSnapshot },
}

/// Serialize a frame: the full snapshot when `emit_snapshots` is set,
/// otherwise one line per host event.
pub fn frame_lines(
    snapshot: &FrameSnapshot,
    emit_snapshots: bool,
) -> serde_json::Result<Vec<String>> {
    if emit_snapshots {
        return Ok(vec![serde_json::to_string(&OutputLine::Frame { snapshot })?]);
    }
    snapshot
        .events
        .iter()
        .map(|event| serde_json::to_string(&OutputLine::Event { event }))
        .collect()
}

fn event_lines(events: &[SimEvent]) -> serde_json::Result<Vec<String>> {
    events
        .iter()
        .map(|event| serde_json::to_string(&OutputLine::Event { event }))
        .collect()
}

async fn write_lines<W>(out: &mut W, lines: &[String]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    for line in lines {
        out.write_all(line.as_bytes()).await?;
        out.write_all(b"\n").await?;
    }
    out.flush().await
}

/// Run until `Shutdown` or until every command sender is gone.
///
/// `tx` must feed the same channel as `rx`: decision outcomes and speech
/// engine notifications come back through it.
pub async fn run_game_loop<W>(
    config: &AppConfig,
    tx: mpsc::Sender<GameLoopCommand>,
    mut rx: mpsc::Receiver<GameLoopCommand>,
    latest: LatestSnapshot,
    mut out: W,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let client = DecisionClient::new(config.decision_url.clone(), config.decision_timeout())
        .map_err(std::io::Error::other)?;
    if !client.is_enabled() {
        tracing::info!("no decision service configured, wingman uses local steering");
    }
    let mut decisions = DecisionDispatcher::new(client, tx.clone());
    let mut narrator = Narrator::new(tx.clone());
    drop(tx);

    let mut engine = SimulationEngine::new(config.sim_config());
    if let Some(prompt) = &config.wingman_prompt {
        engine.queue_command(InputCommand::SetWingmanPrompt {
            prompt: prompt.clone(),
        });
    }

    let mut ticker = tokio::time::interval(config.frame_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_frame = Instant::now();

    tracing::info!(
        frame_rate = config.frame_rate,
        seed = config.seed,
        "game loop started"
    );

    loop {
        tokio::select! {
            biased;

            cmd = rx.recv() => match cmd {
                Some(GameLoopCommand::Input(command)) => engine.queue_command(command),
                Some(GameLoopCommand::Shutdown) | None => break,
            },

            _ = ticker.tick() => {
                let now = Instant::now();
                let dt = now.duration_since(last_frame).as_secs_f64();
                last_frame = now;

                let snapshot = engine.tick(dt);
                decisions.handle_events(&snapshot.events);
                narrator.handle_events(&snapshot.events);

                let lines = frame_lines(&snapshot, config.emit_snapshots)
                    .map_err(std::io::Error::other)?;
                write_lines(&mut out, &lines).await?;

                if let Ok(mut lock) = latest.lock() {
                    *lock = Some(snapshot);
                }
            }
        }
    }

    let events = engine.shutdown();
    decisions.handle_events(&events);
    decisions.cancel_all();
    narrator.stop();
    let lines = event_lines(&events).map_err(std::io::Error::other)?;
    write_lines(&mut out, &lines).await?;
    tracing::info!(tick = engine.time().tick, "game loop stopped");
    Ok(())
}
