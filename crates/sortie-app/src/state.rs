//! Messages and shared handles between the host tasks and the game loop.

use std::sync::{Arc, Mutex};

use sortie_core::commands::InputCommand;
use sortie_core::state::FrameSnapshot;

/// Commands sent to the game loop task.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// Forwarded to the simulation engine at the next frame boundary.
    Input(InputCommand),
    /// Stop the loop after cancelling outstanding work.
    Shutdown,
}

/// Latest frame, readable from outside the loop.
pub type LatestSnapshot = Arc<Mutex<Option<FrameSnapshot>>>;

pub fn latest_snapshot() -> LatestSnapshot {
    Arc::new(Mutex::new(None))
}
