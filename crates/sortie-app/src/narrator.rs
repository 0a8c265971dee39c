//! Narration sink for `speak` events.
//!
//! There is no audio device here: a line is logged and the speech engine is
//! reported busy for the estimated speaking time, which holds the wingman's
//! voice queue just as a real synthesizer would.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use sortie_core::commands::InputCommand;
use sortie_core::events::SimEvent;
use sortie_wingman::speech::estimate_speech_ms;

use crate::state::GameLoopCommand;

pub struct Narrator {
    commands: mpsc::Sender<GameLoopCommand>,
    speaking: Option<JoinHandle<()>>,
}

impl Narrator {
    pub fn new(commands: mpsc::Sender<GameLoopCommand>) -> Self {
        Self {
            commands,
            speaking: None,
        }
    }

    pub fn handle_events(&mut self, events: &[SimEvent]) {
        for event in events {
            if let SimEvent::Speak { text } = event {
                self.speak(text);
            }
        }
    }

    /// Start a line, cutting off whatever is still playing.
    pub fn speak(&mut self, text: &str) {
        tracing::info!(text, "wingman");
        self.stop();

        let commands = self.commands.clone();
        let busy_for = Duration::from_millis(estimate_speech_ms(text) as u64);
        self.speaking = Some(tokio::spawn(async move {
            let send = |speaking| GameLoopCommand::Input(InputCommand::SpeechEngine { speaking });
            if commands.send(send(true)).await.is_err() {
                return;
            }
            tokio::time::sleep(busy_for).await;
            let _ = commands.send(send(false)).await;
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.speaking.take() {
            handle.abort();
        }
    }
}

impl Drop for Narrator {
    fn drop(&mut self) {
        self.stop();
    }
}
