//! HTTP client for the wingman decision service.
//!
//! The engine announces requests with `decision_issued` and withdraws them
//! with `decision_cancelled`. [`DecisionDispatcher`] runs one task per
//! request and aborts it on cancellation; outcomes come back to the game
//! loop as `decision_resolved` / `decision_failed` commands.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use sortie_core::commands::InputCommand;
use sortie_core::decision::{DecisionRequest, DecisionResponse};
use sortie_core::events::SimEvent;

use crate::state::GameLoopCommand;

#[derive(Debug)]
pub enum DecisionError {
    /// No service configured.
    Disabled,
    Transport(reqwest::Error),
    Status(StatusCode),
    Decode(reqwest::Error),
}

impl fmt::Display for DecisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionError::Disabled => write!(f, "decision service not configured"),
            DecisionError::Transport(e) => write!(f, "decision request failed: {e}"),
            DecisionError::Status(status) => write!(f, "decision service returned {status}"),
            DecisionError::Decode(e) => write!(f, "malformed decision response: {e}"),
        }
    }
}

impl std::error::Error for DecisionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecisionError::Transport(e) | DecisionError::Decode(e) => Some(e),
            DecisionError::Disabled | DecisionError::Status(_) => None,
        }
    }
}

// Thin reqwest client: one POST per decision.
#[derive(Clone)]
pub struct DecisionClient {
    http: reqwest::Client,
    url: Option<String>,
}

impl DecisionClient {
    pub fn new(url: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url })
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    pub async fn decide(&self, request: &DecisionRequest) -> Result<Vec<Value>, DecisionError> {
        let url = self.url.as_deref().ok_or(DecisionError::Disabled)?;
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(DecisionError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DecisionError::Status(status));
        }

        let body = response
            .json::<DecisionResponse>()
            .await
            .map_err(DecisionError::Decode)?;
        Ok(body.actions)
    }
}

/// Tracks in-flight decision tasks by request id.
pub struct DecisionDispatcher {
    client: Arc<DecisionClient>,
    results: mpsc::Sender<GameLoopCommand>,
    in_flight: HashMap<u64, JoinHandle<()>>,
}

impl DecisionDispatcher {
    pub fn new(client: DecisionClient, results: mpsc::Sender<GameLoopCommand>) -> Self {
        Self {
            client: Arc::new(client),
            results,
            in_flight: HashMap::new(),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// React to the decision events of one frame.
    pub fn handle_events(&mut self, events: &[SimEvent]) {
        self.reap();
        for event in events {
            match event {
                SimEvent::DecisionIssued {
                    request_id,
                    request,
                } => self.issue(*request_id, request.clone()),
                SimEvent::DecisionCancelled { request_id } => self.cancel(*request_id),
                _ => {}
            }
        }
    }

    pub fn issue(&mut self, request_id: u64, request: DecisionRequest) {
        let client = Arc::clone(&self.client);
        let results = self.results.clone();
        let handle = tokio::spawn(async move {
            let command = match client.decide(&request).await {
                Ok(actions) => {
                    tracing::debug!(request_id, actions = actions.len(), "decision received");
                    InputCommand::DecisionResolved {
                        request_id,
                        actions,
                    }
                }
                Err(DecisionError::Disabled) => InputCommand::DecisionFailed { request_id },
                Err(e) => {
                    tracing::warn!(request_id, error = %e, "decision request failed");
                    InputCommand::DecisionFailed { request_id }
                }
            };
            let _ = results.send(GameLoopCommand::Input(command)).await;
        });
        if let Some(old) = self.in_flight.insert(request_id, handle) {
            old.abort();
        }
    }

    pub fn cancel(&mut self, request_id: u64) {
        if let Some(handle) = self.in_flight.remove(&request_id) {
            handle.abort();
            tracing::debug!(request_id, "decision request aborted");
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
    }

    fn reap(&mut self) {
        self.in_flight.retain(|_, handle| !handle.is_finished());
    }
}

impl Drop for DecisionDispatcher {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
