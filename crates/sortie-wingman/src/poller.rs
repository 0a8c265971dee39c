//! Decision poll scheduling.
//!
//! At most one request is in flight. Starting a new one supersedes the
//! previous request, which the host must abort.

use sortie_core::constants::*;

#[derive(Debug, Clone)]
pub struct DecisionPoller {
    next_request_id: u64,
    in_flight: Option<u64>,
    next_poll_ms: Option<f64>,
}

impl Default for DecisionPoller {
    fn default() -> Self {
        Self {
            next_request_id: 1,
            in_flight: None,
            next_poll_ms: None,
        }
    }
}

/// Poll interval for a given player idle time; doubles once the player
/// has stopped firing.
pub fn poll_interval_ms(player_idle_ms: f64) -> f64 {
    if player_idle_ms > DECISION_IDLE_AFTER_MS {
        DECISION_POLL_BASE_MS * DECISION_POLL_IDLE_FACTOR
    } else {
        DECISION_POLL_BASE_MS
    }
}

impl DecisionPoller {
    pub fn due(&self, now_ms: f64) -> bool {
        self.next_poll_ms.map_or(true, |t| now_ms >= t)
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// Start a request. Returns its id and the superseded request, if any.
    pub fn begin(&mut self, now_ms: f64, interval_ms: f64) -> (u64, Option<u64>) {
        let superseded = self.in_flight.take();
        let id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight = Some(id);
        self.next_poll_ms = Some(now_ms + interval_ms);
        (id, superseded)
    }

    /// Settle a response. Returns false for ids that are not in flight.
    pub fn settle(&mut self, request_id: u64) -> bool {
        if self.in_flight == Some(request_id) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Abandon the in-flight request and poll immediately next time.
    pub fn cancel(&mut self) -> Option<u64> {
        self.next_poll_ms = None;
        self.in_flight.take()
    }
}
