//! Sliding window over player shots.

use std::collections::VecDeque;

use sortie_core::constants::{PLAYER_FIRING_RECENT_MS, SHOT_WINDOW_MS};

/// Timestamps of recent player shots.
#[derive(Debug, Clone, Default)]
pub struct ShotWindow {
    shots: VecDeque<f64>,
    last_shot_ms: Option<f64>,
}

impl ShotWindow {
    /// Record a shot at `now_ms` and return the count inside the window.
    pub fn record(&mut self, now_ms: f64) -> usize {
        self.last_shot_ms = Some(now_ms);
        self.shots.push_back(now_ms);
        let cutoff = now_ms - SHOT_WINDOW_MS;
        while self.shots.front().is_some_and(|t| *t < cutoff) {
            self.shots.pop_front();
        }
        self.shots.len()
    }

    /// Time since the last shot; infinite if the player never fired.
    pub fn idle_ms(&self, now_ms: f64) -> f64 {
        self.last_shot_ms.map_or(f64::INFINITY, |t| now_ms - t)
    }

    /// Whether the player fired recently enough to count as firing.
    pub fn firing(&self, now_ms: f64) -> bool {
        self.idle_ms(now_ms) < PLAYER_FIRING_RECENT_MS
    }

    pub fn clear(&mut self) {
        self.shots.clear();
    }
}
