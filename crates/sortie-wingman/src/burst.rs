//! Autonomous fire bursts.

use rand::Rng;
use sortie_core::constants::*;
use sortie_core::decision::BurstOrder;

/// An accepted burst with clamped parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    pub cadence_ms: f64,
    pub ends_at_ms: f64,
    /// Half-width of the per-shot angular jitter (radians).
    pub spread: f64,
    last_shot_ms: Option<f64>,
}

impl Burst {
    /// Clamp an order into safe bounds. Missing or zero values take defaults.
    pub fn from_order(order: &BurstOrder, now_ms: f64) -> Self {
        let cadence = order
            .cadence_ms
            .filter(|c| *c != 0.0)
            .unwrap_or(BURST_CADENCE_DEFAULT_MS)
            .clamp(BURST_CADENCE_RANGE_MS.0, BURST_CADENCE_RANGE_MS.1);
        let duration = order
            .duration_ms
            .filter(|d| *d != 0.0)
            .unwrap_or(BURST_DURATION_DEFAULT_MS)
            .clamp(BURST_DURATION_RANGE_MS.0, BURST_DURATION_RANGE_MS.1);
        let spread = order
            .spread
            .unwrap_or(BURST_SPREAD_DEFAULT)
            .clamp(0.0, BURST_SPREAD_MAX);
        Self {
            cadence_ms: cadence,
            ends_at_ms: now_ms + duration,
            spread,
            last_shot_ms: None,
        }
    }

    pub fn is_over(&self, now_ms: f64) -> bool {
        now_ms >= self.ends_at_ms
    }

    /// Whether a shot is due at `now_ms`; records it if so.
    pub fn take_shot(&mut self, now_ms: f64) -> bool {
        if self.is_over(now_ms) {
            return false;
        }
        let due = self
            .last_shot_ms
            .map_or(true, |last| now_ms - last >= self.cadence_ms);
        if due {
            self.last_shot_ms = Some(now_ms);
        }
        due
    }

    /// Jitter a firing direction (radians) within the spread.
    pub fn jitter<R: Rng + ?Sized>(&self, dir_rad: f64, rng: &mut R) -> f64 {
        dir_rad + (rng.gen::<f64>() - 0.5) * self.spread * 2.0
    }
}
