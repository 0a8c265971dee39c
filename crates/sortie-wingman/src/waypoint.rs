//! Move-command smoothing.
//!
//! Accepted commands are rate-limited, clamped to the viewport, limited to
//! a maximum jump from the wingman's position and blended 50/50 with any
//! waypoint still pending.

use glam::DVec2;
use sortie_core::constants::*;
use sortie_core::types::Viewport;

#[derive(Debug, Clone, Default)]
pub struct WaypointPolicy {
    pending: Option<DVec2>,
    last_accepted_ms: Option<f64>,
}

impl WaypointPolicy {
    pub fn pending(&self) -> Option<DVec2> {
        self.pending
    }

    /// Offer a move command. Returns whether it was accepted.
    pub fn propose(&mut self, requested: DVec2, from: DVec2, viewport: &Viewport, now_ms: f64) -> bool {
        if let Some(last) = self.last_accepted_ms {
            if now_ms - last < WAYPOINT_MIN_INTERVAL_MS {
                return false;
            }
        }

        let clamped = viewport.clamp_point(requested);
        let jump = clamped - from;
        let len = jump.length();
        let limited = if len > WAYPOINT_MAX_JUMP {
            from + jump * (WAYPOINT_MAX_JUMP / len)
        } else {
            clamped
        };
        let next = match self.pending {
            Some(prev) => prev.lerp(limited, 0.5),
            None => limited,
        };

        self.pending = Some(viewport.clamp_point(next));
        self.last_accepted_ms = Some(now_ms);
        true
    }

    /// Drop the waypoint once `pos` is within reach. Returns whether it was cleared.
    pub fn clear_if_reached(&mut self, pos: DVec2) -> bool {
        match self.pending {
            Some(wp) if wp.distance(pos) < WAYPOINT_REACHED => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.pending = None;
        self.last_accepted_ms = None;
    }
}
