//! Escort point: a heading-rotated offset from the player, low-pass filtered.
//!
//! The offset and the tracked player position use separate filters so rapid
//! player rotation swings the escort point gently.

use glam::DVec2;
use sortie_core::constants::*;
use sortie_core::math::frame_lerp_factor;

/// Escort offset rotated by the player's heading (degrees).
pub fn rotated_offset(heading_deg: f64) -> DVec2 {
    let (sin, cos) = heading_deg.to_radians().sin_cos();
    DVec2::new(
        ESCORT_OFFSET_X * cos - ESCORT_OFFSET_Y * sin,
        ESCORT_OFFSET_X * sin + ESCORT_OFFSET_Y * cos,
    )
}

/// Unfiltered escort point.
pub fn escort_instant(player: DVec2, heading_deg: f64) -> DVec2 {
    player + rotated_offset(heading_deg)
}

#[derive(Debug, Clone, Default)]
pub struct EscortFilter {
    offset: Option<DVec2>,
    player: Option<DVec2>,
}

impl EscortFilter {
    pub fn reset(&mut self) {
        self.offset = None;
        self.player = None;
    }

    /// Advance both filters and return the filtered escort point.
    pub fn update(&mut self, player: DVec2, heading_deg: f64, dt: f64) -> DVec2 {
        let raw_offset = rotated_offset(heading_deg);
        let offset = match self.offset {
            Some(prev) => prev.lerp(raw_offset, frame_lerp_factor(ESCORT_OFFSET_LERP, dt)),
            None => raw_offset,
        };
        let tracked = match self.player {
            Some(prev) => prev.lerp(player, frame_lerp_factor(ESCORT_PLAYER_LERP, dt)),
            None => player,
        };
        self.offset = Some(offset);
        self.player = Some(tracked);
        tracked + offset
    }
}
