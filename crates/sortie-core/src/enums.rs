//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Who fired a projectile. Drives the projectile and flash colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Owner {
    #[default]
    Player,
    Wingman,
}

/// Advisory wingman mode set by the decision service.
///
/// The mode is metadata: local steering runs the same way in every mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WingmanMode {
    Patrol,
    #[default]
    Escort,
    Engage,
    Evade,
}

/// What a registered target is and which systems consider it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Something the ship can land on (links, buttons).
    Interactive,
    /// Accumulates damage from hits and regenerates after a quiet period.
    Damageable,
    /// A destructible title letter: breaks, falls, heals, respawns.
    Letter,
    /// A text block with a per-cell health mask damaged by passing lasers.
    MaskedText,
}

/// Lifecycle of a destructible letter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterPhase {
    #[default]
    Intact,
    /// Damage crossed the fall threshold; fall animation playing.
    Falling,
    /// Hidden, waiting for the respawn delay.
    Gone,
    /// Hidden, damage easing back to zero.
    Healing,
    /// Visible again, respawn animation playing.
    Respawning,
}

/// Ship flight state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightState {
    #[default]
    Flying,
    Landing,
}

/// Visual debris kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    /// Point light, linear fade.
    Spark,
    /// Rotating triangular shard.
    Fragment,
}

impl TargetKind {
    /// Whether projectile hits add damage to this kind.
    pub fn takes_hits(&self) -> bool {
        matches!(self, TargetKind::Damageable | TargetKind::Letter)
    }
}

impl WingmanMode {
    /// Parse the wire name used by the decision service.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patrol" => Some(WingmanMode::Patrol),
            "escort" => Some(WingmanMode::Escort),
            "engage" => Some(WingmanMode::Engage),
            "evade" => Some(WingmanMode::Evade),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            WingmanMode::Patrol => "patrol",
            WingmanMode::Escort => "escort",
            WingmanMode::Engage => "engage",
            WingmanMode::Evade => "evade",
        }
    }
}

impl Owner {
    /// Parse a wire owner tag; anything unknown is treated as the wingman,
    /// since externally injected shots come from non-player controllers.
    pub fn from_wire(s: Option<&str>) -> Self {
        match s {
            Some(tag) if tag.eq_ignore_ascii_case("player") => Owner::Player,
            _ => Owner::Wingman,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Owner::Player => "player",
            Owner::Wingman => "wingman",
        }
    }
}
