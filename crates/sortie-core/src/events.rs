//! Events emitted by the simulation stages.
//!
//! Most events are forwarded to the host after each frame. `SpawnLaser` and
//! `LaserLine` only travel between stages on the frame bus.

use serde::{Deserialize, Serialize};

use crate::commands::SpawnLaserRequest;
use crate::decision::DecisionRequest;
use crate::enums::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    /// Per-frame ship broadcast. Heading is the continuous accumulator.
    ShipState {
        x: f64,
        y: f64,
        heading: f64,
        vx: f64,
        vy: f64,
    },
    /// The player fired (one event per trigger, both cannons).
    LaserFired { time_ms: f64 },
    /// A projectile crossed a damageable target.
    TargetHit {
        key: String,
        /// Damage after the hit, in [0, 1].
        damage: f64,
        /// Normalized hit location inside the target rectangle.
        hit_x: f64,
        hit_y: f64,
        owner: Owner,
    },
    LetterFell { key: String },
    LetterRespawned { key: String },
    LandingChanged {
        landed: bool,
        /// Key of the target the ship landed on.
        target: Option<String>,
    },
    WingmanActivated,
    WingmanDeactivated,
    WingmanModeChanged { mode: WingmanMode },
    /// A line the wingman starts speaking now.
    Speak { text: String },
    /// The host should post `request` to the decision service.
    DecisionIssued {
        request_id: u64,
        request: DecisionRequest,
    },
    /// The host should abort the in-flight request.
    DecisionCancelled { request_id: u64 },

    // --- Internal ---
    /// Projectile injected by a non-player controller.
    SpawnLaser(SpawnLaserRequest),
    /// A live projectile's trail segment this frame.
    LaserLine {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        alpha: f64,
    },
}

impl SimEvent {
    /// Events that stay inside the engine.
    pub fn is_internal(&self) -> bool {
        matches!(self, SimEvent::SpawnLaser(_) | SimEvent::LaserLine { .. })
    }
}
