//! Input commands sent from the host to the simulation.
//!
//! Commands are queued and processed at the next frame boundary.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::Rect;

/// All inputs the simulation accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputCommand {
    // --- Player input ---
    /// Pointer moved (viewport coordinates).
    PointerMove { x: f64, y: f64 },
    /// Fire key pressed. Rate-limited by the laser cooldown.
    Fire,
    /// External controller injects a projectile.
    SpawnLaser(SpawnLaserRequest),

    // --- Layout ---
    /// Viewport resized. Triggers a landing-target rescan.
    Resize { width: f64, height: f64 },
    /// Start tracking a target element.
    RegisterTarget {
        key: String,
        rect: Rect,
        kind: TargetKind,
    },
    /// Latest layout rectangle of a tracked element.
    UpdateTargetRect { key: String, rect: Rect },
    /// Element attached to / detached from the document.
    SetTargetConnected { key: String, connected: bool },
    /// Stop tracking a target element.
    RemoveTarget { key: String },
    /// Page visibility changed.
    SetPageVisible { visible: bool },

    // --- Wingman ---
    /// Style override sent with every decision request.
    SetWingmanPrompt { prompt: String },
    /// Enqueue a line for the wingman to speak.
    WingmanSay { text: String },
    /// The decision service answered a request.
    DecisionResolved {
        request_id: u64,
        #[serde(default)]
        actions: Vec<serde_json::Value>,
    },
    /// The decision request failed (network, timeout, bad payload).
    DecisionFailed { request_id: u64 },
    /// The platform speech engine started or stopped speaking.
    SpeechEngine { speaking: bool },

    // --- Simulation control ---
    Pause,
    Resume,
}

/// Inbound projectile spawn request. Every numeric field is optional on the
/// wire; requests with missing or non-finite numbers are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnLaserRequest {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub vx: Option<f64>,
    pub vy: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

/// A spawn request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSpawn {
    pub origin: DVec2,
    pub velocity: DVec2,
    pub color: Option<String>,
    pub owner: Owner,
}

impl SpawnLaserRequest {
    /// Validate numeric fields. Returns `None` for malformed requests.
    pub fn validate(&self) -> Option<ValidSpawn> {
        let finite = |v: Option<f64>| v.filter(|n| n.is_finite());
        let x = finite(self.x)?;
        let y = finite(self.y)?;
        let vx = finite(self.vx)?;
        let vy = finite(self.vy)?;
        Some(ValidSpawn {
            origin: DVec2::new(x, y),
            velocity: DVec2::new(vx, vy),
            color: self.color.clone(),
            owner: Owner::from_wire(self.owner.as_deref()),
        })
    }
}

impl From<ValidSpawn> for SpawnLaserRequest {
    fn from(s: ValidSpawn) -> Self {
        Self {
            x: Some(s.origin.x),
            y: Some(s.origin.y),
            vx: Some(s.velocity.x),
            vy: Some(s.velocity.y),
            color: s.color,
            owner: Some(s.owner.as_wire().to_string()),
        }
    }
}
