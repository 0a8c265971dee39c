//! Wire contract with the external wingman decision service.
//!
//! Request: a snapshot of the scene. Response: `{ "actions": [...] }` in any
//! of several loose shapes, normalized into [`WingmanAction`] by the consumer.

use serde::{Deserialize, Serialize};

use crate::enums::WingmanMode;

/// Scene snapshot posted to the decision service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    /// Simulation time in milliseconds.
    pub time: f64,
    pub dims: Dims,
    pub player: PlayerSnapshot,
    pub wingman: WingmanSnapshot,
    pub enemies: Vec<EnemySnapshot>,
    /// Style override or, for the farewell request, a constraining instruction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dims {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub vx: f64,
    pub vy: f64,
    pub firing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WingmanSnapshot {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub mode: WingmanMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub visible: bool,
    pub threat: f64,
}

/// Raw response body. Actions stay untyped until normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionResponse {
    #[serde(default)]
    pub actions: Vec<serde_json::Value>,
}

/// Burst parameters as issued; clamped by the consumer before use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BurstOrder {
    pub cadence_ms: Option<f64>,
    pub duration_ms: Option<f64>,
    pub spread: Option<f64>,
}

/// Canonical wingman action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WingmanAction {
    SetMode {
        mode: WingmanMode,
    },
    MoveTo {
        x: f64,
        y: f64,
    },
    FireBurst(BurstOrder),
    Say {
        text: String,
    },
    Despawn,
    /// Composite: switch to engage, optionally moving and firing.
    Engage {
        move_to: Option<(f64, f64)>,
        fire_burst: Option<BurstOrder>,
    },
}
