//! Frame snapshot: everything a presentation layer needs to draw one frame.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::SimEvent;
use crate::types::{Rect, SimTime, Viewport};

/// Complete visible state produced after each frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub time: SimTime,
    pub paused: bool,
    pub viewport: Viewport,
    pub ship: ShipView,
    pub projectiles: Vec<ProjectileView>,
    pub flashes: Vec<FlashView>,
    pub sparks: Vec<SparkView>,
    pub fragments: Vec<FragmentView>,
    pub targets: Vec<TargetView>,
    pub masked_text: Vec<MaskedTextView>,
    pub wingman: WingmanView,
    /// Host-visible events produced this frame, in publish order.
    pub events: Vec<SimEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipView {
    pub x: f64,
    pub y: f64,
    /// Heading wrapped to [0, 360).
    pub heading: f64,
    pub vx: f64,
    pub vy: f64,
    pub bank: f64,
    pub pitch: f64,
    /// Visual scale; below 1 while landed.
    pub lift: f64,
    pub landed: bool,
    pub landed_on: Option<String>,
    pub idle_locked: bool,
    pub downwash: DownwashView,
}

/// Shadow under the ship, stronger when slow and close to the page.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DownwashView {
    pub scale: f64,
    pub alpha: f64,
    /// Vertical offset below the ship (px).
    pub offset: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub tail_x: f64,
    pub tail_y: f64,
    pub head_x: f64,
    pub head_y: f64,
    pub alpha: f64,
    pub owner: Owner,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashView {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub alpha: f64,
    pub owner: Owner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparkView {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub alpha: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentView {
    pub x: f64,
    pub y: f64,
    /// Rotation (radians).
    pub angle: f64,
    pub size: f64,
    pub alpha: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetView {
    pub key: String,
    pub kind: TargetKind,
    pub rect: Rect,
    pub connected: bool,
    pub damage: f64,
    pub hit_x: f64,
    pub hit_y: f64,
    /// Present for letter targets only.
    pub letter: Option<LetterView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterView {
    pub phase: LetterPhase,
    pub flashing: bool,
    /// Fall animation progress in [0, 1] while falling.
    pub fall_progress: f64,
    /// Respawn animation progress in [0, 1] while respawning.
    pub respawn_progress: f64,
    pub drift: f64,
    pub rotation: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskedTextView {
    pub key: String,
    pub cols: usize,
    pub rows: usize,
    /// Row-major cell health in [0, 1].
    pub health: Vec<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WingmanView {
    pub active: bool,
    pub x: f64,
    pub y: f64,
    /// Heading wrapped to [0, 360).
    pub heading: f64,
    pub mode: WingmanMode,
    /// Speech bubble text, if one is visible.
    pub phrase: Option<String>,
}
