//! Plain data carried by simulation entities.
//!
//! Target components are attached to `hecs` entities; projectiles, flashes
//! and particles live in flat vectors owned by their layer.
//! Logic lives in the systems, not here.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::Rect;

/// Host-side identifier of a target element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetKey(pub String);

/// Last rectangle the host reported for the element.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LayoutRect(pub Rect);

/// Rectangle used for hit-testing this frame. Only refreshed from
/// [`LayoutRect`] while the element is connected.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CachedRect(pub Rect);

/// Whether the element is attached to the document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Connected(pub bool);

/// Accumulated damage on a hittable target.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DamageState {
    /// Damage in [0, 1].
    pub damage: f64,
    /// Simulation time of the last accepted hit (ms).
    pub last_hit_ms: Option<f64>,
    /// Normalized location of the last hit.
    pub hit_x: f64,
    pub hit_y: f64,
}

/// Per-letter randomized parameters, sampled once at registration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LetterParams {
    /// Damage at which the letter breaks.
    pub fall_threshold: f64,
    /// Horizontal drift during the fall (px).
    pub drift: f64,
    /// Rotation during the fall (deg).
    pub rotation: f64,
    pub fall_delay_ms: f64,
    pub respawn_delay_ms: f64,
    pub respawn_time_ms: f64,
}

/// Lifecycle of a destructible letter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LetterState {
    pub phase: LetterPhase,
    pub params: LetterParams,
    /// Time the current phase began (ms).
    pub phase_start_ms: f64,
    /// Damage at the moment healing started.
    pub heal_from: f64,
    /// Hit flash visible until this time (ms).
    pub flash_until_ms: f64,
}

/// Health grid of a masked text block. Row-major, one value per cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaskGrid {
    pub cols: usize,
    pub rows: usize,
    /// Cell health in [0, 1]; 1 = intact.
    pub health: Vec<f64>,
}

/// A live projectile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: DVec2,
    pub vel: DVec2,
    /// Cumulative distance traveled (px).
    pub dist: f64,
    pub owner: Owner,
    pub color: Option<String>,
}

/// Short-lived glow at a spawn point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MuzzleFlash {
    pub pos: DVec2,
    /// Elapsed life (seconds).
    pub life: f64,
    pub max_life: f64,
    pub owner: Owner,
}

/// A spark, fragment or text debris particle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: DVec2,
    pub vel: DVec2,
    /// Elapsed life (seconds).
    pub life: f64,
    pub max_life: f64,
    /// Rotation (radians), fragments only.
    pub angle: f64,
    /// Angular velocity (rad/s), fragments only.
    pub spin: f64,
    /// Size multiplier.
    pub size: f64,
    /// Downward acceleration (px/s²).
    pub gravity: f64,
    /// Velocity retained per 60 Hz frame; 1.0 = no drag.
    pub drag: f64,
}
