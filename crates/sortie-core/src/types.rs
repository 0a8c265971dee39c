//! Fundamental geometric and simulation types.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in viewport space (pixels, y grows downward).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Viewport dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Simulation time tracking.
///
/// Frames are variable-length (driven by the display refresh), so time is
/// accumulated from each frame's clamped `dt` rather than a fixed rate.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current frame number (increments by 1 each frame).
    pub tick: u64,
    /// Elapsed simulation time in milliseconds.
    pub now_ms: f64,
}

/// Per-frame broadcast of the player ship's kinematic state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipState {
    pub x: f64,
    pub y: f64,
    /// Heading in degrees, wrapped to [0, 360).
    pub heading: f64,
    pub vx: f64,
    pub vy: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Whether the rectangle has a non-zero area (laid out and visible).
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Rectangle grown by `pad` on every side.
    pub fn padded(&self, pad: f64) -> Rect {
        Rect {
            left: self.left - pad,
            top: self.top - pad,
            width: self.width + pad * 2.0,
            height: self.height + pad * 2.0,
        }
    }

    /// Inclusive point containment.
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }

    /// Normalized coordinates of `p` inside the rectangle, clamped to [0, 1].
    pub fn normalized(&self, p: DVec2) -> DVec2 {
        let nx = if self.width > 0.0 {
            ((p.x - self.left) / self.width).clamp(0.0, 1.0)
        } else {
            0.5
        };
        let ny = if self.height > 0.0 {
            ((p.y - self.top) / self.height).clamp(0.0, 1.0)
        } else {
            0.5
        };
        DVec2::new(nx, ny)
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Clamp a point into the viewport.
    pub fn clamp_point(&self, p: DVec2) -> DVec2 {
        DVec2::new(p.x.clamp(0.0, self.width), p.y.clamp(0.0, self.height))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl SimTime {
    /// Advance by one frame of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.now_ms += dt * 1000.0;
    }
}

impl ShipState {
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn velocity(&self) -> DVec2 {
        DVec2::new(self.vx, self.vy)
    }
}
