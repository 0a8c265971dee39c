//! Player ship controller.
//!
//! Maps the raw pointer into an inertial ship: the pointer target is
//! filtered, the position follows the filtered target, and the heading is
//! driven by a jerk-limited, critically-damped rotational spring on a
//! continuous (unwrapped) accumulator. Idle lock and landing are separate
//! hysteresis machines that may both be engaged at once.
//!
//! Smoothing factors are tuned per 60 Hz frame and rescaled for the actual
//! frame step.

use glam::DVec2;

use sortie_core::constants::*;
use sortie_core::events::SimEvent;
use sortie_core::geometry::is_inside_padded;
use sortie_core::math::*;
use sortie_core::state::{DownwashView, ShipView};
use sortie_core::types::{Rect, ShipState, Viewport};

/// Inputs for one controller frame.
pub struct ShipFrame {
    pub now_ms: f64,
    pub dt: f64,
}

#[derive(Debug, Clone)]
pub struct ShipController {
    pos: DVec2,
    target: DVec2,
    filtered: DVec2,
    prev: DVec2,
    prev_raw: DVec2,
    /// Smoothed per-frame displacement (px).
    speed: f64,
    vel: DVec2,

    /// Continuous heading (deg, unbounded).
    heading: f64,
    turn_rate: f64,
    turn_accel: f64,

    bank: f64,
    pitch: f64,
    lift: f64,

    idle_lock: IdleLock,
    landing: LandingTracker,
    landing_targets: Vec<(String, Rect)>,
    next_scan_ms: Option<f64>,
}

impl ShipController {
    /// A ship parked at the viewport center, facing right.
    pub fn new(viewport: &Viewport) -> Self {
        let c = viewport.center();
        Self {
            pos: c,
            target: c,
            filtered: c,
            prev: c,
            prev_raw: c,
            speed: 0.0,
            vel: DVec2::ZERO,
            heading: 0.0,
            turn_rate: 0.0,
            turn_accel: 0.0,
            bank: 0.0,
            pitch: 0.0,
            lift: 1.0,
            idle_lock: IdleLock::default(),
            landing: LandingTracker::default(),
            landing_targets: Vec::new(),
            next_scan_ms: None,
        }
    }

    // --- Input ---

    /// Pointer moved. Breaks the idle lock and kicks the filtered target.
    pub fn pointer_move(&mut self, p: DVec2) {
        self.target = p;
        self.idle_lock.release();
        self.filtered = self
            .filtered
            .lerp(self.target, MOUSE_LERP_FAST * IDLE_UNLOCK_BOOST);
    }

    /// Force a landing-target rescan on the next frame.
    pub fn request_rescan(&mut self) {
        self.next_scan_ms = None;
    }

    pub fn scan_due(&self, now_ms: f64) -> bool {
        self.next_scan_ms.map_or(true, |at| now_ms >= at)
    }

    pub fn set_landing_targets(&mut self, targets: Vec<(String, Rect)>, now_ms: f64) {
        self.landing_targets = targets;
        self.next_scan_ms = Some(now_ms + TARGET_SCAN_INTERVAL_MS);
    }

    // --- Frame ---

    pub fn update(&mut self, frame: &ShipFrame, out: &mut Vec<SimEvent>) {
        let dt = frame.dt;

        let input_speed = (self.target - self.prev_raw).length() / dt;
        self.prev_raw = self.target;

        let f_fast = clamp(
            (input_speed - INPUT_SPEED_FOR_BASE) / (INPUT_SPEED_FOR_FAST - INPUT_SPEED_FOR_BASE),
            0.0,
            1.0,
        );
        let mouse_lerp = lerp(MOUSE_LERP_BASE, MOUSE_LERP_FAST, f_fast);
        let k_spring = lerp(K_BASE, K_FAST, f_fast);
        let rate_max = lerp(RATE_MAX_BASE, RATE_MAX_FAST, f_fast);
        let accel_max = lerp(ACCEL_MAX_BASE, ACCEL_MAX_FAST, f_fast);
        let jerk_max = lerp(JERK_MAX_BASE, JERK_MAX_FAST, f_fast);
        let pos_lerp = lerp(POS_LERP_BASE, POS_LERP_FAST, f_fast);

        // Follow the filtered target.
        self.filtered = self
            .filtered
            .lerp(self.target, frame_lerp_factor(mouse_lerp, dt));
        self.pos = self.pos.lerp(self.filtered, frame_lerp_factor(pos_lerp, dt));

        let d = self.pos - self.prev;
        // Thresholds are tuned in px per 60Hz frame.
        let spd = per_reference_frame(d.length(), dt);
        self.speed = lerp(self.speed, spd, frame_lerp_factor(SPEED_SMOOTH, dt));
        self.vel = d / dt;

        if let Some(landed) = self
            .landing
            .update(frame.now_ms, spd, self.pos, &self.landing_targets)
        {
            tracing::debug!(landed, target = ?self.landing.landed_on(), "landing changed");
            out.push(SimEvent::LandingChanged {
                landed,
                target: self.landing.landed_on().map(str::to_string),
            });
        }

        let dist_to_filtered = (self.filtered - self.pos).length();
        if self
            .idle_lock
            .update(frame.now_ms, spd < IDLE_LOCK_SPEED && dist_to_filtered < IDLE_LOCK_DIST)
        {
            self.turn_rate = 0.0;
            self.turn_accel = 0.0;
        }
        let locked = self.idle_lock.locked;

        self.steer_heading(d, spd, dist_to_filtered, locked, dt, k_spring, rate_max, accel_max, jerk_max);

        let bank_target = clamp(self.turn_rate * BANK_FROM_RATE, -BANK_MAX, BANK_MAX);
        let pitch_target = clamp(
            per_reference_frame(d.y, dt) * PITCH_FROM_DY,
            -PITCH_MAX,
            PITCH_MAX,
        );
        self.bank = lerp(self.bank, bank_target, frame_lerp_factor(BANK_VISUAL_LERP, dt));
        self.pitch = lerp(self.pitch, pitch_target, frame_lerp_factor(PITCH_VISUAL_LERP, dt));
        self.lift = if self.landing.is_landed() {
            LIFT_LANDED
        } else {
            clamp(1.0 + self.speed * LIFT_FROM_SPEED, 1.0, LIFT_MAX)
        };

        out.push(SimEvent::ShipState {
            x: self.pos.x,
            y: self.pos.y,
            heading: self.heading,
            vx: self.vel.x,
            vy: self.vel.y,
        });

        self.prev = self.pos;
    }

    #[allow(clippy::too_many_arguments)]
    fn steer_heading(
        &mut self,
        d: DVec2,
        spd: f64,
        dist: f64,
        locked: bool,
        dt: f64,
        k_spring: f64,
        rate_max: f64,
        accel_max: f64,
        jerk_max: f64,
    ) {
        let desired_wrapped = if locked {
            ang_wrap(self.heading)
        } else if dist <= DIST_DEAD && spd > 0.1 {
            // Too close to aim at; follow the direction of motion.
            ang_wrap(d.y.atan2(d.x).to_degrees())
        } else {
            let to = self.filtered - self.pos;
            ang_wrap(to.y.atan2(to.x).to_degrees())
        };

        let desired = unwrap_to_near(self.heading, desired_wrapped);
        let mut err = desired - self.heading;
        if err.abs() < DEAD_ERR {
            err = 0.0;
        }

        let damping = 2.0 * k_spring.sqrt();
        let desired_accel = if locked {
            0.0
        } else {
            k_spring * err - damping * self.turn_rate
        };

        let max_jerk = jerk_max * dt;
        self.turn_accel += clamp(desired_accel - self.turn_accel, -max_jerk, max_jerk);
        self.turn_accel = clamp(self.turn_accel, -accel_max, accel_max);
        if !locked {
            self.turn_rate += self.turn_accel * dt;
        }
        self.turn_rate = clamp(self.turn_rate, -rate_max, rate_max);

        if locked {
            self.turn_rate = 0.0;
            self.turn_accel = 0.0;
        } else if self.turn_rate.abs() < DEAD_RATE && err == 0.0 {
            self.turn_rate = 0.0;
        }

        self.heading += self.turn_rate * dt;
    }

    // --- Accessors ---

    pub fn position(&self) -> DVec2 {
        self.pos
    }

    pub fn velocity(&self) -> DVec2 {
        self.vel
    }

    pub fn filtered_target(&self) -> DVec2 {
        self.filtered
    }

    /// Continuous heading (deg).
    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn turn_rate(&self) -> f64 {
        self.turn_rate
    }

    pub fn lift(&self) -> f64 {
        self.lift
    }

    pub fn is_idle_locked(&self) -> bool {
        self.idle_lock.locked
    }

    pub fn is_landed(&self) -> bool {
        self.landing.is_landed()
    }

    pub fn landed_on(&self) -> Option<&str> {
        self.landing.landed_on()
    }

    /// Kinematic state with the heading wrapped to [0, 360).
    pub fn state(&self) -> ShipState {
        ShipState {
            x: self.pos.x,
            y: self.pos.y,
            heading: ang_wrap(self.heading),
            vx: self.vel.x,
            vy: self.vel.y,
        }
    }

    pub fn view(&self) -> ShipView {
        let (scale_base, scale_gain, scale_max) = WASH_SCALE;
        let (alpha_base, alpha_gain, alpha_max) = WASH_ALPHA;
        let (offset_base, offset_gain, offset_max) = WASH_OFFSET;
        ShipView {
            x: self.pos.x,
            y: self.pos.y,
            heading: ang_wrap(self.heading),
            vx: self.vel.x,
            vy: self.vel.y,
            bank: self.bank,
            pitch: self.pitch,
            lift: self.lift,
            landed: self.landing.is_landed(),
            landed_on: self.landing.landed_on().map(str::to_string),
            idle_locked: self.idle_lock.locked,
            downwash: DownwashView {
                scale: clamp(scale_base + self.speed * scale_gain, scale_base, scale_max),
                alpha: clamp(alpha_base + self.speed * alpha_gain, alpha_base, alpha_max),
                offset: clamp(offset_base + self.speed * offset_gain, offset_base, offset_max),
            },
        }
    }
}

// --- Idle lock ---

#[derive(Debug, Clone, Copy, Default)]
struct IdleLock {
    locked: bool,
    since_ms: Option<f64>,
}

impl IdleLock {
    /// Returns true on the frame the lock engages.
    fn update(&mut self, now_ms: f64, near_and_slow: bool) -> bool {
        if !near_and_slow {
            self.release();
            return false;
        }
        let since = *self.since_ms.get_or_insert(now_ms);
        if !self.locked && now_ms - since >= IDLE_LOCK_AFTER_MS {
            self.locked = true;
            return true;
        }
        false
    }

    fn release(&mut self) {
        self.locked = false;
        self.since_ms = None;
    }
}

// --- Landing ---

/// Landing hysteresis.
///
/// Enter: idle below the enter speed for the enter time while inside a
/// padded interactive rectangle. Exit: the landed-on rectangle no longer
/// contains the ship (or is gone), or motion at or above the exit speed is
/// sustained for the exit time. Any idle frame restarts the exit timer.
#[derive(Debug, Clone, Default)]
pub struct LandingTracker {
    landed_on: Option<String>,
    idle_since_ms: Option<f64>,
    moving_since_ms: Option<f64>,
}

impl LandingTracker {
    pub fn is_landed(&self) -> bool {
        self.landed_on.is_some()
    }

    pub fn landed_on(&self) -> Option<&str> {
        self.landed_on.as_deref()
    }

    /// Advance one frame. `spd` is the frame displacement in px per 60Hz
    /// frame. Returns the new landed flag when it changes.
    pub fn update(
        &mut self,
        now_ms: f64,
        spd: f64,
        pos: DVec2,
        targets: &[(String, Rect)],
    ) -> Option<bool> {
        match self.landed_on.as_deref() {
            None => {
                if spd >= LAND_IDLE_SPEED_ENTER {
                    self.idle_since_ms = None;
                    return None;
                }
                let since = *self.idle_since_ms.get_or_insert(now_ms);
                if now_ms - since < LAND_IDLE_TIME_ENTER_MS {
                    return None;
                }
                let on = targets.iter().find(|(_, rect)| is_inside_padded(pos, rect))?;
                self.landed_on = Some(on.0.clone());
                self.idle_since_ms = None;
                self.moving_since_ms = None;
                Some(true)
            }
            Some(key) => {
                let still_on = targets
                    .iter()
                    .find(|(k, _)| k == key)
                    .is_some_and(|(_, rect)| is_inside_padded(pos, rect));
                if !still_on {
                    self.take_off();
                    return Some(false);
                }
                if spd < LAND_IDLE_SPEED_EXIT {
                    self.moving_since_ms = None;
                    return None;
                }
                let since = *self.moving_since_ms.get_or_insert(now_ms);
                if now_ms - since >= LAND_IDLE_TIME_EXIT_MS {
                    self.take_off();
                    return Some(false);
                }
                None
            }
        }
    }

    fn take_off(&mut self) {
        self.landed_on = None;
        self.idle_since_ms = None;
        self.moving_since_ms = None;
    }
}
