//! Arrival steering and anti-spin heading.
//!
//! Pure functions over plain data, no agent state.

use glam::DVec2;
use sortie_core::constants::*;
use sortie_core::math::{ang_delta, ang_wrap, clamp, lerp};

/// Input to the spring-damper for one frame.
pub struct SteerContext {
    pub pos: DVec2,
    pub vel: DVec2,
    pub dest: DVec2,
    pub dt: f64,
}

/// Output from the spring-damper.
pub struct SteerUpdate {
    pub pos: DVec2,
    pub vel: DVec2,
    /// Remaining distance to the destination after the step.
    pub dist: f64,
}

/// Natural frequency for a given distance: soft near, crisp far.
pub fn natural_frequency(dist: f64) -> f64 {
    lerp(
        STEER_OMEGA_NEAR,
        STEER_OMEGA_FAR,
        clamp(dist / STEER_OMEGA_FAR_DIST, 0.0, 1.0),
    )
}

/// Critically damped step toward `dest` with clamped acceleration and
/// speed, braking proportionally inside the arrival band.
pub fn steer(ctx: &SteerContext) -> SteerUpdate {
    let to = ctx.dest - ctx.pos;
    let dist = to.length();
    let omega = natural_frequency(dist);

    let accel = (to * (omega * omega) - ctx.vel * (2.0 * omega)).clamp_length_max(STEER_MAX_ACCEL);
    let mut vel = (ctx.vel + accel * ctx.dt).clamp_length_max(STEER_MAX_SPEED);
    if dist < ARRIVAL_RADIUS {
        vel = vel.clamp_length_max(STEER_MAX_SPEED * dist / ARRIVAL_RADIUS);
    }

    let pos = ctx.pos + vel * ctx.dt;
    SteerUpdate {
        pos,
        vel,
        dist: (ctx.dest - pos).length(),
    }
}

/// Input to the heading update.
pub struct HeadingContext {
    /// Current heading (deg, wrapped).
    pub heading: f64,
    pub vel: DVec2,
    pub dist_to_dest: f64,
    pub dt: f64,
}

/// Turn toward the direction of travel, rate-limited. Holds the last
/// heading while nearly stationary or almost arrived.
pub fn update_heading(ctx: &HeadingContext) -> f64 {
    if ctx.vel.length() <= HEADING_MIN_SPEED || ctx.dist_to_dest <= HEADING_MIN_DIST {
        return ctx.heading;
    }
    let desired = ang_wrap(ctx.vel.y.atan2(ctx.vel.x).to_degrees());
    let max_step = HEADING_RATE_MAX * ctx.dt;
    let step = clamp(ang_delta(ctx.heading, desired), -max_step, max_step);
    ang_wrap(ctx.heading + step)
}
