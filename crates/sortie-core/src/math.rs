//! Scalar helpers shared by every controller.

/// Clamp `n` into `[lo, hi]`.
pub fn clamp(n: f64, lo: f64, hi: f64) -> f64 {
    n.min(hi).max(lo)
}

/// Linear interpolation from `a` to `b` by `t`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Sample a uniform value from a `(lo, hi)` range given `t` in [0, 1).
pub fn lerp_range(range: (f64, f64), t: f64) -> f64 {
    lerp(range.0, range.1, t)
}

/// Wrap an angle in degrees into [0, 360).
pub fn ang_wrap(deg: f64) -> f64 {
    let w = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if w >= 360.0 {
        0.0
    } else {
        w
    }
}

/// Signed shortest difference `to - from` in degrees, in [-180, 180).
pub fn ang_delta(from: f64, to: f64) -> f64 {
    (to - from + 180.0).rem_euclid(360.0) - 180.0
}

/// Unwrap a wrapped heading to the equivalent nearest the continuous heading.
///
/// Candidates are the base unwrap and its neighbours one turn either side;
/// the closest to `current_continuous` wins.
pub fn unwrap_to_near(current_continuous: f64, desired_wrapped: f64) -> f64 {
    let base = desired_wrapped + 360.0 * ((current_continuous - desired_wrapped) / 360.0).round();
    let mut best = base;
    for candidate in [base + 360.0, base - 360.0] {
        if (candidate - current_continuous).abs() < (best - current_continuous).abs() {
            best = candidate;
        }
    }
    best
}

/// Express a distance covered in `dt` seconds as distance per 60Hz frame.
pub fn per_reference_frame(distance: f64, dt: f64) -> f64 {
    distance / (dt * 60.0)
}

/// Convert a per-60Hz-frame smoothing factor to one for an arbitrary `dt`.
pub fn frame_lerp_factor(per_frame: f64, dt: f64) -> f64 {
    1.0 - (1.0 - per_frame).powf(dt * 60.0)
}
