//! Simulation constants and tuning parameters.
//!
//! Distances are viewport pixels, times are milliseconds unless the name
//! says `_SECS`, angles are degrees unless the name says `_RAD`.

// --- Frame timing ---

/// Smallest frame step accepted by the engine (seconds).
pub const MIN_FRAME_DT: f64 = 0.001;

/// Largest frame step accepted by the engine (seconds). Longer frames are
/// clamped so a stalled display does not teleport entities.
pub const MAX_FRAME_DT: f64 = 0.033;

/// Nominal frame rate of the host loop (Hz).
pub const DEFAULT_FRAME_RATE: u32 = 60;

// --- Ship: position smoothing ---

/// Position follow factor toward the filtered target (slow input).
pub const POS_LERP_BASE: f64 = 0.18;

/// Position follow factor toward the filtered target (fast input).
pub const POS_LERP_FAST: f64 = 0.24;

/// Target filter factor (slow input).
pub const MOUSE_LERP_BASE: f64 = 0.26;

/// Target filter factor (fast input), also the kick applied on pointer move.
pub const MOUSE_LERP_FAST: f64 = 0.70;

/// Smoothing factor for the displayed speed estimate.
pub const SPEED_SMOOTH: f64 = 0.28;

/// Within this distance of the filtered target, heading follows motion instead.
pub const DIST_DEAD: f64 = 6.0;

/// Input speed (px/s) at or below which the "base" regime applies.
pub const INPUT_SPEED_FOR_BASE: f64 = 120.0;

/// Input speed (px/s) at or above which the "fast" regime applies.
pub const INPUT_SPEED_FOR_FAST: f64 = 900.0;

// --- Ship: heading dynamics ---

/// Max turn rate (deg/s), base regime.
pub const RATE_MAX_BASE: f64 = 260.0;

/// Max turn rate (deg/s), fast regime.
pub const RATE_MAX_FAST: f64 = 560.0;

/// Max angular acceleration (deg/s²), base regime.
pub const ACCEL_MAX_BASE: f64 = 900.0;

/// Max angular acceleration (deg/s²), fast regime.
pub const ACCEL_MAX_FAST: f64 = 1900.0;

/// Max angular jerk (deg/s³), base regime.
pub const JERK_MAX_BASE: f64 = 9000.0;

/// Max angular jerk (deg/s³), fast regime.
pub const JERK_MAX_FAST: f64 = 18000.0;

/// Turn rates below this (deg/s) snap to zero once the error is zero.
pub const DEAD_RATE: f64 = 0.08;

/// Heading errors below this (deg) are treated as zero.
pub const DEAD_ERR: f64 = 0.25;

/// Rotational spring constant, base regime. Damping is 2·√K.
pub const K_BASE: f64 = 26.0;

/// Rotational spring constant, fast regime.
pub const K_FAST: f64 = 46.0;

// --- Ship: landing ---

/// Per-frame displacement (px) below which the ship counts as idle for landing.
pub const LAND_IDLE_SPEED_ENTER: f64 = 0.07;

/// Per-frame displacement (px) at or above which a landed ship counts as moving.
pub const LAND_IDLE_SPEED_EXIT: f64 = 0.11;

/// Idle time required before landing.
pub const LAND_IDLE_TIME_ENTER_MS: f64 = 240.0;

/// Sustained motion required before taking off again.
pub const LAND_IDLE_TIME_EXIT_MS: f64 = 120.0;

/// Padding added around interactive target rectangles for landing checks.
pub const HIT_PAD: f64 = 10.0;

/// Interval between landing-target cache refreshes.
pub const TARGET_SCAN_INTERVAL_MS: f64 = 800.0;

// --- Ship: idle lock ---

/// Per-frame displacement (px) below which the ship may idle-lock.
pub const IDLE_LOCK_SPEED: f64 = 0.055;

/// Distance to the filtered target (px) below which the ship may idle-lock.
pub const IDLE_LOCK_DIST: f64 = 8.0;

/// Time near-and-slow before the lock engages.
pub const IDLE_LOCK_AFTER_MS: f64 = 140.0;

/// Multiplier on the target kick applied when pointer motion breaks the lock.
pub const IDLE_UNLOCK_BOOST: f64 = 1.0;

// --- Ship: visuals ---

/// Max visual bank (deg).
pub const BANK_MAX: f64 = 28.0;

/// Bank per deg/s of turn rate.
pub const BANK_FROM_RATE: f64 = 0.42;

/// Pitch per px of vertical frame displacement.
pub const PITCH_FROM_DY: f64 = 0.55;

/// Max visual pitch (deg).
pub const PITCH_MAX: f64 = 9.0;

/// Max lift (scale) while flying.
pub const LIFT_MAX: f64 = 1.05;

/// Lift (scale) while landed.
pub const LIFT_LANDED: f64 = 0.985;

/// Lift gained per unit of smoothed speed.
pub const LIFT_FROM_SPEED: f64 = 0.0020;

pub const BANK_VISUAL_LERP: f64 = 0.14;
pub const PITCH_VISUAL_LERP: f64 = 0.14;

/// Downwash shadow: base value, gain per unit of smoothed speed, upper bound.
pub const WASH_SCALE: (f64, f64, f64) = (0.95, 0.0018, 1.28);
pub const WASH_ALPHA: (f64, f64, f64) = (0.20, 0.00045, 0.36);
pub const WASH_OFFSET: (f64, f64, f64) = (10.0, 0.015, 36.0);

// --- Lasers ---

/// Minimum interval between player shots.
pub const LASER_COOLDOWN_MS: f64 = 120.0;

/// Projectile muzzle speed (px/s).
pub const LASER_SPEED: f64 = 1600.0;

/// Distance after which a projectile is removed (px).
pub const LASER_MAX_DIST: f64 = 700.0;

/// Visual stroke width (px).
pub const LASER_WIDTH: f64 = 2.0;

/// Fixed offset from the ship's reported position to its sprite origin.
pub const LASER_ORIGIN_TWEAK_X: f64 = 0.5;
pub const LASER_ORIGIN_TWEAK_Y: f64 = 1.0;

/// Distance from ship center to nose (px, before lift scaling).
pub const NOSE_OFFSET: f64 = 25.0;

/// Lateral offset of each cannon from the heading axis (px).
pub const CANNON_OFFSET: f64 = 6.5;

/// Extra forward offset of the spawn point past the nose (px).
pub const LASER_START_FWD: f64 = 5.0;

/// Trail length as a fraction of max range.
pub const LASER_FADE_TAIL: f64 = 0.25;

/// Fraction of ship velocity inherited by player shots.
pub const LASER_INHERIT_SHIP_VEL: f64 = 1.0;

/// Forward lead applied to the spawn point (seconds of ship motion, ~1 frame).
pub const LASER_SPAWN_LEAD: f64 = 0.016;

/// Player muzzle flash lifetime (seconds).
pub const FLASH_LIFE_PLAYER: f64 = 0.08;

/// Wingman muzzle flash lifetime (seconds).
pub const FLASH_LIFE_WINGMAN: f64 = 0.06;

// --- Damage ---

/// Damage added to a target per projectile hit.
pub const DAMAGE_ADD_PER_HIT: f64 = 0.18;

/// Quiet period before a plain damageable target starts regenerating.
pub const DAMAGE_REGEN_DELAY_MS: f64 = 1500.0;

/// Regeneration rate of plain damageable targets (damage per second).
pub const DAMAGE_REGEN_PER_SEC: f64 = 0.12;

/// Duration of the hit flash on a letter.
pub const LETTER_HIT_FLASH_MS: f64 = 140.0;

/// Fall animation length once a letter breaks.
pub const LETTER_FALL_ANIM_MS: f64 = 700.0;

/// Respawn animation length after a letter is fully healed.
pub const LETTER_RESPAWN_ANIM_MS: f64 = 450.0;

/// Minimum wait after a letter is gone before healing starts.
pub const RESPAWN_DELAY_MS: f64 = 2600.0;

/// Extra per-letter random wait (0..jitter).
pub const RESPAWN_DELAY_JITTER_MS: f64 = 900.0;

/// Minimum heal duration (damage → 0).
pub const RESPAWN_TIME_MS: f64 = 1400.0;

/// Extra per-letter random heal duration (0..jitter).
pub const RESPAWN_TIME_JITTER_MS: f64 = 400.0;

/// Base fall threshold; each letter adds 0..`FALL_THRESHOLD_JITTER`.
pub const FALL_THRESHOLD_BASE: f64 = 0.66;
pub const FALL_THRESHOLD_JITTER: f64 = 0.2;

/// Maximum random fall delay per letter.
pub const FALL_DELAY_MAX_MS: f64 = 140.0;

/// Horizontal drift (px) and rotation (deg) magnitudes of a falling letter.
pub const LETTER_DRIFT: (f64, f64) = (10.0, 38.0);
pub const LETTER_ROTATION: (f64, f64) = (10.0, 32.0);

// --- Masked text ---

/// Health grid cell size (px).
pub const MASK_CELL: f64 = 8.0;

/// Laser segments farther than this from the block are ignored (px).
pub const MASK_CULL_MARGIN: f64 = 40.0;

/// Spacing between damage samples along a laser segment (px).
pub const MASK_SAMPLE_STEP: f64 = 8.0;

/// Splat radius (px), jittered ±15 %.
pub const MASK_DAMAGE_RADIUS: f64 = 22.0;

/// Splat strength before alpha scaling.
pub const MASK_DAMAGE_STRENGTH: f64 = 0.45;

/// Global health regeneration (fraction per second).
pub const MASK_REGEN_SPEED: f64 = 0.045;

/// Laser alpha above which a splat counts as a big hit.
pub const MASK_BIG_HIT_THRESHOLD: f64 = 0.85;

/// Debris sparks per sample (×1.4 for big hits).
pub const MASK_SPARKS_PER_SAMPLE: usize = 8;

/// Debris shards per sample (×2 for big hits).
pub const MASK_SHARDS_PER_SAMPLE: usize = 8;

/// Upper bound on live text debris.
pub const MASK_MAX_DEBRIS: usize = 1500;

pub const DEBRIS_SPARK_SPEED: (f64, f64) = (120.0, 460.0);
pub const DEBRIS_SPARK_LIFE: (f64, f64) = (0.35, 0.95);
pub const DEBRIS_SPARK_SIZE: (f64, f64) = (1.0, 2.8);
pub const DEBRIS_SHARD_SPEED: (f64, f64) = (80.0, 340.0);
pub const DEBRIS_SHARD_LIFE: (f64, f64) = (0.6, 1.4);
pub const DEBRIS_SHARD_SIZE: (f64, f64) = (4.0, 12.0);

/// Max shard spin either way (rad/s).
pub const DEBRIS_SHARD_SPIN: f64 = 6.0;

// --- Particles ---

pub const SPARKS_PER_HIT: (f64, f64) = (10.0, 18.0);
pub const FRAGS_PER_HIT: (f64, f64) = (3.0, 6.0);
pub const SPARK_SPEED: (f64, f64) = (220.0, 520.0);
pub const FRAG_SPEED: (f64, f64) = (90.0, 220.0);
pub const SPARK_LIFE: (f64, f64) = (0.18, 0.36);
pub const FRAG_LIFE: (f64, f64) = (0.45, 0.85);

/// Angular jitter around the hit normal (radians, full width).
pub const SPARK_SPREAD_RAD: f64 = 1.2;
pub const FRAG_SPREAD_RAD: f64 = 1.6;

/// Fragment spin (rad/s).
pub const FRAG_SPIN: (f64, f64) = (0.6, 1.1);

/// Fragment size multiplier.
pub const FRAG_SIZE: (f64, f64) = (0.8, 2.0);

/// Downward acceleration (px/s²), scaled per particle kind.
pub const GRAVITY: f64 = 450.0;
pub const SPARK_GRAVITY_SCALE: f64 = 0.15;
pub const FRAG_GRAVITY_SCALE: f64 = 0.35;

/// Gravity and per-60Hz-frame velocity retention for text debris.
pub const DEBRIS_GRAVITY: f64 = 620.0;
pub const DEBRIS_DRAG: f64 = 0.985;

// --- Wingman: activation ---

/// Sliding window over player shots.
pub const SHOT_WINDOW_MS: f64 = 3000.0;

/// Shots within the window that summon the wingman.
pub const SHOTS_TO_SPAWN: usize = 8;

/// Player silence that sends the wingman home.
pub const DESPAWN_AFTER_IDLE_MS: f64 = 6000.0;

/// A shot this recent marks the player as firing in decision snapshots.
pub const PLAYER_FIRING_RECENT_MS: f64 = 300.0;

/// Wait for a farewell decision before leaving silently.
pub const FAREWELL_TIMEOUT_MS: f64 = 5000.0;

/// Time allowed for the farewell line to be heard before leaving.
pub const FAREWELL_GRACE_MS: f64 = 2500.0;

// --- Wingman: body ---

/// Sprite size (px).
pub const NPC_SIZE: f64 = 56.0;

/// Nose distance from center (px): sprite nose at x=40 of a 48 viewBox centered at 24.
pub const NPC_NOSE_OFFSET: f64 = (40.0 - 24.0) * NPC_SIZE / 48.0;

/// Extra forward offset for wingman shots (px).
pub const NPC_NOSE_FUDGE: f64 = 2.0;

/// Fraction of (player + wingman) velocity inherited by wingman shots.
pub const NPC_INHERIT_FACTOR: f64 = 0.5;

/// Wingman laser color.
pub const NPC_COLOR: &str = "#ff7cf3";

/// Escort offset relative to the player, rotated by the player's heading.
pub const ESCORT_OFFSET_X: f64 = -120.0;
pub const ESCORT_OFFSET_Y: f64 = -80.0;

/// Per-60Hz-frame filter factor for the rotated escort offset.
pub const ESCORT_OFFSET_LERP: f64 = 0.12;

/// Per-60Hz-frame filter factor for the tracked player position.
pub const ESCORT_PLAYER_LERP: f64 = 0.35;

// --- Wingman: steering ---

/// Natural frequency near the destination (rad/s).
pub const STEER_OMEGA_NEAR: f64 = 4.5;

/// Natural frequency far from the destination (rad/s).
pub const STEER_OMEGA_FAR: f64 = 9.0;

/// Distance at which the far natural frequency is reached (px).
pub const STEER_OMEGA_FAR_DIST: f64 = 400.0;

/// Acceleration bound (px/s²).
pub const STEER_MAX_ACCEL: f64 = 3200.0;

/// Speed bound (px/s).
pub const STEER_MAX_SPEED: f64 = 950.0;

/// Braking band around the destination (px).
pub const ARRIVAL_RADIUS: f64 = 48.0;

/// A waypoint closer than this is considered reached (px).
pub const WAYPOINT_REACHED: f64 = 14.0;

/// Minimum speed before heading follows the direction of travel (px/s).
pub const HEADING_MIN_SPEED: f64 = 35.0;

/// Minimum distance to destination before heading follows travel (px).
pub const HEADING_MIN_DIST: f64 = 10.0;

/// Heading rate limit (deg/s).
pub const HEADING_RATE_MAX: f64 = 480.0;

// --- Wingman: AI commands ---

/// Minimum interval between accepted move commands.
pub const WAYPOINT_MIN_INTERVAL_MS: f64 = 400.0;

/// Maximum jump of a single move command from the current position (px).
pub const WAYPOINT_MAX_JUMP: f64 = 280.0;

pub const BURST_CADENCE_DEFAULT_MS: f64 = 160.0;
pub const BURST_CADENCE_RANGE_MS: (f64, f64) = (60.0, 400.0);
pub const BURST_DURATION_DEFAULT_MS: f64 = 900.0;
pub const BURST_DURATION_RANGE_MS: (f64, f64) = (200.0, 2400.0);
pub const BURST_SPREAD_DEFAULT: f64 = 0.02;
pub const BURST_SPREAD_MAX: f64 = 0.08;

// --- Wingman: decision polling ---

/// Poll interval while the player is active.
pub const DECISION_POLL_BASE_MS: f64 = 800.0;

/// Poll interval multiplier while the player is idle.
pub const DECISION_POLL_IDLE_FACTOR: f64 = 2.0;

/// Player silence after which polling slows down.
pub const DECISION_IDLE_AFTER_MS: f64 = 1500.0;

/// Threat value reported for every damageable target.
pub const ENEMY_DEFAULT_THREAT: f64 = 0.5;

// --- Wingman: speech ---

/// Minimum time between the starts of two utterances.
pub const SPEECH_COOLDOWN_MS: f64 = 1400.0;

/// Estimated speaking time: base plus per character.
pub const SPEECH_BASE_MS: f64 = 500.0;
pub const SPEECH_MS_PER_CHAR: f64 = 55.0;

/// How long the speech bubble stays visible.
pub const PHRASE_VISIBLE_MS: f64 = 1200.0;

/// Line announced on arrival.
pub const ARRIVAL_PHRASE: &str = "Reinforcements inbound";

/// Instruction sent with the farewell request.
pub const FAREWELL_INSTRUCTION: &str = "The player has stopped firing and you are leaving. \
Reply with exactly one action of type \"say\": a short English sign-off, 2-5 words. \
Do not return any other action.";
