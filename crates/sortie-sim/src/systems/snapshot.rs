//! Snapshot system: builds the complete [`FrameSnapshot`] for a frame.
//!
//! Read-only: never modifies the world or any layer.

use hecs::World;

use sortie_core::components::*;
use sortie_core::constants::*;
use sortie_core::enums::*;
use sortie_core::events::SimEvent;
use sortie_core::math::clamp;
use sortie_core::state::*;
use sortie_core::types::{SimTime, Viewport};

use super::lasers::LaserLayer;
use super::particles::ParticleField;
use crate::ship::ShipController;

/// Everything the snapshot reads besides the world.
pub struct SnapshotSources<'a> {
    pub time: SimTime,
    pub paused: bool,
    pub viewport: Viewport,
    pub ship: &'a ShipController,
    pub lasers: &'a LaserLayer,
    pub particles: &'a ParticleField,
    pub wingman: WingmanView,
}

pub fn build_snapshot(
    world: &World,
    src: SnapshotSources<'_>,
    events: Vec<SimEvent>,
) -> FrameSnapshot {
    let now_ms = src.time.now_ms;
    FrameSnapshot {
        time: src.time,
        paused: src.paused,
        viewport: src.viewport,
        ship: src.ship.view(),
        projectiles: src.lasers.projectile_views(),
        flashes: src.lasers.flash_views(),
        sparks: src.particles.spark_views(),
        fragments: src.particles.fragment_views(),
        targets: build_targets(world, now_ms),
        masked_text: build_masked_text(world),
        wingman: src.wingman,
        events,
    }
}

/// One view per registered target, ordered by key.
fn build_targets(world: &World, now_ms: f64) -> Vec<TargetView> {
    let mut targets: Vec<TargetView> = world
        .query::<(
            &TargetKey,
            &TargetKind,
            &CachedRect,
            &Connected,
            Option<&DamageState>,
            Option<&LetterState>,
        )>()
        .iter()
        .map(|(_, (key, kind, rect, connected, damage, letter))| {
            let damage = damage.copied().unwrap_or_default();
            TargetView {
                key: key.0.clone(),
                kind: *kind,
                rect: rect.0,
                connected: connected.0,
                damage: damage.damage,
                hit_x: damage.hit_x,
                hit_y: damage.hit_y,
                letter: letter.map(|l| letter_view(l, now_ms)),
            }
        })
        .collect();
    targets.sort_by(|a, b| a.key.cmp(&b.key));
    targets
}

fn letter_view(letter: &LetterState, now_ms: f64) -> LetterView {
    let elapsed = now_ms - letter.phase_start_ms;
    let fall_progress = match letter.phase {
        LetterPhase::Falling => clamp(
            (elapsed - letter.params.fall_delay_ms) / LETTER_FALL_ANIM_MS,
            0.0,
            1.0,
        ),
        LetterPhase::Gone | LetterPhase::Healing => 1.0,
        LetterPhase::Intact | LetterPhase::Respawning => 0.0,
    };
    let respawn_progress = match letter.phase {
        LetterPhase::Respawning => clamp(elapsed / LETTER_RESPAWN_ANIM_MS, 0.0, 1.0),
        _ => 0.0,
    };
    LetterView {
        phase: letter.phase,
        flashing: now_ms < letter.flash_until_ms,
        fall_progress,
        respawn_progress,
        drift: letter.params.drift,
        rotation: letter.params.rotation,
    }
}

fn build_masked_text(world: &World) -> Vec<MaskedTextView> {
    let mut views: Vec<MaskedTextView> = world
        .query::<(&TargetKey, &MaskGrid)>()
        .iter()
        .map(|(_, (key, grid))| MaskedTextView {
            key: key.0.clone(),
            cols: grid.cols,
            rows: grid.rows,
            health: grid.health.clone(),
        })
        .collect();
    views.sort_by(|a, b| a.key.cmp(&b.key));
    views
}
