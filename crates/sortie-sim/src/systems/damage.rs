//! Damage system: letter break/heal cycle and plain target regeneration.
//!
//! Hits only ever raise damage (in the laser layer). This system is the
//! only place damage goes back down.

use std::f64::consts::FRAC_PI_2;

use hecs::World;

use sortie_core::components::*;
use sortie_core::constants::*;
use sortie_core::enums::LetterPhase;
use sortie_core::events::SimEvent;
use sortie_core::math::clamp;

pub fn run(world: &mut World, now_ms: f64, dt: f64, out: &mut Vec<SimEvent>) {
    for (_entity, (key, damage, letter)) in
        world.query_mut::<(&TargetKey, &mut DamageState, Option<&mut LetterState>)>()
    {
        match letter {
            Some(letter) => advance_letter(&key.0, damage, letter, now_ms, out),
            None => regenerate(damage, now_ms, dt),
        }
    }
}

/// Plain damageable targets heal at a fixed rate after a quiet period.
pub fn regenerate(damage: &mut DamageState, now_ms: f64, dt: f64) {
    if damage.damage <= 0.0 {
        return;
    }
    let quiet = damage
        .last_hit_ms
        .map_or(true, |t| now_ms - t >= DAMAGE_REGEN_DELAY_MS);
    if quiet {
        damage.damage = (damage.damage - DAMAGE_REGEN_PER_SEC * dt).max(0.0);
    }
}

/// Step a letter through intact → falling → gone → healing → respawning.
pub fn advance_letter(
    key: &str,
    damage: &mut DamageState,
    letter: &mut LetterState,
    now_ms: f64,
    out: &mut Vec<SimEvent>,
) {
    let elapsed = now_ms - letter.phase_start_ms;

    match letter.phase {
        LetterPhase::Intact | LetterPhase::Respawning => {
            if damage.damage >= letter.params.fall_threshold {
                letter.phase = LetterPhase::Falling;
                letter.phase_start_ms = now_ms;
                tracing::debug!(key, damage = damage.damage, "letter fell");
                out.push(SimEvent::LetterFell {
                    key: key.to_string(),
                });
            } else if letter.phase == LetterPhase::Respawning && elapsed >= LETTER_RESPAWN_ANIM_MS {
                letter.phase = LetterPhase::Intact;
                letter.phase_start_ms = now_ms;
            }
        }
        LetterPhase::Falling => {
            if elapsed >= letter.params.fall_delay_ms + LETTER_FALL_ANIM_MS {
                letter.phase = LetterPhase::Gone;
                letter.phase_start_ms = now_ms;
            }
        }
        LetterPhase::Gone => {
            if elapsed >= letter.params.respawn_delay_ms {
                letter.phase = LetterPhase::Healing;
                letter.phase_start_ms = now_ms;
                letter.heal_from = damage.damage;
            }
        }
        LetterPhase::Healing => {
            let t = if letter.params.respawn_time_ms > 0.0 {
                clamp(elapsed / letter.params.respawn_time_ms, 0.0, 1.0)
            } else {
                1.0
            };
            // Ease-out sine toward zero.
            damage.damage = clamp(letter.heal_from * (1.0 - (t * FRAC_PI_2).sin()), 0.0, 1.0);
            if t >= 1.0 {
                damage.damage = 0.0;
                letter.phase = LetterPhase::Respawning;
                letter.phase_start_ms = now_ms;
                tracing::debug!(key, "letter respawned");
                out.push(SimEvent::LetterRespawned {
                    key: key.to_string(),
                });
            }
        }
    }
}
