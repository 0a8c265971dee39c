//! Target registry: host elements mirrored as entities in the hecs world.
//!
//! Each registered element is one entity keyed by its host key. Hit-testing
//! reads [`CachedRect`], which only follows [`LayoutRect`] while the element
//! is connected; a detached element keeps its last rectangle but is skipped.

use std::collections::HashMap;

use hecs::{Entity, World};
use rand::Rng;

use sortie_core::components::*;
use sortie_core::constants::*;
use sortie_core::decision::EnemySnapshot;
use sortie_core::enums::*;
use sortie_core::math::lerp_range;
use sortie_core::types::Rect;

/// Maps host keys to entities.
#[derive(Debug, Default)]
pub struct TargetRegistry {
    index: HashMap<String, Entity>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn entity(&self, key: &str) -> Option<Entity> {
        self.index.get(key).copied()
    }

    /// Start tracking an element. Re-registering a key replaces the old entity.
    pub fn register<R: Rng + ?Sized>(
        &mut self,
        world: &mut World,
        rng: &mut R,
        key: String,
        rect: Rect,
        kind: TargetKind,
    ) -> Entity {
        if let Some(old) = self.index.remove(&key) {
            let _ = world.despawn(old);
        }

        let entity = world.spawn((
            TargetKey(key.clone()),
            kind,
            LayoutRect(rect),
            CachedRect(rect),
            Connected(true),
        ));

        match kind {
            TargetKind::Interactive => {}
            TargetKind::Damageable => {
                let _ = world.insert_one(entity, DamageState::default());
            }
            TargetKind::Letter => {
                let letter = LetterState {
                    phase: LetterPhase::Intact,
                    params: sample_letter_params(rng),
                    phase_start_ms: 0.0,
                    heal_from: 0.0,
                    flash_until_ms: 0.0,
                };
                let _ = world.insert(entity, (DamageState::default(), letter));
            }
            TargetKind::MaskedText => {
                let _ = world.insert_one(entity, MaskGrid::default());
            }
        }

        tracing::debug!(key = %key, ?kind, "target registered");
        self.index.insert(key, entity);
        entity
    }

    pub fn update_rect(&self, world: &mut World, key: &str, rect: Rect) -> bool {
        let Some(entity) = self.entity(key) else {
            return false;
        };
        match world.get::<&mut LayoutRect>(entity) {
            Ok(mut layout) => {
                layout.0 = rect;
                true
            }
            Err(_) => false,
        }
    }

    pub fn set_connected(&self, world: &mut World, key: &str, connected: bool) -> bool {
        let Some(entity) = self.entity(key) else {
            return false;
        };
        match world.get::<&mut Connected>(entity) {
            Ok(mut c) => {
                c.0 = connected;
                true
            }
            Err(_) => false,
        }
    }

    pub fn remove(&mut self, world: &mut World, key: &str) -> bool {
        match self.index.remove(key) {
            Some(entity) => {
                let _ = world.despawn(entity);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self, world: &mut World) {
        for (_, entity) in self.index.drain() {
            let _ = world.despawn(entity);
        }
    }
}

/// Sample the randomized per-letter parameters.
pub fn sample_letter_params<R: Rng + ?Sized>(rng: &mut R) -> LetterParams {
    let drift = lerp_range(LETTER_DRIFT, rng.gen::<f64>());
    let dir = if rng.gen::<f64>() < 0.5 { -1.0 } else { 1.0 };
    let rotation = lerp_range(LETTER_ROTATION, rng.gen::<f64>()) * dir;
    let fall_threshold = FALL_THRESHOLD_BASE + rng.gen::<f64>() * FALL_THRESHOLD_JITTER;
    let fall_delay_ms = rng.gen::<f64>() * FALL_DELAY_MAX_MS;
    let respawn_delay_ms = (RESPAWN_DELAY_MS + rng.gen::<f64>() * RESPAWN_DELAY_JITTER_MS).round();
    let respawn_time_ms = (RESPAWN_TIME_MS + rng.gen::<f64>() * RESPAWN_TIME_JITTER_MS).round();

    LetterParams {
        fall_threshold,
        drift: drift * dir,
        rotation,
        fall_delay_ms,
        respawn_delay_ms,
        respawn_time_ms,
    }
}

// --- Systems over targets ---

/// Copy layout rectangles into the hit-test cache for connected elements.
pub fn refresh_rects(world: &mut World) {
    for (_entity, (layout, cached, connected)) in
        world.query_mut::<(&LayoutRect, &mut CachedRect, &Connected)>()
    {
        if connected.0 {
            cached.0 = layout.0;
        }
    }
}

/// Connected, visible interactive rectangles the ship can land on.
pub fn landing_targets(world: &World) -> Vec<(String, Rect)> {
    let mut out: Vec<(String, Rect)> = world
        .query::<(&TargetKey, &TargetKind, &CachedRect, &Connected)>()
        .iter()
        .filter(|(_, (_, kind, rect, connected))| {
            **kind == TargetKind::Interactive && connected.0 && rect.0.is_visible()
        })
        .map(|(_, (key, _, rect, _))| (key.0.clone(), rect.0))
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

/// Damageable targets reported to the decision service as enemies.
pub fn enemies(world: &World) -> Vec<EnemySnapshot> {
    let mut out: Vec<EnemySnapshot> = world
        .query::<(&TargetKey, &TargetKind, &CachedRect, &Connected)>()
        .iter()
        .filter(|(_, (_, kind, _, connected))| kind.takes_hits() && connected.0)
        .map(|(_, (key, _, rect, _))| {
            let c = rect.0.center();
            EnemySnapshot {
                id: key.0.clone(),
                x: c.x,
                y: c.y,
                size: rect.0.width.max(rect.0.height),
                visible: rect.0.is_visible(),
                threat: ENEMY_DEFAULT_THREAT,
            }
        })
        .collect();
    out.sort_by(|a, b| a.id.cmp(&b.id));
    out
}
