//! Laser layer: the authoritative projectile list.
//!
//! Player shots come from the fire trigger, everything else arrives as a
//! spawn request on the bus. Projectiles expire by distance only and pierce
//! targets: a projectile scores a hit on every frame its trail overlaps a
//! target rectangle.

use glam::DVec2;
use hecs::World;
use rand::Rng;

use sortie_core::commands::SpawnLaserRequest;
use sortie_core::components::*;
use sortie_core::constants::*;
use sortie_core::enums::*;
use sortie_core::events::SimEvent;
use sortie_core::geometry::segment_intersects_rect;
use sortie_core::math::clamp;
use sortie_core::state::{FlashView, ProjectileView};
use sortie_core::types::ShipState;

use super::particles::spawn_hit_burst;

#[derive(Debug, Default)]
pub struct LaserLayer {
    projectiles: Vec<Projectile>,
    flashes: Vec<MuzzleFlash>,
    last_fire_ms: Option<f64>,
}

impl LaserLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn flashes(&self) -> &[MuzzleFlash] {
        &self.flashes
    }

    pub fn clear(&mut self) {
        self.projectiles.clear();
        self.flashes.clear();
    }

    // --- Spawning ---

    /// Fire both cannons if the cooldown allows. `ship.heading` is wrapped.
    pub fn fire_player(&mut self, ship: &ShipState, lift: f64, now_ms: f64) -> bool {
        if self
            .last_fire_ms
            .is_some_and(|last| now_ms - last < LASER_COOLDOWN_MS)
        {
            return false;
        }
        self.last_fire_ms = Some(now_ms);

        let rad = ship.heading.to_radians();
        let dir = DVec2::new(rad.cos(), rad.sin());
        let normal = DVec2::new(-dir.y, dir.x);
        let ship_vel = ship.velocity();

        let nose = (NOSE_OFFSET + LASER_START_FWD) * lift;
        let lateral = CANNON_OFFSET * lift;
        let base = ship.position()
            + DVec2::new(LASER_ORIGIN_TWEAK_X, LASER_ORIGIN_TWEAK_Y)
            + ship_vel * LASER_SPAWN_LEAD;
        let muzzle = base + dir * nose;
        let vel = dir * LASER_SPEED + ship_vel * LASER_INHERIT_SHIP_VEL;

        for side in [1.0, -1.0] {
            self.projectiles.push(Projectile {
                pos: muzzle + normal * lateral * side,
                vel,
                dist: 0.0,
                owner: Owner::Player,
                color: None,
            });
        }
        self.flashes.push(MuzzleFlash {
            pos: muzzle,
            life: 0.0,
            max_life: FLASH_LIFE_PLAYER,
            owner: Owner::Player,
        });
        true
    }

    /// Inject an external projectile. Malformed requests are dropped.
    pub fn spawn(&mut self, request: &SpawnLaserRequest) -> bool {
        let Some(valid) = request.validate() else {
            tracing::debug!(?request, "dropped malformed spawn request");
            return false;
        };
        self.projectiles.push(Projectile {
            pos: valid.origin,
            vel: valid.velocity,
            dist: 0.0,
            owner: valid.owner,
            color: valid.color,
        });
        self.flashes.push(MuzzleFlash {
            pos: valid.origin,
            life: 0.0,
            max_life: FLASH_LIFE_WINGMAN,
            owner: valid.owner,
        });
        true
    }

    // --- Frame ---

    /// Integrate projectiles and flashes. A projectile whose traveled
    /// distance reaches the max range is removed in the same pass.
    pub fn advance(&mut self, dt: f64) {
        self.projectiles.retain_mut(|p| {
            p.pos += p.vel * dt;
            p.dist += p.vel.length() * dt;
            p.dist < LASER_MAX_DIST
        });
        self.flashes.retain_mut(|f| {
            f.life += dt;
            f.life < f.max_life
        });
    }

    /// Trail segment of every live projectile.
    pub fn lines(&self) -> Vec<SimEvent> {
        self.projectiles
            .iter()
            .map(|p| {
                let (tail, head) = trail(p);
                SimEvent::LaserLine {
                    x1: tail.x,
                    y1: tail.y,
                    x2: head.x,
                    y2: head.y,
                    alpha: trail_alpha(p),
                }
            })
            .collect()
    }

    /// Hit-test every trail against connected hittable targets.
    pub fn collide<R: Rng + ?Sized>(
        &self,
        world: &mut World,
        rng: &mut R,
        particles: &mut Vec<Particle>,
        now_ms: f64,
        out: &mut Vec<SimEvent>,
    ) {
        if self.projectiles.is_empty() {
            return;
        }

        for (_entity, (key, kind, rect, connected, damage, mut letter)) in world.query_mut::<(
            &TargetKey,
            &TargetKind,
            &CachedRect,
            &Connected,
            &mut DamageState,
            Option<&mut LetterState>,
        )>() {
            if !kind.takes_hits() || !connected.0 || !rect.0.is_visible() {
                continue;
            }
            // Hidden letters cannot be hit.
            if letter
                .as_ref()
                .is_some_and(|l| matches!(l.phase, LetterPhase::Gone | LetterPhase::Healing))
            {
                continue;
            }

            for p in &self.projectiles {
                let (tail, head) = trail(p);
                if !segment_intersects_rect(tail, head, &rect.0) {
                    continue;
                }

                let hit = rect.0.normalized(head);
                damage.damage = (damage.damage + DAMAGE_ADD_PER_HIT).min(1.0);
                damage.last_hit_ms = Some(now_ms);
                damage.hit_x = hit.x;
                damage.hit_y = hit.y;
                if let Some(letter) = letter.as_deref_mut() {
                    letter.flash_until_ms = now_ms + LETTER_HIT_FLASH_MS;
                }

                let normal = -p.vel.normalize_or_zero();
                spawn_hit_burst(particles, rng, head, normal);

                out.push(SimEvent::TargetHit {
                    key: key.0.clone(),
                    damage: damage.damage,
                    hit_x: hit.x,
                    hit_y: hit.y,
                    owner: p.owner,
                });
            }
        }
    }

    // --- Views ---

    pub fn projectile_views(&self) -> Vec<ProjectileView> {
        self.projectiles
            .iter()
            .map(|p| {
                let (tail, head) = trail(p);
                ProjectileView {
                    tail_x: tail.x,
                    tail_y: tail.y,
                    head_x: head.x,
                    head_y: head.y,
                    alpha: trail_alpha(p),
                    owner: p.owner,
                    color: p.color.clone(),
                }
            })
            .collect()
    }

    pub fn flash_views(&self) -> Vec<FlashView> {
        self.flashes
            .iter()
            .map(|f| {
                let a = clamp((f.max_life - f.life) / FLASH_LIFE_PLAYER, 0.0, 1.0);
                FlashView {
                    x: f.pos.x,
                    y: f.pos.y,
                    radius: 10.0 + (1.0 - a) * 10.0,
                    alpha: a,
                    owner: f.owner,
                }
            })
            .collect()
    }
}

/// Tail and head of a projectile's trail. The tail trails the head along the
/// velocity by a fixed fraction of max range, never past the origin.
pub fn trail(p: &Projectile) -> (DVec2, DVec2) {
    let len = (LASER_MAX_DIST * LASER_FADE_TAIL).min(p.dist);
    let tail = p.pos - p.vel.normalize_or_zero() * len;
    (tail, p.pos)
}

/// Trail opacity, fading linearly over the range.
pub fn trail_alpha(p: &Projectile) -> f64 {
    clamp(1.0 - p.dist / LASER_MAX_DIST, 0.0, 1.0)
}
