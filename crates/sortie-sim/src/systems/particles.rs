//! Particle system: hit bursts, text debris and their integration.
//!
//! Purely visual. Particles live in flat vectors owned by [`ParticleField`];
//! nothing else reads them except the snapshot builder.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;

use sortie_core::components::Particle;
use sortie_core::constants::*;
use sortie_core::enums::ParticleKind;
use sortie_core::math::{clamp, lerp_range};
use sortie_core::state::{FragmentView, SparkView};

#[derive(Debug, Default)]
pub struct ParticleField {
    /// Hit sparks and fragments from projectile impacts.
    pub hits: Vec<Particle>,
    /// Sparks and shards knocked out of masked text.
    pub debris: Vec<Particle>,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.hits.len() + self.debris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty() && self.debris.is_empty()
    }

    pub fn clear(&mut self) {
        self.hits.clear();
        self.debris.clear();
    }

    pub fn run(&mut self, dt: f64) {
        step(&mut self.hits, dt);
        step(&mut self.debris, dt);
    }

    pub fn spark_views(&self) -> Vec<SparkView> {
        let hit = self
            .hits
            .iter()
            .filter(|p| p.kind == ParticleKind::Spark)
            .map(|p| {
                let a = alpha(p);
                SparkView {
                    x: p.pos.x,
                    y: p.pos.y,
                    radius: p.size * (1.0 + a),
                    alpha: a,
                }
            });
        let debris = self
            .debris
            .iter()
            .filter(|p| p.kind == ParticleKind::Spark)
            .map(|p| SparkView {
                x: p.pos.x,
                y: p.pos.y,
                radius: p.size,
                alpha: alpha(p),
            });
        hit.chain(debris).collect()
    }

    pub fn fragment_views(&self) -> Vec<FragmentView> {
        self.hits
            .iter()
            .chain(self.debris.iter())
            .filter(|p| p.kind == ParticleKind::Fragment)
            .map(|p| FragmentView {
                x: p.pos.x,
                y: p.pos.y,
                angle: p.angle,
                size: p.size,
                alpha: alpha(p),
            })
            .collect()
    }
}

/// Remaining-life fraction in [0, 1].
pub fn alpha(p: &Particle) -> f64 {
    if p.max_life <= 0.0 {
        return 0.0;
    }
    clamp(1.0 - p.life / p.max_life, 0.0, 1.0)
}

/// Spawn a spark + fragment burst at a projectile hit, fanned around `normal`.
pub fn spawn_hit_burst<R: Rng + ?Sized>(
    out: &mut Vec<Particle>,
    rng: &mut R,
    at: DVec2,
    normal: DVec2,
) {
    let base = normal.y.atan2(normal.x);

    let sparks = lerp_range(SPARKS_PER_HIT, rng.gen::<f64>()).floor() as usize;
    for _ in 0..sparks {
        let ang = base + (rng.gen::<f64>() - 0.5) * SPARK_SPREAD_RAD;
        let speed = lerp_range(SPARK_SPEED, rng.gen::<f64>());
        out.push(Particle {
            kind: ParticleKind::Spark,
            pos: at,
            vel: DVec2::new(ang.cos(), ang.sin()) * speed,
            life: 0.0,
            max_life: lerp_range(SPARK_LIFE, rng.gen::<f64>()),
            angle: 0.0,
            spin: 0.0,
            size: 2.0,
            gravity: GRAVITY * SPARK_GRAVITY_SCALE,
            drag: 1.0,
        });
    }

    let frags = lerp_range(FRAGS_PER_HIT, rng.gen::<f64>()).floor() as usize;
    for _ in 0..frags {
        let ang = base + (rng.gen::<f64>() - 0.5) * FRAG_SPREAD_RAD;
        let speed = lerp_range(FRAG_SPEED, rng.gen::<f64>());
        out.push(Particle {
            kind: ParticleKind::Fragment,
            pos: at,
            vel: DVec2::new(ang.cos(), ang.sin()) * speed,
            life: 0.0,
            max_life: lerp_range(FRAG_LIFE, rng.gen::<f64>()),
            angle: rng.gen::<f64>() * TAU,
            spin: lerp_range(FRAG_SPIN, rng.gen::<f64>()),
            size: lerp_range(FRAG_SIZE, rng.gen::<f64>()),
            gravity: GRAVITY * FRAG_GRAVITY_SCALE,
            drag: 1.0,
        });
    }
}

/// Spawn text debris in every direction. Big hits throw more.
pub fn spawn_text_debris<R: Rng + ?Sized>(
    out: &mut Vec<Particle>,
    rng: &mut R,
    at: DVec2,
    big: bool,
) {
    let sparks = if big {
        (MASK_SPARKS_PER_SAMPLE as f64 * 1.4).ceil() as usize
    } else {
        MASK_SPARKS_PER_SAMPLE
    };
    for _ in 0..sparks {
        let ang = rng.gen::<f64>() * TAU;
        let speed = lerp_range(DEBRIS_SPARK_SPEED, rng.gen::<f64>());
        out.push(Particle {
            kind: ParticleKind::Spark,
            pos: at,
            vel: DVec2::new(ang.cos(), ang.sin()) * speed,
            life: 0.0,
            max_life: lerp_range(DEBRIS_SPARK_LIFE, rng.gen::<f64>()),
            angle: 0.0,
            spin: 0.0,
            size: lerp_range(DEBRIS_SPARK_SIZE, rng.gen::<f64>()),
            gravity: DEBRIS_GRAVITY,
            drag: DEBRIS_DRAG,
        });
    }

    let shards = if big {
        MASK_SHARDS_PER_SAMPLE * 2
    } else {
        MASK_SHARDS_PER_SAMPLE
    };
    for _ in 0..shards {
        let ang = rng.gen::<f64>() * TAU;
        let speed = lerp_range(DEBRIS_SHARD_SPEED, rng.gen::<f64>());
        out.push(Particle {
            kind: ParticleKind::Fragment,
            pos: at,
            vel: DVec2::new(ang.cos(), ang.sin()) * speed,
            life: 0.0,
            max_life: lerp_range(DEBRIS_SHARD_LIFE, rng.gen::<f64>()),
            angle: rng.gen::<f64>() * std::f64::consts::PI,
            spin: (rng.gen::<f64>() * 2.0 - 1.0) * DEBRIS_SHARD_SPIN,
            size: lerp_range(DEBRIS_SHARD_SIZE, rng.gen::<f64>()),
            gravity: DEBRIS_GRAVITY,
            drag: DEBRIS_DRAG,
        });
    }

    if out.len() > MASK_MAX_DEBRIS {
        let excess = out.len() - MASK_MAX_DEBRIS;
        out.drain(..excess);
    }
}

/// Age, cull and integrate particles. Expired particles are removed before
/// they move.
pub fn step(particles: &mut Vec<Particle>, dt: f64) {
    particles.retain_mut(|p| {
        p.life += dt;
        if p.life >= p.max_life {
            return false;
        }
        p.vel.y += p.gravity * dt;
        if p.drag < 1.0 {
            p.vel *= p.drag.powf(dt * 60.0);
        }
        p.pos += p.vel * dt;
        p.angle += p.spin * dt;
        true
    });
}
