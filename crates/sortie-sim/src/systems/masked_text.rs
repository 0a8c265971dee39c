//! Masked text: a health grid per text block, carved by passing lasers.
//!
//! Every laser trail published this frame is culled against the block,
//! sampled along its length, and each sample removes a radial splat from
//! the grid. Every third sample of a trail throws debris. The whole grid
//! heals a little each frame by blending toward full health.

use glam::DVec2;
use hecs::World;
use rand::Rng;

use sortie_core::components::*;
use sortie_core::constants::*;
use sortie_core::types::Rect;

use super::particles::spawn_text_debris;

/// A laser trail: tail, head and opacity.
#[derive(Debug, Clone, Copy)]
pub struct Stroke {
    pub from: DVec2,
    pub to: DVec2,
    pub alpha: f64,
}

pub fn run<R: Rng + ?Sized>(
    world: &mut World,
    rng: &mut R,
    strokes: &[Stroke],
    debris: &mut Vec<Particle>,
    dt: f64,
) {
    for (_entity, (rect, connected, grid)) in
        world.query_mut::<(&CachedRect, &Connected, &mut MaskGrid)>()
    {
        fit_grid(grid, &rect.0);
        regenerate(grid, dt);
        if !connected.0 {
            continue;
        }
        for stroke in strokes {
            carve(grid, &rect.0, stroke, rng, debris);
        }
    }
}

/// Rebuild the grid at full health when the block size changes.
pub fn fit_grid(grid: &mut MaskGrid, rect: &Rect) {
    let cols = (rect.width.max(0.0) / MASK_CELL).ceil() as usize;
    let rows = (rect.height.max(0.0) / MASK_CELL).ceil() as usize;
    if grid.cols != cols || grid.rows != rows || grid.health.len() != cols * rows {
        grid.cols = cols;
        grid.rows = rows;
        grid.health = vec![1.0; cols * rows];
    }
}

/// Blend every cell toward full health.
pub fn regenerate(grid: &mut MaskGrid, dt: f64) {
    let k = (MASK_REGEN_SPEED * dt).min(1.0);
    if k <= 0.0 {
        return;
    }
    for h in &mut grid.health {
        *h += (1.0 - *h) * k;
    }
}

/// Whether both endpoints lie beyond the same side of the grown rectangle.
pub fn culled(rect: &Rect, a: DVec2, b: DVec2) -> bool {
    let m = MASK_CULL_MARGIN;
    (a.x < rect.left - m && b.x < rect.left - m)
        || (a.x > rect.right() + m && b.x > rect.right() + m)
        || (a.y < rect.top - m && b.y < rect.top - m)
        || (a.y > rect.bottom() + m && b.y > rect.bottom() + m)
}

/// Sample a stroke every few pixels and splat each sample into the grid.
pub fn carve<R: Rng + ?Sized>(
    grid: &mut MaskGrid,
    rect: &Rect,
    stroke: &Stroke,
    rng: &mut R,
    debris: &mut Vec<Particle>,
) {
    if culled(rect, stroke.from, stroke.to) {
        return;
    }

    let delta = stroke.to - stroke.from;
    let steps = ((delta.length() / MASK_SAMPLE_STEP).floor() as usize).max(1);
    let strength = MASK_DAMAGE_STRENGTH * (0.6 + stroke.alpha * 0.7);
    let big = stroke.alpha > MASK_BIG_HIT_THRESHOLD;
    let origin = DVec2::new(rect.left, rect.top);

    for i in 0..=steps {
        let p = stroke.from + delta * (i as f64 / steps as f64);
        let radius = MASK_DAMAGE_RADIUS * (0.85 + rng.gen::<f64>() * 0.3);
        splat(grid, p - origin, radius, strength);
        if i % 3 == 0 {
            spawn_text_debris(debris, rng, p, big);
        }
    }
}

/// Remove a radial splat centred at `local` (block coordinates). Each cell
/// keeps `1 - strength * falloff` of its health.
pub fn splat(grid: &mut MaskGrid, local: DVec2, radius: f64, strength: f64) {
    if grid.cols == 0 || grid.rows == 0 || radius <= 0.0 {
        return;
    }

    let col_lo = ((local.x - radius) / MASK_CELL).floor().max(0.0) as usize;
    let row_lo = ((local.y - radius) / MASK_CELL).floor().max(0.0) as usize;
    let col_hi = ((local.x + radius) / MASK_CELL).ceil();
    let row_hi = ((local.y + radius) / MASK_CELL).ceil();
    if col_hi < 0.0 || row_hi < 0.0 {
        return;
    }
    let col_hi = (col_hi as usize).min(grid.cols);
    let row_hi = (row_hi as usize).min(grid.rows);

    for row in row_lo..row_hi {
        for col in col_lo..col_hi {
            let center = DVec2::new(
                (col as f64 + 0.5) * MASK_CELL,
                (row as f64 + 0.5) * MASK_CELL,
            );
            let d = center.distance(local);
            if d >= radius {
                continue;
            }
            let cut = strength * (1.0 - d / radius);
            let h = &mut grid.health[row * grid.cols + col];
            *h = (*h * (1.0 - cut)).clamp(0.0, 1.0);
        }
    }
}

/// Mean health of a grid, 1.0 when empty.
pub fn mean_health(grid: &MaskGrid) -> f64 {
    if grid.health.is_empty() {
        return 1.0;
    }
    grid.health.iter().sum::<f64>() / grid.health.len() as f64
}
