//! Frame-scoped event bus.
//!
//! Stages publish typed events; later stages in the same frame read them by
//! kind. Producers never hold references to consumers. The bus is drained
//! into the snapshot at the end of every frame.

use sortie_core::commands::SpawnLaserRequest;
use sortie_core::events::SimEvent;
use sortie_core::math::ang_wrap;
use sortie_core::types::ShipState;

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<SimEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn publish_all(&mut self, events: impl IntoIterator<Item = SimEvent>) {
        self.events.extend(events);
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Latest ship broadcast this frame, heading wrapped to [0, 360).
    pub fn ship_state(&self) -> Option<ShipState> {
        self.events.iter().rev().find_map(|e| match e {
            SimEvent::ShipState {
                x,
                y,
                heading,
                vx,
                vy,
            } => Some(ShipState {
                x: *x,
                y: *y,
                heading: ang_wrap(*heading),
                vx: *vx,
                vy: *vy,
            }),
            _ => None,
        })
    }

    /// Number of player trigger pulls this frame.
    pub fn player_shots(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SimEvent::LaserFired { .. }))
            .count()
    }

    /// Projectile spawn requests published this frame.
    pub fn spawn_requests(&self) -> impl Iterator<Item = &SpawnLaserRequest> {
        self.events.iter().filter_map(|e| match e {
            SimEvent::SpawnLaser(req) => Some(req),
            _ => None,
        })
    }

    /// Trail segments of live projectiles as `(x1, y1, x2, y2, alpha)`.
    pub fn laser_lines(&self) -> impl Iterator<Item = (f64, f64, f64, f64, f64)> + '_ {
        self.events.iter().filter_map(|e| match e {
            SimEvent::LaserLine {
                x1,
                y1,
                x2,
                y2,
                alpha,
            } => Some((*x1, *y1, *x2, *y2, *alpha)),
            _ => None,
        })
    }

    /// Take host-visible events, dropping internal ones.
    pub fn drain_host(&mut self) -> Vec<SimEvent> {
        self.events.drain(..).filter(|e| !e.is_internal()).collect()
    }
}
