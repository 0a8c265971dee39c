//! Simulation engine: the per-frame scheduler.
//!
//! `SimulationEngine` owns the hecs world of targets, the ship, the laser
//! layer, the particle field and the wingman. Each frame it drains queued
//! input commands, runs the stages in a fixed order over a frame-scoped
//! event bus, and produces a `FrameSnapshot`. Completely headless and
//! deterministic for a given seed and input sequence.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};

use glam::DVec2;
use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use sortie_core::commands::InputCommand;
use sortie_core::constants::{MAX_FRAME_DT, MIN_FRAME_DT};
use sortie_core::events::SimEvent;
use sortie_core::state::FrameSnapshot;
use sortie_core::types::{SimTime, Viewport};
use sortie_wingman::{Wingman, WingmanContext};

use crate::bus::EventBus;
use crate::ship::{ShipController, ShipFrame};
use crate::systems;
use crate::systems::lasers::LaserLayer;
use crate::systems::masked_text::Stroke;
use crate::systems::particles::ParticleField;
use crate::systems::snapshot::SnapshotSources;
use crate::targets::{self, TargetRegistry};

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed + same inputs = same frames.
    pub seed: u64,
    /// Initial viewport. The ship starts at its center.
    pub viewport: Viewport,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            viewport: Viewport::default(),
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    targets: TargetRegistry,
    time: SimTime,
    paused: bool,
    viewport: Viewport,
    rng: ChaCha8Rng,
    command_queue: VecDeque<InputCommand>,
    bus: EventBus,

    ship: ShipController,
    lasers: LaserLayer,
    particles: ParticleField,
    wingman: Wingman,

    fire_requested: bool,
    page_visible: bool,
    speech_engine_busy: bool,
}

impl SimulationEngine {
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            targets: TargetRegistry::new(),
            time: SimTime::default(),
            paused: false,
            viewport: config.viewport,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            bus: EventBus::new(),
            ship: ShipController::new(&config.viewport),
            lasers: LaserLayer::new(),
            particles: ParticleField::new(),
            wingman: Wingman::new(),
            fire_requested: false,
            page_visible: true,
            speech_engine_busy: false,
        }
    }

    /// Queue an input command for processing at the next frame boundary.
    pub fn queue_command(&mut self, command: InputCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = InputCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance one display frame of `dt` seconds (clamped) and return the
    /// resulting snapshot. While paused, commands are still applied but
    /// simulation time stands still.
    pub fn tick(&mut self, dt: f64) -> FrameSnapshot {
        let dt = if dt.is_finite() {
            dt.clamp(MIN_FRAME_DT, MAX_FRAME_DT)
        } else {
            MIN_FRAME_DT
        };

        self.process_commands();

        if !self.paused {
            self.time.advance(dt);
            self.run_stages(dt);
        }
        self.fire_requested = false;

        let events = self.bus.drain_host();
        systems::snapshot::build_snapshot(
            &self.world,
            SnapshotSources {
                time: self.time,
                paused: self.paused,
                viewport: self.viewport,
                ship: &self.ship,
                lasers: &self.lasers,
                particles: &self.particles,
                wingman: self.wingman.view(self.time.now_ms),
            },
            events,
        )
    }

    /// Cancel outstanding work and drop transient state. Returns the
    /// host-visible events produced while tearing down (request
    /// cancellations, wingman deactivation).
    pub fn shutdown(&mut self) -> Vec<SimEvent> {
        let mut out = Vec::new();
        self.wingman.shutdown(&mut out);
        self.lasers.clear();
        self.particles.clear();
        self.command_queue.clear();
        self.bus.publish_all(out);
        tracing::info!(tick = self.time.tick, "simulation shut down");
        self.bus.drain_host()
    }

    // --- Accessors ---

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn targets(&self) -> &TargetRegistry {
        &self.targets
    }

    pub fn ship(&self) -> &ShipController {
        &self.ship
    }

    pub fn lasers(&self) -> &LaserLayer {
        &self.lasers
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn wingman(&self) -> &Wingman {
        &self.wingman
    }

    // --- Commands ---

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: InputCommand) {
        match command {
            InputCommand::PointerMove { x, y } => {
                if x.is_finite() && y.is_finite() {
                    self.ship.pointer_move(DVec2::new(x, y));
                }
            }
            InputCommand::Fire => {
                if !self.paused {
                    self.fire_requested = true;
                }
            }
            InputCommand::SpawnLaser(request) => {
                self.bus.publish(SimEvent::SpawnLaser(request));
            }
            InputCommand::Resize { width, height } => {
                if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
                    self.viewport = Viewport::new(width, height);
                    self.ship.request_rescan();
                }
            }
            InputCommand::RegisterTarget { key, rect, kind } => {
                self.targets
                    .register(&mut self.world, &mut self.rng, key, rect, kind);
            }
            InputCommand::UpdateTargetRect { key, rect } => {
                self.targets.update_rect(&mut self.world, &key, rect);
            }
            InputCommand::SetTargetConnected { key, connected } => {
                self.targets.set_connected(&mut self.world, &key, connected);
            }
            InputCommand::RemoveTarget { key } => {
                self.targets.remove(&mut self.world, &key);
            }
            InputCommand::SetPageVisible { visible } => {
                self.page_visible = visible;
            }
            InputCommand::SetWingmanPrompt { prompt } => {
                self.wingman.set_prompt(&prompt);
            }
            InputCommand::WingmanSay { text } => {
                self.wingman.say(&text);
            }
            InputCommand::DecisionResolved {
                request_id,
                actions,
            } => {
                self.wingman.resolve(request_id, actions);
            }
            InputCommand::DecisionFailed { request_id } => {
                self.wingman.fail(request_id);
            }
            InputCommand::SpeechEngine { speaking } => {
                self.speech_engine_busy = speaking;
            }
            InputCommand::Pause => {
                if !self.paused {
                    tracing::info!("simulation paused");
                }
                self.paused = true;
            }
            InputCommand::Resume => {
                if self.paused {
                    tracing::info!("simulation resumed");
                }
                self.paused = false;
            }
        }
    }

    // --- Stages ---

    /// Run all stages in order. A panicking stage is logged and skipped for
    /// this frame; the rest still run.
    fn run_stages(&mut self, dt: f64) {
        let now_ms = self.time.now_ms;

        // 1. Layout + ship + player trigger
        guarded("ship", || {
            targets::refresh_rects(&mut self.world);
            if self.ship.scan_due(now_ms) {
                let landing = targets::landing_targets(&self.world);
                self.ship.set_landing_targets(landing, now_ms);
            }

            let mut out = Vec::new();
            self.ship.update(&ShipFrame { now_ms, dt }, &mut out);
            self.bus.publish_all(out);

            if self.fire_requested {
                let state = self.bus.ship_state().unwrap_or_else(|| self.ship.state());
                if self.lasers.fire_player(&state, self.ship.lift(), now_ms) {
                    self.bus.publish(SimEvent::LaserFired { time_ms: now_ms });
                }
            }
        });

        // 2. Wingman
        guarded("wingman", || {
            let enemies = targets::enemies(&self.world);
            let ctx = WingmanContext {
                now_ms,
                dt,
                viewport: self.viewport,
                player: self.bus.ship_state().unwrap_or_else(|| self.ship.state()),
                player_shots: self.bus.player_shots(),
                page_visible: self.page_visible,
                speech_engine_busy: self.speech_engine_busy,
                enemies: &enemies,
            };
            let mut out = Vec::new();
            self.wingman.update(&ctx, &mut self.rng, &mut out);
            self.bus.publish_all(out);
        });

        // 3. Lasers: spawn requests, integration, trails, hits
        guarded("lasers", || {
            let requests: Vec<_> = self.bus.spawn_requests().cloned().collect();
            for request in &requests {
                self.lasers.spawn(request);
            }
            self.lasers.advance(dt);
            self.bus.publish_all(self.lasers.lines());

            let mut out = Vec::new();
            self.lasers.collide(
                &mut self.world,
                &mut self.rng,
                &mut self.particles.hits,
                now_ms,
                &mut out,
            );
            self.bus.publish_all(out);
        });

        // 4. Letters + regeneration
        guarded("damage", || {
            let mut out = Vec::new();
            systems::damage::run(&mut self.world, now_ms, dt, &mut out);
            self.bus.publish_all(out);
        });

        // 5. Masked text
        guarded("masked_text", || {
            let strokes: Vec<Stroke> = self
                .bus
                .laser_lines()
                .map(|(x1, y1, x2, y2, alpha)| Stroke {
                    from: DVec2::new(x1, y1),
                    to: DVec2::new(x2, y2),
                    alpha,
                })
                .collect();
            systems::masked_text::run(
                &mut self.world,
                &mut self.rng,
                &strokes,
                &mut self.particles.debris,
                dt,
            );
        });

        // 6. Particles
        guarded("particles", || self.particles.run(dt));
    }
}

/// Run one stage, containing any panic to this frame.
pub(crate) fn guarded(stage: &'static str, f: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        tracing::error!(stage, "stage panicked; skipped for this frame");
    }
}
