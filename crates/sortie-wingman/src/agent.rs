//! The wingman agent.
//!
//! Owns the wingman's body, its advisory mode and the plumbing around the
//! decision service. The host feeds it one [`WingmanContext`] per frame and
//! collects the events it publishes: spawned projectiles, speech, decision
//! requests and cancellations, activation changes.

use glam::DVec2;
use rand::Rng;
use serde_json::Value;
use sortie_core::commands::SpawnLaserRequest;
use sortie_core::constants::*;
use sortie_core::decision::*;
use sortie_core::enums::{Owner, WingmanMode};
use sortie_core::events::SimEvent;
use sortie_core::math::ang_wrap;
use sortie_core::state::WingmanView;
use sortie_core::types::{ShipState, Viewport};

use crate::actions::normalize_actions;
use crate::activation::ShotWindow;
use crate::burst::Burst;
use crate::escort::{escort_instant, EscortFilter};
use crate::poller::{poll_interval_ms, DecisionPoller};
use crate::speech::{estimate_speech_ms, VoiceQueue};
use crate::steering::{steer, update_heading, HeadingContext, SteerContext};
use crate::waypoint::WaypointPolicy;

/// Everything the wingman reads from the rest of the frame.
pub struct WingmanContext<'a> {
    pub now_ms: f64,
    pub dt: f64,
    pub viewport: Viewport,
    pub player: ShipState,
    /// Player shots fired this frame.
    pub player_shots: usize,
    pub page_visible: bool,
    /// Whether the platform speech engine is currently talking.
    pub speech_engine_busy: bool,
    /// Damageable targets reported to the decision service.
    pub enemies: &'a [EnemySnapshot],
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Farewell {
    /// Waiting for the farewell decision.
    Awaiting { request_id: u64, since_ms: f64 },
    /// Farewell line is next on the voice channel but not yet spoken.
    Speaking { since_ms: f64 },
    /// Farewell line spoken; leave at the given time.
    Leaving { at_ms: f64 },
}

#[derive(Debug)]
enum Inbox {
    Resolved(u64, Vec<Value>),
    Failed(u64),
}

#[derive(Debug, Default)]
pub struct Wingman {
    active: bool,
    mode: WingmanMode,
    pos: DVec2,
    vel: DVec2,
    /// Heading (deg, wrapped).
    heading: f64,
    escort: EscortFilter,
    waypoint: WaypointPolicy,
    burst: Option<Burst>,
    shots: ShotWindow,
    poller: DecisionPoller,
    voice: VoiceQueue,
    farewell: Option<Farewell>,
    prompt: Option<String>,
    phrase: Option<(String, f64)>,
    inbox: Vec<Inbox>,
}

impl Wingman {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn mode(&self) -> WingmanMode {
        self.mode
    }

    pub fn position(&self) -> DVec2 {
        self.pos
    }

    pub fn velocity(&self) -> DVec2 {
        self.vel
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn waypoint(&self) -> Option<DVec2> {
        self.waypoint.pending()
    }

    pub fn burst(&self) -> Option<&Burst> {
        self.burst.as_ref()
    }

    pub fn in_flight_request(&self) -> Option<u64> {
        self.poller.in_flight()
    }

    pub fn farewell_pending(&self) -> bool {
        self.farewell.is_some()
    }

    /// Style override sent with every decision request. Blank clears it.
    pub fn set_prompt(&mut self, prompt: &str) {
        let prompt = prompt.trim();
        self.prompt = (!prompt.is_empty()).then(|| prompt.to_string());
    }

    /// Queue a line directly.
    pub fn say(&mut self, text: &str) -> bool {
        self.voice.enqueue(text)
    }

    /// A decision response arrived. Applied on the next update.
    pub fn resolve(&mut self, request_id: u64, actions: Vec<Value>) {
        self.inbox.push(Inbox::Resolved(request_id, actions));
    }

    /// A decision request failed. Handled on the next update.
    pub fn fail(&mut self, request_id: u64) {
        self.inbox.push(Inbox::Failed(request_id));
    }

    /// Advance one frame.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        ctx: &WingmanContext<'_>,
        rng: &mut R,
        out: &mut Vec<SimEvent>,
    ) {
        self.drain_inbox(ctx, out);
        self.track_shots(ctx, out);
        self.run_farewell(ctx, out);

        if self.active {
            self.fly(ctx);
            self.run_burst(ctx, rng, out);
            self.maybe_poll(ctx, out);
        }

        self.run_voice(ctx, out);
    }

    pub fn view(&self, now_ms: f64) -> WingmanView {
        WingmanView {
            active: self.active,
            x: self.pos.x,
            y: self.pos.y,
            heading: self.heading,
            mode: self.mode,
            phrase: self
                .phrase
                .as_ref()
                .filter(|(_, until)| now_ms < *until)
                .map(|(text, _)| text.clone()),
        }
    }

    /// Cancel everything outstanding. Used on engine teardown.
    pub fn shutdown(&mut self, out: &mut Vec<SimEvent>) {
        if self.active {
            self.deactivate(out);
        } else if let Some(id) = self.poller.cancel() {
            out.push(SimEvent::DecisionCancelled { request_id: id });
        }
        self.voice.clear();
        self.inbox.clear();
    }

    // --- Lifecycle ---

    fn track_shots(&mut self, ctx: &WingmanContext<'_>, out: &mut Vec<SimEvent>) {
        let mut in_window = 0;
        for _ in 0..ctx.player_shots {
            in_window = self.shots.record(ctx.now_ms);
        }
        if !self.active && in_window >= SHOTS_TO_SPAWN {
            self.activate(ctx, out);
        }
    }

    fn activate(&mut self, ctx: &WingmanContext<'_>, out: &mut Vec<SimEvent>) {
        let player = ctx.player.position();
        self.active = true;
        self.mode = WingmanMode::default();
        self.pos = escort_instant(player, ctx.player.heading);
        self.vel = DVec2::ZERO;
        self.heading = ang_wrap(ctx.player.heading);
        self.escort.reset();
        self.waypoint.clear();
        self.burst = None;
        self.farewell = None;

        tracing::info!(x = self.pos.x, y = self.pos.y, "wingman activated");
        out.push(SimEvent::WingmanActivated);
        self.voice.enqueue(ARRIVAL_PHRASE);
        let prompt = self.prompt.clone();
        self.issue_request(ctx, prompt, out);
    }

    fn deactivate(&mut self, out: &mut Vec<SimEvent>) {
        if let Some(id) = self.poller.cancel() {
            out.push(SimEvent::DecisionCancelled { request_id: id });
        }
        self.active = false;
        self.mode = WingmanMode::default();
        self.vel = DVec2::ZERO;
        self.waypoint.clear();
        self.burst = None;
        self.farewell = None;
        self.voice.clear();
        tracing::info!("wingman deactivated");
        out.push(SimEvent::WingmanDeactivated);
    }

    fn run_farewell(&mut self, ctx: &WingmanContext<'_>, out: &mut Vec<SimEvent>) {
        if !self.active {
            return;
        }
        match self.farewell {
            None if self.shots.idle_ms(ctx.now_ms) >= DESPAWN_AFTER_IDLE_MS => {
                self.waypoint.clear();
                self.burst = None;
                let request_id =
                    self.issue_request(ctx, Some(FAREWELL_INSTRUCTION.to_string()), out);
                tracing::info!(request_id, "wingman requesting farewell");
                self.farewell = Some(Farewell::Awaiting {
                    request_id,
                    since_ms: ctx.now_ms,
                });
            }
            Some(Farewell::Awaiting { since_ms, .. })
                if ctx.now_ms - since_ms >= FAREWELL_TIMEOUT_MS =>
            {
                tracing::warn!("farewell decision timed out");
                self.deactivate(out);
            }
            Some(Farewell::Speaking { since_ms })
                if ctx.now_ms - since_ms >= FAREWELL_TIMEOUT_MS =>
            {
                tracing::warn!("farewell line never got the voice channel");
                self.deactivate(out);
            }
            Some(Farewell::Leaving { at_ms }) if ctx.now_ms >= at_ms => {
                self.deactivate(out);
            }
            _ => {}
        }
    }

    // --- Decisions ---

    fn issue_request(
        &mut self,
        ctx: &WingmanContext<'_>,
        prompt: Option<String>,
        out: &mut Vec<SimEvent>,
    ) -> u64 {
        let interval = poll_interval_ms(self.shots.idle_ms(ctx.now_ms));
        let (request_id, superseded) = self.poller.begin(ctx.now_ms, interval);
        if let Some(old) = superseded {
            out.push(SimEvent::DecisionCancelled { request_id: old });
        }
        let request = self.snapshot(ctx, prompt);
        out.push(SimEvent::DecisionIssued {
            request_id,
            request,
        });
        request_id
    }

    fn snapshot(&self, ctx: &WingmanContext<'_>, prompt: Option<String>) -> DecisionRequest {
        DecisionRequest {
            time: ctx.now_ms,
            dims: Dims {
                width: ctx.viewport.width,
                height: ctx.viewport.height,
            },
            player: PlayerSnapshot {
                x: ctx.player.x,
                y: ctx.player.y,
                heading: ang_wrap(ctx.player.heading),
                vx: ctx.player.vx,
                vy: ctx.player.vy,
                firing: self.shots.firing(ctx.now_ms),
            },
            wingman: WingmanSnapshot {
                x: self.pos.x,
                y: self.pos.y,
                heading: self.heading,
                mode: self.mode,
            },
            enemies: ctx.enemies.to_vec(),
            prompt,
        }
    }

    /// Polling runs only while the wingman is on screen and the page is visible.
    fn maybe_poll(&mut self, ctx: &WingmanContext<'_>, out: &mut Vec<SimEvent>) {
        if self.farewell.is_some() || !ctx.page_visible || !self.on_screen(&ctx.viewport) {
            return;
        }
        if self.poller.due(ctx.now_ms) {
            let prompt = self.prompt.clone();
            self.issue_request(ctx, prompt, out);
        }
    }

    fn on_screen(&self, viewport: &Viewport) -> bool {
        viewport.as_rect().padded(NPC_SIZE / 2.0).contains(self.pos)
    }

    fn drain_inbox(&mut self, ctx: &WingmanContext<'_>, out: &mut Vec<SimEvent>) {
        for message in std::mem::take(&mut self.inbox) {
            let (request_id, actions) = match message {
                Inbox::Resolved(id, actions) => (id, Some(actions)),
                Inbox::Failed(id) => (id, None),
            };
            if !self.poller.settle(request_id) {
                tracing::debug!(request_id, "ignoring response for request not in flight");
                continue;
            }
            match self.farewell {
                Some(Farewell::Awaiting {
                    request_id: farewell_id,
                    ..
                }) if farewell_id == request_id => self.finish_farewell(ctx, actions, out),
                _ => match actions {
                    Some(actions) if self.active => self.apply(ctx, &actions, out),
                    Some(_) => {}
                    None => tracing::debug!(request_id, "decision failed, keeping local steering"),
                },
            }
        }
    }

    fn finish_farewell(
        &mut self,
        ctx: &WingmanContext<'_>,
        actions: Option<Vec<Value>>,
        out: &mut Vec<SimEvent>,
    ) {
        let line = actions.as_deref().map(normalize_actions).and_then(|actions| {
            actions.into_iter().find_map(|a| match a {
                WingmanAction::Say { text } => Some(text),
                _ => None,
            })
        });
        match line {
            Some(text) if self.voice.preempt(&text) => {
                self.farewell = Some(Farewell::Speaking {
                    since_ms: ctx.now_ms,
                });
            }
            _ => {
                tracing::debug!("no farewell line, leaving silently");
                self.deactivate(out);
            }
        }
    }

    fn apply(&mut self, ctx: &WingmanContext<'_>, raw: &[Value], out: &mut Vec<SimEvent>) {
        for action in normalize_actions(raw) {
            match action {
                WingmanAction::SetMode { mode } => self.set_mode(mode, out),
                WingmanAction::MoveTo { x, y } => self.move_to(ctx, x, y),
                WingmanAction::FireBurst(order) => {
                    self.burst = Some(Burst::from_order(&order, ctx.now_ms));
                }
                WingmanAction::Say { text } => {
                    self.voice.enqueue(&text);
                }
                WingmanAction::Despawn => {
                    self.deactivate(out);
                    return;
                }
                WingmanAction::Engage {
                    move_to,
                    fire_burst,
                } => {
                    self.set_mode(WingmanMode::Engage, out);
                    if let Some((x, y)) = move_to {
                        self.move_to(ctx, x, y);
                    }
                    if let Some(order) = fire_burst {
                        self.burst = Some(Burst::from_order(&order, ctx.now_ms));
                    }
                }
            }
        }
    }

    fn set_mode(&mut self, mode: WingmanMode, out: &mut Vec<SimEvent>) {
        if self.mode != mode {
            self.mode = mode;
            out.push(SimEvent::WingmanModeChanged { mode });
        }
    }

    fn move_to(&mut self, ctx: &WingmanContext<'_>, x: f64, y: f64) {
        let accepted = self
            .waypoint
            .propose(DVec2::new(x, y), self.pos, &ctx.viewport, ctx.now_ms);
        if !accepted {
            tracing::trace!(x, y, "move command rate-limited");
        }
    }

    // --- Motion and fire ---

    fn fly(&mut self, ctx: &WingmanContext<'_>) {
        let escort = self
            .escort
            .update(ctx.player.position(), ctx.player.heading, ctx.dt);
        let dest = self.waypoint.pending().unwrap_or(escort);
        let step = steer(&SteerContext {
            pos: self.pos,
            vel: self.vel,
            dest,
            dt: ctx.dt,
        });
        self.pos = step.pos;
        self.vel = step.vel;
        self.heading = update_heading(&HeadingContext {
            heading: self.heading,
            vel: self.vel,
            dist_to_dest: step.dist,
            dt: ctx.dt,
        });
        self.waypoint.clear_if_reached(self.pos);
    }

    fn run_burst<R: Rng + ?Sized>(
        &mut self,
        ctx: &WingmanContext<'_>,
        rng: &mut R,
        out: &mut Vec<SimEvent>,
    ) {
        let Some(burst) = self.burst.as_mut() else {
            return;
        };
        if burst.is_over(ctx.now_ms) {
            self.burst = None;
            return;
        }
        if !burst.take_shot(ctx.now_ms) {
            return;
        }
        let aim = match self.waypoint.pending() {
            Some(wp) => (wp.y - self.pos.y).atan2(wp.x - self.pos.x),
            None => ctx.player.heading.to_radians(),
        };
        let dir = burst.jitter(aim, rng);
        out.push(SimEvent::SpawnLaser(self.shot(ctx, dir)));
    }

    fn shot(&self, ctx: &WingmanContext<'_>, dir_rad: f64) -> SpawnLaserRequest {
        let dir = DVec2::new(dir_rad.cos(), dir_rad.sin());
        let origin = self.pos + dir * (NPC_NOSE_OFFSET + NPC_NOSE_FUDGE);
        let inherit = (ctx.player.velocity() + self.vel) * (LASER_INHERIT_SHIP_VEL * NPC_INHERIT_FACTOR);
        let vel = dir * LASER_SPEED + inherit;
        SpawnLaserRequest {
            x: Some(origin.x),
            y: Some(origin.y),
            vx: Some(vel.x),
            vy: Some(vel.y),
            color: Some(NPC_COLOR.to_string()),
            owner: Some(Owner::Wingman.as_wire().to_string()),
        }
    }

    fn run_voice(&mut self, ctx: &WingmanContext<'_>, out: &mut Vec<SimEvent>) {
        if let Some(text) = self.voice.poll(ctx.now_ms, ctx.speech_engine_busy) {
            // The farewell line was preempted to the front, so it is the first
            // line out after entering `Speaking`.
            if let Some(Farewell::Speaking { .. }) = self.farewell {
                let hold = FAREWELL_GRACE_MS.max(estimate_speech_ms(&text));
                self.farewell = Some(Farewell::Leaving {
                    at_ms: ctx.now_ms + hold,
                });
            }
            self.phrase = Some((text.clone(), ctx.now_ms + PHRASE_VISIBLE_MS));
            out.push(SimEvent::Speak { text });
        }
    }
}
