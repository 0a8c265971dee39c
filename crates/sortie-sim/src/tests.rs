//! Tests for the simulation engine, ship controller, laser layer, damage
//! cycle, masked text and the wingman wiring.

use glam::DVec2;
use serde_json::json;

use sortie_core::commands::{InputCommand, SpawnLaserRequest};
use sortie_core::components::{LetterState, MaskGrid};
use sortie_core::constants::*;
use sortie_core::enums::*;
use sortie_core::events::SimEvent;
use sortie_core::state::FrameSnapshot;
use sortie_core::types::Rect;

use crate::bus::EventBus;
use crate::engine::{SimConfig, SimulationEngine};
use crate::ship::LandingTracker;
use crate::systems::masked_text;

const DT: f64 = 1.0 / 60.0;

fn new_engine() -> SimulationEngine {
    SimulationEngine::new(SimConfig::default())
}

fn register(key: &str, rect: Rect, kind: TargetKind) -> InputCommand {
    InputCommand::RegisterTarget {
        key: key.to_string(),
        rect,
        kind,
    }
}

fn laser(x: f64, y: f64, vx: f64, vy: f64) -> InputCommand {
    InputCommand::SpawnLaser(SpawnLaserRequest {
        x: Some(x),
        y: Some(y),
        vx: Some(vx),
        vy: Some(vy),
        ..Default::default()
    })
}

fn run(engine: &mut SimulationEngine, frames: usize) -> Vec<FrameSnapshot> {
    (0..frames).map(|_| engine.tick(DT)).collect()
}

fn target_damage(snap: &FrameSnapshot, key: &str) -> f64 {
    snap.targets
        .iter()
        .find(|t| t.key == key)
        .map(|t| t.damage)
        .expect("target in snapshot")
}

fn letter_phase(snap: &FrameSnapshot, key: &str) -> LetterPhase {
    snap.targets
        .iter()
        .find(|t| t.key == key)
        .and_then(|t| t.letter.as_ref())
        .map(|l| l.phase)
        .expect("letter in snapshot")
}

fn count(snaps: &[FrameSnapshot], pred: impl Fn(&SimEvent) -> bool) -> usize {
    snaps
        .iter()
        .flat_map(|s| s.events.iter())
        .filter(|e| pred(e))
        .count()
}

/// Fire once every eight frames (133 ms, above the cooldown).
fn fire_shots(engine: &mut SimulationEngine, shots: usize) -> Vec<FrameSnapshot> {
    let mut snaps = Vec::new();
    for _ in 0..shots {
        engine.queue_command(InputCommand::Fire);
        snaps.extend(run(engine, 8));
    }
    snaps
}

/// A scripted session touching every stage.
fn scripted_session(seed: u64, frames: usize) -> Vec<String> {
    let mut engine = SimulationEngine::new(SimConfig {
        seed,
        ..Default::default()
    });
    engine.queue_commands([
        register("title-0", Rect::new(900.0, 300.0, 40.0, 60.0), TargetKind::Letter),
        register("card", Rect::new(800.0, 200.0, 120.0, 80.0), TargetKind::Damageable),
        register("blurb", Rect::new(700.0, 420.0, 240.0, 80.0), TargetKind::MaskedText),
        register("cta", Rect::new(200.0, 600.0, 80.0, 30.0), TargetKind::Interactive),
    ]);

    let mut out = Vec::with_capacity(frames);
    for i in 0..frames {
        let t = i as f64 * 0.05;
        engine.queue_command(InputCommand::PointerMove {
            x: 640.0 + 200.0 * t.cos(),
            y: 360.0 + 120.0 * (t * 1.3).sin(),
        });
        if i % 9 == 0 {
            engine.queue_command(InputCommand::Fire);
        }
        if i % 25 == 0 {
            engine.queue_command(laser(600.0, 340.0, 1600.0, 0.0));
        }
        let snap = engine.tick(DT);
        out.push(serde_json::to_string(&snap).unwrap());
    }
    out
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let a = scripted_session(12345, 300);
    let b = scripted_session(12345, 300);
    for (i, (sa, sb)) in a.iter().zip(b.iter()).enumerate() {
        assert_eq!(sa, sb, "Snapshots diverged at frame {i} with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let a = scripted_session(111, 30);
    let b = scripted_session(222, 30);
    assert!(
        a.iter().zip(b.iter()).any(|(sa, sb)| sa != sb),
        "Different seeds should produce divergent output"
    );
}

// ---- Frame timing ----

#[test]
fn test_dt_is_clamped() {
    let mut engine = new_engine();
    engine.tick(1.0);
    assert!((engine.time().now_ms - MAX_FRAME_DT * 1000.0).abs() < 1e-9);

    engine.tick(0.0);
    assert!((engine.time().now_ms - (MAX_FRAME_DT + MIN_FRAME_DT) * 1000.0).abs() < 1e-9);

    engine.tick(f64::NAN);
    assert_eq!(engine.time().tick, 3);
}

#[test]
fn test_pause_stops_simulation() {
    let mut engine = new_engine();
    engine.queue_command(laser(100.0, 100.0, 1600.0, 0.0));
    run(&mut engine, 1);
    let tick = engine.time().tick;
    let pos = engine.lasers().projectiles()[0].pos;

    engine.queue_command(InputCommand::Pause);
    let snaps = run(&mut engine, 10);
    assert!(snaps.iter().all(|s| s.paused));
    assert_eq!(engine.time().tick, tick, "Time should not advance while paused");
    assert_eq!(engine.lasers().projectiles()[0].pos, pos);

    engine.queue_command(InputCommand::Resume);
    let snap = engine.tick(DT);
    assert!(!snap.paused);
    assert_eq!(engine.time().tick, tick + 1);
    assert!(engine.lasers().projectiles()[0].pos.x > pos.x);
}

#[test]
fn test_fire_ignored_while_paused() {
    let mut engine = new_engine();
    engine.queue_commands([InputCommand::Pause, InputCommand::Fire]);
    engine.tick(DT);
    engine.queue_command(InputCommand::Resume);
    let snap = engine.tick(DT);
    assert!(engine.lasers().projectiles().is_empty());
    assert!(!snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::LaserFired { .. })));
}

// ---- Lasers ----

#[test]
fn test_projectile_removed_at_max_range() {
    let mut engine = new_engine();
    engine.queue_command(laser(0.0, 100.0, LASER_SPEED, 0.0));

    // 26 frames at 1600 px/s is 693 px: still alive.
    run(&mut engine, 26);
    assert_eq!(engine.lasers().projectiles().len(), 1);
    assert!(engine.lasers().projectiles()[0].dist < LASER_MAX_DIST);

    // 27 frames is 720 px: gone.
    run(&mut engine, 1);
    assert!(engine.lasers().projectiles().is_empty());
}

#[test]
fn test_projectile_range_independent_of_frame_rate() {
    let mut engine = new_engine();
    engine.queue_command(laser(0.0, 100.0, LASER_SPEED, 0.0));
    let step = LASER_SPEED * MAX_FRAME_DT;
    let frames_alive = (LASER_MAX_DIST / step).ceil() as usize - 1;

    for _ in 0..frames_alive {
        engine.tick(MAX_FRAME_DT);
        for p in engine.lasers().projectiles() {
            assert!(p.dist < LASER_MAX_DIST);
        }
    }
    assert_eq!(engine.lasers().projectiles().len(), 1);
    engine.tick(MAX_FRAME_DT);
    assert!(engine.lasers().projectiles().is_empty());
}

#[test]
fn test_player_fire_dual_cannons_and_cooldown() {
    let mut engine = new_engine();
    engine.queue_command(InputCommand::Fire);
    let snap = engine.tick(DT);

    let shots = engine.lasers().projectiles();
    assert_eq!(shots.len(), 2);
    assert!(shots.iter().all(|p| p.owner == Owner::Player));
    // Resting ship faces +x with lift 1: cannons are symmetric about y.
    let spread = (shots[0].pos.y - shots[1].pos.y).abs();
    assert!((spread - 2.0 * CANNON_OFFSET).abs() < 1e-9);
    assert!((shots[0].vel - DVec2::new(LASER_SPEED, 0.0)).length() < 1e-9);
    assert_eq!(snap.flashes.len(), 1);
    assert_eq!(
        snap.events
            .iter()
            .filter(|e| matches!(e, SimEvent::LaserFired { .. }))
            .count(),
        1
    );

    // Next frame is inside the cooldown.
    engine.queue_command(InputCommand::Fire);
    let snap = engine.tick(DT);
    assert_eq!(engine.lasers().projectiles().len(), 2);
    assert!(!snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::LaserFired { .. })));
}

#[test]
fn test_malformed_spawn_dropped() {
    let mut engine = new_engine();
    engine.queue_commands([
        InputCommand::SpawnLaser(SpawnLaserRequest {
            x: None,
            y: Some(10.0),
            vx: Some(1.0),
            vy: Some(0.0),
            ..Default::default()
        }),
        InputCommand::SpawnLaser(SpawnLaserRequest {
            x: Some(f64::NAN),
            y: Some(10.0),
            vx: Some(1.0),
            vy: Some(0.0),
            ..Default::default()
        }),
        InputCommand::SpawnLaser(SpawnLaserRequest::default()),
    ]);
    let snap = engine.tick(DT);
    assert!(engine.lasers().projectiles().is_empty());
    assert!(snap.flashes.is_empty());
}

#[test]
fn test_external_spawn_defaults_to_wingman() {
    let mut engine = new_engine();
    engine.queue_command(InputCommand::SpawnLaser(SpawnLaserRequest {
        x: Some(10.0),
        y: Some(10.0),
        vx: Some(100.0),
        vy: Some(0.0),
        color: Some("#ff7cf3".into()),
        owner: None,
    }));
    let snap = engine.tick(DT);
    assert_eq!(snap.projectiles.len(), 1);
    assert_eq!(snap.projectiles[0].owner, Owner::Wingman);
    assert_eq!(snap.projectiles[0].color.as_deref(), Some("#ff7cf3"));
    assert_eq!(engine.lasers().flashes()[0].max_life, FLASH_LIFE_WINGMAN);
}

#[test]
fn test_internal_events_not_forwarded() {
    let mut engine = new_engine();
    engine.queue_command(laser(0.0, 100.0, LASER_SPEED, 0.0));
    let snaps = run(&mut engine, 5);
    assert_eq!(
        count(&snaps, |e| e.is_internal()),
        0,
        "spawn_laser and laser_line must stay on the bus"
    );
}

#[test]
fn test_hit_spawns_particles_and_event() {
    let mut engine = new_engine();
    engine.queue_commands([
        register("card", Rect::new(600.0, 300.0, 120.0, 60.0), TargetKind::Damageable),
        laser(560.0, 330.0, LASER_SPEED, 0.0),
    ]);
    let snaps = run(&mut engine, 3);
    let hits: Vec<_> = snaps
        .iter()
        .flat_map(|s| s.events.iter())
        .filter_map(|e| match e {
            SimEvent::TargetHit {
                key,
                damage,
                hit_x,
                hit_y,
                owner,
            } => Some((key.clone(), *damage, *hit_x, *hit_y, *owner)),
            _ => None,
        })
        .collect();
    assert!(!hits.is_empty());
    let (key, damage, hit_x, hit_y, owner) = &hits[0];
    assert_eq!(key, "card");
    assert!((damage - DAMAGE_ADD_PER_HIT).abs() < 1e-9);
    assert!((0.0..=1.0).contains(hit_x));
    assert!((hit_y - 0.5).abs() < 1e-9);
    assert_eq!(*owner, Owner::Wingman);
    assert!(!engine.particles().hits.is_empty());
}

#[test]
fn test_disconnected_target_not_hit() {
    let mut engine = new_engine();
    engine.queue_commands([
        register("card", Rect::new(600.0, 300.0, 120.0, 60.0), TargetKind::Damageable),
        InputCommand::SetTargetConnected {
            key: "card".into(),
            connected: false,
        },
        laser(560.0, 330.0, LASER_SPEED, 0.0),
    ]);
    let snaps = run(&mut engine, 20);
    assert_eq!(count(&snaps, |e| matches!(e, SimEvent::TargetHit { .. })), 0);
}

#[test]
fn test_cached_rect_follows_layout_while_connected() {
    let mut engine = new_engine();
    engine.queue_command(register(
        "card",
        Rect::new(0.0, 0.0, 10.0, 10.0),
        TargetKind::Damageable,
    ));
    engine.tick(DT);

    engine.queue_command(InputCommand::UpdateTargetRect {
        key: "card".into(),
        rect: Rect::new(50.0, 50.0, 10.0, 10.0),
    });
    let snap = engine.tick(DT);
    assert_eq!(snap.targets[0].rect, Rect::new(50.0, 50.0, 10.0, 10.0));

    engine.queue_commands([
        InputCommand::SetTargetConnected {
            key: "card".into(),
            connected: false,
        },
        InputCommand::UpdateTargetRect {
            key: "card".into(),
            rect: Rect::new(90.0, 90.0, 10.0, 10.0),
        },
    ]);
    let snap = engine.tick(DT);
    assert_eq!(snap.targets[0].rect, Rect::new(50.0, 50.0, 10.0, 10.0));
    assert!(!snap.targets[0].connected);
}

// ---- Damage ----

#[test]
fn test_damage_stays_in_unit_interval() {
    let mut engine = new_engine();
    engine.queue_command(register(
        "card",
        Rect::new(600.0, 300.0, 120.0, 60.0),
        TargetKind::Damageable,
    ));

    let mut peak: f64 = 0.0;
    for _ in 0..30 {
        engine.queue_command(laser(450.0, 330.0, LASER_SPEED, 0.0));
        let snap = engine.tick(DT);
        let d = target_damage(&snap, "card");
        assert!((0.0..=1.0).contains(&d), "damage out of range: {d}");
        peak = peak.max(d);
    }
    assert_eq!(peak, 1.0);

    let mut last = 1.0;
    for snap in run(&mut engine, 60 * 12) {
        let d = target_damage(&snap, "card");
        assert!((0.0..=1.0).contains(&d), "damage out of range: {d}");
        if engine.lasers().projectiles().is_empty() {
            assert!(d <= last + 1e-12, "regeneration must not raise damage");
        }
        last = d;
    }
    assert_eq!(last, 0.0);
}

#[test]
fn test_regen_waits_for_quiet_period() {
    let mut engine = new_engine();
    engine.queue_commands([
        register("card", Rect::new(600.0, 300.0, 120.0, 60.0), TargetKind::Damageable),
        laser(560.0, 330.0, LASER_SPEED, 0.0),
    ]);
    let snaps = run(&mut engine, 30);
    let hit = target_damage(&snaps[snaps.len() - 1], "card");
    assert!(hit > 0.0);

    // One second after the last hit: still inside the quiet period.
    let snaps = run(&mut engine, 60);
    assert_eq!(target_damage(&snaps[snaps.len() - 1], "card"), hit);

    let snaps = run(&mut engine, 60);
    assert!(target_damage(&snaps[snaps.len() - 1], "card") < hit);
}

#[test]
fn test_letter_lifecycle() {
    let mut engine = new_engine();
    engine.queue_command(register(
        "title-0",
        Rect::new(600.0, 300.0, 40.0, 60.0),
        TargetKind::Letter,
    ));
    engine.tick(DT);
    let entity = engine.targets().entity("title-0").unwrap();
    let params = engine.world().get::<&LetterState>(entity).unwrap().params;
    assert!((FALL_THRESHOLD_BASE..=FALL_THRESHOLD_BASE + FALL_THRESHOLD_JITTER)
        .contains(&params.fall_threshold));

    // Shoot until it breaks.
    let mut fell_at = None;
    for _ in 0..60 {
        engine.queue_command(laser(500.0, 330.0, LASER_SPEED, 0.0));
        let snap = engine.tick(DT);
        if count(std::slice::from_ref(&snap), |e| {
            matches!(e, SimEvent::LetterFell { key } if key == "title-0")
        }) > 0
        {
            assert!(target_damage(&snap, "title-0") >= params.fall_threshold);
            fell_at = Some(snap.time.now_ms);
            break;
        }
    }
    let fell_at = fell_at.expect("letter should fall");

    let mut phases = vec![LetterPhase::Falling];
    let mut gone_at = None;
    let mut gone_probe_done = false;
    let mut heal_last = f64::INFINITY;
    let mut respawned = 0;

    for _ in 0..(60 * 10) {
        let snap = engine.tick(DT);
        let phase = letter_phase(&snap, "title-0");
        let damage = target_damage(&snap, "title-0");
        assert!((0.0..=1.0).contains(&damage));
        respawned += count(std::slice::from_ref(&snap), |e| {
            matches!(e, SimEvent::LetterRespawned { .. })
        });

        if phases.last() != Some(&phase) {
            phases.push(phase);
        }

        match phase {
            LetterPhase::Gone if gone_at.is_none() => {
                gone_at = Some(snap.time.now_ms);
                assert!(
                    snap.time.now_ms - fell_at
                        >= params.fall_delay_ms + LETTER_FALL_ANIM_MS - 1e-6
                );
            }
            LetterPhase::Gone if !gone_probe_done => {
                // Hidden letters ignore fire.
                gone_probe_done = true;
                engine.queue_command(laser(500.0, 330.0, LASER_SPEED, 0.0));
                let probe = run(&mut engine, 10);
                assert_eq!(count(&probe, |e| matches!(e, SimEvent::TargetHit { .. })), 0);
                assert_eq!(target_damage(&probe[9], "title-0"), damage);
            }
            LetterPhase::Healing => {
                assert!(damage <= heal_last + 1e-12, "healing must be monotonic");
                heal_last = damage;
            }
            LetterPhase::Respawning => assert_eq!(damage, 0.0),
            _ => {}
        }

        if phases.len() == 5 {
            break;
        }
    }

    assert_eq!(
        phases,
        vec![
            LetterPhase::Falling,
            LetterPhase::Gone,
            LetterPhase::Healing,
            LetterPhase::Respawning,
            LetterPhase::Intact,
        ]
    );
    assert!(gone_probe_done);
    assert_eq!(respawned, 1);
}

#[test]
fn test_letter_hit_flashes() {
    let mut engine = new_engine();
    engine.queue_commands([
        register("title-0", Rect::new(600.0, 300.0, 40.0, 60.0), TargetKind::Letter),
        laser(590.0, 330.0, LASER_SPEED, 0.0),
    ]);
    let snap = engine.tick(DT);
    let letter = snap.targets[0].letter.as_ref().unwrap();
    assert!(letter.flashing);
    assert_eq!(letter.phase, LetterPhase::Intact);
}

// ---- Masked text ----

#[test]
fn test_masked_text_carved_and_regenerates() {
    let mut engine = new_engine();
    engine.queue_commands([
        register("blurb", Rect::new(400.0, 200.0, 160.0, 80.0), TargetKind::MaskedText),
        laser(380.0, 240.0, LASER_SPEED, 0.0),
    ]);
    let snap = engine.tick(DT);
    let view = &snap.masked_text[0];
    assert_eq!((view.cols, view.rows), (20, 10));
    assert!(view.health.iter().any(|h| *h < 1.0));
    assert!(view.health.iter().all(|h| (0.0..=1.0).contains(h)));
    assert!(!engine.particles().debris.is_empty());

    let snaps = run(&mut engine, 40);
    let entity = engine.targets().entity("blurb").unwrap();
    let carved = masked_text::mean_health(&engine.world().get::<&MaskGrid>(entity).unwrap());
    assert!(carved < 1.0);
    assert!(snaps.iter().all(|s| s.masked_text[0].health.len() == 200));

    run(&mut engine, 60 * 5);
    let healed = masked_text::mean_health(&engine.world().get::<&MaskGrid>(entity).unwrap());
    assert!(healed > carved);
}

#[test]
fn test_masked_text_culls_far_strokes() {
    let rect = Rect::new(400.0, 200.0, 160.0, 80.0);
    assert!(masked_text::culled(
        &rect,
        DVec2::new(0.0, 0.0),
        DVec2::new(300.0, 100.0)
    ));
    assert!(!masked_text::culled(
        &rect,
        DVec2::new(370.0, 240.0),
        DVec2::new(300.0, 240.0)
    ));
    // Endpoints on opposite sides never cull.
    assert!(!masked_text::culled(
        &rect,
        DVec2::new(0.0, 240.0),
        DVec2::new(1000.0, 240.0)
    ));
}

#[test]
fn test_splat_falloff() {
    let mut grid = MaskGrid::default();
    masked_text::fit_grid(&mut grid, &Rect::new(0.0, 0.0, 80.0, 80.0));
    assert_eq!(grid.health.len(), 100);

    masked_text::splat(&mut grid, DVec2::new(4.0, 4.0), 12.0, 0.5);
    assert!((grid.health[0] - 0.5).abs() < 1e-12);
    assert!(grid.health[1] > 0.5 && grid.health[1] < 1.0);
    assert_eq!(grid.health[99], 1.0);

    // Resizing rebuilds at full health.
    masked_text::fit_grid(&mut grid, &Rect::new(0.0, 0.0, 40.0, 80.0));
    assert_eq!((grid.cols, grid.rows), (5, 10));
    assert!(grid.health.iter().all(|h| *h == 1.0));
}

// ---- Ship ----

#[test]
fn test_heading_stays_put_without_input() {
    let mut engine = new_engine();
    run(&mut engine, 120);
    assert_eq!(engine.ship().heading(), 0.0);
    assert_eq!(engine.ship().position(), engine.viewport().center());
}

#[test]
fn test_heading_continuity() {
    let mut engine = new_engine();
    let mut last = engine.ship().heading();
    for i in 0..900 {
        let a = i as f64 * 0.3;
        let r = 80.0 + 160.0 * ((i as f64) * 0.01).sin().abs();
        engine.queue_command(InputCommand::PointerMove {
            x: 640.0 + r * a.cos(),
            y: 360.0 + r * a.sin(),
        });
        engine.tick(DT);
        let h = engine.ship().heading();
        assert!(
            (h - last).abs() <= RATE_MAX_FAST * DT + 1e-9,
            "heading jumped {} -> {} at frame {i}",
            last,
            h
        );
        last = h;
    }
}

#[test]
fn test_idle_lock_freezes_turn_rate() {
    let mut engine = new_engine();
    engine.queue_command(InputCommand::PointerMove { x: 900.0, y: 500.0 });
    run(&mut engine, 180);
    assert!(engine.ship().is_idle_locked());

    for _ in 0..60 {
        let snap = engine.tick(DT);
        assert!(snap.ship.idle_locked);
        assert_eq!(engine.ship().turn_rate(), 0.0);
    }

    engine.queue_command(InputCommand::PointerMove { x: 200.0, y: 150.0 });
    engine.tick(DT);
    assert!(!engine.ship().is_idle_locked());
}

#[test]
fn test_ship_state_broadcast_every_frame() {
    let mut engine = new_engine();
    let snaps = run(&mut engine, 10);
    for snap in &snaps {
        assert_eq!(
            snap.events
                .iter()
                .filter(|e| matches!(e, SimEvent::ShipState { .. }))
                .count(),
            1
        );
    }
}

#[test]
fn test_landing_on_interactive_target() {
    let mut engine = new_engine();
    engine.queue_command(register(
        "cta",
        Rect::new(600.0, 340.0, 80.0, 40.0),
        TargetKind::Interactive,
    ));
    let snaps = run(&mut engine, 30);
    assert_eq!(
        count(&snaps, |e| matches!(
            e,
            SimEvent::LandingChanged { landed: true, target: Some(t) } if t == "cta"
        )),
        1
    );
    let last = &snaps[snaps.len() - 1];
    assert!(last.ship.landed);
    assert_eq!(last.ship.landed_on.as_deref(), Some("cta"));
    assert_eq!(last.ship.lift, LIFT_LANDED);

    engine.queue_command(InputCommand::PointerMove { x: 100.0, y: 100.0 });
    let snaps = run(&mut engine, 60);
    assert_eq!(
        count(&snaps, |e| matches!(e, SimEvent::LandingChanged { landed: false, .. })),
        1
    );
    assert!(!engine.ship().is_landed());
}

/// Drift the pointer across a large panel at `px_per_s` and report whether
/// the ship was landed at any point after it settled into the drift.
fn lands_while_drifting(dt: f64, px_per_s: f64) -> bool {
    let mut engine = new_engine();
    engine.queue_command(register(
        "panel",
        Rect::new(400.0, 200.0, 600.0, 300.0),
        TargetKind::Interactive,
    ));
    let frames = (2.5 / dt) as usize;
    let settled = (1.0 / dt) as usize;
    let mut landed = false;
    for i in 1..=frames {
        engine.queue_command(InputCommand::PointerMove {
            x: 640.0 + px_per_s * dt * i as f64,
            y: 360.0,
        });
        let snap = engine.tick(dt);
        if i > settled {
            landed |= snap.ship.landed;
        }
    }
    landed
}

#[test]
fn test_landing_thresholds_independent_of_frame_rate() {
    // 9 px/s is 0.15 px per 60 Hz frame: too fast to land at any refresh rate.
    assert!(!lands_while_drifting(1.0 / 60.0, 9.0));
    assert!(!lands_while_drifting(1.0 / 144.0, 9.0));
    // 2.4 px/s is 0.04 px per 60 Hz frame: slow enough everywhere.
    assert!(lands_while_drifting(1.0 / 60.0, 2.4));
    assert!(lands_while_drifting(1.0 / 144.0, 2.4));
}

#[test]
fn test_resize_forces_landing_rescan() {
    let setup = |resize: bool| {
        let mut engine = new_engine();
        engine.tick(DT);
        engine.queue_command(register(
            "cta",
            Rect::new(600.0, 340.0, 80.0, 40.0),
            TargetKind::Interactive,
        ));
        if resize {
            engine.queue_command(InputCommand::Resize {
                width: 1280.0,
                height: 720.0,
            });
        }
        run(&mut engine, 20);
        engine.ship().is_landed()
    };
    assert!(!setup(false), "cache refreshes only every 800 ms");
    assert!(setup(true));
}

#[test]
fn test_landing_enter_requires_idle_time() {
    let targets = vec![("cta".to_string(), Rect::new(100.0, 100.0, 50.0, 20.0))];
    let pos = DVec2::new(120.0, 110.0);
    let mut tracker = LandingTracker::default();

    assert_eq!(tracker.update(0.0, 0.0, pos, &targets), None);
    assert_eq!(tracker.update(200.0, 0.0, pos, &targets), None);
    assert_eq!(tracker.update(239.0, 0.0, pos, &targets), None);
    assert_eq!(tracker.update(240.0, 0.0, pos, &targets), Some(true));
    assert_eq!(tracker.landed_on(), Some("cta"));
}

#[test]
fn test_landing_needs_target_overlap() {
    let targets = vec![("cta".to_string(), Rect::new(100.0, 100.0, 50.0, 20.0))];
    let mut tracker = LandingTracker::default();
    let far = DVec2::new(400.0, 400.0);
    for i in 0..30 {
        assert_eq!(tracker.update(i as f64 * 50.0, 0.0, far, &targets), None);
    }
    // Inside the pad, just outside the rectangle.
    let near = DVec2::new(100.0 - HIT_PAD + 1.0, 110.0);
    assert_eq!(tracker.update(1500.0, 0.0, near, &targets), Some(true));
}

#[test]
fn test_landing_motion_resets_enter_timer() {
    let targets = vec![("cta".to_string(), Rect::new(100.0, 100.0, 50.0, 20.0))];
    let pos = DVec2::new(120.0, 110.0);
    let mut tracker = LandingTracker::default();

    tracker.update(0.0, 0.0, pos, &targets);
    tracker.update(200.0, LAND_IDLE_SPEED_ENTER, pos, &targets);
    assert_eq!(tracker.update(300.0, 0.0, pos, &targets), None);
    assert_eq!(tracker.update(500.0, 0.0, pos, &targets), None);
    assert_eq!(tracker.update(540.0, 0.0, pos, &targets), Some(true));
}

#[test]
fn test_landing_single_flick_does_not_take_off() {
    let targets = vec![("cta".to_string(), Rect::new(100.0, 100.0, 50.0, 20.0))];
    let pos = DVec2::new(120.0, 110.0);
    let mut tracker = LandingTracker::default();
    tracker.update(0.0, 0.0, pos, &targets);
    assert_eq!(tracker.update(240.0, 0.0, pos, &targets), Some(true));

    // A one-frame flick, then idle again: still landed.
    let mut now = 240.0;
    for _ in 0..5 {
        now += 16.0;
        assert_eq!(tracker.update(now, 5.0, pos, &targets), None);
        now += 16.0;
        assert_eq!(tracker.update(now, 0.0, pos, &targets), None);
        now += 200.0;
        assert_eq!(tracker.update(now, 0.0, pos, &targets), None);
    }
    assert!(tracker.is_landed());

    // Sustained motion takes off once the exit time elapses.
    let start = now + 16.0;
    assert_eq!(tracker.update(start, 0.2, pos, &targets), None);
    assert_eq!(tracker.update(start + 60.0, 0.2, pos, &targets), None);
    assert_eq!(tracker.update(start + 119.0, 0.2, pos, &targets), None);
    assert_eq!(
        tracker.update(start + LAND_IDLE_TIME_EXIT_MS, 0.2, pos, &targets),
        Some(false)
    );
    assert!(!tracker.is_landed());
}

#[test]
fn test_landing_exit_when_leaving_target() {
    let targets = vec![("cta".to_string(), Rect::new(100.0, 100.0, 50.0, 20.0))];
    let pos = DVec2::new(120.0, 110.0);
    let mut tracker = LandingTracker::default();
    tracker.update(0.0, 0.0, pos, &targets);
    tracker.update(240.0, 0.0, pos, &targets);
    assert!(tracker.is_landed());

    assert_eq!(
        tracker.update(256.0, 0.0, DVec2::new(300.0, 300.0), &targets),
        Some(false)
    );

    // Landed target vanishing from the cache also takes off.
    tracker.update(300.0, 0.0, pos, &targets);
    assert_eq!(tracker.update(540.0, 0.0, pos, &targets), Some(true));
    assert_eq!(tracker.update(556.0, 0.0, pos, &[]), Some(false));
}

// ---- Targets ----

#[test]
fn test_enemies_are_hittable_connected_targets() {
    let mut engine = new_engine();
    engine.queue_commands([
        register("b-card", Rect::new(0.0, 0.0, 40.0, 20.0), TargetKind::Damageable),
        register("a-letter", Rect::new(100.0, 100.0, 20.0, 30.0), TargetKind::Letter),
        register("cta", Rect::new(0.0, 0.0, 10.0, 10.0), TargetKind::Interactive),
        register("blurb", Rect::new(0.0, 0.0, 10.0, 10.0), TargetKind::MaskedText),
    ]);
    engine.tick(DT);

    let enemies = crate::targets::enemies(engine.world());
    let ids: Vec<_> = enemies.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["a-letter", "b-card"]);
    assert_eq!(enemies[0].x, 110.0);
    assert_eq!(enemies[0].y, 115.0);
    assert_eq!(enemies[0].size, 30.0);
    assert!(enemies[0].visible);
    assert_eq!(enemies[0].threat, ENEMY_DEFAULT_THREAT);
}

#[test]
fn test_reregister_and_remove() {
    let mut engine = new_engine();
    engine.queue_commands([
        register("card", Rect::new(0.0, 0.0, 40.0, 20.0), TargetKind::Damageable),
        register("card", Rect::new(10.0, 0.0, 40.0, 20.0), TargetKind::Letter),
    ]);
    let snap = engine.tick(DT);
    assert_eq!(snap.targets.len(), 1);
    assert_eq!(snap.targets[0].kind, TargetKind::Letter);
    assert_eq!(engine.world().len(), 1);

    engine.queue_command(InputCommand::RemoveTarget { key: "card".into() });
    let snap = engine.tick(DT);
    assert!(snap.targets.is_empty());
    assert!(engine.targets().is_empty());
}

// ---- Wingman wiring ----

#[test]
fn test_eight_shots_summon_wingman_once() {
    let mut engine = new_engine();
    let snaps = fire_shots(&mut engine, 8);

    let activation = snaps
        .iter()
        .position(|s| {
            s.events
                .iter()
                .any(|e| matches!(e, SimEvent::WingmanActivated))
        })
        .expect("wingman should activate");
    let frame = &snaps[activation];
    assert_eq!(
        frame
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::DecisionIssued { .. }))
            .count(),
        1
    );
    assert!(frame.wingman.active);

    let more = fire_shots(&mut engine, 8);
    assert_eq!(count(&snaps, |e| matches!(e, SimEvent::WingmanActivated)), 1);
    assert_eq!(count(&more, |e| matches!(e, SimEvent::WingmanActivated)), 0);
}

#[test]
fn test_wingman_burst_reaches_laser_layer() {
    let mut engine = new_engine();
    let snaps = fire_shots(&mut engine, 8);
    let request_id = snaps
        .iter()
        .flat_map(|s| s.events.iter())
        .find_map(|e| match e {
            SimEvent::DecisionIssued { request_id, .. } => Some(*request_id),
            _ => None,
        })
        .expect("request issued");

    engine.queue_command(InputCommand::DecisionResolved {
        request_id,
        actions: vec![json!({"type": "fire_burst", "cadence_ms": 100, "duration_ms": 600})],
    });
    let snaps = run(&mut engine, 20);
    assert!(snaps.iter().any(|s| s
        .projectiles
        .iter()
        .any(|p| p.owner == Owner::Wingman && p.color.as_deref() == Some(NPC_COLOR))));
    assert_eq!(count(&snaps, |e| e.is_internal()), 0);
}

#[test]
fn test_request_carries_targets_and_prompt() {
    let mut engine = new_engine();
    engine.queue_commands([
        register("title-0", Rect::new(100.0, 100.0, 20.0, 30.0), TargetKind::Letter),
        InputCommand::SetWingmanPrompt {
            prompt: "  terse  ".into(),
        },
    ]);
    let snaps = fire_shots(&mut engine, 8);
    let request = snaps
        .iter()
        .flat_map(|s| s.events.iter())
        .find_map(|e| match e {
            SimEvent::DecisionIssued { request, .. } => Some(request.clone()),
            _ => None,
        })
        .expect("request issued");
    assert_eq!(request.enemies.len(), 1);
    assert_eq!(request.enemies[0].id, "title-0");
    assert_eq!(request.prompt.as_deref(), Some("terse"));
    assert_eq!(request.dims.width, 1280.0);
    assert!(request.player.firing);
}

#[test]
fn test_shutdown_cancels_in_flight_request() {
    let mut engine = new_engine();
    fire_shots(&mut engine, 8);
    let in_flight = engine.wingman().in_flight_request().expect("in flight");

    let events = engine.shutdown();
    assert!(events.iter().any(
        |e| matches!(e, SimEvent::DecisionCancelled { request_id } if *request_id == in_flight)
    ));
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::WingmanDeactivated)));
    assert!(!engine.wingman().is_active());
    assert!(engine.lasers().projectiles().is_empty());
}

// ---- Bus ----

#[test]
fn test_bus_wraps_ship_heading_and_filters_internal() {
    let mut bus = EventBus::new();
    bus.publish(SimEvent::ShipState {
        x: 1.0,
        y: 2.0,
        heading: -90.0,
        vx: 0.0,
        vy: 0.0,
    });
    bus.publish(SimEvent::LaserFired { time_ms: 5.0 });
    bus.publish(SimEvent::SpawnLaser(SpawnLaserRequest::default()));
    bus.publish(SimEvent::LaserLine {
        x1: 0.0,
        y1: 0.0,
        x2: 1.0,
        y2: 1.0,
        alpha: 1.0,
    });

    assert_eq!(bus.ship_state().unwrap().heading, 270.0);
    assert_eq!(bus.player_shots(), 1);
    assert_eq!(bus.spawn_requests().count(), 1);
    assert_eq!(bus.laser_lines().count(), 1);

    let host = bus.drain_host();
    assert_eq!(host.len(), 2);
    assert!(bus.is_empty());
}

#[test]
fn test_panicking_stage_is_contained() {
    let mut ran_after = false;
    crate::engine::guarded("boom", || panic!("stage failure"));
    crate::engine::guarded("after", || ran_after = true);
    assert!(ran_after);
}
