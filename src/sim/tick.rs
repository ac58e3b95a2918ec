//! Fixed timestep simulation tick
//!
//! Advances the simulation deterministically, strictly in order:
//! integrate → detect/resolve ball contacts → player → projectiles →
//! companions → wanderers.

use glam::Vec2;

use super::body::{Ball, EntityRef};
use super::bounds::{Arena, clamp_inside, enforce_bounds, integrate};
use super::collision::{CollisionParams, resolve_ball_collisions};
use super::events::{Axis, SimEvent};
use super::player::Player;
use super::projectile::{check_projectile_collisions, update_projectiles};
use super::state::Simulation;
use super::steering::nearest_ball;
use crate::config::SimConfig;

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// New arena size, if the host was resized since the last tick
    pub bounds: Option<Arena>,
    /// Player movement intent (zero = let the autopilot drive)
    pub move_intent: Vec2,
    /// Fire at this point (subject to the cooldown)
    pub fire_at: Option<Vec2>,
}

/// Advance the simulation by one fixed timestep and return what happened
pub fn tick(sim: &mut Simulation, input: &TickInput, dt: f32) -> Vec<SimEvent> {
    let mut events = Vec::new();

    if let Some(bounds) = input.bounds {
        sim.resize(bounds);
    }

    sim.time_ticks += 1;
    let tick_no = sim.time_ticks;

    let Simulation {
        rng,
        arena,
        config,
        balls,
        player,
        companions,
        wanderers,
        next_id,
        ..
    } = sim;
    let arena = *arena;

    // --- BALLS ---
    move_balls(balls, &arena, dt, &mut events);

    let params = CollisionParams::from(&config.physics);
    let shrink = config
        .physics
        .shrink_factor
        .map(|factor| (factor, config.physics.min_radius));
    for contact in resolve_ball_collisions(balls, &params, shrink) {
        events.push(SimEvent::Collision {
            a: EntityRef::Ball(contact.a),
            b: EntityRef::Ball(contact.b),
            intensity: contact.approach_speed,
        });
    }
    // Separation can push a ball past a wall
    for ball in balls.iter_mut().filter(|b| b.body.animated) {
        clamp_inside(&mut ball.body, &arena);
    }

    // --- PLAYER ---
    if let Some(player) = player.as_mut() {
        step_player(player, input, &arena, balls, config, dt, next_id, &mut events);
    }

    // --- COMPANIONS ---
    let ward = player.as_ref().filter(|p| p.can_act()).map(|p| p.body.pos);
    for companion in companions.iter_mut() {
        events.extend(companion.update(ward, balls, &arena, dt));
    }

    // --- WANDERERS ---
    for wanderer in wanderers.iter_mut() {
        wanderer.update(&arena, &config.wanderers, &mut *rng, dt);
    }

    // Ensure deterministic ordering
    sim.normalize_order();

    log::trace!("tick {tick_no}: {} events", events.len());
    events
}

fn move_balls(balls: &mut [Ball], arena: &Arena, dt: f32, events: &mut Vec<SimEvent>) {
    for ball in balls.iter_mut().filter(|b| b.body.animated) {
        integrate(&mut ball.body, dt);
        let bounce = enforce_bounds(&mut ball.body, arena, 1.0);
        if bounce.x {
            events.push(SimEvent::WallBounce {
                body: ball.entity(),
                axis: Axis::Horizontal,
            });
        }
        if bounce.y {
            events.push(SimEvent::WallBounce {
                body: ball.entity(),
                axis: Axis::Vertical,
            });
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn step_player(
    player: &mut Player,
    input: &TickInput,
    arena: &Arena,
    balls: &mut [Ball],
    config: &SimConfig,
    dt: f32,
    next_id: &mut u32,
    events: &mut Vec<SimEvent>,
) {
    // The cooldown keeps running while the player is down
    player.fire.cool_down();

    if player.exploding {
        events.extend(player.tick_respawn(arena, balls));
    } else if player.active {
        if let Some(ball) = player.touching_ball(balls, &config.player) {
            log::debug!("player hit by ball {}", ball.id);
            events.push(player.die(config.player.respawn_ticks));
        } else {
            player.update_heading(balls);
            let vel = player.desired_velocity(input.move_intent, arena, balls, &config.player);
            player.advance(vel, arena, dt);

            let target = input.fire_at.or_else(|| {
                config
                    .player
                    .auto_fire
                    .then(|| nearest_ball(player.body.pos, balls).map(|b| b.body.pos))
                    .flatten()
            });
            player.try_fire(target, &config.projectiles, || {
                let id = *next_id;
                *next_id += 1;
                id
            });
        }
    }

    // Shots already in flight keep going while the player is down
    update_projectiles(&mut player.projectiles, arena, dt);
    events.extend(check_projectile_collisions(
        &mut player.projectiles,
        balls,
        &config.projectiles,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BallSpawn, CompanionConfig};
    use crate::consts::TICK_DT;
    use crate::sim::CompanionMode;

    fn balls_only(balls: Vec<BallSpawn>) -> SimConfig {
        let mut cfg = SimConfig::empty();
        cfg.balls = balls;
        cfg
    }

    #[test]
    fn test_ball_wall_bounce_emits_event() {
        let cfg = balls_only(vec![BallSpawn::new(777.0, 300.0, 3.0, 4.0, 20.0)]);
        let mut sim = Simulation::new(&cfg, 1);

        let events = tick(&mut sim, &TickInput::default(), TICK_DT);
        let ball = &sim.balls[0];
        assert_eq!(ball.body.vel, Vec2::new(-3.0, 4.0));
        assert_eq!(ball.body.pos.x, 780.0);
        assert_eq!(
            events,
            vec![SimEvent::WallBounce {
                body: ball.entity(),
                axis: Axis::Horizontal
            }]
        );
    }

    #[test]
    fn test_ball_collision_event_carries_both_ids() {
        let mut cfg = balls_only(vec![
            BallSpawn::new(100.0, 300.0, 5.0, 0.0, 30.0),
            BallSpawn::new(165.0, 300.0, -5.0, 0.0, 30.0),
        ]);
        cfg.physics.collision_damping = 1.0;
        let mut sim = Simulation::new(&cfg, 1);
        let (a, b) = (sim.balls[0].id, sim.balls[1].id);

        let events = tick(&mut sim, &TickInput::default(), TICK_DT);
        assert!(events.iter().any(|e| matches!(
            e,
            SimEvent::Collision { a: EntityRef::Ball(x), b: EntityRef::Ball(y), .. }
                if *x == a && *y == b
        )));
        assert!((sim.balls[0].body.vel.x + 5.0).abs() < 1e-4);
        assert!((sim.balls[1].body.vel.x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_shrink_on_impact_when_configured() {
        let mut cfg = balls_only(vec![
            BallSpawn::new(100.0, 300.0, 5.0, 0.0, 50.0),
            BallSpawn::new(195.0, 300.0, -5.0, 0.0, 50.0),
        ]);
        cfg.physics.shrink_factor = Some(0.8);
        cfg.physics.min_radius = 35.0;
        let mut sim = Simulation::new(&cfg, 1);
        tick(&mut sim, &TickInput::default(), TICK_DT);
        assert_eq!(sim.balls[0].body.radius(), 40.0);
        assert_eq!(sim.balls[1].body.radius(), 40.0);
    }

    #[test]
    fn test_paused_balls_do_not_move() {
        let mut sim = Simulation::new(&SimConfig::default(), 1);
        sim.set_balls_animated(false);
        let before: Vec<Vec2> = sim.balls.iter().map(|b| b.body.pos).collect();
        tick(&mut sim, &TickInput::default(), TICK_DT);
        let after: Vec<Vec2> = sim.balls.iter().map(|b| b.body.pos).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_player_dies_and_respawns() {
        let mut cfg = balls_only(vec![BallSpawn::new(410.0, 300.0, 0.0, 0.0, 30.0)]);
        cfg.player.enabled = true;
        cfg.player.respawn_ticks = 5;
        cfg.player.auto_fire = false;
        let mut sim = Simulation::new(&cfg, 1);

        let events = tick(&mut sim, &TickInput::default(), TICK_DT);
        let died = |e: &SimEvent| matches!(e, SimEvent::Death { agent: EntityRef::Player, .. });
        assert!(events.iter().any(died));
        assert_eq!(sim.player.as_ref().unwrap().deaths, 1);

        let mut respawned = false;
        for _ in 0..5 {
            let events = tick(&mut sim, &TickInput::default(), TICK_DT);
            respawned |= events.iter().any(|e| matches!(e, SimEvent::Respawn { .. }));
        }
        assert!(respawned);
        let player = sim.player.as_ref().unwrap();
        assert!(player.can_act());
        assert!(player.body.pos.distance(sim.balls[0].body.pos) > 100.0);
    }

    #[test]
    fn test_manual_shot_hits_ball() {
        let mut cfg = balls_only(vec![BallSpawn::new(600.0, 300.0, 0.0, 0.0, 30.0)]);
        cfg.player.enabled = true;
        cfg.player.autopilot = false;
        cfg.player.auto_fire = false;
        let mut sim = Simulation::new(&cfg, 1);

        let fire = TickInput {
            fire_at: Some(Vec2::new(600.0, 300.0)),
            ..Default::default()
        };
        let mut hit = None;
        for i in 0..40 {
            let input = if i == 0 { fire.clone() } else { TickInput::default() };
            for e in tick(&mut sim, &input, TICK_DT) {
                if let SimEvent::ProjectileHit { ball, .. } = e {
                    hit = Some(ball);
                }
            }
            if hit.is_some() {
                break;
            }
        }
        assert_eq!(hit, Some(sim.balls[0].id));
        assert!(sim.balls[0].body.vel.x > 0.0);
        assert!(sim.player.as_ref().unwrap().projectiles.is_empty());
    }

    #[test]
    fn test_fire_cooldown_runs_while_player_is_down() {
        let mut cfg = SimConfig::empty();
        cfg.player.enabled = true;
        cfg.player.auto_fire = false;
        let mut sim = Simulation::new(&cfg, 1);

        let fire = TickInput {
            fire_at: Some(Vec2::new(700.0, 300.0)),
            ..Default::default()
        };
        tick(&mut sim, &fire, TICK_DT);
        let player = sim.player.as_mut().unwrap();
        assert_eq!(player.fire.remaining, cfg.projectiles.fire_cooldown);
        player.die(180);

        for _ in 0..50 {
            tick(&mut sim, &TickInput::default(), TICK_DT);
        }
        let player = sim.player.as_ref().unwrap();
        assert!(player.exploding);
        assert!(player.fire.ready());
    }

    #[test]
    fn test_entities_iterate_in_id_order() {
        let mut sim = Simulation::new(&SimConfig::default(), 8);
        sim.balls.reverse();
        sim.companions.reverse();
        tick(&mut sim, &TickInput::default(), TICK_DT);

        let ball_ids: Vec<u32> = sim.balls.iter().map(|b| b.id).collect();
        assert!(ball_ids.windows(2).all(|w| w[0] < w[1]), "{ball_ids:?}");
        let companion_ids: Vec<u32> = sim.companions.iter().map(|c| c.id).collect();
        assert!(companion_ids.windows(2).all(|w| w[0] < w[1]), "{companion_ids:?}");
    }

    #[test]
    fn test_degenerate_resize_input_is_floored() {
        let mut sim = Simulation::new(&SimConfig::default(), 3);
        let input = TickInput {
            bounds: Some(Arena {
                width: 0.0,
                height: 600.0,
            }),
            ..Default::default()
        };
        for _ in 0..5 {
            tick(&mut sim, &input, TICK_DT);
        }
        assert_eq!(sim.arena.width, 1.0);
        let player = sim.player.as_ref().unwrap();
        assert!(player.body.pos.is_finite(), "player at {}", player.body.pos);
        for w in &sim.wanderers {
            assert!(w.body.pos.is_finite() && sim.arena.contains(w.body.pos));
        }
        for b in &sim.balls {
            assert!(b.body.pos.is_finite() && sim.arena.contains(b.body.pos));
        }
        for c in &sim.companions {
            assert!(c.body.pos.is_finite() && sim.arena.contains(c.body.pos));
        }
    }

    #[test]
    fn test_intent_moves_player_and_wraps() {
        let mut cfg = SimConfig::empty();
        cfg.player.enabled = true;
        cfg.player.spawn = Some(Vec2::new(2.0, 300.0));
        let mut sim = Simulation::new(&cfg, 1);
        let left = TickInput {
            move_intent: Vec2::new(-1.0, 0.0),
            ..Default::default()
        };
        tick(&mut sim, &left, TICK_DT);
        let x = sim.player.as_ref().unwrap().body.pos.x;
        assert!(x > 790.0, "expected wrap to the right edge, got {x}");
    }

    #[test]
    fn test_escort_follows_player() {
        let mut cfg = SimConfig::empty();
        cfg.player.enabled = true;
        cfg.player.auto_fire = false;
        cfg.companions = vec![CompanionConfig::escort(Vec2::new(150.0, 300.0))];
        let mut sim = Simulation::new(&cfg, 1);

        tick(&mut sim, &TickInput::default(), TICK_DT);
        let c = &sim.companions[0];
        assert_eq!(c.mode, CompanionMode::Following);
        assert!(c.body.vel.x > 0.0);
    }

    #[test]
    fn test_resize_input_applies_before_tick() {
        let mut sim = Simulation::new(&SimConfig::default(), 2);
        let input = TickInput {
            bounds: Some(Arena::new(400.0, 300.0)),
            ..Default::default()
        };
        tick(&mut sim, &input, TICK_DT);
        assert_eq!(sim.arena, Arena::new(400.0, 300.0));
        for b in &sim.balls {
            let r = b.body.radius();
            assert!(b.body.pos.x >= r - 1e-3 && b.body.pos.x <= 400.0 - r + 1e-3);
            assert!(b.body.pos.y >= r - 1e-3 && b.body.pos.y <= 300.0 - r + 1e-3);
        }
    }

    #[test]
    fn test_containment_over_long_run() {
        let mut sim = Simulation::with_random_balls(&SimConfig::default(), 11, 10);
        for _ in 0..2000 {
            tick(&mut sim, &TickInput::default(), TICK_DT);
            for b in &sim.balls {
                assert!(sim.arena.contains(b.body.pos), "ball {} escaped: {}", b.id, b.body.pos);
            }
            for c in &sim.companions {
                assert!(sim.arena.contains(c.body.pos));
            }
            if let Some(p) = &sim.player {
                assert!(sim.arena.contains(p.body.pos));
            }
        }
    }

    #[test]
    fn test_determinism() {
        // Two simulations with same seed should produce identical results
        let mut a = Simulation::with_random_balls(&SimConfig::default(), 99999, 6);
        let mut b = Simulation::with_random_balls(&SimConfig::default(), 99999, 6);

        let inputs = [
            TickInput::default(),
            TickInput {
                move_intent: Vec2::new(1.0, 0.5),
                ..Default::default()
            },
            TickInput {
                fire_at: Some(Vec2::new(10.0, 10.0)),
                ..Default::default()
            },
        ];
        for i in 0..900 {
            let input = &inputs[i % inputs.len()];
            assert_eq!(tick(&mut a, input, TICK_DT), tick(&mut b, input, TICK_DT));
        }
        for (x, y) in a.balls.iter().zip(&b.balls) {
            assert_eq!(x.body, y.body);
        }
        assert_eq!(a.wanderers[0].body.pos, b.wanderers[0].body.pos);
    }
}
