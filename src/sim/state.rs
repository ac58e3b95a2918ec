//! Simulation state
//!
//! One owned aggregate holds every entity. [`super::tick`] is the only thing
//! that mutates it during play; hosts read it back to render.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Ball, EntityRef, MovingBody};
use super::bounds::{Arena, clamp_inside, wrap_horizontal};
use super::collision::total_kinetic_energy;
use super::companion::Companion;
use super::player::Player;
use super::wanderer::Wanderer;
use crate::config::SimConfig;

/// Complete simulation state (deterministic for a given seed and input stream)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Generator state is saved so a restored run continues the same stream
    pub(super) rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub arena: Arena,
    /// Sanitized configuration in effect
    pub config: SimConfig,
    /// Balls (sorted by id)
    pub balls: Vec<Ball>,
    pub player: Option<Player>,
    pub companions: Vec<Companion>,
    pub wanderers: Vec<Wanderer>,
    /// Next entity ID
    pub(super) next_id: u32,
}

impl Simulation {
    /// Build a simulation from a configuration. Out-of-range settings are
    /// logged and clamped.
    pub fn new(config: &SimConfig, seed: u64) -> Self {
        for warning in config.validate() {
            log::warn!("config: {warning}");
        }
        let config = config.sanitized();
        let arena = Arena::new(config.arena.width, config.arena.height);

        let mut sim = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            arena,
            balls: Vec::new(),
            player: None,
            companions: Vec::new(),
            wanderers: Vec::new(),
            next_id: 1,
            config,
        };

        let spawns = sim.config.balls.clone();
        for spawn in spawns {
            sim.add_ball(spawn.pos, spawn.vel, spawn.radius);
        }

        if sim.config.player.enabled {
            let pos = sim.config.player.spawn.unwrap_or_else(|| arena.center());
            let fire_period = sim.config.projectiles.fire_cooldown;
            let mut player = Player::new(pos, &sim.config.player, fire_period);
            wrap_horizontal(&mut player.body, &arena);
            sim.player = Some(player);
        }

        let companions = sim.config.companions.clone();
        for tuning in companions {
            let id = sim.next_entity_id();
            let mut companion = Companion::new(id, tuning);
            clamp_inside(&mut companion.body, &arena);
            sim.companions.push(companion);
        }

        for _ in 0..sim.config.wanderers.count {
            let id = sim.next_entity_id();
            let wanderer = Wanderer::spawn(id, &arena, &sim.config.wanderers, &mut sim.rng);
            sim.wanderers.push(wanderer);
        }

        log::info!(
            "simulation created: seed={seed}, arena={}x{}, balls={}, companions={}, wanderers={}",
            arena.width,
            arena.height,
            sim.balls.len(),
            sim.companions.len(),
            sim.wanderers.len()
        );
        sim
    }

    /// Like [`Simulation::new`] but the configured ball list is replaced by
    /// `count` balls with seeded random placement, size and velocity
    pub fn with_random_balls(config: &SimConfig, seed: u64, count: usize) -> Self {
        let mut config = config.clone();
        config.balls.clear();
        let mut sim = Self::new(&config, seed);

        for _ in 0..count {
            let radius = sim.rng.random_range(20.0f32..40.0);
            let pos = Vec2::new(
                sim.rng.random_range(0.0..sim.arena.width),
                sim.rng.random_range(0.0..sim.arena.height),
            );
            let vel = Vec2::new(random_axis_speed(&mut sim.rng), random_axis_speed(&mut sim.rng));
            sim.add_ball(pos, vel, radius);
        }
        sim
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a ball, clamped into the arena. Returns its id.
    pub fn add_ball(&mut self, pos: Vec2, vel: Vec2, radius: f32) -> u32 {
        let id = self.next_entity_id();
        let mut ball = Ball::new(id, pos, vel, radius);
        clamp_inside(&mut ball.body, &self.arena);
        self.balls.push(ball);
        id
    }

    pub fn ball(&self, id: u32) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    pub fn companion(&self, id: u32) -> Option<&Companion> {
        self.companions.iter().find(|c| c.id == id)
    }

    /// Look up any entity's body
    pub fn body(&self, entity: EntityRef) -> Option<&MovingBody> {
        match entity {
            EntityRef::Ball(id) => self.ball(id).map(|b| &b.body),
            EntityRef::Player => self.player.as_ref().map(|p| &p.body),
            EntityRef::Companion(id) => self.companion(id).map(|c| &c.body),
            EntityRef::Projectile(id) => self
                .player
                .as_ref()
                .and_then(|p| p.projectiles.iter().find(|s| s.id == id))
                .map(|s| &s.body),
            EntityRef::Wanderer(id) => self.wanderers.iter().find(|w| w.id == id).map(|w| &w.body),
        }
    }

    /// Replace the arena and clamp every body into it. Degenerate sizes are
    /// floored the same way [`Arena::new`] floors them.
    pub fn resize(&mut self, arena: Arena) {
        let arena = arena.sanitized();
        if arena == self.arena {
            return;
        }
        log::debug!(
            "arena resized {}x{} -> {}x{}",
            self.arena.width,
            self.arena.height,
            arena.width,
            arena.height
        );
        self.arena = arena;
        for ball in &mut self.balls {
            clamp_inside(&mut ball.body, &arena);
        }
        if let Some(player) = &mut self.player {
            wrap_horizontal(&mut player.body, &arena);
            player.projectiles.retain(|p| arena.contains(p.body.pos));
        }
        for companion in &mut self.companions {
            clamp_inside(&mut companion.body, &arena);
        }
        for wanderer in &mut self.wanderers {
            clamp_inside(&mut wanderer.body, &arena);
        }
    }

    /// Pause or resume every ball
    pub fn set_balls_animated(&mut self, animated: bool) {
        for ball in &mut self.balls {
            ball.body.animated = animated;
        }
    }

    /// Total kinetic energy of the balls
    pub fn ball_energy(&self) -> f32 {
        total_kinetic_energy(self.balls.iter().map(|b| &b.body), self.config.physics.mass_model)
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.balls.sort_by_key(|b| b.id);
        self.companions.sort_by_key(|c| c.id);
        self.wanderers.sort_by_key(|w| w.id);
    }
}

fn random_axis_speed(rng: &mut Pcg32) -> f32 {
    let magnitude = rng.random_range(0.8f32..2.5);
    if rng.random::<bool>() { magnitude } else { -magnitude }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{TickInput, tick};

    #[test]
    fn test_default_scenario() {
        let sim = Simulation::new(&SimConfig::default(), 1);
        assert_eq!(sim.balls.len(), 3);
        assert_eq!(sim.companions.len(), 2);
        assert_eq!(sim.wanderers.len(), 1);
        let player = sim.player.as_ref().expect("player");
        assert_eq!(player.body.pos, Vec2::new(400.0, 300.0));

        // IDs are unique across roles
        let mut ids: Vec<u32> = sim.balls.iter().map(|b| b.id).collect();
        ids.extend(sim.companions.iter().map(|c| c.id));
        ids.extend(sim.wanderers.iter().map(|w| w.id));
        let n = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), n);
    }

    #[test]
    fn test_random_balls_are_seeded_and_inside() {
        let a = Simulation::with_random_balls(&SimConfig::empty(), 77, 12);
        let b = Simulation::with_random_balls(&SimConfig::empty(), 77, 12);
        assert_eq!(a.balls.len(), 12);
        for (x, y) in a.balls.iter().zip(&b.balls) {
            assert_eq!(x.body, y.body);
            let r = x.body.radius();
            assert!(x.body.pos.x >= r && x.body.pos.x <= a.arena.width - r);
            assert!(x.body.pos.y >= r && x.body.pos.y <= a.arena.height - r);
            assert!(x.body.vel.x.abs() >= 0.8 && x.body.vel.y.abs() >= 0.8);
        }
    }

    #[test]
    fn test_resize_clamps_bodies() {
        let mut sim = Simulation::new(&SimConfig::default(), 3);
        sim.resize(Arena::new(300.0, 200.0));
        for ball in &sim.balls {
            let r = ball.body.radius();
            assert!(ball.body.pos.x <= 300.0 - r && ball.body.pos.y <= 200.0 - r);
        }
        for c in &sim.companions {
            assert!(sim.arena.contains(c.body.pos));
        }
        assert!(sim.arena.contains(sim.player.as_ref().unwrap().body.pos));
    }

    #[test]
    fn test_degenerate_resize_keeps_positions_finite() {
        let mut sim = Simulation::new(&SimConfig::default(), 4);
        sim.resize(Arena {
            width: 0.0,
            height: 600.0,
        });
        assert_eq!(sim.arena, Arena::new(1.0, 600.0));

        let player = sim.player.as_ref().unwrap();
        assert!(player.body.pos.is_finite());
        assert!(sim.arena.contains(player.body.pos));
        for w in &sim.wanderers {
            assert!(w.body.pos.is_finite());
            assert!(sim.arena.contains(w.body.pos));
        }
        for b in &sim.balls {
            assert!(sim.arena.contains(b.body.pos));
        }
    }

    #[test]
    fn test_restored_state_replays_identically() {
        let mut sim = Simulation::new(&SimConfig::default(), 21);
        for _ in 0..50 {
            tick(&mut sim, &TickInput::default(), 1.0);
        }
        let json = serde_json::to_string(&sim).unwrap();
        let mut restored: Simulation = serde_json::from_str(&json).unwrap();

        for _ in 0..400 {
            tick(&mut sim, &TickInput::default(), 1.0);
            tick(&mut restored, &TickInput::default(), 1.0);
        }
        for (a, b) in sim.wanderers.iter().zip(&restored.wanderers) {
            assert_eq!(a.body.pos, b.body.pos);
            assert_eq!(a.redirect_in, b.redirect_in);
        }
        for (a, b) in sim.balls.iter().zip(&restored.balls) {
            assert_eq!(a.body, b.body);
        }
    }

    #[test]
    fn test_out_of_bounds_spawn_is_clamped() {
        let mut sim = Simulation::new(&SimConfig::empty(), 0);
        let id = sim.add_ball(Vec2::new(-50.0, 900.0), Vec2::ZERO, 30.0);
        assert_eq!(sim.ball(id).unwrap().body.pos, Vec2::new(30.0, 570.0));
    }

    #[test]
    fn test_entity_lookup() {
        let sim = Simulation::new(&SimConfig::default(), 5);
        let first = sim.balls[0].id;
        assert!(sim.body(EntityRef::Ball(first)).is_some());
        assert!(sim.body(EntityRef::Player).is_some());
        assert!(sim.body(EntityRef::Ball(9999)).is_none());
    }

    #[test]
    fn test_state_serializes() {
        let sim = Simulation::new(&SimConfig::default(), 9);
        let json = serde_json::to_string(&sim).unwrap();
        let back: Simulation = serde_json::from_str(&json).unwrap();
        assert_eq!(back.balls.len(), sim.balls.len());
        assert_eq!(back.seed, 9);
    }
}
