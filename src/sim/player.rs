//! The player avatar
//!
//! Moves by intent when one is given, otherwise dodges approaching balls while
//! drifting back toward the arena center. Dies on contact with a ball and
//! respawns at the safest spot once its timer runs out.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Ball, EntityRef, MovingBody};
use super::bounds::{Arena, integrate, wrap_horizontal};
use super::collision::detect_collision_with_radius;
use super::events::SimEvent;
use super::projectile::{FireCooldown, Projectile, spawn_projectile};
use super::steering::{centering, compute_avoidance, nearest_ball, panic_boost, safest_spawn};
use crate::config::{PlayerConfig, ProjectileConfig};
use crate::{clamp_length, heading_of};

/// Band at the top and bottom of the arena that respawns avoid
const RESPAWN_RESERVED_BAND: f32 = 50.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: MovingBody,
    pub size: f32,
    pub speed: f32,
    pub active: bool,
    pub exploding: bool,
    pub deaths: u32,
    /// Ticks until respawn while exploding
    pub respawn_timer: u32,
    /// Facing angle toward the nearest ball (radians)
    pub heading: f32,
    pub fire: FireCooldown,
    pub projectiles: Vec<Projectile>,
}

impl Player {
    pub fn new(pos: Vec2, cfg: &PlayerConfig, fire_period: u32) -> Self {
        Self {
            body: MovingBody::new(pos, Vec2::ZERO, cfg.size * 0.5),
            size: cfg.size,
            speed: cfg.speed,
            active: true,
            exploding: false,
            deaths: 0,
            respawn_timer: 0,
            heading: 0.0,
            fire: FireCooldown::new(fire_period),
            projectiles: Vec::new(),
        }
    }

    #[inline]
    pub fn can_act(&self) -> bool {
        self.active && !self.exploding
    }

    /// First animated ball touching the player's (reduced) hit circle
    pub fn touching_ball<'a>(&self, balls: &'a [Ball], cfg: &PlayerConfig) -> Option<&'a Ball> {
        if !self.can_act() {
            return None;
        }
        let reach = self.size * cfg.collision_factor;
        balls
            .iter()
            .filter(|b| b.body.animated)
            .find(|b| detect_collision_with_radius(self.body.pos, reach, &b.body))
    }

    /// Blow up and start the respawn countdown
    pub fn die(&mut self, respawn_ticks: u32) -> SimEvent {
        self.exploding = true;
        self.active = false;
        self.respawn_timer = respawn_ticks;
        self.deaths += 1;
        self.body.vel = Vec2::ZERO;
        log::info!("player died at {} (deaths: {})", self.body.pos, self.deaths);
        SimEvent::Death {
            agent: EntityRef::Player,
            at: self.body.pos,
        }
    }

    /// Count down while exploding; on expiry respawn as far from the balls as possible
    pub fn tick_respawn(&mut self, arena: &Arena, balls: &[Ball]) -> Option<SimEvent> {
        if !self.exploding {
            return None;
        }
        self.respawn_timer = self.respawn_timer.saturating_sub(1);
        if self.respawn_timer > 0 {
            return None;
        }
        self.respawn_at(safest_spawn(arena, self.size, RESPAWN_RESERVED_BAND, balls));
        log::info!("player respawned at {}", self.body.pos);
        Some(SimEvent::Respawn {
            agent: EntityRef::Player,
            at: self.body.pos,
        })
    }

    pub fn respawn_at(&mut self, pos: Vec2) {
        self.body.pos = pos;
        self.body.vel = Vec2::ZERO;
        self.exploding = false;
        self.active = true;
        self.respawn_timer = 0;
        self.heading = 0.0;
    }

    /// Face the nearest animated ball
    pub fn update_heading(&mut self, balls: &[Ball]) {
        if let Some(ball) = nearest_ball(self.body.pos, balls) {
            self.heading = heading_of(ball.body.pos - self.body.pos);
        }
    }

    /// Desired velocity for this tick.
    ///
    /// A non-zero `intent` wins; otherwise the autopilot blends avoidance with
    /// centering, capped at the boosted speed.
    pub fn desired_velocity(
        &self,
        intent: Vec2,
        arena: &Arena,
        balls: &[Ball],
        cfg: &PlayerConfig,
    ) -> Vec2 {
        if intent != Vec2::ZERO {
            return intent.normalize_or_zero() * self.speed;
        }
        if !cfg.autopilot {
            return Vec2::ZERO;
        }
        let avoid = compute_avoidance(self.body.pos, self.size, self.speed, balls, &cfg.avoidance);
        let center = centering(
            self.body.pos,
            arena.center(),
            self.speed,
            cfg.centering_fraction,
            cfg.centering_deadzone,
        );
        let blended = avoid.vector * cfg.avoid_weight + center * cfg.center_weight;
        clamp_length(blended, self.speed * panic_boost(avoid.max_danger, &cfg.avoidance))
    }

    /// Apply `vel` for one step and wrap around the arena
    pub fn advance(&mut self, vel: Vec2, arena: &Arena, dt: f32) {
        self.body.vel = vel;
        integrate(&mut self.body, dt);
        wrap_horizontal(&mut self.body, arena);
    }

    /// Shots leave from the tip of the heading
    pub fn muzzle(&self) -> Vec2 {
        self.body.pos + Vec2::from_angle(self.heading) * self.size * 0.8
    }

    /// Fire at `target` if the cooldown has run out
    pub fn try_fire(
        &mut self,
        target: Option<Vec2>,
        cfg: &ProjectileConfig,
        next_id: impl FnOnce() -> u32,
    ) -> bool {
        if !self.can_act() || !self.fire.ready() {
            return false;
        }
        let Some(target) = target else {
            return false;
        };
        let Some(shot) = spawn_projectile(next_id(), self.muzzle(), target, cfg.speed, cfg.radius)
        else {
            return false;
        };
        self.projectiles.push(shot);
        self.fire.trigger();
        true
    }
}
