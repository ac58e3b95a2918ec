//! Projectiles fired by the player
//!
//! Short-lived bodies that fly straight at a fixed speed, vanish off-arena,
//! and knock a struck ball away from where the shot came from.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Ball, EntityRef, MovingBody};
use super::bounds::{Arena, integrate};
use super::collision::detect_collision;
use super::events::SimEvent;
use crate::clamp_length;
use crate::config::ProjectileConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub body: MovingBody,
    /// Where the shot was fired from
    pub origin: Vec2,
    pub active: bool,
}

impl Projectile {
    #[inline]
    pub fn entity(&self) -> EntityRef {
        EntityRef::Projectile(self.id)
    }
}

/// Fire from `origin` toward `target` at `speed`.
/// Returns `None` when the target coincides with the origin.
pub fn spawn_projectile(
    id: u32,
    origin: Vec2,
    target: Vec2,
    speed: f32,
    radius: f32,
) -> Option<Projectile> {
    let dir = (target - origin).normalize_or_zero();
    if dir == Vec2::ZERO {
        return None;
    }
    Some(Projectile {
        id,
        body: MovingBody::new(origin, dir * speed, radius),
        origin,
        active: true,
    })
}

/// Advance every projectile and drop the ones that left the arena
pub fn update_projectiles(projectiles: &mut Vec<Projectile>, arena: &Arena, dt: f32) {
    for p in projectiles.iter_mut().filter(|p| p.active) {
        integrate(&mut p.body, dt);
        if !arena.contains(p.body.pos) {
            p.active = false;
        }
    }
    projectiles.retain(|p| p.active);
}

/// Test every projectile against every animated ball. A projectile hits at
/// most one ball, then is consumed. Returns one `ProjectileHit` per hit.
pub fn check_projectile_collisions(
    projectiles: &mut Vec<Projectile>,
    balls: &mut [Ball],
    cfg: &ProjectileConfig,
) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for p in projectiles.iter_mut().filter(|p| p.active) {
        let Some(ball) = balls
            .iter_mut()
            .find(|b| b.body.animated && detect_collision(&p.body, &b.body))
        else {
            continue;
        };

        p.active = false;

        let mut push = (ball.body.pos - p.origin).normalize_or_zero();
        if push == Vec2::ZERO {
            push = p.body.vel.normalize_or_zero();
        }
        ball.body.vel = clamp_length(ball.body.vel + push * cfg.hit_impulse, cfg.max_ball_speed);

        log::debug!("projectile {} hit ball {}", p.id, ball.id);
        events.push(SimEvent::ProjectileHit {
            projectile: p.id,
            ball: ball.id,
            at: p.body.pos,
        });
    }
    projectiles.retain(|p| p.active);
    events
}

/// Ticks-between-shots gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireCooldown {
    pub period: u32,
    pub remaining: u32,
}

impl FireCooldown {
    pub fn new(period: u32) -> Self {
        Self {
            period,
            remaining: 0,
        }
    }

    /// Call once per tick, whether or not the owner can fire
    pub fn cool_down(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    #[inline]
    pub fn ready(&self) -> bool {
        self.remaining == 0
    }

    /// Start the wait after a shot
    pub fn trigger(&mut self) {
        self.remaining = self.period;
    }
}
