//! Companion agents
//!
//! A companion is a [`MovingBody`] driven by a small reactive state machine
//! that is re-evaluated every tick:
//!
//! - `Idle`: nothing to do, drift toward the arena center
//! - `Following` / `Intercepting` (escorts): keep station near the player,
//!   breaking off to meet balls heading toward it
//! - `Chasing` (hunters): stalk the biggest ball without ever catching it
//! - `Drifting` then `Spinning`: recovery after touching a ball, during which
//!   normal steering is suspended

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Ball, EntityRef, MovingBody};
use super::bounds::{Arena, enforce_bounds, integrate};
use super::collision::detect_collision_with_radius;
use super::events::{Axis, SimEvent};
use super::steering::{biggest_ball, centering, chase, follow, nearest_threat_to, seek};
use crate::config::CompanionConfig;
use crate::{heading_of, normalize_angle};

/// Which steering strategy a companion runs when not recovering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompanionRole {
    /// Guard the player: intercept incoming balls, otherwise follow
    Escort,
    /// Stalk the biggest ball at a respectful distance
    #[default]
    Hunter,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CompanionMode {
    Idle,
    Following,
    Intercepting { ball: u32 },
    Chasing { ball: u32 },
    Drifting { ticks_left: u32 },
    Spinning { angle: f32, turns: u32 },
}

impl CompanionMode {
    #[inline]
    pub fn is_recovering(&self) -> bool {
        matches!(
            self,
            CompanionMode::Drifting { .. } | CompanionMode::Spinning { .. }
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Companion {
    pub id: u32,
    pub body: MovingBody,
    pub tuning: CompanionConfig,
    pub mode: CompanionMode,
    /// Facing angle (radians); sweeps a full turn per spin while recovering
    pub heading: f32,
}

impl Companion {
    pub fn new(id: u32, tuning: CompanionConfig) -> Self {
        Self {
            id,
            body: MovingBody::new(tuning.pos, Vec2::ZERO, tuning.size * 0.5),
            tuning,
            mode: CompanionMode::Idle,
            heading: 0.0,
        }
    }

    #[inline]
    pub fn entity(&self) -> EntityRef {
        EntityRef::Companion(self.id)
    }

    #[inline]
    pub fn role(&self) -> CompanionRole {
        self.tuning.role
    }

    /// Advance one tick. `ward` is the position of the entity an escort
    /// protects (None while the player is down).
    pub fn update(
        &mut self,
        ward: Option<Vec2>,
        balls: &[Ball],
        arena: &Arena,
        dt: f32,
    ) -> Vec<SimEvent> {
        let mut events = Vec::new();

        if !self.mode.is_recovering() {
            if let Some(ball) = self.touching_ball(balls) {
                events.push(SimEvent::Collision {
                    a: self.entity(),
                    b: ball.entity(),
                    intensity: (self.body.vel - ball.body.vel).length(),
                });
                self.start_recovery(ball.body.pos);
            }
        }

        match self.mode {
            CompanionMode::Drifting { ticks_left } => self.drift(ticks_left),
            CompanionMode::Spinning { angle, turns } => self.spin(angle, turns),
            _ => {
                let (mode, vel, facing) = self.steer(ward, balls, arena);
                self.mode = mode;
                self.body.vel = vel;
                if let Some(target) = facing {
                    self.heading = heading_of(target - self.body.pos);
                } else if vel != Vec2::ZERO {
                    self.heading = heading_of(vel);
                }
            }
        }

        integrate(&mut self.body, dt);
        let bounce = enforce_bounds(&mut self.body, arena, self.tuning.wall_restitution);
        if bounce.x {
            events.push(SimEvent::WallBounce {
                body: self.entity(),
                axis: Axis::Horizontal,
            });
        }
        if bounce.y {
            events.push(SimEvent::WallBounce {
                body: self.entity(),
                axis: Axis::Vertical,
            });
        }

        events
    }

    fn touching_ball<'a>(&self, balls: &'a [Ball]) -> Option<&'a Ball> {
        let reach = self.tuning.size * self.tuning.collision_factor;
        balls
            .iter()
            .filter(|b| b.body.animated)
            .find(|b| detect_collision_with_radius(self.body.pos, reach, &b.body))
    }

    /// Recoil away from `from` and begin drifting
    pub fn start_recovery(&mut self, from: Vec2) {
        let away = (self.body.pos - from).normalize_or_zero();
        let away = if away == Vec2::ZERO { Vec2::X } else { away };
        self.body.vel = away * self.tuning.speed * self.tuning.recoil_factor;
        self.mode = CompanionMode::Drifting {
            ticks_left: self.tuning.drift_ticks,
        };
        log::debug!("companion {} recoiling, drifting {} ticks", self.id, self.tuning.drift_ticks);
    }

    fn drift(&mut self, ticks_left: u32) {
        self.body.vel *= self.tuning.drift_friction;
        let ticks_left = ticks_left.saturating_sub(1);
        self.mode = if ticks_left == 0 {
            self.body.vel = Vec2::ZERO;
            CompanionMode::Spinning {
                angle: 0.0,
                turns: 0,
            }
        } else {
            CompanionMode::Drifting { ticks_left }
        };
    }

    fn spin(&mut self, mut angle: f32, mut turns: u32) {
        self.body.vel = Vec2::ZERO;
        angle += TAU / self.tuning.spin_ticks_per_turn.max(1) as f32;
        if angle >= TAU - 1e-4 {
            angle = (angle - TAU).max(0.0);
            turns += 1;
        }
        self.heading = normalize_angle(angle);
        self.mode = if turns >= self.tuning.spin_turns {
            self.heading = 0.0;
            CompanionMode::Idle
        } else {
            CompanionMode::Spinning { angle, turns }
        };
    }

    /// Pick mode and velocity from the current situation.
    /// Returns the point to face, if any.
    fn steer(
        &self,
        ward: Option<Vec2>,
        balls: &[Ball],
        arena: &Arena,
    ) -> (CompanionMode, Vec2, Option<Vec2>) {
        let t = &self.tuning;
        let pos = self.body.pos;

        match t.role {
            CompanionRole::Escort => {
                if let Some(ward) = ward {
                    if let Some(threat) = nearest_threat_to(pos, ward, t.protect_radius, balls) {
                        return (
                            CompanionMode::Intercepting { ball: threat.id },
                            seek(pos, threat.body.pos, t.speed),
                            Some(threat.body.pos),
                        );
                    }
                    return (
                        CompanionMode::Following,
                        follow(pos, ward, t.follow_distance, t.follow_tolerance, t.speed),
                        Some(ward),
                    );
                }
            }
            CompanionRole::Hunter => {
                if let Some(prey) = biggest_ball(balls) {
                    if let Some(vel) =
                        chase(pos, prey.body.pos, t.chase_distance, t.min_distance, t.speed)
                    {
                        return (
                            CompanionMode::Chasing { ball: prey.id },
                            vel,
                            Some(prey.body.pos),
                        );
                    }
                }
            }
        }

        let idle = centering(pos, arena.center(), t.speed, t.idle_fraction, 20.0);
        (CompanionMode::Idle, idle, None)
    }
}
