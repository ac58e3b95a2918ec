//! Moving bodies and entity identities
//!
//! Every simulated thing (ball, player, companion, projectile, wanderer) wraps
//! one [`MovingBody`]; role-specific behavior lives in its own module.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MIN_RADIUS;

/// How mass is derived from radius. Both are strictly monotonic in radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MassModel {
    /// m = r²
    #[default]
    Square,
    /// m = π·r²
    Disc,
}

impl MassModel {
    #[inline]
    pub fn mass(self, radius: f32) -> f32 {
        match self {
            MassModel::Square => radius * radius,
            MassModel::Disc => std::f32::consts::PI * radius * radius,
        }
    }
}

/// Identity of an entity, tagged by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Ball(u32),
    Player,
    Companion(u32),
    Projectile(u32),
    Wanderer(u32),
}

/// Position, velocity and size of a circular body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingBody {
    pub pos: Vec2,
    pub vel: Vec2,
    radius: f32,
    /// Inactive bodies neither move nor collide
    pub animated: bool,
}

impl MovingBody {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel,
            radius: checked_radius(radius),
            animated: true,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Resize the body. Radii below [`MIN_RADIUS`] are a bug: asserted in debug,
    /// floored in release.
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = checked_radius(radius);
    }

    #[inline]
    pub fn mass(&self, model: MassModel) -> f32 {
        model.mass(self.radius)
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    pub fn kinetic_energy(&self, model: MassModel) -> f32 {
        0.5 * self.mass(model) * self.vel.length_squared()
    }

    pub fn momentum(&self, model: MassModel) -> Vec2 {
        self.vel * self.mass(model)
    }
}

fn checked_radius(radius: f32) -> f32 {
    debug_assert!(
        radius.is_finite() && radius >= MIN_RADIUS,
        "radius {radius} below floor {MIN_RADIUS}"
    );
    if radius.is_finite() {
        radius.max(MIN_RADIUS)
    } else {
        MIN_RADIUS
    }
}

/// A bouncing eyeball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub body: MovingBody,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            id,
            body: MovingBody::new(pos, vel, radius),
        }
    }

    #[inline]
    pub fn entity(&self) -> EntityRef {
        EntityRef::Ball(self.id)
    }

    /// Shrink by `factor`, never below `min_radius`.
    /// Returns true if the radius changed.
    pub fn shrink(&mut self, factor: f32, min_radius: f32) -> bool {
        let current = self.body.radius();
        let target = (current * factor).max(min_radius.max(MIN_RADIUS));
        if target < current {
            self.body.set_radius(target);
            true
        } else {
            false
        }
    }
}
