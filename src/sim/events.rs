//! Per-tick events for presentation layers (sound, jiggle, explosions).
//! Nothing here feeds back into the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::EntityRef;

/// Wall a body bounced off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A body reflected off an arena wall
    WallBounce { body: EntityRef, axis: Axis },
    /// Two bodies collided; `intensity` is the closing speed along the normal
    Collision {
        a: EntityRef,
        b: EntityRef,
        intensity: f32,
    },
    /// A projectile struck a ball and was consumed
    ProjectileHit { projectile: u32, ball: u32, at: Vec2 },
    /// An agent was destroyed
    Death { agent: EntityRef, at: Vec2 },
    /// An agent came back
    Respawn { agent: EntityRef, at: Vec2 },
}

impl SimEvent {
    /// Short tag used for tallies and logging
    pub fn kind(&self) -> &'static str {
        match self {
            SimEvent::WallBounce { .. } => "wall_bounce",
            SimEvent::Collision { .. } => "collision",
            SimEvent::ProjectileHit { .. } => "projectile_hit",
            SimEvent::Death { .. } => "death",
            SimEvent::Respawn { .. } => "respawn",
        }
    }
}
