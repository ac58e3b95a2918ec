//! Collision detection and response for circular bodies
//!
//! Detection is a plain center-distance test. Response is a mass-weighted
//! elastic impulse along the contact normal, with positional separation split
//! by inverse mass so the heavier body moves less.

use glam::Vec2;

use super::body::{Ball, MassModel, MovingBody};
use crate::config::PhysicsConfig;

/// Distances below this are treated as coincident centers
const COINCIDENT_EPSILON: f32 = 1e-6;

/// Impulse tuning for ball-ball contacts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionParams {
    pub mass_model: MassModel,
    /// Applied to both velocities after the impulse (1.0 = perfectly elastic)
    pub damping: f32,
}

impl Default for CollisionParams {
    fn default() -> Self {
        Self {
            mass_model: MassModel::Square,
            damping: 1.0,
        }
    }
}

impl From<&PhysicsConfig> for CollisionParams {
    fn from(cfg: &PhysicsConfig) -> Self {
        Self {
            mass_model: cfg.mass_model,
            damping: cfg.collision_damping,
        }
    }
}

/// Details of a resolved contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionOutcome {
    /// Unit normal pointing from `b` toward `a`
    pub normal: Vec2,
    /// Closing speed along the normal before the impulse
    pub approach_speed: f32,
    /// How far the bodies were pushed apart
    pub separation: f32,
}

/// A ball-ball contact found during the pairwise pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallContact {
    pub a: u32,
    pub b: u32,
    pub approach_speed: f32,
}

/// True if two circles overlap
#[inline]
pub fn overlaps(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    pos_a.distance_squared(pos_b) < reach * reach
}

/// True if the two bodies overlap. Pure and symmetric.
#[inline]
pub fn detect_collision(a: &MovingBody, b: &MovingBody) -> bool {
    overlaps(a.pos, a.radius(), b.pos, b.radius())
}

/// Like [`detect_collision`] but with an effective radius standing in for `a`'s
/// visual one (agents and projectiles use a smaller, fairer hit circle)
#[inline]
pub fn detect_collision_with_radius(pos: Vec2, effective_radius: f32, b: &MovingBody) -> bool {
    overlaps(pos, effective_radius, b.pos, b.radius())
}

/// Resolve a contact between two bodies.
///
/// Overlap is always removed. Velocities only change if the bodies are
/// closing along the normal; the returned outcome is `Some` exactly when an
/// impulse was applied.
pub fn resolve_collision(
    a: &mut MovingBody,
    b: &mut MovingBody,
    params: &CollisionParams,
) -> Option<CollisionOutcome> {
    let delta = a.pos - b.pos;
    let dist = delta.length();
    let rel_vel = a.vel - b.vel;

    let normal = if dist > COINCIDENT_EPSILON {
        delta / dist
    } else {
        coincident_normal(rel_vel)
    };

    let mass_a = a.mass(params.mass_model);
    let mass_b = b.mass(params.mass_model);
    let total = mass_a + mass_b;

    let overlap = a.radius() + b.radius() - dist;
    let separation = overlap.max(0.0);
    if overlap > 0.0 {
        a.pos += normal * overlap * (mass_b / total);
        b.pos -= normal * overlap * (mass_a / total);
    }

    let closing = rel_vel.dot(normal);
    if closing >= 0.0 {
        return None;
    }

    let impulse = 2.0 * closing / total;
    a.vel -= normal * impulse * mass_b;
    b.vel += normal * impulse * mass_a;

    a.vel *= params.damping;
    b.vel *= params.damping;

    Some(CollisionOutcome {
        normal,
        approach_speed: -closing,
        separation,
    })
}

/// Synthetic normal for exactly coincident centers: oppose the relative
/// velocity so the pair is treated as approaching, or fall back to +x
fn coincident_normal(rel_vel: Vec2) -> Vec2 {
    let n = -rel_vel.normalize_or_zero();
    if n == Vec2::ZERO { Vec2::X } else { n }
}

/// O(n²) pass over animated balls: resolve every overlapping pair once.
///
/// When `shrink` is set, both balls of an impulse-bearing contact shrink by
/// `factor` (floored at `min_radius`).
pub fn resolve_ball_collisions(
    balls: &mut [Ball],
    params: &CollisionParams,
    shrink: Option<(f32, f32)>,
) -> Vec<BallContact> {
    let mut contacts = Vec::new();
    for j in 1..balls.len() {
        let (head, tail) = balls.split_at_mut(j);
        let b = &mut tail[0];
        if !b.body.animated {
            continue;
        }
        for a in head.iter_mut() {
            if !a.body.animated || !detect_collision(&a.body, &b.body) {
                continue;
            }
            if let Some(outcome) = resolve_collision(&mut a.body, &mut b.body, params) {
                if let Some((factor, min_radius)) = shrink {
                    a.shrink(factor, min_radius);
                    b.shrink(factor, min_radius);
                }
                contacts.push(BallContact {
                    a: a.id,
                    b: b.id,
                    approach_speed: outcome.approach_speed,
                });
            }
        }
    }
    contacts
}

/// Sum of ½mv² over the bodies
pub fn total_kinetic_energy<'a>(
    bodies: impl IntoIterator<Item = &'a MovingBody>,
    model: MassModel,
) -> f32 {
    bodies.into_iter().map(|b| b.kinetic_energy(model)).sum()
}

/// Sum of m·v over the bodies
pub fn total_momentum<'a>(
    bodies: impl IntoIterator<Item = &'a MovingBody>,
    model: MassModel,
) -> Vec2 {
    bodies.into_iter().map(|b| b.momentum(model)).sum()
}
