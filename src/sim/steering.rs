//! Steering heuristics shared by the player and companions
//!
//! Every function here is pure: it reads positions and velocities and returns
//! a desired velocity. Agents decide how to blend and apply the results.

use glam::Vec2;

use super::body::Ball;
use super::bounds::Arena;
use crate::config::AvoidanceConfig;

/// Result of the predictive avoidance pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Avoidance {
    /// Desired velocity away from the approaching balls (zero if none)
    pub vector: Vec2,
    /// Number of balls judged to be approaching inside the danger radius
    pub threats: usize,
    /// Highest danger score seen, in [0, 1]
    pub max_danger: f32,
}

impl Avoidance {
    #[inline]
    pub fn is_threatened(&self) -> bool {
        self.threats > 0
    }
}

/// Nearest animated ball to `pos`
pub fn nearest_ball<'a>(pos: Vec2, balls: &'a [Ball]) -> Option<&'a Ball> {
    balls
        .iter()
        .filter(|b| b.body.animated)
        .min_by(|a, b| {
            a.body
                .pos
                .distance_squared(pos)
                .partial_cmp(&b.body.pos.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Largest animated ball (first one wins ties)
pub fn biggest_ball(balls: &[Ball]) -> Option<&Ball> {
    balls
        .iter()
        .filter(|b| b.body.animated)
        .fold(None, |best: Option<&Ball>, b| match best {
            Some(cur) if cur.body.radius() >= b.body.radius() => Some(cur),
            _ => Some(b),
        })
}

/// Speed multiplier for a danger score
pub fn panic_boost(max_danger: f32, cfg: &AvoidanceConfig) -> f32 {
    if max_danger > cfg.severe_danger {
        cfg.severe_boost
    } else if max_danger > cfg.moderate_danger {
        cfg.moderate_boost
    } else {
        1.0
    }
}

/// Predictive avoidance.
///
/// A ball within `own_reach + ball radius + danger_margin` is a threat if any of
/// its constant-velocity extrapolations comes closer than its current distance
/// (scaled by `approach_ratio`). Each threat contributes a unit vector away from
/// it weighted by `((danger - d) / danger)²`; the contributions are averaged and
/// scaled by `speed` times the panic boost for the worst danger seen.
pub fn compute_avoidance(
    pos: Vec2,
    own_reach: f32,
    speed: f32,
    balls: &[Ball],
    cfg: &AvoidanceConfig,
) -> Avoidance {
    let mut total = Vec2::ZERO;
    let mut threats = 0usize;
    let mut max_danger = 0.0f32;

    for ball in balls.iter().filter(|b| b.body.animated) {
        let away = pos - ball.body.pos;
        let dist = away.length();
        let danger_radius = own_reach + ball.body.radius() + cfg.danger_margin;
        if dist >= danger_radius || dist <= 0.0 {
            continue;
        }

        let approaching = cfg.prediction_ticks.iter().any(|&t| {
            let future = ball.body.pos + ball.body.vel * t;
            future.distance(pos) < dist * cfg.approach_ratio
        });
        if !approaching {
            continue;
        }

        let score = ((danger_radius - dist) / danger_radius).powi(2);
        total += away / dist * score;
        threats += 1;
        max_danger = max_danger.max(score);
    }

    if threats == 0 {
        return Avoidance::default();
    }

    let vector = total / threats as f32 * speed * panic_boost(max_danger, cfg);
    Avoidance {
        vector,
        threats,
        max_danger,
    }
}

/// Gentle pull toward `target` at `speed * fraction`, nothing inside `deadzone`
pub fn centering(pos: Vec2, target: Vec2, speed: f32, fraction: f32, deadzone: f32) -> Vec2 {
    let to = target - pos;
    let dist = to.length();
    if dist < deadzone || dist <= 0.0 {
        return Vec2::ZERO;
    }
    to / dist * speed * fraction
}

/// Full-speed pursuit of `target`
pub fn seek(pos: Vec2, target: Vec2, speed: f32) -> Vec2 {
    (target - pos).normalize_or_zero() * speed
}

/// Hold a standoff of `follow_distance` (± `tolerance`) from `target`.
///
/// Too far: approach at up to `speed`, easing in as the gap closes.
/// Too close: back off at half speed. Otherwise hold.
pub fn follow(pos: Vec2, target: Vec2, follow_distance: f32, tolerance: f32, speed: f32) -> Vec2 {
    let to = target - pos;
    let dist = to.length();
    if dist <= 0.0 {
        return Vec2::ZERO;
    }
    let dir = to / dist;
    if dist > follow_distance + tolerance {
        dir * ((dist - follow_distance) * 0.8).min(speed)
    } else if dist < follow_distance - tolerance {
        -dir * speed * 0.5
    } else {
        Vec2::ZERO
    }
}

/// Chase `target` but never close in nearer than `min_distance`.
/// Returns `None` when the target is out of `chase_distance`.
pub fn chase(
    pos: Vec2,
    target: Vec2,
    chase_distance: f32,
    min_distance: f32,
    speed: f32,
) -> Option<Vec2> {
    let to = target - pos;
    let dist = to.length();
    if dist > chase_distance {
        return None;
    }
    if dist <= 0.0 {
        return Some(Vec2::ZERO);
    }
    let dir = to / dist;
    if dist > min_distance {
        // Settle a little outside the minimum
        let standoff = min_distance + 10.0;
        if dist > standoff {
            Some(dir * ((dist - standoff) * 0.8).min(speed))
        } else {
            Some(Vec2::ZERO)
        }
    } else {
        Some(-dir * speed * 0.5)
    }
}

/// Nearest ball (to `pos`) that is inside `protect_radius` of `ward` and whose
/// velocity points toward it
pub fn nearest_threat_to<'a>(
    pos: Vec2,
    ward: Vec2,
    protect_radius: f32,
    balls: &'a [Ball],
) -> Option<&'a Ball> {
    balls
        .iter()
        .filter(|b| b.body.animated)
        .filter(|b| {
            let to_ward = ward - b.body.pos;
            to_ward.length() < protect_radius && b.body.vel.dot(to_ward) > 0.0
        })
        .min_by(|a, b| {
            a.body
                .pos
                .distance_squared(pos)
                .partial_cmp(&b.body.pos.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Grid search for the spawn point with the most clearance from every
/// animated ball. `reserved` pixels at top and bottom are kept free.
pub fn safest_spawn(arena: &Arena, own_size: f32, reserved: f32, balls: &[Ball]) -> Vec2 {
    const GRID: usize = 20;
    if !balls.iter().any(|b| b.body.animated) {
        return arena.center();
    }
    let margin = own_size + 10.0;
    let span_x = (arena.width - 2.0 * margin).max(0.0);
    let span_y = (arena.height - 2.0 * (reserved + margin)).max(0.0);

    let mut best = arena.center();
    let mut best_clearance = 0.0f32;

    for i in 0..GRID {
        for j in 0..GRID {
            let fx = i as f32 / (GRID - 1) as f32;
            let fy = j as f32 / (GRID - 1) as f32;
            let candidate = Vec2::new(
                margin + fx * span_x,
                reserved + margin + fy * span_y,
            );

            let clearance = balls
                .iter()
                .filter(|b| b.body.animated)
                .map(|b| candidate.distance(b.body.pos) - b.body.radius() - own_size)
                .fold(f32::INFINITY, f32::min);

            if clearance > best_clearance {
                best_clearance = clearance;
                best = candidate;
            }
        }
    }

    best
}
