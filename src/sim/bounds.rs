//! Arena bounds, integration and wall policies
//!
//! Balls and companions reflect off all four walls, the player wraps
//! horizontally and clamps vertically, wanderers wrap on both axes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::MovingBody;

/// The rectangular arena shared by every body, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        debug_assert!(width > 0.0 && height > 0.0, "arena {width}x{height}");
        Self { width, height }.sanitized()
    }

    /// Copy with each side floored at one pixel. Zero, negative and
    /// non-finite sides count as degenerate.
    pub fn sanitized(self) -> Self {
        Self {
            width: usable_extent(self.width),
            height: usable_extent(self.height),
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// True if `pos` lies inside the closed rectangle
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.x <= self.width && pos.y >= 0.0 && pos.y <= self.height
    }
}

#[inline]
fn usable_extent(v: f32) -> f32 {
    if v.is_finite() { v.max(1.0) } else { 1.0 }
}

/// Which axes reflected during [`enforce_bounds`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounce {
    pub x: bool,
    pub y: bool,
}

impl Bounce {
    #[inline]
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

/// Advance position by velocity
#[inline]
pub fn integrate(body: &mut MovingBody, dt: f32) {
    body.pos += body.vel * dt;
}

/// Keep the body's edge inside the arena.
///
/// A body touching or past a wall is clamped back to the wall; its velocity
/// component is negated (scaled by `restitution`) only while it still points
/// out of the arena, so a body straddling a wall settles in one tick.
pub fn enforce_bounds(body: &mut MovingBody, arena: &Arena, restitution: f32) -> Bounce {
    let r = body.radius();
    Bounce {
        x: reflect_axis(&mut body.pos.x, &mut body.vel.x, r, arena.width, restitution),
        y: reflect_axis(&mut body.pos.y, &mut body.vel.y, r, arena.height, restitution),
    }
}

fn reflect_axis(pos: &mut f32, vel: &mut f32, radius: f32, extent: f32, restitution: f32) -> bool {
    let lo = radius;
    let hi = extent - radius;
    if lo > hi {
        // Body wider than the arena: pin it to the middle
        *pos = extent * 0.5;
        return false;
    }
    if *pos <= lo {
        *pos = lo;
        if *vel < 0.0 {
            *vel = -*vel * restitution;
            return true;
        }
    } else if *pos >= hi {
        *pos = hi;
        if *vel > 0.0 {
            *vel = -*vel * restitution;
            return true;
        }
    }
    false
}

/// Player policy: leaving one side re-enters from the other, top and bottom clamp
pub fn wrap_horizontal(body: &mut MovingBody, arena: &Arena) {
    body.pos.x = wrap(body.pos.x, arena.width);
    let r = body.radius();
    body.pos.y = if 2.0 * r > arena.height {
        arena.height * 0.5
    } else {
        body.pos.y.clamp(r, arena.height - r)
    };
}

/// Wanderer policy: wrap on both axes
pub fn wrap_all(body: &mut MovingBody, arena: &Arena) {
    body.pos.x = wrap(body.pos.x, arena.width);
    body.pos.y = wrap(body.pos.y, arena.height);
}

#[inline]
fn wrap(v: f32, extent: f32) -> f32 {
    if !(extent > 0.0) {
        return 0.0;
    }
    let w = v.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if w >= extent { 0.0 } else { w }
}

/// Clamp a body's center into the arena without touching its velocity
/// (used after a resize)
pub fn clamp_inside(body: &mut MovingBody, arena: &Arena) {
    let r = body.radius();
    body.pos.x = clamp_axis(body.pos.x, r, arena.width);
    body.pos.y = clamp_axis(body.pos.y, r, arena.height);
}

#[inline]
fn clamp_axis(v: f32, radius: f32, extent: f32) -> f32 {
    if 2.0 * radius > extent {
        extent * 0.5
    } else {
        v.clamp(radius, extent - radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_right_wall_bounce() {
        let arena = Arena::new(800.0, 600.0);
        let mut body = MovingBody::new(Vec2::new(780.0, 300.0), Vec2::new(3.0, 4.0), 20.0);

        let bounce = enforce_bounds(&mut body, &arena, 1.0);
        assert!(bounce.x);
        assert!(!bounce.y);
        assert_eq!(body.vel, Vec2::new(-3.0, 4.0));
        assert_eq!(body.pos.x, 780.0);
    }

    #[test]
    fn test_overshoot_is_clamped() {
        let arena = Arena::new(800.0, 600.0);
        let mut body = MovingBody::new(Vec2::new(-15.0, 610.0), Vec2::new(-2.0, 5.0), 10.0);

        let bounce = enforce_bounds(&mut body, &arena, 1.0);
        assert!(bounce.x && bounce.y);
        assert_eq!(body.pos, Vec2::new(10.0, 590.0));
        assert_eq!(body.vel, Vec2::new(2.0, -5.0));
    }

    #[test]
    fn test_straddling_body_does_not_oscillate() {
        let arena = Arena::new(800.0, 600.0);
        // Spawned across the left wall but already moving inward
        let mut body = MovingBody::new(Vec2::new(5.0, 300.0), Vec2::new(2.0, 0.0), 20.0);

        let first = enforce_bounds(&mut body, &arena, 1.0);
        assert!(!first.any());
        assert_eq!(body.pos.x, 20.0);
        assert_eq!(body.vel.x, 2.0);

        integrate(&mut body, 1.0);
        let second = enforce_bounds(&mut body, &arena, 1.0);
        assert!(!second.any());
        assert_eq!(body.pos.x, 22.0);
    }

    #[test]
    fn test_restitution_scales_reflection() {
        let arena = Arena::new(100.0, 100.0);
        let mut body = MovingBody::new(Vec2::new(95.0, 50.0), Vec2::new(4.0, 0.0), 10.0);
        enforce_bounds(&mut body, &arena, 0.5);
        assert_eq!(body.vel.x, -2.0);
    }

    #[test]
    fn test_body_larger_than_arena_is_centered() {
        let arena = Arena::new(30.0, 600.0);
        let mut body = MovingBody::new(Vec2::new(2.0, 300.0), Vec2::new(1.0, 0.0), 20.0);
        enforce_bounds(&mut body, &arena, 1.0);
        assert_eq!(body.pos.x, 15.0);
    }

    #[test]
    fn test_wrap_horizontal() {
        let arena = Arena::new(800.0, 600.0);
        let mut body = MovingBody::new(Vec2::new(-3.0, -50.0), Vec2::ZERO, 20.0);
        wrap_horizontal(&mut body, &arena);
        assert!((body.pos.x - 797.0).abs() < 1e-3);
        assert_eq!(body.pos.y, 20.0);

        body.pos = Vec2::new(805.0, 900.0);
        wrap_horizontal(&mut body, &arena);
        assert!((body.pos.x - 5.0).abs() < 1e-3);
        assert_eq!(body.pos.y, 580.0);
    }

    #[test]
    fn test_wrap_all() {
        let arena = Arena::new(800.0, 600.0);
        let mut body = MovingBody::new(Vec2::new(810.0, -10.0), Vec2::ZERO, 20.0);
        wrap_all(&mut body, &arena);
        assert!((body.pos.x - 10.0).abs() < 1e-3);
        assert!((body.pos.y - 590.0).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_arena_is_floored() {
        let arena = Arena {
            width: 0.0,
            height: f32::NAN,
        }
        .sanitized();
        assert_eq!(arena, Arena::new(1.0, 1.0));

        // A raw zero extent never yields NaN
        assert_eq!(wrap(-3.0, 0.0), 0.0);
        assert_eq!(wrap(5.0, -2.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_enforce_bounds_contains(
            x in -500.0f32..1500.0,
            y in -500.0f32..1500.0,
            vx in -20.0f32..20.0,
            vy in -20.0f32..20.0,
            r in 1.0f32..80.0,
        ) {
            let arena = Arena::new(800.0, 600.0);
            let mut body = MovingBody::new(Vec2::new(x, y), Vec2::new(vx, vy), r);
            enforce_bounds(&mut body, &arena, 1.0);
            prop_assert!(arena.contains(body.pos));
            prop_assert!(body.pos.x - r >= -1e-3 && body.pos.x + r <= 800.0 + 1e-3);
            prop_assert!(body.pos.y - r >= -1e-3 && body.pos.y + r <= 600.0 + 1e-3);
        }

        #[test]
        fn prop_wrapping_contains(x in -5000.0f32..5000.0, y in -5000.0f32..5000.0) {
            let arena = Arena::new(800.0, 600.0);
            let mut body = MovingBody::new(Vec2::new(x, y), Vec2::ZERO, 10.0);
            wrap_all(&mut body, &arena);
            prop_assert!(arena.contains(body.pos));
            body.pos = Vec2::new(x, y);
            wrap_horizontal(&mut body, &arena);
            prop_assert!(arena.contains(body.pos));
        }
    }
}
