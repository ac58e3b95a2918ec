//! Eyeball Arena - a deterministic 2D arena simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, collisions, steering, tick)
//! - `config`: Data-driven tuning loaded from JSON
//! - `driver`: Fixed-rate frame clock and headless run loop
//!
//! Rendering, input wiring and audio are left to whatever host embeds the
//! simulation: it consumes the per-tick [`sim::SimEvent`] list and the public
//! entity state.

pub mod config;
pub mod driver;
pub mod sim;

pub use config::{ConfigError, SimConfig};
pub use driver::{EventTally, FrameClock, run_headless};
pub use sim::{Simulation, SimEvent, TickInput, tick};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    use std::time::Duration;

    /// Nominal frame interval of the fixed-rate driver (~60 Hz)
    pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);
    /// One tick expressed in simulation time units (velocities are px/tick)
    pub const TICK_DT: f32 = 1.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default arena dimensions
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Radius floor; no body may shrink below this
    pub const MIN_RADIUS: f32 = 1.0;

    /// Projectile defaults
    pub const PROJECTILE_SPEED: f32 = 8.0;
    pub const PROJECTILE_RADIUS: f32 = 8.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Heading of a vector in radians (0 = +x, screen coordinates)
#[inline]
pub fn heading_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Clamp a vector's length to `max`, preserving direction
#[inline]
pub fn clamp_length(v: Vec2, max: f32) -> Vec2 {
    let len = v.length();
    if len > max && len > 0.0 { v * (max / len) } else { v }
}
