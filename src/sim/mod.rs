//! Deterministic simulation module
//!
//! All arena logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod body;
pub mod bounds;
pub mod collision;
pub mod companion;
pub mod events;
pub mod player;
pub mod projectile;
pub mod state;
pub mod steering;
pub mod tick;
pub mod wanderer;

pub use body::{Ball, EntityRef, MassModel, MovingBody};
pub use bounds::{Arena, Bounce, enforce_bounds, integrate, wrap_horizontal};
pub use collision::{
    BallContact, CollisionOutcome, CollisionParams, detect_collision, resolve_ball_collisions,
    resolve_collision, total_kinetic_energy, total_momentum,
};
pub use companion::{Companion, CompanionMode, CompanionRole};
pub use events::{Axis, SimEvent};
pub use player::Player;
pub use projectile::{FireCooldown, Projectile, check_projectile_collisions, spawn_projectile};
pub use state::Simulation;
pub use steering::{Avoidance, compute_avoidance, safest_spawn};
pub use tick::{TickInput, tick};
pub use wanderer::Wanderer;
