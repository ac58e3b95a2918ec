//! Simulation configuration
//!
//! Every tuning number the simulation uses lives here so hosts can swap
//! variants (damping, shrink-on-impact, agent speeds) without touching code.
//! Stored as JSON; every section falls back to its defaults field by field.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::{CompanionRole, MassModel};

/// Failure to obtain a configuration from disk
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Arena rectangle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
        }
    }
}

/// Ball-ball collision tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub mass_model: MassModel,
    /// Velocity multiplier applied to both bodies after an impulse (1.0 = perfectly elastic)
    pub collision_damping: f32,
    /// Radius multiplier applied to both balls on impact (None = no shrinking)
    pub shrink_factor: Option<f32>,
    /// Shrinking never takes a ball below this radius
    pub min_radius: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            mass_model: MassModel::Square,
            collision_damping: 0.95,
            shrink_factor: None,
            min_radius: 10.0,
        }
    }
}

/// One ball placed at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallSpawn {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl BallSpawn {
    pub fn new(x: f32, y: f32, vx: f32, vy: f32, radius: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            vel: Vec2::new(vx, vy),
            radius,
        }
    }
}

fn default_balls() -> Vec<BallSpawn> {
    vec![
        BallSpawn::new(100.0, 100.0, 1.5, 1.2, 30.0),
        BallSpawn::new(300.0, 200.0, -1.2, 1.8, 25.0),
        BallSpawn::new(500.0, 150.0, -1.8, -1.4, 35.0),
    ]
}

/// Predictive threat avoidance tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvoidanceConfig {
    /// Added to own radius + ball radius to form the danger radius
    pub danger_margin: f32,
    /// Future offsets (ticks) at which a ball's position is extrapolated
    pub prediction_ticks: Vec<f32>,
    /// A predicted position closer than `distance * approach_ratio` counts as approaching
    pub approach_ratio: f32,
    pub moderate_danger: f32,
    pub moderate_boost: f32,
    pub severe_danger: f32,
    pub severe_boost: f32,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            danger_margin: 120.0,
            prediction_ticks: vec![5.0, 10.0, 15.0, 20.0],
            approach_ratio: 1.0,
            moderate_danger: 0.4,
            moderate_boost: 1.5,
            severe_danger: 0.7,
            severe_boost: 2.0,
        }
    }
}

/// Player avatar tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub enabled: bool,
    /// Spawn point (None = arena center)
    pub spawn: Option<Vec2>,
    pub size: f32,
    pub speed: f32,
    /// Collision radius as a fraction of size (smaller than visual, for fairness)
    pub collision_factor: f32,
    pub respawn_ticks: u32,
    /// Steer automatically when no movement intent is given
    pub autopilot: bool,
    /// Fire at the nearest ball whenever the cooldown allows
    pub auto_fire: bool,
    pub avoid_weight: f32,
    pub center_weight: f32,
    /// Centering speed as a fraction of `speed`
    pub centering_fraction: f32,
    /// No centering pull within this distance of the arena center
    pub centering_deadzone: f32,
    pub avoidance: AvoidanceConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spawn: None,
            size: 40.0,
            speed: 4.5,
            collision_factor: 0.6,
            respawn_ticks: 180,
            autopilot: true,
            auto_fire: true,
            avoid_weight: 0.8,
            center_weight: 0.2,
            centering_fraction: 0.3,
            centering_deadzone: 20.0,
            avoidance: AvoidanceConfig::default(),
        }
    }
}

/// Projectile tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub speed: f32,
    pub radius: f32,
    /// Ticks between shots
    pub fire_cooldown: u32,
    /// Velocity added to a struck ball
    pub hit_impulse: f32,
    /// Struck ball speed is clamped to this
    pub max_ball_speed: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: PROJECTILE_SPEED,
            radius: PROJECTILE_RADIUS,
            fire_cooldown: 15,
            hit_impulse: 0.8,
            max_ball_speed: 8.0,
        }
    }
}

/// One companion placed at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    pub role: CompanionRole,
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
    /// Preferred standoff from the escorted entity
    pub follow_distance: f32,
    /// Dead band around `follow_distance` where the companion holds position
    pub follow_tolerance: f32,
    /// Balls heading toward the escorted entity within this radius are intercepted
    pub protect_radius: f32,
    /// Hunters ignore targets farther than this
    pub chase_distance: f32,
    /// Hunters never close in nearer than this
    pub min_distance: f32,
    /// Idle drift speed as a fraction of `speed`
    pub idle_fraction: f32,
    pub collision_factor: f32,
    /// Speed of the recoil after hitting a ball, as a multiple of `speed`
    pub recoil_factor: f32,
    pub drift_ticks: u32,
    pub drift_friction: f32,
    pub spin_ticks_per_turn: u32,
    pub spin_turns: u32,
    /// Velocity multiplier on wall contact (1.0 = perfect reflection)
    pub wall_restitution: f32,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            role: CompanionRole::Hunter,
            pos: Vec2::new(600.0, 400.0),
            size: 60.0,
            speed: 3.0,
            follow_distance: 80.0,
            follow_tolerance: 15.0,
            protect_radius: 200.0,
            chase_distance: 400.0,
            min_distance: 60.0,
            idle_fraction: 0.3,
            collision_factor: 0.4,
            recoil_factor: 1.5,
            drift_ticks: 120,
            drift_friction: 0.98,
            spin_ticks_per_turn: 15,
            spin_turns: 4,
            wall_restitution: 1.0,
        }
    }
}

impl CompanionConfig {
    pub fn escort(pos: Vec2) -> Self {
        Self {
            role: CompanionRole::Escort,
            pos,
            size: 40.0,
            speed: 3.5,
            ..Self::default()
        }
    }

    pub fn hunter(pos: Vec2) -> Self {
        Self {
            role: CompanionRole::Hunter,
            pos,
            ..Self::default()
        }
    }
}

fn default_companions() -> Vec<CompanionConfig> {
    vec![
        CompanionConfig::hunter(Vec2::new(600.0, 400.0)),
        CompanionConfig::escort(Vec2::new(320.0, 320.0)),
    ]
}

/// Drifting background NPC tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WandererConfig {
    pub count: usize,
    pub size: f32,
    /// Per-axis drift velocity is drawn from [-max_drift/2, max_drift/2)
    pub max_drift: f32,
    pub redirect_min_ticks: u32,
    pub redirect_span_ticks: u32,
    pub pause_chance: f32,
}

impl Default for WandererConfig {
    fn default() -> Self {
        Self {
            count: 1,
            size: 40.0,
            max_drift: 0.8,
            redirect_min_ticks: 180,
            redirect_span_ticks: 300,
            pause_chance: 0.2,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub arena: ArenaConfig,
    pub physics: PhysicsConfig,
    #[serde(default = "default_balls")]
    pub balls: Vec<BallSpawn>,
    pub player: PlayerConfig,
    pub projectiles: ProjectileConfig,
    #[serde(default = "default_companions")]
    pub companions: Vec<CompanionConfig>,
    pub wanderers: WandererConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            physics: PhysicsConfig::default(),
            balls: default_balls(),
            player: PlayerConfig::default(),
            projectiles: ProjectileConfig::default(),
            companions: default_companions(),
            wanderers: WandererConfig::default(),
        }
    }
}

impl SimConfig {
    /// A bare arena: no balls, agents or wanderers. Handy for building scenarios.
    pub fn empty() -> Self {
        Self {
            balls: Vec::new(),
            player: PlayerConfig {
                enabled: false,
                ..PlayerConfig::default()
            },
            companions: Vec::new(),
            wanderers: WandererConfig {
                count: 0,
                ..WandererConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Load a configuration file, falling back to defaults on any failure.
    /// The error message (if any) is returned for the caller to log.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load(path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e.to_string())),
        }
    }

    /// Human-readable warnings for values the simulation will clamp
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.arena.width <= 0.0 || self.arena.height <= 0.0 {
            w.push(format!(
                "arena: size {}x{} must be positive",
                self.arena.width, self.arena.height
            ));
        }
        let damping = self.physics.collision_damping;
        if !(damping > 0.0 && damping <= 1.0) {
            w.push(format!("physics.collision_damping {damping} outside (0, 1]"));
        }
        if let Some(f) = self.physics.shrink_factor {
            if !(f > 0.0 && f <= 1.0) {
                w.push(format!("physics.shrink_factor {f} outside (0, 1]"));
            }
        }
        if self.physics.min_radius < MIN_RADIUS {
            w.push(format!(
                "physics.min_radius {} below floor {MIN_RADIUS}",
                self.physics.min_radius
            ));
        }
        for (i, b) in self.balls.iter().enumerate() {
            if b.radius < MIN_RADIUS {
                w.push(format!("balls[{i}].radius {} below floor {MIN_RADIUS}", b.radius));
            }
        }
        if self.player.size <= 0.0 {
            w.push(format!("player.size {} must be positive", self.player.size));
        }
        if self.player.avoidance.prediction_ticks.is_empty() {
            w.push("player.avoidance.prediction_ticks is empty".to_string());
        }
        if self.projectiles.speed <= 0.0 {
            w.push(format!("projectiles.speed {} must be positive", self.projectiles.speed));
        }
        for (i, c) in self.companions.iter().enumerate() {
            if c.size <= 0.0 {
                w.push(format!("companions[{i}].size {} must be positive", c.size));
            }
            if c.spin_ticks_per_turn == 0 {
                w.push(format!("companions[{i}].spin_ticks_per_turn must be non-zero"));
            }
        }
        w
    }

    /// Copy with every out-of-range value clamped to something the simulation accepts
    pub fn sanitized(&self) -> Self {
        let mut cfg = self.clone();
        cfg.arena.width = cfg.arena.width.max(1.0);
        cfg.arena.height = cfg.arena.height.max(1.0);
        cfg.physics.collision_damping = cfg.physics.collision_damping.clamp(f32::EPSILON, 1.0);
        cfg.physics.shrink_factor = cfg.physics.shrink_factor.map(|f| f.clamp(f32::EPSILON, 1.0));
        cfg.physics.min_radius = cfg.physics.min_radius.max(MIN_RADIUS);
        for b in &mut cfg.balls {
            b.radius = b.radius.max(MIN_RADIUS);
        }
        cfg.player.size = cfg.player.size.max(2.0 * MIN_RADIUS);
        if cfg.player.avoidance.prediction_ticks.is_empty() {
            cfg.player.avoidance.prediction_ticks = AvoidanceConfig::default().prediction_ticks;
        }
        cfg.projectiles.speed = cfg.projectiles.speed.max(f32::EPSILON);
        cfg.projectiles.radius = cfg.projectiles.radius.max(MIN_RADIUS);
        for c in &mut cfg.companions {
            c.size = c.size.max(2.0 * MIN_RADIUS);
            c.spin_ticks_per_turn = c.spin_ticks_per_turn.max(1);
        }
        cfg.wanderers.size = cfg.wanderers.size.max(2.0 * MIN_RADIUS);
        cfg
    }
}
