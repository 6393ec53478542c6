//! Session configuration.
//!
//! Every field has a default from `constants`, and the whole struct
//! deserializes with `#[serde(default)]` so a host can build it straight from
//! the framework's create options.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::MapChangePolicy;

/// Legal range for requested speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedBounds {
    pub min: f32,
    pub max: f32,
}

impl SpeedBounds {
    /// Bounds of `[-limit, limit]`.
    pub fn symmetric(limit: f32) -> Self {
        let limit = limit.abs();
        Self {
            min: -limit,
            max: limit,
        }
    }
}

impl Default for SpeedBounds {
    fn default() -> Self {
        Self {
            min: MIN_SPEED,
            max: MAX_SPEED,
        }
    }
}

/// Physics tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity_y: f32,
    /// Length of one physics sub-step (seconds).
    pub fixed_dt: f32,
    /// Cap on sub-steps per tick.
    pub max_sub_steps: u32,
    pub solver_iterations: usize,
    pub player_mass: f32,
    pub player_radius: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity_y: GRAVITY_Y,
            fixed_dt: FIXED_DT,
            max_sub_steps: MAX_SUB_STEPS,
            solver_iterations: SOLVER_ITERATIONS,
            player_mass: PLAYER_MASS,
            player_radius: PLAYER_RADIUS,
        }
    }
}

/// Configuration for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Listing name.
    pub room_name: String,
    /// Ticks per second driven by the host.
    pub tick_rate: u32,
    pub max_players: usize,
    /// Legal modes; the first is selected initially.
    pub modes: Vec<String>,
    /// Legal maps; the first is selected initially.
    pub maps: Vec<String>,
    /// Map whose geometry is built at setup. Defaults to the first legal map.
    pub initial_map: Option<String>,
    pub map_change_policy: MapChangePolicy,
    pub speed_bounds: SpeedBounds,
    pub intent_speed_scale: f32,
    pub floor_threshold: f32,
    /// RNG seed for spawn positions and default colors. Same seed = same session.
    pub seed: u64,
    pub physics: PhysicsConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            room_name: DEFAULT_ROOM_NAME.to_string(),
            tick_rate: TICK_RATE,
            max_players: DEFAULT_MAX_PLAYERS,
            modes: DEFAULT_MODES.iter().map(|m| m.to_string()).collect(),
            maps: DEFAULT_MAPS.iter().map(|m| m.to_string()).collect(),
            initial_map: None,
            map_change_policy: MapChangePolicy::default(),
            speed_bounds: SpeedBounds::default(),
            intent_speed_scale: INTENT_SPEED_SCALE,
            floor_threshold: FLOOR_THRESHOLD,
            seed: 42,
            physics: PhysicsConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Map built at setup.
    pub fn setup_map(&self) -> &str {
        self.initial_map
            .as_deref()
            .or_else(|| self.maps.first().map(String::as_str))
            .unwrap_or(DEFAULT_MAPS[0])
    }

    /// Mode selected when the session starts.
    pub fn initial_mode(&self) -> &str {
        self.modes
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_MODES[0])
    }

    pub fn is_legal_mode(&self, mode: &str) -> bool {
        self.modes.iter().any(|m| m == mode)
    }

    pub fn is_legal_map(&self, map: &str) -> bool {
        self.maps.iter().any(|m| m == map)
    }
}
