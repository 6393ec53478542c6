//! Session constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per physics sub-step.
pub const FIXED_DT: f32 = 1.0 / TICK_RATE as f32;

/// Maximum physics sub-steps per tick when catching up on wall-clock time.
pub const MAX_SUB_STEPS: u32 = 3;

/// Constraint solver iterations per physics sub-step.
pub const SOLVER_ITERATIONS: usize = 4;

/// Vertical gravity (m/s²). Applied along -Y.
pub const GRAVITY_Y: f32 = -9.82;

// --- Player bodies ---

/// Player body mass (kg).
pub const PLAYER_MASS: f32 = 2.0;

/// Player sphere radius (meters). Also the spawn height.
pub const PLAYER_RADIUS: f32 = 0.3;

/// Bodies below this height are respawned.
pub const FLOOR_THRESHOLD: f32 = -10.0;

/// Spawn x/z are drawn from `[0, SPAWN_EXTENT)`.
pub const SPAWN_EXTENT: f32 = 1.0;

// --- Anti-cheat ---

/// Fastest legal planar speed (m/s).
pub const MAX_SPEED: f32 = 25.0;

/// Fastest legal reverse speed (m/s).
pub const MIN_SPEED: f32 = -25.0;

/// Multiplier applied to requested speed before clamping.
pub const INTENT_SPEED_SCALE: f32 = 1.0;

// --- Ground plates ---

/// Half thickness of a ground plate (meters).
pub const PLATE_HALF_THICKNESS: f32 = 1.0;

/// Plate center height. The top face sits at y = 0.
pub const PLATE_CENTER_Y: f32 = -PLATE_HALF_THICKNESS;

/// Most grid cells a map may span along one axis.
pub const MAX_CELLS_PER_AXIS: f32 = 1_048_576.0;

/// Area type tag that suppresses plate generation.
pub const HOLE_AREA_TYPE: &str = "hole";

// --- Profiles ---

/// Display name given to new players.
pub const DEFAULT_PLAYER_NAME: &str = "New Player";

/// Longest accepted display name (characters).
pub const MAX_NAME_LEN: usize = 32;

/// Longest accepted color string (characters).
pub const MAX_COLOR_LEN: usize = 16;

// --- Room ---

/// Listing name for new sessions.
pub const DEFAULT_ROOM_NAME: &str = "New Game";

/// Default player cap per session.
pub const DEFAULT_MAX_PLAYERS: usize = 16;

/// Legal match modes. The first is the initial mode.
pub const DEFAULT_MODES: &[&str] = &["classic", "survival"];

/// Legal maps. The first is the initial map and the one built at setup.
pub const DEFAULT_MAPS: &[&str] = &["lobby", "arena"];
