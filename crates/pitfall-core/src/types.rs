//! Fundamental identity, geometry and time types.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Session identity assigned by the hosting framework.
/// Stable for the lifetime of a connection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Replicated 3D position (meters). y is up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<Vec3> for Position {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Position> for Vec3 {
    fn from(p: Position) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

/// Key for a body owned by the physics world.
///
/// Holders of a handle never own the body; the physics world may already have
/// dropped it, in which case lookups return `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u64);

/// Session time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of ticks run so far.
    pub tick: u64,
    /// Simulated seconds advanced by physics.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick covering `secs` of simulated time.
    pub fn advance(&mut self, secs: f64) {
        self.tick += 1;
        self.elapsed_secs += secs;
    }
}
