//! Replicated session state: what the replication layer pushes to clients.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::SessionPhase;
use crate::types::{Position, SessionId, SimTime};

/// One connected player as every client sees it.
///
/// `position` and `facing` are written by the tick from the player's physics
/// body. `is_admin` is only ever changed by the registry on join/leave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: SessionId,
    pub name: String,
    pub color: String,
    pub is_admin: bool,
    pub position: Position,
    /// Facing (radians) last applied by the tick.
    pub facing: f32,
    /// Last requested speed, before validation.
    pub speed_intent: f32,
    /// Last requested facing (radians).
    pub orientation_intent: f32,
}

/// Match configuration selected by the admin before start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub mode: String,
    pub map: String,
    pub started: bool,
}

/// Discovery/listing record for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMetadata {
    pub name: String,
    pub mode: String,
    pub map: String,
    pub started: bool,
    pub player_count: usize,
    pub max_players: usize,
}

/// Complete replicated state produced after each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub time: SimTime,
    pub phase: SessionPhase,
    pub metadata: RoomMetadata,
    pub players: BTreeMap<SessionId, PlayerRecord>,
}
