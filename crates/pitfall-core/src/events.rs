//! Broadcasts emitted by the session to every connected client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Session-wide announcements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Broadcast {
    /// The admin selected a new mode.
    UpdateMode { mode: String },
    /// The admin selected a new map.
    UpdateMap { map: String },
    /// The admin locked the configuration.
    MatchStarted { mode: String, map: String },
}

impl Broadcast {
    /// Wire name of the broadcast.
    pub fn kind(&self) -> &'static str {
        match self {
            Broadcast::UpdateMode { .. } => "update_mode",
            Broadcast::UpdateMap { .. } => "update_map",
            Broadcast::MatchStarted { .. } => "match_started",
        }
    }

    /// Payload as delivered to clients. Mode and map updates carry the bare value.
    pub fn payload(&self) -> Value {
        match self {
            Broadcast::UpdateMode { mode } => Value::String(mode.clone()),
            Broadcast::UpdateMap { map } => Value::String(map.clone()),
            Broadcast::MatchStarted { mode, map } => serde_json::json!({
                "mode": mode,
                "map": map,
            }),
        }
    }
}
