//! Messages sent from clients to the session.
//!
//! Messages are validated against the sender's record when handled; movement
//! intent is stored and only applied on the next tick.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IgnoreReason;

/// All client actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Overwrite the sender's display name and/or color.
    #[serde(alias = "change_player")]
    ChangeProfile {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        color: Option<String>,
    },
    /// Select the match mode (admin, before start).
    SetMode { mode: String },
    /// Select the map (admin, before start).
    SetMap { map: String },
    /// Lock the match configuration (admin).
    StartMatch,
    /// Update movement intent.
    Move { speed: f32, orientation: f32 },
}

impl ClientMessage {
    /// Wire name of this message type.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::ChangeProfile { .. } => "change_profile",
            ClientMessage::SetMode { .. } => "set_mode",
            ClientMessage::SetMap { .. } => "set_map",
            ClientMessage::StartMatch => "start_match",
            ClientMessage::Move { .. } => "move",
        }
    }

    /// Decode a framework message delivered as `(type, payload)`.
    ///
    /// Framework payloads are loosely typed. `set_mode`/`set_map` accept either
    /// a bare string or `{ "mode": .. }`/`{ "map": .. }`. A `move` payload with a
    /// missing or non-numeric field decodes to 0.0 for that field.
    pub fn from_raw(kind: &str, payload: &Value) -> Result<Self, IgnoreReason> {
        match kind {
            "change_profile" | "change_player" => Ok(ClientMessage::ChangeProfile {
                name: optional_string(payload, "name")?,
                color: optional_string(payload, "color")?,
            }),
            "set_mode" => Ok(ClientMessage::SetMode {
                mode: bare_or_field(payload, "mode")?,
            }),
            "set_map" => Ok(ClientMessage::SetMap {
                map: bare_or_field(payload, "map")?,
            }),
            "start_match" => Ok(ClientMessage::StartMatch),
            "move" => Ok(ClientMessage::Move {
                speed: number_or_zero(payload, "speed"),
                orientation: number_or_zero(payload, "orientation"),
            }),
            other => Err(IgnoreReason::UnknownMessageType(other.to_string())),
        }
    }
}

/// Options passed by the framework when a client joins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinOptions {
    pub name: Option<String>,
    pub color: Option<String>,
}

fn optional_string(payload: &Value, field: &str) -> Result<Option<String>, IgnoreReason> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(IgnoreReason::MalformedPayload(format!(
            "`{field}` must be a string"
        ))),
    }
}

fn bare_or_field(payload: &Value, field: &str) -> Result<String, IgnoreReason> {
    match payload {
        Value::String(s) => Ok(s.clone()),
        Value::Object(map) => match map.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(IgnoreReason::MalformedPayload(format!(
                "`{field}` must be a string"
            ))),
        },
        _ => Err(IgnoreReason::MalformedPayload(format!(
            "expected a string or an object with `{field}`"
        ))),
    }
}

fn number_or_zero(payload: &Value, field: &str) -> f32 {
    payload
        .get(field)
        .and_then(Value::as_f64)
        .map(|v| v as f32)
        .unwrap_or(0.0)
}
