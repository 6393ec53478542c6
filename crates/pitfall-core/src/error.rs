//! Error and outcome types.
//!
//! Only `MapLoadError` (via `SessionError::Setup`) is fatal. Everything a
//! client can trigger ends up as a `Rejection` or an `IgnoreReason`, which
//! are logged and never sent back to the client.

use std::io;

use thiserror::Error;

use crate::types::SessionId;

/// Failure to turn a named map resource into collider placements.
#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("map `{0}` not found")]
    NotFound(String),
    #[error("invalid map name `{0}`")]
    InvalidName(String),
    #[error("failed to read map `{name}`: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse map `{name}`: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("map `{name}` has invalid dimensions: {reason}")]
    InvalidDimensions { name: String, reason: String },
}

/// Errors surfaced to the hosting framework.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session setup failed: {0}")]
    Setup(#[from] MapLoadError),
    #[error("session is full ({max} players)")]
    SessionFull { max: usize },
    #[error("{0} has already joined")]
    AlreadyJoined(SessionId),
    #[error("session has been disposed")]
    Disposed,
}

/// Errors raised by the player registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("identity {0} is already registered")]
    DuplicateIdentity(SessionId),
}

impl From<RegistryError> for SessionError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::DuplicateIdentity(id) => SessionError::AlreadyJoined(id),
        }
    }
}

/// A message that broke a gating rule. No state changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("sender is not the admin")]
    NotAdmin,
    #[error("mode `{0}` is not a legal mode")]
    UnknownMode(String),
    #[error("map `{0}` is not a legal map")]
    UnknownMap(String),
    #[error("match has already started")]
    AlreadyStarted,
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
    #[error("map `{0}` could not be loaded")]
    MapUnavailable(String),
}

/// A message that was dropped without being evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IgnoreReason {
    #[error("sender is not registered")]
    StaleSender,
    #[error("session is not running")]
    NotRunning,
    #[error("unknown message type `{0}`")]
    UnknownMessageType(String),
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Result of handling one client message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    Applied,
    Rejected(Rejection),
    Ignored(IgnoreReason),
}

impl MessageOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MessageOutcome::Applied)
    }
}
