//! Events, configuration and errors shared between the host handle and the
//! game loop thread.

use std::sync::mpsc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use pitfall_core::commands::{ClientMessage, JoinOptions};
use pitfall_core::error::SessionError;
use pitfall_core::state::PlayerRecord;
use pitfall_core::types::SessionId;

/// Reply channel for a join request.
pub type JoinReply = mpsc::Sender<Result<PlayerRecord, SessionError>>;

/// Everything the framework can deliver to a running session.
#[derive(Debug)]
pub enum HostEvent {
    Join {
        id: SessionId,
        options: JoinOptions,
        /// Receives the join result once the loop has applied it.
        reply: Option<JoinReply>,
    },
    Leave {
        id: SessionId,
        consented: bool,
    },
    Message {
        id: SessionId,
        message: ClientMessage,
    },
    /// Loosely typed framework message, decoded leniently by the session.
    RawMessage {
        id: SessionId,
        kind: String,
        payload: Value,
    },
    /// Dispose the session and stop the loop.
    Shutdown,
}

/// Host settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Overrides the session's own tick rate when set.
    pub tick_rate: Option<u32>,
    /// Dispose the session as soon as the last player leaves.
    pub auto_dispose: bool,
    /// Thread name for the game loop.
    pub thread_name: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tick_rate: None,
            auto_dispose: true,
            thread_name: "pitfall-game-loop".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to spawn game loop thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("game loop has stopped")]
    Stopped,
    #[error("game loop thread panicked")]
    Panicked,
    #[error(transparent)]
    Session(#[from] SessionError),
}
