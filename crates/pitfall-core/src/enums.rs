//! Enumeration types used throughout the session.

use serde::{Deserialize, Serialize};

/// Session lifecycle. `Disposed` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// World and geometry being built; no events accepted yet.
    #[default]
    Setup,
    /// Accepting joins, leaves and messages; ticking.
    Running,
    /// Torn down. Nothing is accepted any more.
    Disposed,
}

/// What happens to the static world when the admin selects another map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapChangePolicy {
    /// Record the selection only. Geometry stays as built at setup.
    #[default]
    KeepGeometry,
    /// Drop every static collider and rebuild from the newly selected map.
    Regenerate,
}
