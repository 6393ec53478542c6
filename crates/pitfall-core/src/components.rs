//! ECS components for player entities.
//!
//! Components are plain data structs with no methods.
//! `PlayerRecord` itself is also stored as a component.

use serde::{Deserialize, Serialize};

use crate::types::BodyHandle;

/// The physics body backing a player. The physics world owns the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerBody(pub BodyHandle);

/// Monotonic join counter. Lower = joined earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JoinOrder(pub u64);
