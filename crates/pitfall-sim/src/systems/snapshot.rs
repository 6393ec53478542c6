//! Snapshot system: builds the replicated `SessionSnapshot`.
//!
//! Read-only; never modifies the registry.

use std::collections::BTreeMap;

use pitfall_core::enums::SessionPhase;
use pitfall_core::state::{MatchConfig, RoomMetadata, SessionSnapshot};
use pitfall_core::types::SimTime;

use crate::registry::PlayerRegistry;

/// Listing record for the current match configuration.
pub fn build_metadata(
    room_name: &str,
    config: &MatchConfig,
    player_count: usize,
    max_players: usize,
) -> RoomMetadata {
    RoomMetadata {
        name: room_name.to_string(),
        mode: config.mode.clone(),
        map: config.map.clone(),
        started: config.started,
        player_count,
        max_players,
    }
}

pub fn build_snapshot(
    registry: &PlayerRegistry,
    time: &SimTime,
    phase: SessionPhase,
    metadata: RoomMetadata,
) -> SessionSnapshot {
    let players: BTreeMap<_, _> = registry
        .records()
        .into_iter()
        .map(|record| (record.id.clone(), record))
        .collect();

    SessionSnapshot {
        time: *time,
        phase,
        metadata,
        players,
    }
}
