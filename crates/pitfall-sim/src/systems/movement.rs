//! Intent-to-velocity and transform write-back.

use pitfall_core::config::SpeedBounds;
use pitfall_core::types::{Position, SessionId};

use crate::input::planar_velocity;
use crate::physics::PhysicsBackend;
use crate::registry::PlayerRegistry;

/// Turn every player's stored intent into a planar body velocity.
/// Returns the number of bodies updated.
pub fn apply_intents<P: PhysicsBackend + ?Sized>(
    registry: &PlayerRegistry,
    physics: &mut P,
    bounds: &SpeedBounds,
    scale: f32,
) -> usize {
    let mut applied = 0;
    for record in registry.records() {
        let Some(body) = registry.body(&record.id) else {
            log::warn!("player {} has no body, skipping movement", record.id);
            continue;
        };
        let (vx, vz) = planar_velocity(record.speed_intent, record.orientation_intent, bounds, scale);
        if physics.set_planar_velocity(body, vx, vz) {
            applied += 1;
        } else {
            log::warn!("body for player {} is gone, skipping movement", record.id);
        }
    }
    applied
}

/// Copy body positions and commanded facing into the replicated records.
/// Players in `skip` (respawned this tick) are left as they are.
pub fn sync_transforms<P: PhysicsBackend + ?Sized>(
    registry: &mut PlayerRegistry,
    physics: &P,
    skip: &[SessionId],
) {
    for (id, body) in registry.bodies() {
        if skip.contains(&id) {
            continue;
        }
        let Some(state) = physics.body_state(body) else {
            log::warn!("body for player {id} is gone, skipping transform sync");
            continue;
        };
        let orientation = registry
            .get(&id)
            .map(|record| record.orientation_intent)
            .filter(|o| o.is_finite());
        registry.set_transform(&id, Position::from(state.position), orientation);
    }
}
