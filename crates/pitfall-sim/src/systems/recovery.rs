//! Out-of-bounds recovery: players who fell off the map respawn.

use rand_chacha::ChaCha8Rng;

use pitfall_core::types::{Position, SessionId};

use crate::physics::PhysicsBackend;
use crate::registry::PlayerRegistry;
use crate::world_setup;

/// Respawn every body below `floor_threshold` (or with a non-finite position).
/// Returns the respawned identities in join order.
pub fn run<P: PhysicsBackend + ?Sized>(
    registry: &mut PlayerRegistry,
    physics: &mut P,
    rng: &mut ChaCha8Rng,
    floor_threshold: f32,
    radius: f32,
) -> Vec<SessionId> {
    let mut respawned = Vec::new();
    for (id, body) in registry.bodies() {
        let Some(state) = physics.body_state(body) else {
            continue;
        };
        if state.position.is_finite() && state.position.y >= floor_threshold {
            continue;
        }

        let spawn = world_setup::random_spawn(rng, radius);
        if !physics.reset_body(body, spawn) {
            log::warn!("could not reset body for player {id}");
            continue;
        }
        registry.mark_respawned(&id, Position::from(spawn));
        log::info!("player {id} fell below {floor_threshold}, respawned at {spawn}");
        respawned.push(id);
    }
    respawned
}
