//! Spawn factories: static ground geometry, spawn points and default colors.

use glam::Vec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use pitfall_core::constants::SPAWN_EXTENT;
use pitfall_core::map::StaticColliderSpec;

use crate::physics::PhysicsBackend;

/// Add one fixed body per plate. Returns the number of plates added.
pub fn build_geometry<P: PhysicsBackend + ?Sized>(
    physics: &mut P,
    plates: &[StaticColliderSpec],
) -> usize {
    for plate in plates {
        physics.add_static_body(plate);
    }
    plates.len()
}

/// Drop every static body and build `plates` in their place.
pub fn rebuild_geometry<P: PhysicsBackend + ?Sized>(
    physics: &mut P,
    plates: &[StaticColliderSpec],
) -> usize {
    physics.clear_static_bodies();
    build_geometry(physics, plates)
}

/// Random spawn point: x and z in `[0, SPAWN_EXTENT)`, resting at `radius`.
pub fn random_spawn(rng: &mut ChaCha8Rng, radius: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(0.0..SPAWN_EXTENT),
        radius,
        rng.gen_range(0.0..SPAWN_EXTENT),
    )
}

/// Random `#RRGGBB` color, uppercase hex.
pub fn random_color(rng: &mut ChaCha8Rng) -> String {
    let rgb: u32 = rng.gen_range(0..0x0100_0000);
    format!("#{rgb:06X}")
}
