//! Headless session engine for PITFALL matches.
//!
//! Owns the physics world, the player registry and the match configuration,
//! applies validated input on a fixed tick and produces `SessionSnapshot`s
//! for replication.

pub mod controller;
pub mod input;
pub mod map_loader;
pub mod physics;
pub mod registry;
pub mod systems;
pub mod world_setup;

pub use controller::SessionController;
pub use map_loader::{InMemoryMaps, MapDirectory, MapSource};
pub use physics::{PhysicsBackend, RapierWorld};
pub use pitfall_core as core;
