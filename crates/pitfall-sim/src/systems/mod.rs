//! Per-tick systems run by the session controller after each physics step.
//!
//! Systems are plain functions over the registry and the physics world.
//! Per-player problems are logged and skipped so one bad body never stalls
//! the tick for everyone else.

pub mod movement;
pub mod recovery;
pub mod snapshot;
