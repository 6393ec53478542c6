//! Physics capability used by the session.
//!
//! The session only needs to place bodies, step the world and read or reset
//! body state, so the engine sits behind `PhysicsBackend`. `RapierWorld` is the
//! production backend; tests can substitute a scripted one.

pub mod rapier_world;

use glam::Vec3;

use pitfall_core::map::StaticColliderSpec;
use pitfall_core::types::BodyHandle;

pub use rapier_world::RapierWorld;

/// Kinematic state of one body after the last step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// The operations the session performs on its physics world.
pub trait PhysicsBackend {
    /// Insert an immovable ground plate.
    fn add_static_body(&mut self, spec: &StaticColliderSpec) -> BodyHandle;

    /// Insert a dynamic sphere with the given mass.
    fn add_dynamic_body(&mut self, mass: f32, radius: f32, position: Vec3) -> BodyHandle;

    /// Remove a body. Returns `false` if it was already gone.
    fn remove_body(&mut self, handle: BodyHandle) -> bool;

    /// Remove every static body.
    fn clear_static_bodies(&mut self);

    /// Advance the world. See [`StepClock`] for the sub-stepping rule.
    /// Returns the number of sub-steps run.
    fn step(&mut self, fixed_dt: f32, elapsed: f32, max_sub_steps: u32) -> u32;

    fn body_state(&self, handle: BodyHandle) -> Option<BodyState>;

    /// Overwrite the x/z velocity, keeping vertical velocity.
    fn set_planar_velocity(&mut self, handle: BodyHandle, vx: f32, vz: f32) -> bool;

    /// Teleport a body to `position` with zero velocity, identity orientation
    /// and no accumulated forces.
    fn reset_body(&mut self, handle: BodyHandle, position: Vec3) -> bool;

    /// Number of bodies of any kind.
    fn body_count(&self) -> usize;

    fn static_body_count(&self) -> usize;
}

/// Fixed-timestep accumulator.
///
/// Wall-clock time is banked and spent in whole `fixed_dt` sub-steps, at most
/// `max_sub_steps` per call. Time beyond the cap is dropped. An `elapsed` of
/// zero runs exactly one sub-step.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepClock {
    accumulator: f32,
}

impl StepClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sub-steps to run for this call.
    pub fn advance(&mut self, fixed_dt: f32, elapsed: f32, max_sub_steps: u32) -> u32 {
        if !(fixed_dt > 0.0) {
            return 0;
        }
        if elapsed == 0.0 || !elapsed.is_finite() {
            return 1;
        }

        self.accumulator += elapsed.max(0.0);
        let mut steps = 0;
        while self.accumulator >= fixed_dt && steps < max_sub_steps {
            self.accumulator -= fixed_dt;
            steps += 1;
        }
        self.accumulator %= fixed_dt;
        steps
    }

    /// Banked time not yet simulated.
    pub fn pending(&self) -> f32 {
        self.accumulator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_one_step_per_nominal_tick() {
        let mut clock = StepClock::new();
        let total: u32 = (0..60).map(|_| clock.advance(DT, DT, 3)).sum();
        assert!((59..=60).contains(&total), "ran {total} steps");
    }

    #[test]
    fn test_long_stall_capped() {
        let mut clock = StepClock::new();
        assert_eq!(clock.advance(DT, 1.0, 3), 3);
        // Excess beyond the cap is discarded, not replayed next tick.
        assert!(clock.pending() < DT);
    }

    #[test]
    fn test_short_frames_accumulate() {
        let mut clock = StepClock::new();
        assert_eq!(clock.advance(DT, DT * 0.4, 3), 0);
        assert_eq!(clock.advance(DT, DT * 0.4, 3), 0);
        assert_eq!(clock.advance(DT, DT * 0.4, 3), 1);
    }

    #[test]
    fn test_zero_elapsed_runs_single_step() {
        let mut clock = StepClock::new();
        assert_eq!(clock.advance(DT, 0.0, 3), 1);
    }

    #[test]
    fn test_bad_fixed_dt_runs_nothing() {
        let mut clock = StepClock::new();
        assert_eq!(clock.advance(0.0, 1.0, 3), 0);
        assert_eq!(clock.advance(f32::NAN, 1.0, 3), 0);
    }
}
