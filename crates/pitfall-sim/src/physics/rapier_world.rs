//! rapier3d backend for the session's physics world.
//!
//! Ground plates become fixed rigid bodies with cuboid colliders; players
//! become dynamic rigid bodies with ball colliders of explicit mass. The
//! session only ever sees `BodyHandle`s, which map to rapier handles here.

use std::collections::{BTreeSet, HashMap};

use glam::Vec3;
use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::*;

use pitfall_core::config::PhysicsConfig;
use pitfall_core::map::StaticColliderSpec;
use pitfall_core::types::BodyHandle;

use super::{BodyState, PhysicsBackend, StepClock};

/// In-memory rapier simulation owned by one session.
pub struct RapierWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    clock: StepClock,
    handles: HashMap<BodyHandle, RigidBodyHandle>,
    statics: BTreeSet<BodyHandle>,
    next_handle: u64,
}

impl RapierWorld {
    pub fn new(config: &PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.fixed_dt;
        integration_parameters.num_solver_iterations = config.solver_iterations.max(1);

        Self {
            gravity: vector![0.0, config.gravity_y, 0.0],
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            clock: StepClock::new(),
            handles: HashMap::new(),
            statics: BTreeSet::new(),
            next_handle: 0,
        }
    }

    fn register(&mut self, rb: RigidBodyHandle) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.handles.insert(handle, rb);
        handle
    }

    fn rigid_body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        let rb = *self.handles.get(&handle)?;
        self.bodies.get_mut(rb)
    }
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new(&PhysicsConfig::default())
    }
}

impl PhysicsBackend for RapierWorld {
    fn add_static_body(&mut self, spec: &StaticColliderSpec) -> BodyHandle {
        let center = spec.center();
        let he = spec.half_extents();

        let body = RigidBodyBuilder::fixed()
            .translation(vector![center.x, center.y, center.z])
            .build();
        let rb = self.bodies.insert(body);
        let collider = ColliderBuilder::cuboid(he.x, he.y, he.z).build();
        self.colliders
            .insert_with_parent(collider, rb, &mut self.bodies);

        let handle = self.register(rb);
        self.statics.insert(handle);
        handle
    }

    fn add_dynamic_body(&mut self, mass: f32, radius: f32, position: Vec3) -> BodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .build();
        let rb = self.bodies.insert(body);
        let collider = ColliderBuilder::ball(radius).mass(mass).build();
        self.colliders
            .insert_with_parent(collider, rb, &mut self.bodies);

        self.register(rb)
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        let Some(rb) = self.handles.remove(&handle) else {
            return false;
        };
        self.statics.remove(&handle);
        self.bodies
            .remove(
                rb,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    fn clear_static_bodies(&mut self) {
        let statics: Vec<BodyHandle> = self.statics.iter().copied().collect();
        for handle in statics {
            self.remove_body(handle);
        }
    }

    fn step(&mut self, fixed_dt: f32, elapsed: f32, max_sub_steps: u32) -> u32 {
        let steps = self.clock.advance(fixed_dt, elapsed, max_sub_steps);
        self.integration_parameters.dt = fixed_dt;

        for _ in 0..steps {
            self.pipeline.step(
                &self.gravity,
                &self.integration_parameters,
                &mut self.islands,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                &(),
                &(),
            );
        }
        steps
    }

    fn body_state(&self, handle: BodyHandle) -> Option<BodyState> {
        let rb = self.bodies.get(*self.handles.get(&handle)?)?;
        let t = rb.translation();
        let v = rb.linvel();
        Some(BodyState {
            position: Vec3::new(t.x, t.y, t.z),
            velocity: Vec3::new(v.x, v.y, v.z),
        })
    }

    fn set_planar_velocity(&mut self, handle: BodyHandle, vx: f32, vz: f32) -> bool {
        let Some(rb) = self.rigid_body_mut(handle) else {
            return false;
        };
        let vy = rb.linvel().y;
        rb.set_linvel(vector![vx, vy, vz], true);
        true
    }

    fn reset_body(&mut self, handle: BodyHandle, position: Vec3) -> bool {
        let Some(rb) = self.rigid_body_mut(handle) else {
            return false;
        };
        rb.set_translation(vector![position.x, position.y, position.z], true);
        rb.set_rotation(UnitQuaternion::identity(), true);
        rb.set_linvel(vector![0.0, 0.0, 0.0], true);
        rb.set_angvel(vector![0.0, 0.0, 0.0], true);
        rb.reset_forces(true);
        rb.reset_torques(true);
        true
    }

    fn body_count(&self) -> usize {
        self.handles.len()
    }

    fn static_body_count(&self) -> usize {
        self.statics.len()
    }
}
