//! Player registry: identity to {replicated record, physics body}.
//!
//! One hecs entity per player carrying `PlayerRecord`, `PlayerBody` and
//! `JoinOrder`, plus an identity index. The registry is the only place that
//! touches `is_admin`: it is set on the first join and moved on leave, so
//! exactly one record is admin whenever the registry is non-empty.

use std::collections::HashMap;

use glam::Vec3;
use hecs::{Entity, World};

use pitfall_core::components::{JoinOrder, PlayerBody};
use pitfall_core::config::PhysicsConfig;
use pitfall_core::error::RegistryError;
use pitfall_core::state::PlayerRecord;
use pitfall_core::types::{BodyHandle, Position, SessionId};

use crate::physics::PhysicsBackend;

/// Profile and spawn point for a joining player.
#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub name: String,
    pub color: String,
    pub spawn: Vec3,
}

#[derive(Default)]
pub struct PlayerRegistry {
    world: World,
    index: HashMap<SessionId, Entity>,
    next_join: u64,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player and create its body. The first player in an empty
    /// registry becomes admin.
    pub fn join<P: PhysicsBackend + ?Sized>(
        &mut self,
        id: SessionId,
        player: NewPlayer,
        physics: &mut P,
        body: &PhysicsConfig,
    ) -> Result<PlayerRecord, RegistryError> {
        if self.index.contains_key(&id) {
            return Err(RegistryError::DuplicateIdentity(id));
        }

        let handle = physics.add_dynamic_body(body.player_mass, body.player_radius, player.spawn);
        let record = PlayerRecord {
            id: id.clone(),
            name: player.name,
            color: player.color,
            is_admin: self.index.is_empty(),
            position: Position::from(player.spawn),
            facing: 0.0,
            speed_intent: 0.0,
            orientation_intent: 0.0,
        };

        let order = JoinOrder(self.next_join);
        self.next_join += 1;
        let entity = self
            .world
            .spawn((record.clone(), PlayerBody(handle), order));
        self.index.insert(id, entity);

        Ok(record)
    }

    /// Remove a player and its body. If it was admin, the earliest remaining
    /// joiner is promoted. Unknown identities are a no-op.
    pub fn leave<P: PhysicsBackend + ?Sized>(
        &mut self,
        id: &SessionId,
        physics: &mut P,
    ) -> Option<PlayerRecord> {
        let entity = self.index.remove(id)?;
        let (record, body) = self
            .world
            .remove::<(PlayerRecord, PlayerBody)>(entity)
            .ok()?;
        let _ = self.world.despawn(entity);

        if !physics.remove_body(body.0) {
            log::warn!("player {id} left without a live physics body");
        }

        if record.is_admin {
            self.promote_earliest();
        }
        Some(record)
    }

    fn promote_earliest(&mut self) {
        if let Some((_, (_, record))) = self
            .world
            .query_mut::<(&JoinOrder, &mut PlayerRecord)>()
            .into_iter()
            .min_by_key(|(_, (order, _))| **order)
        {
            record.is_admin = true;
        }
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.index.contains_key(id)
    }

    /// Copy of the player's record.
    pub fn get(&self, id: &SessionId) -> Option<PlayerRecord> {
        let entity = *self.index.get(id)?;
        self.world
            .get::<&PlayerRecord>(entity)
            .ok()
            .map(|record| (*record).clone())
    }

    pub fn is_admin(&self, id: &SessionId) -> bool {
        self.get(id).is_some_and(|record| record.is_admin)
    }

    /// Identity of the current admin, if anyone is registered.
    pub fn admin(&self) -> Option<SessionId> {
        self.world
            .query::<&PlayerRecord>()
            .iter()
            .find(|(_, record)| record.is_admin)
            .map(|(_, record)| record.id.clone())
    }

    pub fn body(&self, id: &SessionId) -> Option<BodyHandle> {
        let entity = *self.index.get(id)?;
        self.world.get::<&PlayerBody>(entity).ok().map(|body| body.0)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Identities and bodies in join order.
    pub fn bodies(&self) -> Vec<(SessionId, BodyHandle)> {
        let mut rows: Vec<(JoinOrder, SessionId, BodyHandle)> = self
            .world
            .query::<(&JoinOrder, &PlayerRecord, &PlayerBody)>()
            .iter()
            .map(|(_, (order, record, body))| (*order, record.id.clone(), body.0))
            .collect();
        rows.sort_by_key(|(order, _, _)| *order);
        rows.into_iter().map(|(_, id, body)| (id, body)).collect()
    }

    /// Identities in join order.
    pub fn ids(&self) -> Vec<SessionId> {
        self.bodies().into_iter().map(|(id, _)| id).collect()
    }

    /// Copies of every record in join order.
    pub fn records(&self) -> Vec<PlayerRecord> {
        let mut rows: Vec<(JoinOrder, PlayerRecord)> = self
            .world
            .query::<(&JoinOrder, &PlayerRecord)>()
            .iter()
            .map(|(_, (order, record))| (*order, record.clone()))
            .collect();
        rows.sort_by_key(|(order, _)| *order);
        rows.into_iter().map(|(_, record)| record).collect()
    }

    /// Overwrite display fields. `None` leaves a field unchanged.
    pub fn set_profile(&mut self, id: &SessionId, name: Option<String>, color: Option<String>) -> bool {
        self.update(id, |record| {
            if let Some(name) = name {
                record.name = name;
            }
            if let Some(color) = color {
                record.color = color;
            }
        })
    }

    /// Store raw movement intent for the next tick.
    pub fn set_intent(&mut self, id: &SessionId, speed: f32, orientation: f32) -> bool {
        self.update(id, |record| {
            record.speed_intent = speed;
            record.orientation_intent = orientation;
        })
    }

    /// Write the physics transform back. `facing` is skipped when `None`.
    pub fn set_transform(&mut self, id: &SessionId, position: Position, facing: Option<f32>) -> bool {
        self.update(id, |record| {
            record.position = position;
            if let Some(facing) = facing {
                record.facing = facing;
            }
        })
    }

    /// Record a respawn: new position, speed intent cleared.
    pub fn mark_respawned(&mut self, id: &SessionId, position: Position) -> bool {
        self.update(id, |record| {
            record.position = position;
            record.speed_intent = 0.0;
        })
    }

    fn update(&mut self, id: &SessionId, f: impl FnOnce(&mut PlayerRecord)) -> bool {
        let Some(&entity) = self.index.get(id) else {
            return false;
        };
        match self.world.query_one_mut::<&mut PlayerRecord>(entity) {
            Ok(record) => {
                f(record);
                true
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::RapierWorld;

    fn spawn(name: &str) -> NewPlayer {
        NewPlayer {
            name: name.to_string(),
            color: "#FFFFFF".to_string(),
            spawn: Vec3::new(0.5, 0.3, 0.5),
        }
    }

    fn setup() -> (PlayerRegistry, RapierWorld, PhysicsConfig) {
        (PlayerRegistry::new(), RapierWorld::default(), PhysicsConfig::default())
    }

    fn admins(registry: &PlayerRegistry) -> usize {
        registry.records().iter().filter(|r| r.is_admin).count()
    }

    #[test]
    fn test_first_joiner_is_admin() {
        let (mut reg, mut physics, cfg) = setup();
        let a = reg.join("a".into(), spawn("A"), &mut physics, &cfg).unwrap();
        let b = reg.join("b".into(), spawn("B"), &mut physics, &cfg).unwrap();
        assert!(a.is_admin);
        assert!(!b.is_admin);
        assert_eq!(reg.admin(), Some(SessionId::new("a")));
        assert_eq!(physics.body_count(), 2);
        assert_eq!(a.position, Position::new(0.5, 0.3, 0.5));
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let (mut reg, mut physics, cfg) = setup();
        reg.join("a".into(), spawn("A"), &mut physics, &cfg).unwrap();
        let err = reg
            .join("a".into(), spawn("A again"), &mut physics, &cfg)
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateIdentity("a".into()));
        assert_eq!(reg.len(), 1);
        assert_eq!(physics.body_count(), 1, "no body for a rejected join");
    }

    #[test]
    fn test_admin_handoff_to_earliest_joiner() {
        let (mut reg, mut physics, cfg) = setup();
        for id in ["a", "b", "c"] {
            reg.join(id.into(), spawn(id), &mut physics, &cfg).unwrap();
        }

        let removed = reg.leave(&"a".into(), &mut physics).unwrap();
        assert!(removed.is_admin);
        assert_eq!(reg.admin(), Some(SessionId::new("b")));
        assert_eq!(admins(&reg), 1);
        assert_eq!(physics.body_count(), 2);
    }

    #[test]
    fn test_non_admin_leave_keeps_admin() {
        let (mut reg, mut physics, cfg) = setup();
        for id in ["a", "b", "c"] {
            reg.join(id.into(), spawn(id), &mut physics, &cfg).unwrap();
        }
        reg.leave(&"b".into(), &mut physics);
        assert_eq!(reg.admin(), Some(SessionId::new("a")));
        assert_eq!(reg.ids(), vec![SessionId::new("a"), SessionId::new("c")]);
    }

    #[test]
    fn test_leave_is_idempotent() {
        let (mut reg, mut physics, cfg) = setup();
        reg.join("a".into(), spawn("A"), &mut physics, &cfg).unwrap();
        assert!(reg.leave(&"a".into(), &mut physics).is_some());
        assert!(reg.leave(&"a".into(), &mut physics).is_none());
        assert!(reg.leave(&"ghost".into(), &mut physics).is_none());
        assert!(reg.is_empty());
        assert_eq!(reg.admin(), None);
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn test_rejoin_after_empty_becomes_admin() {
        let (mut reg, mut physics, cfg) = setup();
        reg.join("a".into(), spawn("A"), &mut physics, &cfg).unwrap();
        reg.leave(&"a".into(), &mut physics);
        let b = reg.join("b".into(), spawn("B"), &mut physics, &cfg).unwrap();
        assert!(b.is_admin);
    }

    #[test]
    fn test_exactly_one_admin_through_churn() {
        let (mut reg, mut physics, cfg) = setup();
        let ids: Vec<String> = (0..8).map(|i| format!("p{i}")).collect();
        for id in &ids {
            reg.join(id.as_str().into(), spawn(id), &mut physics, &cfg).unwrap();
            assert_eq!(admins(&reg), 1);
        }
        for id in ids.iter().rev().step_by(2).chain(ids.iter()) {
            reg.leave(&id.as_str().into(), &mut physics);
            let expected = usize::from(!reg.is_empty());
            assert_eq!(admins(&reg), expected);
        }
        assert!(reg.is_empty());
    }

    #[test]
    fn test_mutators_touch_only_their_fields() {
        let (mut reg, mut physics, cfg) = setup();
        let id: SessionId = "a".into();
        reg.join(id.clone(), spawn("A"), &mut physics, &cfg).unwrap();

        assert!(reg.set_profile(&id, Some("Zed".into()), None));
        assert!(reg.set_intent(&id, 3.0, 1.5));
        assert!(reg.set_transform(&id, Position::new(1.0, 2.0, 3.0), None));

        let record = reg.get(&id).unwrap();
        assert_eq!(record.name, "Zed");
        assert_eq!(record.color, "#FFFFFF");
        assert_eq!(record.speed_intent, 3.0);
        assert_eq!(record.orientation_intent, 1.5);
        assert_eq!(record.position, Position::new(1.0, 2.0, 3.0));
        assert_eq!(record.facing, 0.0);
        assert!(record.is_admin);

        assert!(reg.mark_respawned(&id, Position::new(0.1, 0.3, 0.2)));
        let record = reg.get(&id).unwrap();
        assert_eq!(record.speed_intent, 0.0);
        assert_eq!(record.orientation_intent, 1.5);

        assert!(!reg.set_intent(&"ghost".into(), 1.0, 1.0));
    }
}
