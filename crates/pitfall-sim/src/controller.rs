//! Session controller: the authoritative owner of one match.
//!
//! `SessionController` owns the physics world, the player registry, the
//! match configuration and the session RNG. Client messages only store
//! validated intent or change configuration; physics is mutated exclusively
//! inside `tick`. Completely headless, so a whole session can be driven
//! deterministically from tests.

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use pitfall_core::commands::{ClientMessage, JoinOptions};
use pitfall_core::config::SessionConfig;
use pitfall_core::constants::DEFAULT_PLAYER_NAME;
use pitfall_core::enums::{MapChangePolicy, SessionPhase};
use pitfall_core::error::{IgnoreReason, MessageOutcome, Rejection, SessionError};
use pitfall_core::events::Broadcast;
use pitfall_core::state::{MatchConfig, PlayerRecord, RoomMetadata, SessionSnapshot};
use pitfall_core::types::{SessionId, SimTime};
use serde_json::Value;

use crate::input::validate_profile;
use crate::map_loader::MapSource;
use crate::physics::{PhysicsBackend, RapierWorld};
use crate::registry::{NewPlayer, PlayerRegistry};
use crate::systems;
use crate::world_setup;

pub struct SessionController<P: PhysicsBackend = RapierWorld> {
    config: SessionConfig,
    maps: Box<dyn MapSource + Send>,
    physics: P,
    registry: PlayerRegistry,
    rng: ChaCha8Rng,
    match_config: MatchConfig,
    phase: SessionPhase,
    time: SimTime,
    broadcasts: Vec<Broadcast>,
}

impl SessionController<RapierWorld> {
    /// Create a session backed by a fresh rapier world.
    pub fn with_rapier(
        config: SessionConfig,
        maps: impl MapSource + Send + 'static,
    ) -> Result<Self, SessionError> {
        let physics = RapierWorld::new(&config.physics);
        Self::create(config, maps, physics)
    }
}

impl<P: PhysicsBackend> SessionController<P> {
    /// Build the static world from the setup map and start running.
    ///
    /// A map that cannot be loaded aborts creation.
    pub fn create(
        config: SessionConfig,
        maps: impl MapSource + Send + 'static,
        mut physics: P,
    ) -> Result<Self, SessionError> {
        let setup_map = config.setup_map().to_string();
        let plates = maps.load(&setup_map).map_err(|err| {
            log::warn!("session setup failed: {err}");
            SessionError::Setup(err)
        })?;
        let plate_count = world_setup::build_geometry(&mut physics, &plates);

        let match_config = MatchConfig {
            mode: config.initial_mode().to_string(),
            map: setup_map,
            started: false,
        };
        log::info!(
            "session `{}` created: mode {}, map {} ({plate_count} plates)",
            config.room_name,
            match_config.mode,
            match_config.map,
        );

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            maps: Box::new(maps),
            physics,
            registry: PlayerRegistry::new(),
            match_config,
            phase: SessionPhase::Running,
            time: SimTime::default(),
            broadcasts: Vec::new(),
        })
    }

    /// Admit a player. The first player of an empty session becomes admin.
    ///
    /// Invalid name/color options fall back to the defaults.
    pub fn on_join(
        &mut self,
        id: SessionId,
        options: JoinOptions,
    ) -> Result<PlayerRecord, SessionError> {
        if self.phase != SessionPhase::Running {
            return Err(SessionError::Disposed);
        }
        if self.registry.contains(&id) {
            return Err(SessionError::AlreadyJoined(id));
        }
        if self.registry.len() >= self.config.max_players {
            return Err(SessionError::SessionFull {
                max: self.config.max_players,
            });
        }

        let profile = validate_profile(options.name.as_deref(), options.color.as_deref())
            .unwrap_or_else(|rejection| {
                log::debug!("ignoring join options for {id}: {rejection}");
                Default::default()
            });
        let spawn = world_setup::random_spawn(&mut self.rng, self.config.physics.player_radius);
        let color = match profile.color {
            Some(color) => color,
            None => world_setup::random_color(&mut self.rng),
        };
        let player = NewPlayer {
            name: profile
                .name
                .unwrap_or_else(|| DEFAULT_PLAYER_NAME.to_string()),
            color,
            spawn,
        };

        let record = self
            .registry
            .join(id, player, &mut self.physics, &self.config.physics)?;
        log::info!(
            "player {} joined ({} of {}){}",
            record.id,
            self.registry.len(),
            self.config.max_players,
            if record.is_admin { " as admin" } else { "" },
        );
        Ok(record)
    }

    /// Remove a player and its body. Unknown identities are a no-op.
    pub fn on_leave(&mut self, id: &SessionId, consented: bool) -> Option<PlayerRecord> {
        let record = self.registry.leave(id, &mut self.physics)?;
        log::info!("player {id} left (consented: {consented})");
        if record.is_admin {
            if let Some(admin) = self.registry.admin() {
                log::info!("admin handed from {id} to {admin}");
            }
        }
        Some(record)
    }

    /// Handle a decoded client message from `sender`.
    pub fn on_message(&mut self, sender: &SessionId, message: ClientMessage) -> MessageOutcome {
        if let Some(reason) = self.gate(sender) {
            return self.ignored(sender, message.kind(), reason);
        }

        let kind = message.kind();
        let result = match message {
            ClientMessage::ChangeProfile { name, color } => {
                self.change_profile(sender, name.as_deref(), color.as_deref())
            }
            ClientMessage::SetMode { mode } => self.set_mode(sender, mode),
            ClientMessage::SetMap { map } => self.set_map(sender, map),
            ClientMessage::StartMatch => self.start_match(sender),
            ClientMessage::Move { speed, orientation } => {
                self.registry.set_intent(sender, speed, orientation);
                Ok(())
            }
        };

        match result {
            Ok(()) => MessageOutcome::Applied,
            Err(rejection) => {
                log::debug!("rejected {kind} from {sender}: {rejection}");
                MessageOutcome::Rejected(rejection)
            }
        }
    }

    /// Handle a loosely typed framework message `(type, payload)`.
    pub fn on_raw_message(
        &mut self,
        sender: &SessionId,
        kind: &str,
        payload: &Value,
    ) -> MessageOutcome {
        if let Some(reason) = self.gate(sender) {
            return self.ignored(sender, kind, reason);
        }
        match ClientMessage::from_raw(kind, payload) {
            Ok(message) => self.on_message(sender, message),
            Err(reason) => self.ignored(sender, kind, reason),
        }
    }

    fn gate(&self, sender: &SessionId) -> Option<IgnoreReason> {
        if self.phase != SessionPhase::Running {
            Some(IgnoreReason::NotRunning)
        } else if !self.registry.contains(sender) {
            Some(IgnoreReason::StaleSender)
        } else {
            None
        }
    }

    fn ignored(&self, sender: &SessionId, kind: &str, reason: IgnoreReason) -> MessageOutcome {
        log::debug!("ignored {kind} from {sender}: {reason}");
        MessageOutcome::Ignored(reason)
    }

    fn change_profile(
        &mut self,
        sender: &SessionId,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<(), Rejection> {
        let edit = validate_profile(name, color)?;
        self.registry.set_profile(sender, edit.name, edit.color);
        Ok(())
    }

    /// Admin-only, pre-start configuration gate.
    fn require_admin_setup(&self, sender: &SessionId) -> Result<(), Rejection> {
        if !self.registry.is_admin(sender) {
            return Err(Rejection::NotAdmin);
        }
        if self.match_config.started {
            return Err(Rejection::AlreadyStarted);
        }
        Ok(())
    }

    fn set_mode(&mut self, sender: &SessionId, mode: String) -> Result<(), Rejection> {
        self.require_admin_setup(sender)?;
        if !self.config.is_legal_mode(&mode) {
            return Err(Rejection::UnknownMode(mode));
        }

        log::info!("mode set to {mode} by {sender}");
        self.match_config.mode = mode.clone();
        self.broadcasts.push(Broadcast::UpdateMode { mode });
        Ok(())
    }

    fn set_map(&mut self, sender: &SessionId, map: String) -> Result<(), Rejection> {
        self.require_admin_setup(sender)?;
        if !self.config.is_legal_map(&map) {
            return Err(Rejection::UnknownMap(map));
        }

        if self.config.map_change_policy == MapChangePolicy::Regenerate {
            let plates = match self.maps.load(&map) {
                Ok(plates) => plates,
                Err(err) => {
                    log::warn!("cannot switch to map {map}: {err}");
                    return Err(Rejection::MapUnavailable(map));
                }
            };
            let count = world_setup::rebuild_geometry(&mut self.physics, &plates);
            log::info!("rebuilt static world from map {map} ({count} plates)");
        }

        log::info!("map set to {map} by {sender}");
        self.match_config.map = map.clone();
        self.broadcasts.push(Broadcast::UpdateMap { map });
        Ok(())
    }

    fn start_match(&mut self, sender: &SessionId) -> Result<(), Rejection> {
        self.require_admin_setup(sender)?;

        self.match_config.started = true;
        log::info!(
            "match started by {sender}: mode {}, map {}",
            self.match_config.mode,
            self.match_config.map
        );
        self.broadcasts.push(Broadcast::MatchStarted {
            mode: self.match_config.mode.clone(),
            map: self.match_config.map.clone(),
        });
        Ok(())
    }

    /// Advance the session by one tick covering `elapsed` wall-clock time.
    ///
    /// Steps physics first, then applies intents, respawns fallen players and
    /// writes transforms back into the replicated records. A session that is
    /// not running returns its current snapshot unchanged.
    pub fn tick(&mut self, elapsed: Duration) -> SessionSnapshot {
        if self.phase != SessionPhase::Running {
            return self.snapshot();
        }

        let physics_config = &self.config.physics;
        let steps = self.physics.step(
            physics_config.fixed_dt,
            elapsed.as_secs_f32(),
            physics_config.max_sub_steps,
        );

        systems::movement::apply_intents(
            &self.registry,
            &mut self.physics,
            &self.config.speed_bounds,
            self.config.intent_speed_scale,
        );
        let respawned = systems::recovery::run(
            &mut self.registry,
            &mut self.physics,
            &mut self.rng,
            self.config.floor_threshold,
            self.config.physics.player_radius,
        );
        systems::movement::sync_transforms(&mut self.registry, &self.physics, &respawned);

        self.time
            .advance(f64::from(steps) * f64::from(self.config.physics.fixed_dt));
        self.snapshot()
    }

    /// Current replicated state, without advancing.
    pub fn snapshot(&self) -> SessionSnapshot {
        systems::snapshot::build_snapshot(&self.registry, &self.time, self.phase, self.metadata())
    }

    /// Drain the broadcasts produced since the last call.
    pub fn take_broadcasts(&mut self) -> Vec<Broadcast> {
        std::mem::take(&mut self.broadcasts)
    }

    /// Tear the session down. Every player and body is removed; later joins
    /// fail and later messages and ticks are ignored.
    pub fn dispose(&mut self) {
        if self.phase == SessionPhase::Disposed {
            return;
        }
        for id in self.registry.ids() {
            self.registry.leave(&id, &mut self.physics);
        }
        self.physics.clear_static_bodies();
        self.phase = SessionPhase::Disposed;
        log::info!("session `{}` disposed", self.config.room_name);
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn match_config(&self) -> &MatchConfig {
        &self.match_config
    }

    pub fn metadata(&self) -> RoomMetadata {
        systems::snapshot::build_metadata(
            &self.config.room_name,
            &self.match_config,
            self.registry.len(),
            self.config.max_players,
        )
    }

    pub fn player(&self, id: &SessionId) -> Option<PlayerRecord> {
        self.registry.get(id)
    }

    pub fn player_count(&self) -> usize {
        self.registry.len()
    }

    pub fn admin(&self) -> Option<SessionId> {
        self.registry.admin()
    }

    /// Read-only access to the physics world.
    pub fn physics(&self) -> &P {
        &self.physics
    }

    /// Mutable physics access for tests that need to push bodies around.
    #[cfg(test)]
    pub(crate) fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    #[cfg(test)]
    pub(crate) fn body_of(&self, id: &SessionId) -> Option<pitfall_core::types::BodyHandle> {
        self.registry.body(id)
    }
}
