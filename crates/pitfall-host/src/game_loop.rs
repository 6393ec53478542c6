//! Game loop thread: drives one session at a fixed rate.
//!
//! The controller is built by the caller (so setup errors surface before any
//! thread exists) and moved into the loop thread, which owns it exclusively.
//! Events arrive via an `mpsc` channel and are applied between ticks, in
//! arrival order. Broadcasts and snapshots go out through the `Transport`.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use pitfall_core::commands::{ClientMessage, JoinOptions};
use pitfall_core::constants::TICK_RATE;
use pitfall_core::enums::SessionPhase;
use pitfall_core::state::{PlayerRecord, SessionSnapshot};
use pitfall_core::types::SessionId;
use pitfall_sim::{PhysicsBackend, SessionController};
use serde_json::Value;

use crate::state::{HostConfig, HostError, HostEvent};
use crate::transport::Transport;

/// Handle to a running session loop.
pub struct SessionHost {
    events: mpsc::Sender<HostEvent>,
    latest_snapshot: Arc<Mutex<Option<SessionSnapshot>>>,
    thread: Option<JoinHandle<()>>,
}

/// Move `controller` onto a new game loop thread.
pub fn spawn_session<P, T>(
    controller: SessionController<P>,
    transport: T,
    config: HostConfig,
) -> Result<SessionHost, HostError>
where
    P: PhysicsBackend + Send + 'static,
    T: Transport + 'static,
{
    let (event_tx, event_rx) = mpsc::channel::<HostEvent>();
    let latest_snapshot = Arc::new(Mutex::new(None));
    let loop_snapshot = Arc::clone(&latest_snapshot);

    let thread = std::thread::Builder::new()
        .name(config.thread_name.clone())
        .spawn(move || {
            run_game_loop(controller, transport, &config, event_rx, &loop_snapshot);
        })
        .map_err(HostError::Spawn)?;

    Ok(SessionHost {
        events: event_tx,
        latest_snapshot,
        thread: Some(thread),
    })
}

impl SessionHost {
    /// Queue an event for the loop.
    pub fn send(&self, event: HostEvent) -> Result<(), HostError> {
        self.events.send(event).map_err(|_| HostError::Stopped)
    }

    /// Join and wait for the loop to apply it.
    pub fn join(&self, id: SessionId, options: JoinOptions) -> Result<PlayerRecord, HostError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(HostEvent::Join {
            id,
            options,
            reply: Some(reply_tx),
        })?;
        let record = reply_rx.recv().map_err(|_| HostError::Stopped)??;
        Ok(record)
    }

    pub fn leave(&self, id: SessionId, consented: bool) -> Result<(), HostError> {
        self.send(HostEvent::Leave { id, consented })
    }

    pub fn message(&self, id: SessionId, message: ClientMessage) -> Result<(), HostError> {
        self.send(HostEvent::Message { id, message })
    }

    pub fn raw_message(
        &self,
        id: SessionId,
        kind: impl Into<String>,
        payload: Value,
    ) -> Result<(), HostError> {
        self.send(HostEvent::RawMessage {
            id,
            kind: kind.into(),
            payload,
        })
    }

    /// Snapshot produced by the most recent tick.
    pub fn latest_snapshot(&self) -> Option<SessionSnapshot> {
        self.latest_snapshot
            .lock()
            .ok()
            .and_then(|lock| lock.clone())
    }

    /// Whether the loop thread is still running.
    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Dispose the session and wait for the loop to exit.
    pub fn shutdown(mut self) -> Result<(), HostError> {
        // The loop may already have stopped on its own (auto-dispose).
        let _ = self.events.send(HostEvent::Shutdown);
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| HostError::Panicked),
            None => Ok(()),
        }
    }
}

/// Whether the loop keeps running after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Apply one event to the session.
pub fn apply_event<P: PhysicsBackend>(
    controller: &mut SessionController<P>,
    event: HostEvent,
    config: &HostConfig,
) -> Flow {
    match event {
        HostEvent::Join { id, options, reply } => {
            let result = controller.on_join(id.clone(), options);
            if let Err(err) = &result {
                log::info!("join of {id} refused: {err}");
            }
            if let Some(reply) = reply {
                let _ = reply.send(result);
            }
        }
        HostEvent::Leave { id, consented } => {
            let left = controller.on_leave(&id, consented).is_some();
            if left && config.auto_dispose && controller.player_count() == 0 {
                log::info!("last player left, disposing session");
                controller.dispose();
                return Flow::Stop;
            }
        }
        HostEvent::Message { id, message } => {
            controller.on_message(&id, message);
        }
        HostEvent::RawMessage { id, kind, payload } => {
            controller.on_raw_message(&id, &kind, &payload);
        }
        HostEvent::Shutdown => {
            controller.dispose();
            return Flow::Stop;
        }
    }
    Flow::Continue
}

/// Nominal duration of one tick at `tick_rate` Hz.
pub fn tick_duration(tick_rate: u32) -> Duration {
    let rate = if tick_rate == 0 { TICK_RATE } else { tick_rate };
    Duration::from_nanos(1_000_000_000 / u64::from(rate))
}

/// The game loop. Runs until Shutdown, auto-dispose or channel disconnect.
fn run_game_loop<P: PhysicsBackend, T: Transport>(
    mut controller: SessionController<P>,
    mut transport: T,
    config: &HostConfig,
    event_rx: mpsc::Receiver<HostEvent>,
    latest_snapshot: &Mutex<Option<SessionSnapshot>>,
) {
    let tick_duration = tick_duration(config.tick_rate.unwrap_or(controller.config().tick_rate));
    log::info!(
        "game loop started for `{}` at {:?} per tick",
        controller.config().room_name,
        tick_duration
    );

    let mut last_tick = Instant::now();
    let mut next_tick_time = last_tick;

    loop {
        // 1. Drain pending events
        let mut flow = Flow::Continue;
        loop {
            match event_rx.try_recv() {
                Ok(event) => {
                    flow = apply_event(&mut controller, event, config);
                    if flow == Flow::Stop {
                        break;
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    controller.dispose();
                    flow = Flow::Stop;
                    break;
                }
            }
        }

        // 2. Flush broadcasts produced by the events
        for broadcast in controller.take_broadcasts() {
            transport.broadcast(&broadcast);
        }

        if flow == Flow::Stop || controller.phase() == SessionPhase::Disposed {
            publish(&controller.snapshot(), &mut transport, latest_snapshot);
            log::info!("game loop stopped for `{}`", controller.config().room_name);
            return;
        }

        // 3. Advance one tick by the wall-clock time since the last one
        let now = Instant::now();
        let elapsed = now - last_tick;
        last_tick = now;
        let snapshot = controller.tick(elapsed);

        // 4. Replicate
        publish(&snapshot, &mut transport, latest_snapshot);

        // 5. Sleep until next tick
        next_tick_time += tick_duration;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > tick_duration * 2 {
            // Too far behind, reset instead of bursting ticks
            next_tick_time = now;
        }
    }
}

fn publish<T: Transport>(
    snapshot: &SessionSnapshot,
    transport: &mut T,
    latest_snapshot: &Mutex<Option<SessionSnapshot>>,
) {
    transport.replicate(snapshot);
    if let Ok(mut lock) = latest_snapshot.lock() {
        *lock = Some(snapshot.clone());
    }
}
