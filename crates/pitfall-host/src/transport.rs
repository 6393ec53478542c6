//! Outbound side of a session: broadcasts and replicated state.

use std::sync::mpsc;

use pitfall_core::events::Broadcast;
use pitfall_core::state::SessionSnapshot;

/// Delivers session output to connected clients.
pub trait Transport: Send {
    /// Send a named event to every client.
    fn broadcast(&mut self, broadcast: &Broadcast);

    /// Push the state after a tick.
    fn replicate(&mut self, snapshot: &SessionSnapshot);
}

/// One item of session output.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Broadcast(Broadcast),
    Snapshot(SessionSnapshot),
}

/// Transport that forwards everything into an mpsc channel.
///
/// Output is dropped silently once the receiver is gone.
pub struct ChannelTransport {
    tx: mpsc::Sender<Outbound>,
    replicate_snapshots: bool,
}

impl ChannelTransport {
    /// Transport plus the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                tx,
                replicate_snapshots: true,
            },
            rx,
        )
    }

    /// Forward broadcasts only.
    pub fn broadcasts_only() -> (Self, mpsc::Receiver<Outbound>) {
        let (mut transport, rx) = Self::channel();
        transport.replicate_snapshots = false;
        (transport, rx)
    }
}

impl Transport for ChannelTransport {
    fn broadcast(&mut self, broadcast: &Broadcast) {
        let _ = self.tx.send(Outbound::Broadcast(broadcast.clone()));
    }

    fn replicate(&mut self, snapshot: &SessionSnapshot) {
        if self.replicate_snapshots {
            let _ = self.tx.send(Outbound::Snapshot(snapshot.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pitfall_core::enums::SessionPhase;
    use pitfall_core::state::RoomMetadata;
    use pitfall_core::types::SimTime;

    use super::*;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            time: SimTime::default(),
            phase: SessionPhase::Running,
            metadata: RoomMetadata {
                name: "room".into(),
                mode: "classic".into(),
                map: "arena".into(),
                started: false,
                player_count: 0,
                max_players: 16,
            },
            players: BTreeMap::new(),
        }
    }

    #[test]
    fn test_channel_forwards_everything() {
        let (mut transport, rx) = ChannelTransport::channel();
        let update = Broadcast::UpdateMap { map: "arena".into() };
        transport.broadcast(&update);
        transport.replicate(&snapshot());

        assert_eq!(rx.try_recv().unwrap(), Outbound::Broadcast(update));
        assert_eq!(rx.try_recv().unwrap(), Outbound::Snapshot(snapshot()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_broadcasts_only_skips_snapshots() {
        let (mut transport, rx) = ChannelTransport::broadcasts_only();
        transport.replicate(&snapshot());
        transport.broadcast(&Broadcast::UpdateMode { mode: "classic".into() });

        assert!(matches!(rx.try_recv().unwrap(), Outbound::Broadcast(_)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (mut transport, rx) = ChannelTransport::channel();
        drop(rx);
        transport.broadcast(&Broadcast::UpdateMap { map: "arena".into() });
        transport.replicate(&snapshot());
    }
}
