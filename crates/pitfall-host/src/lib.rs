//! PITFALL session host.
//!
//! Runs one `SessionController` on a dedicated game-loop thread. Joins,
//! leaves and messages arrive through an mpsc queue and are applied strictly
//! between ticks; broadcasts and snapshots go out through a `Transport`.

pub mod game_loop;
pub mod state;
pub mod transport;

pub use game_loop::{spawn_session, SessionHost};
pub use pitfall_core as core;
pub use state::{HostConfig, HostError, HostEvent};
pub use transport::{ChannelTransport, Outbound, Transport};
