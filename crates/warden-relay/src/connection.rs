//! The tagged connection variant occupying the slot.

use tokio::time::Instant;
use warden_rcon::{Client, RconError};

/// What currently occupies the connection slot.
///
/// `Absent` is a stand-in, not a null: sending through it fails with a
/// uniform error without touching the network, which gives every failed
/// send the same shape regardless of why there is no connection. The
/// transitions between the variants are explicit writes under the slot's
/// lock:
///
/// ```text
///   Absent ──(successful dial)──→ Live
///   Live ──(failed send / watchdog demotion)──→ Absent
/// ```
pub enum Connection<C> {
    /// A live, authenticated session.
    Live(C),
    /// No session; the next acquisition dials a fresh one.
    Absent,
}

impl<C> Connection<C> {
    /// Whether a live session currently occupies the slot.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }
}

impl<C: Client> Connection<C> {
    /// Sends a command through the current variant.
    ///
    /// `Absent` answers immediately and never blocks; `Live` forwards to
    /// the session with the caller's deadline.
    pub async fn send(
        &mut self,
        command: &str,
        deadline: Instant,
    ) -> Result<String, RconError> {
        match self {
            Self::Live(client) => client.send(command, deadline).await,
            Self::Absent => Err(RconError::NotConnected),
        }
    }
}
