//! RCON connection adapter for Warden.
//!
//! Provides the [`Dialer`] and [`Client`] traits that abstract over the
//! remote-console session, plus the real implementations backed by
//! `minecraft_client_rs`.
//!
//! The RCON protocol allows exactly one in-flight request per connection,
//! and the underlying client is a blocking, non-thread-safe handle. This
//! crate's job is to turn "send text, get text or error" into a cancellable
//! async operation; serializing access to a connection is the caller's job
//! (see `warden-relay`'s connection slot).

use std::future::Future;

use tokio::time::Instant;

mod client;
mod error;

pub use client::{RconClient, RconDialer};
pub use error::RconError;

/// The remote endpoint of an RCON server.
#[derive(Debug, Clone)]
pub struct RconTarget {
    /// Hostname or IP address of the server.
    pub host: String,
    /// RCON port.
    pub port: u16,
    /// RCON password, sent during the authentication handshake.
    pub password: String,
}

impl RconTarget {
    /// The `host:port` address string the wire client dials.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A live RCON session that can exchange one command at a time.
///
/// `&mut self` encodes the protocol's one-in-flight-request rule in the
/// type system: two sends on the same session cannot overlap without a
/// `&mut` conflict upstream.
pub trait Client: Send + 'static {
    /// Sends a command and waits for the server's reply, up to `deadline`.
    ///
    /// If the deadline expires first, returns [`RconError::SendTimeout`]
    /// immediately; the in-flight exchange finishes in the background and
    /// its outcome is logged, never delivered.
    fn send(
        &mut self,
        command: &str,
        deadline: Instant,
    ) -> impl Future<Output = Result<String, RconError>> + Send;
}

/// Establishes new RCON sessions.
pub trait Dialer: Send + Sync + 'static {
    /// The session type produced by this dialer.
    type Client: Client;

    /// Dials and authenticates a new session, up to `deadline`.
    ///
    /// Follows the same race-against-deadline contract as
    /// [`Client::send`]: on timeout the attempt is abandoned to a logging
    /// task and [`RconError::DialTimeout`] is returned.
    fn dial(
        &self,
        deadline: Instant,
    ) -> impl Future<Output = Result<Self::Client, RconError>> + Send;
}
