//! Real RCON dialer and session over `minecraft_client_rs`.
//!
//! The wire client is blocking, so every call runs on a
//! `spawn_blocking` task raced against the caller's deadline. A
//! timed-out attempt is never dropped on the floor: it is detached to a
//! logging task so its eventual outcome is still observable, but its
//! result is never delivered to a caller.

use std::sync::Arc;

use minecraft_client_rs::Client as RawClient;
use tokio::sync::Mutex;
use tokio::task::{self, JoinHandle};
use tokio::time::{self, Instant};

use crate::{Client, Dialer, RconError, RconTarget};

/// Dials authenticated RCON sessions against a fixed target.
pub struct RconDialer {
    target: RconTarget,
}

impl RconDialer {
    /// Creates a dialer for the given target.
    pub fn new(target: RconTarget) -> Self {
        Self { target }
    }
}

impl Dialer for RconDialer {
    type Client = RconClient;

    async fn dial(&self, deadline: Instant) -> Result<RconClient, RconError> {
        let addr = self.target.addr();
        let password = self.target.password.clone();

        let mut attempt =
            task::spawn_blocking(move || -> Result<RawClient, String> {
                let mut raw =
                    RawClient::new(addr).map_err(|e| e.to_string())?;
                raw.authenticate(password).map_err(|e| e.to_string())?;
                Ok(raw)
            });

        match time::timeout_at(deadline, &mut attempt).await {
            Ok(Ok(Ok(raw))) => {
                tracing::debug!("rcon session established");
                Ok(RconClient {
                    inner: Arc::new(Mutex::new(raw)),
                })
            }
            Ok(Ok(Err(reason))) => Err(RconError::DialFailed(reason)),
            Ok(Err(join_err)) => {
                Err(RconError::DialFailed(join_err.to_string()))
            }
            Err(_) => {
                abandon("dial", attempt);
                Err(RconError::DialTimeout)
            }
        }
    }
}

/// A live, authenticated RCON session.
///
/// The raw client is shared with at most one outstanding blocking task at
/// a time: the `Arc<Mutex<_>>` exists so an abandoned (timed-out) exchange
/// can finish in the background while the session itself is demoted and
/// replaced by the caller.
pub struct RconClient {
    inner: Arc<Mutex<RawClient>>,
}

impl Client for RconClient {
    async fn send(
        &mut self,
        command: &str,
        deadline: Instant,
    ) -> Result<String, RconError> {
        let command = command.to_owned();
        let inner = Arc::clone(&self.inner);

        let mut attempt =
            task::spawn_blocking(move || -> Result<String, String> {
                let mut raw = inner.blocking_lock();
                let message = raw
                    .send_command(command)
                    .map_err(|e| e.to_string())?;
                Ok(message.body)
            });

        match time::timeout_at(deadline, &mut attempt).await {
            Ok(Ok(Ok(body))) => Ok(body),
            Ok(Ok(Err(reason))) => Err(RconError::SendFailed(reason)),
            Ok(Err(join_err)) => {
                Err(RconError::SendFailed(join_err.to_string()))
            }
            Err(_) => {
                abandon("send", attempt);
                Err(RconError::SendTimeout)
            }
        }
    }
}

/// Detaches a timed-out blocking attempt so its eventual outcome is still
/// observable in the logs without ever reaching a caller.
fn abandon<T: Send + 'static>(
    op: &'static str,
    attempt: JoinHandle<Result<T, String>>,
) {
    tokio::spawn(async move {
        match attempt.await {
            Ok(Ok(_)) => tracing::debug!(
                op,
                "abandoned rcon operation completed after its deadline"
            ),
            Ok(Err(reason)) => tracing::debug!(
                op,
                %reason,
                "abandoned rcon operation failed after its deadline"
            ),
            Err(e) => tracing::warn!(
                op,
                error = %e,
                "abandoned rcon operation panicked"
            ),
        }
    });
}
