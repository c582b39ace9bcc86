//! The relay service: the filter → slot → send pipeline.

use std::time::Duration;

use tokio::time::Instant;
use warden_rcon::Dialer;

use crate::{
    Command, CommandFilter, CommandHandle, Connection, ConnectionSlot,
    Prober, RelayError, Watchdog, WatchdogConfig, WatchdogHandle,
};

/// The public entry point of the relay.
///
/// An explicitly constructed, explicitly owned value — whoever consumes
/// commands holds the service; there is no global instance. Dropping the
/// service (and any in-flight send tasks) closes the watchdog's signal
/// channels, which ends its loop.
pub struct RelayService<D: Dialer> {
    filter: CommandFilter,
    slot: ConnectionSlot<D>,
    watchdog: WatchdogHandle,
}

impl<D: Dialer> RelayService<D> {
    /// Builds the service and its watchdog.
    ///
    /// The watchdog loop is returned unspawned so the caller owns the
    /// task (and can await it on shutdown).
    pub fn new<P: Prober>(
        dialer: D,
        filter: CommandFilter,
        prober: P,
        config: WatchdogConfig,
    ) -> (Self, Watchdog<D::Client, P>) {
        let slot = ConnectionSlot::new(dialer);
        let (watchdog, handle) =
            Watchdog::new(slot.shared(), prober, config);
        (
            Self {
                filter,
                slot,
                watchdog: handle,
            },
            watchdog,
        )
    }

    /// Attempts the initial connection at startup.
    ///
    /// Purely a warm-up: on failure the slot stays `Absent` and the
    /// first command pays the dial cost instead. Callers typically log
    /// the error and carry on.
    pub async fn connect(
        &self,
        timeout: Duration,
    ) -> Result<(), RelayError> {
        let deadline = Instant::now() + timeout;
        let (guard, redialed) = self.slot.acquire(deadline).await?;
        if redialed {
            self.watchdog.skip();
        }
        drop(guard);
        Ok(())
    }

    /// Submits a command for relaying.
    ///
    /// Returns as soon as the command is either settled (rejected,
    /// unavailable) or committed to a send task holding the slot's
    /// lock. Callers block only on the returned handle, under their own
    /// cancellation, and never inside `submit` itself beyond the
    /// deadline-bounded acquisition.
    pub async fn submit(
        &self,
        command: Command,
        timeout: Duration,
    ) -> CommandHandle {
        // Policy first: a rejected command never touches the slot.
        if let Err(err) = self.filter.check(command.head()) {
            return CommandHandle::ready(Err(err));
        }

        let deadline = Instant::now() + timeout;
        let (mut guard, redialed) =
            match self.slot.acquire(deadline).await {
                Ok(acquired) => acquired,
                Err(err) => return CommandHandle::ready(Err(err)),
            };

        if redialed {
            // The exchange about to happen already proves liveness; the
            // watchdog doesn't need to probe again right away.
            self.watchdog.skip();
        }

        let (tx, handle) = CommandHandle::channel();
        let watchdog = self.watchdog.clone();

        // Exactly one task per command; it owns the guard for the whole
        // send and delivers exactly one result.
        tokio::spawn(async move {
            let text = command.canonical();
            let result = match guard.send(&text, deadline).await {
                Ok(output) => {
                    drop(guard);
                    Ok(output)
                }
                Err(err) => {
                    // Demote before releasing so the next command dials
                    // fresh instead of reusing a dead session.
                    *guard = Connection::Absent;
                    drop(guard);
                    tracing::info!(
                        error = %err,
                        "send failed, connection demoted to absent"
                    );
                    watchdog.run_now();
                    Err(RelayError::SendFailed(err))
                }
            };
            if let Err(result) = tx.send(result) {
                // The caller stopped waiting; the outcome is only
                // observable here.
                tracing::debug!(
                    command = %text,
                    ok = result.is_ok(),
                    "command result abandoned by caller"
                );
            }
        });

        handle
    }
}
