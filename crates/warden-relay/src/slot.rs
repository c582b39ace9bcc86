//! The connection slot: one shared cell, one lock, lazy dialing.
//!
//! The slot is the only mutable shared resource in the relay. Exactly
//! three actors write to it, all under the same lock: the service's send
//! step, the lazy dial inside [`acquire`](ConnectionSlot::acquire), and
//! the watchdog's demotion. There is no second lock and no ordering to
//! reason about.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::{self, Instant};
use warden_rcon::Dialer;

use crate::{Connection, RelayError};

/// A shared handle to the slot's cell, handed to the watchdog so its
/// demotion path takes the same lock as everyone else.
pub type SharedConnection<C> = Arc<Mutex<Connection<C>>>;

/// The single mutable cell holding the current connection variant.
///
/// Created with `Absent` inside — there is no "initialize under a held
/// lock" phase; the first acquirer simply pays the dial cost.
pub struct ConnectionSlot<D: Dialer> {
    conn: SharedConnection<D::Client>,
    dialer: D,
}

impl<D: Dialer> ConnectionSlot<D> {
    /// Creates a slot with no live connection.
    pub fn new(dialer: D) -> Self {
        Self {
            conn: Arc::new(Mutex::new(Connection::Absent)),
            dialer,
        }
    }

    /// A clone of the underlying cell for the watchdog's demotion path.
    pub fn shared(&self) -> SharedConnection<D::Client> {
        Arc::clone(&self.conn)
    }

    /// Acquires exclusive access to a live connection, dialing one if
    /// the slot is `Absent`, all bounded by `deadline`.
    ///
    /// On success the returned guard is still held: the caller performs
    /// its send and releases by dropping (or demotes first by writing
    /// `Absent` through the guard). The `bool` reports whether a fresh
    /// session was dialed, so the caller can retune the watchdog.
    ///
    /// A timed-out lock future is dropped from the mutex's wait queue,
    /// so an abandoned acquisition can never leave the slot locked —
    /// the lock transitions locked→unlocked exactly once per logical
    /// operation, enforced by the guard.
    pub async fn acquire(
        &self,
        deadline: Instant,
    ) -> Result<(OwnedMutexGuard<Connection<D::Client>>, bool), RelayError>
    {
        let mut guard = time::timeout_at(
            deadline,
            Arc::clone(&self.conn).lock_owned(),
        )
        .await
        .map_err(|_| {
            RelayError::Unavailable(
                "timed out waiting for an available connection"
                    .to_string(),
            )
        })?;

        // Fast path: a live session is already in the slot.
        if guard.is_live() {
            return Ok((guard, false));
        }

        match self.dialer.dial(deadline).await {
            Ok(client) => {
                tracing::info!("rcon connection established");
                *guard = Connection::Live(client);
                Ok((guard, true))
            }
            Err(err) => {
                // The slot stays Absent; the guard releases on drop.
                tracing::warn!(
                    error = %err,
                    "failed to obtain an rcon connection"
                );
                Err(RelayError::Unavailable(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use warden_rcon::{Client, RconError};

    use super::*;

    /// A scriptable dialer: counts dials, fails on demand, connects
    /// instantly otherwise.
    #[derive(Clone, Default)]
    struct FakeDialer {
        dials: Arc<AtomicUsize>,
        fail: Arc<AtomicBool>,
    }

    struct FakeClient;

    impl Client for FakeClient {
        async fn send(
            &mut self,
            command: &str,
            _deadline: Instant,
        ) -> Result<String, RconError> {
            Ok(command.to_string())
        }
    }

    impl Dialer for FakeDialer {
        type Client = FakeClient;

        async fn dial(
            &self,
            _deadline: Instant,
        ) -> Result<FakeClient, RconError> {
            self.dials.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                Err(RconError::DialFailed("scripted failure".to_string()))
            } else {
                Ok(FakeClient)
            }
        }
    }

    fn generous() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[tokio::test]
    async fn test_acquire_absent_slot_dials_lazily() {
        let dialer = FakeDialer::default();
        let slot = ConnectionSlot::new(dialer.clone());

        let (guard, redialed) = slot.acquire(generous()).await.unwrap();

        assert!(redialed, "first acquisition should dial");
        assert!(guard.is_live());
        assert_eq!(dialer.dials.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_acquire_live_slot_skips_dialing() {
        let dialer = FakeDialer::default();
        let slot = ConnectionSlot::new(dialer.clone());

        let (guard, _) = slot.acquire(generous()).await.unwrap();
        drop(guard);

        let (guard, redialed) = slot.acquire(generous()).await.unwrap();

        assert!(!redialed, "live connection should be reused");
        assert!(guard.is_live());
        assert_eq!(dialer.dials.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_acquire_dial_failure_leaves_slot_absent() {
        let dialer = FakeDialer::default();
        dialer.fail.store(true, Ordering::SeqCst);
        let slot = ConnectionSlot::new(dialer.clone());

        let err = slot.acquire(generous()).await.err().unwrap();
        assert!(matches!(err, RelayError::Unavailable(_)));

        // The next acquisition must attempt a fresh dial (the slot did
        // not get a broken Live written into it).
        dialer.fail.store(false, Ordering::SeqCst);
        let (guard, redialed) = slot.acquire(generous()).await.unwrap();
        assert!(redialed);
        assert!(guard.is_live());
        assert_eq!(dialer.dials.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_times_out_while_lock_is_held() {
        let slot = ConnectionSlot::new(FakeDialer::default());

        let (held, _) = slot.acquire(generous()).await.unwrap();

        let deadline = Instant::now() + Duration::from_millis(50);
        let err = slot.acquire(deadline).await.err().unwrap();

        assert!(matches!(err, RelayError::Unavailable(_)));
        assert!(err.to_string().contains("timed out waiting"));
        drop(held);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_acquire_does_not_wedge_the_lock() {
        let dialer = FakeDialer::default();
        let slot = ConnectionSlot::new(dialer.clone());

        let (held, _) = slot.acquire(generous()).await.unwrap();

        // This waiter gives up after 50ms...
        let deadline = Instant::now() + Duration::from_millis(50);
        assert!(slot.acquire(deadline).await.is_err());

        // ...and once the holder releases, a later acquisition with a
        // fresh, generous deadline must succeed — no reaper required,
        // the cancelled waiter left the queue when it was dropped.
        drop(held);
        let (guard, _) = slot.acquire(generous()).await.unwrap();
        assert!(guard.is_live());
    }
}
