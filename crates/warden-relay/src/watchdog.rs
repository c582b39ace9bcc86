//! Background reachability watchdog.
//!
//! A single long-lived loop that periodically (or on demand) checks
//! whether the remote server is reachable at all, and force-demotes the
//! connection slot when it is not. The probe is deliberately decoupled
//! from the command path: it never waits behind an in-flight command, so
//! a slow or hanging send cannot blind health detection — and a hanging
//! probe cannot stall commands. Only the demotion write takes the slot's
//! lock.
//!
//! The command path retunes the schedule through a [`WatchdogHandle`]:
//! a proven-live exchange (successful lazy reconnect) skips the next
//! probe, a proven failure forces one now.

use std::future::Future;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time;

use crate::slot::SharedConnection;
use crate::Connection;

/// Configuration for the watchdog loop.
#[derive(Debug, Clone)]
pub struct WatchdogConfig {
    /// How often to probe when no signals retune the schedule.
    pub period: Duration,
    /// How long a single reachability probe may take.
    pub probe_timeout: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(60),
            probe_timeout: Duration::from_secs(3),
        }
    }
}

/// Checks whether the remote server is reachable at all.
pub trait Prober: Send + 'static {
    /// Returns `true` if the server answered within `timeout`.
    fn probe(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = bool> + Send;
}

/// Probes by opening (and immediately closing) a bare TCP connection to
/// the target — no protocol handshake, just "is anything listening".
pub struct TcpProber {
    host: String,
    port: u16,
}

impl TcpProber {
    /// Creates a prober for the given host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Prober for TcpProber {
    async fn probe(&self, timeout: Duration) -> bool {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        match time::timeout(timeout, connect).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "reachability probe failed");
                false
            }
            Err(_) => {
                tracing::debug!("reachability probe timed out");
                false
            }
        }
    }
}

/// Retunes the watchdog's schedule from outside the loop.
///
/// Both signals are best-effort and never block the sender: if the loop
/// is busy or a signal is already pending, the extra one is simply lost —
/// which is fine, the schedule converges either way.
#[derive(Clone)]
pub struct WatchdogHandle {
    skip_tx: mpsc::Sender<()>,
    run_tx: mpsc::Sender<()>,
}

impl WatchdogHandle {
    /// Asks the loop to skip its next scheduled probe.
    pub fn skip(&self) {
        let _ = self.skip_tx.try_send(());
    }

    /// Asks the loop to probe now instead of waiting out the period.
    pub fn run_now(&self) {
        let _ = self.run_tx.try_send(());
    }
}

/// The watchdog loop. Create with [`Watchdog::new`], then hand
/// [`run`](Self::run) to a task.
pub struct Watchdog<C, P> {
    conn: SharedConnection<C>,
    prober: P,
    config: WatchdogConfig,
    skip_rx: mpsc::Receiver<()>,
    run_rx: mpsc::Receiver<()>,
}

impl<C, P> Watchdog<C, P>
where
    C: Send + 'static,
    P: Prober,
{
    /// Creates the watchdog and the handle that retunes its schedule.
    pub fn new(
        conn: SharedConnection<C>,
        prober: P,
        config: WatchdogConfig,
    ) -> (Self, WatchdogHandle) {
        let (skip_tx, skip_rx) = mpsc::channel(1);
        let (run_tx, run_rx) = mpsc::channel(1);
        (
            Self {
                conn,
                prober,
                config,
                skip_rx,
                run_rx,
            },
            WatchdogHandle { skip_tx, run_tx },
        )
    }

    /// Runs the loop until every [`WatchdogHandle`] has been dropped.
    ///
    /// Shutdown is checked at every wait point: a closed signal channel
    /// ends the loop immediately, even mid-wait, with no probe left
    /// unresolved.
    pub async fn run(mut self) {
        tracing::debug!(period = ?self.config.period, "watchdog running");
        loop {
            tokio::select! {
                signal = self.skip_rx.recv() => match signal {
                    Some(()) => {
                        tracing::trace!("skipping next scheduled probe");
                        continue;
                    }
                    None => break,
                },
                signal = self.run_rx.recv() => match signal {
                    Some(()) => tracing::trace!("probe requested"),
                    None => break,
                },
                () = time::sleep(self.config.period) => {}
            }

            self.probe_once().await;

            // A probe just ran; anything that asked for one in the
            // meantime is already served.
            while self.run_rx.try_recv().is_ok() {}
        }
        tracing::debug!("watchdog stopped");
    }

    async fn probe_once(&self) {
        if self.prober.probe(self.config.probe_timeout).await {
            tracing::trace!("rcon server reachable");
            return;
        }

        // Unreachable: force-write Absent so the next command pays the
        // reconnect cost immediately instead of after another failed
        // send. The probe itself ran outside the lock; only this write
        // serializes with the command path.
        let mut conn = self.conn.lock().await;
        if conn.is_live() {
            tracing::warn!(
                "rcon server unreachable, demoting connection to absent"
            );
        }
        *conn = Connection::Absent;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::sync::Mutex;
    use tokio::time::Instant;
    use warden_rcon::{Client, RconError};

    use super::*;

    struct NullClient;

    impl Client for NullClient {
        async fn send(
            &mut self,
            _command: &str,
            _deadline: Instant,
        ) -> Result<String, RconError> {
            Ok(String::new())
        }
    }

    #[derive(Clone)]
    struct FakeProber {
        reachable: Arc<AtomicBool>,
        probes: Arc<AtomicUsize>,
    }

    impl FakeProber {
        fn new(reachable: bool) -> Self {
            Self {
                reachable: Arc::new(AtomicBool::new(reachable)),
                probes: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn count(&self) -> usize {
            self.probes.load(Ordering::SeqCst)
        }
    }

    impl Prober for FakeProber {
        async fn probe(&self, _timeout: Duration) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.reachable.load(Ordering::SeqCst)
        }
    }

    fn live_cell() -> SharedConnection<NullClient> {
        Arc::new(Mutex::new(Connection::Live(NullClient)))
    }

    fn config(period_ms: u64) -> WatchdogConfig {
        WatchdogConfig {
            period: Duration::from_millis(period_ms),
            probe_timeout: Duration::from_millis(50),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_failure_demotes_live_connection() {
        let conn = live_cell();
        let prober = FakeProber::new(false);
        let (watchdog, handle) =
            Watchdog::new(Arc::clone(&conn), prober.clone(), config(100));
        let task = tokio::spawn(watchdog.run());

        time::sleep(Duration::from_millis(150)).await;

        assert!(prober.count() >= 1, "a probe cycle should have run");
        assert!(
            !conn.lock().await.is_live(),
            "failed probe must demote the slot"
        );

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_success_leaves_connection_alone() {
        let conn = live_cell();
        let prober = FakeProber::new(true);
        let (watchdog, handle) =
            Watchdog::new(Arc::clone(&conn), prober.clone(), config(100));
        let task = tokio::spawn(watchdog.run());

        time::sleep(Duration::from_millis(250)).await;

        assert!(prober.count() >= 2);
        assert!(conn.lock().await.is_live());

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_now_probes_without_waiting_out_the_period() {
        let conn = live_cell();
        let prober = FakeProber::new(false);
        // An hour-long period: only the signal can trigger the probe.
        let (watchdog, handle) = Watchdog::new(
            Arc::clone(&conn),
            prober.clone(),
            WatchdogConfig {
                period: Duration::from_secs(3600),
                probe_timeout: Duration::from_millis(50),
            },
        );
        let task = tokio::spawn(watchdog.run());

        // Let the loop enter its wait, then poke it.
        time::sleep(Duration::from_millis(1)).await;
        handle.run_now();
        time::sleep(Duration::from_millis(10)).await;

        assert_eq!(prober.count(), 1);
        assert!(!conn.lock().await.is_live());

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_defers_the_scheduled_probe() {
        let conn = live_cell();
        let prober = FakeProber::new(true);
        let (watchdog, handle) =
            Watchdog::new(Arc::clone(&conn), prober.clone(), config(100));
        let task = tokio::spawn(watchdog.run());

        // Without the skip, the first probe would land at t=100ms. The
        // skip at t=60ms restarts the wait, pushing it to t=160ms.
        time::sleep(Duration::from_millis(60)).await;
        handle.skip();

        time::sleep(Duration::from_millis(80)).await; // t = 140ms
        assert_eq!(prober.count(), 0, "probe should have been deferred");

        time::sleep(Duration::from_millis(40)).await; // t = 180ms
        assert_eq!(prober.count(), 1);

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_stops_when_all_handles_drop() {
        let (watchdog, handle) = Watchdog::new(
            live_cell(),
            FakeProber::new(true),
            config(100),
        );
        let task = tokio::spawn(watchdog.run());

        drop(handle);

        // The loop must notice mid-wait, not after the next period.
        time::timeout(Duration::from_millis(50), task)
            .await
            .expect("watchdog should stop promptly")
            .unwrap();
    }
}
