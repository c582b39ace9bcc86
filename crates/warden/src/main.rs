//! Warden: relays chat commands to a game server over RCON.
//!
//! Bootstrap order mirrors the component lifecycle: logging, then
//! configuration, then the relay service and its watchdog, then the
//! console front end. Shutdown runs in reverse with a bounded drain.

mod config;
mod console;

use std::process::ExitCode;
use std::time::Duration;

use tokio::signal;
use tokio::time;
use tracing_subscriber::EnvFilter;
use warden_rcon::RconDialer;
use warden_relay::{
    CommandFilter, RelayService, TcpProber, WatchdogConfig,
};

use crate::config::Config;

/// How long shutdown waits for the watchdog to drain.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("hello, this is warden");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let filter = CommandFilter::new(
        config.allowed_commands.clone(),
        config.forbidden_commands.clone(),
    );
    let prober =
        TcpProber::new(config.target.host.clone(), config.target.port);
    let dialer = RconDialer::new(config.target.clone());

    let (service, watchdog) = RelayService::new(
        dialer,
        filter,
        prober,
        WatchdogConfig {
            period: config.watchdog_period,
            probe_timeout: config.probe_timeout,
        },
    );

    // Best-effort warm-up; a dead server just means the first command
    // pays the dial cost once the server is back.
    if let Err(err) = service.connect(config.connect_timeout).await {
        tracing::warn!(
            error = %err,
            "initial rcon connection failed, will retry on first command"
        );
    }

    let watchdog_task = tokio::spawn(watchdog.run());

    tokio::select! {
        result = console::run(&service, config.command_timeout) => {
            match result {
                Ok(()) => tracing::info!("console closed"),
                Err(err) => {
                    tracing::error!(error = %err, "console failed");
                }
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("interrupt received, shutting down");
        }
    }

    // Dropping the service closes the watchdog's signal channels; the
    // loop notices mid-wait and exits. Bound the drain regardless.
    drop(service);
    if time::timeout(SHUTDOWN_TIMEOUT, watchdog_task).await.is_err() {
        tracing::warn!("watchdog did not stop in time");
    }

    tracing::info!("have a nice day");
    ExitCode::SUCCESS
}
