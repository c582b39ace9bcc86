/// Errors that can occur in the RCON connection layer.
///
/// The underlying wire client reports failures as boxed errors that are
/// not `Send`, so they are rendered to strings at the blocking-task
/// boundary before crossing back into async code.
#[derive(Debug, thiserror::Error)]
pub enum RconError {
    /// Connecting or authenticating failed.
    #[error("failed to connect to the rcon server: {0}")]
    DialFailed(String),

    /// The deadline expired before a session could be established.
    #[error("timed out connecting to the rcon server")]
    DialTimeout,

    /// No live session exists; the command hit the stand-in connection.
    #[error("not connected to the rcon server")]
    NotConnected,

    /// The server failed or rejected this exchange.
    #[error("rcon command failed: {0}")]
    SendFailed(String),

    /// The server did not reply before the deadline.
    #[error("rcon server did not respond to the command in time")]
    SendTimeout,
}
