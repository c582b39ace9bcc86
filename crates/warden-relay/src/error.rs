//! Error taxonomy surfaced to relay callers.

use warden_rcon::RconError;

/// Everything a submitted command can come back with.
///
/// Nothing here is fatal to the process, and the relay never retries on
/// its own: `Rejected` is final, the rest are a caller's decision to
/// retry. The relay self-heals the underlying connection instead —
/// lazily on the next acquisition, and periodically via the watchdog.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The command was blocked by the allow/deny policy.
    /// Reported to the user verbatim, never retried.
    #[error("command rejected: {0}")]
    Rejected(String),

    /// No live connection could be obtained before the deadline —
    /// either the slot's lock or the dial didn't make it in time.
    /// Transient; trying again later may succeed.
    #[error("rcon server unavailable: {0}")]
    Unavailable(String),

    /// A connection was live but this exchange failed. The connection
    /// has been demoted, so the *next* command pays the reconnect cost.
    #[error("command failed: {0}")]
    SendFailed(#[source] RconError),

    /// The caller's wait ended before the relay produced a result.
    /// The underlying operation may still complete; it is logged only.
    #[error("command cancelled before a result was produced")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_displays_reason_verbatim() {
        let err = RelayError::Rejected("command not allowed".to_string());
        assert_eq!(err.to_string(), "command rejected: command not allowed");
    }

    #[test]
    fn test_send_failed_preserves_source() {
        use std::error::Error;

        let err = RelayError::SendFailed(RconError::SendTimeout);
        assert!(err.source().is_some(), "source chain should survive");
    }
}
