//! Caller-facing command and result-handle types.

use tokio::sync::oneshot;

use crate::RelayError;

/// An immutable, non-empty, ordered sequence of command tokens.
///
/// Constructed once from the front end's parse and never mutated; the
/// wire text is derived on demand by [`canonical`](Self::canonical).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    tokens: Vec<String>,
}

impl Command {
    /// Creates a command from tokens. Returns `None` when `tokens` is
    /// empty — there is no such thing as a command without a leading
    /// token.
    pub fn new<I, S>(tokens: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> =
            tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            None
        } else {
            Some(Self { tokens })
        }
    }

    /// Parses a raw line into whitespace-separated tokens.
    pub fn parse(line: &str) -> Option<Self> {
        Self::new(line.split_whitespace())
    }

    /// The leading token — the name the command filter checks.
    pub fn head(&self) -> &str {
        // Non-empty by construction.
        &self.tokens[0]
    }

    /// The canonical wire text: tokens joined by single spaces.
    pub fn canonical(&self) -> String {
        self.tokens.join(" ")
    }
}

/// The caller's handle to a submitted command's eventual outcome.
///
/// Readable exactly once — [`result`](Self::result) consumes the handle.
/// Dropping an unread handle abandons the wait without affecting the
/// relay's shared state; the outcome is then logged, not delivered.
pub struct CommandHandle {
    rx: oneshot::Receiver<Result<String, RelayError>>,
}

impl CommandHandle {
    /// A handle paired with the sender the relay's send step fulfills.
    pub(crate) fn channel(
    ) -> (oneshot::Sender<Result<String, RelayError>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// A handle whose outcome is already known — used for rejections and
    /// acquisition failures, where no send task is ever spawned.
    pub(crate) fn ready(result: Result<String, RelayError>) -> Self {
        let (tx, rx) = oneshot::channel();
        // The receiver is held right here; the send cannot fail.
        let _ = tx.send(result);
        Self { rx }
    }

    /// Waits for the command's outcome.
    ///
    /// Callers bound their own patience by wrapping this in a timeout or
    /// dropping the handle. If the relay side goes away without
    /// delivering, this resolves to [`RelayError::Cancelled`].
    pub async fn result(self) -> Result<String, RelayError> {
        self.rx.await.unwrap_or(Err(RelayError::Cancelled))
    }
}
