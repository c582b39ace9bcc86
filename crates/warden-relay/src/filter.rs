//! Allow/deny policy over a command's leading token.

use crate::RelayError;

/// A pure predicate deciding whether a command may be relayed at all.
///
/// A non-empty allow-list takes precedence: the leading token must match
/// one of its entries exactly. Otherwise a non-empty deny-list rejects
/// matching tokens. With neither configured, everything passes.
///
/// The check runs before any connection work, so rejected commands never
/// touch the slot or the network.
#[derive(Debug, Clone, Default)]
pub struct CommandFilter {
    allowed: Vec<String>,
    forbidden: Vec<String>,
}

impl CommandFilter {
    /// Creates a filter from the configured lists. Either may be empty.
    pub fn new(allowed: Vec<String>, forbidden: Vec<String>) -> Self {
        Self { allowed, forbidden }
    }

    /// A filter that lets every command through.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Checks the leading token against the policy.
    pub fn check(&self, head: &str) -> Result<(), RelayError> {
        if !self.allowed.is_empty() {
            if self.allowed.iter().any(|a| a == head) {
                Ok(())
            } else {
                Err(RelayError::Rejected(
                    "command not allowed".to_string(),
                ))
            }
        } else if self.forbidden.iter().any(|f| f == head) {
            Err(RelayError::Rejected("forbidden command".to_string()))
        } else {
            Ok(())
        }
    }
}
