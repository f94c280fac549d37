//! Error status: whether an operation is worth attempting again

use std::fmt;

/// Whether the failed operation could succeed if attempted again.
///
/// Nothing in the workspace retries on its own; the status is carried so
/// callers and logs can tell a flaky network from a broken setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorStatus {
    /// Trying again will not help
    Permanent,
    /// Trying again may help
    Temporary,
}

impl ErrorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorStatus::Permanent => "permanent",
            ErrorStatus::Temporary => "temporary",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorStatus::Temporary)
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
