//! Error kinds for agent twin operations

use std::fmt;

/// The kind of error that occurred.
///
/// Kinds fall into three classes that callers usually care about:
/// configuration problems ([`ErrorKind::is_config`]), unresolved prompt
/// placeholders ([`ErrorKind::MissingParameter`]) and failures of the model
/// provider ([`ErrorKind::is_upstream`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,

    // =========================================================================
    // Configuration errors
    // =========================================================================
    /// A required setting (usually a credential) is absent
    ConfigMissing,

    /// A setting is present but unusable
    ConfigInvalid,

    // =========================================================================
    // Prompt errors
    // =========================================================================
    /// A template placeholder has no bound value
    MissingParameter,

    // =========================================================================
    // Upstream (model provider) errors
    // =========================================================================
    /// Transport failure talking to the provider
    NetworkFailed,

    /// Provider refused the request because of rate limits
    RateLimited,

    /// Provider rejected the credential
    AuthenticationFailed,

    /// Provider answered with a non-success status
    UpstreamRejected,

    /// Provider answered but the answer was unusable
    InferenceFailed,

    // =========================================================================
    // IO errors
    // =========================================================================
    /// File not found
    FileNotFound,

    /// Permission denied
    PermissionDenied,

    /// IO operation failed
    IoFailed,

    /// Failed to parse input
    ParseFailed,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unexpected => "Unexpected",

            ErrorKind::ConfigMissing => "ConfigMissing",
            ErrorKind::ConfigInvalid => "ConfigInvalid",

            ErrorKind::MissingParameter => "MissingParameter",

            ErrorKind::NetworkFailed => "NetworkFailed",
            ErrorKind::RateLimited => "RateLimited",
            ErrorKind::AuthenticationFailed => "AuthenticationFailed",
            ErrorKind::UpstreamRejected => "UpstreamRejected",
            ErrorKind::InferenceFailed => "InferenceFailed",

            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::PermissionDenied => "PermissionDenied",
            ErrorKind::IoFailed => "IoFailed",
            ErrorKind::ParseFailed => "ParseFailed",
        }
    }

    /// Configuration class: the run could not be set up
    pub fn is_config(&self) -> bool {
        matches!(self, ErrorKind::ConfigMissing | ErrorKind::ConfigInvalid)
    }

    /// Upstream class: the model provider call failed
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ErrorKind::NetworkFailed
                | ErrorKind::RateLimited
                | ErrorKind::AuthenticationFailed
                | ErrorKind::UpstreamRejected
                | ErrorKind::InferenceFailed
        )
    }

    /// Check if this error kind could succeed on a later attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::NetworkFailed | ErrorKind::RateLimited)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
