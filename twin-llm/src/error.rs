//! Provider error types
//!
//! Re-exports twin-error and defines the provider-level error that HTTP
//! clients return before it is folded into the unified [`Error`].

pub use twin_error::{Error, ErrorKind, ErrorStatus, Result};

/// Error type for provider operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Network/connection error
    #[error("network error: {0}")]
    Network(String),

    /// API returned a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Failed to decode the response body
    #[error("parse error: {0}")]
    Parse(String),

    /// Rate limited
    #[error("rate limited{}", .retry_after.map(|s| format!(" (retry after {}s)", s)).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    /// Credential rejected
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The model answered without any text
    #[error("response contained no text")]
    EmptyResponse,
}

impl ProviderError {
    /// The unified kind this provider error maps to. Every variant is an
    /// upstream kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::NetworkFailed,
            Self::Api { .. } => ErrorKind::UpstreamRejected,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::AuthenticationFailed => ErrorKind::AuthenticationFailed,
            Self::Parse(_) | Self::EmptyResponse => ErrorKind::InferenceFailed,
        }
    }

    /// Convert into the unified error, tagging the provider and operation.
    pub fn into_error(self, provider: &str, operation: &'static str) -> Error {
        let mut err = Error::new(self.kind(), self.to_string())
            .with_operation(operation)
            .with_context("provider", provider);

        match &self {
            Self::Api { status, .. } => {
                err = err.with_context("status", status.to_string());
            }
            Self::RateLimited {
                retry_after: Some(secs),
            } => {
                err = err.with_context("retry_after", secs.to_string());
            }
            _ => {}
        }

        err.set_source(self)
    }
}
