//! `Error`: what failed, where, and with which values

use crate::{ErrorKind, ErrorStatus};
use std::fmt;

/// Error returned by every twin crate.
///
/// Besides the [`ErrorKind`] and a message, an error records the operation
/// that raised it (`"invoker::run"`, `"openai::complete"`), ordered
/// key/value context such as the provider or the unbound placeholder, an
/// [`ErrorStatus`], and optionally the lower-level error it wraps.
///
/// ```rust
/// use twin_error::{Error, ErrorKind, ErrorStatus};
///
/// let err = Error::new(ErrorKind::RateLimited, "too many requests")
///     .with_operation("openai::complete")
///     .with_context("model", "gpt-4o-mini")
///     .with_context("retry_after", "20");
///
/// assert_eq!(err.kind(), ErrorKind::RateLimited);
/// assert_eq!(err.status(), ErrorStatus::Temporary);
/// assert_eq!(err.context_value("retry_after"), Some("20"));
/// ```
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: ErrorStatus,
    operation: &'static str,
    context: Vec<(&'static str, String)>,
    source: Option<anyhow::Error>,
}

impl Error {
    /// Network and rate-limit kinds start out temporary, everything else
    /// permanent.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: if kind.is_retryable() {
                ErrorStatus::Temporary
            } else {
                ErrorStatus::Permanent
            },
            operation: "",
            context: Vec::new(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> ErrorStatus {
        self.status
    }

    /// Empty until [`Error::with_operation`] is called
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// First context value recorded under `key`
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn source_ref(&self) -> Option<&anyhow::Error> {
        self.source.as_ref()
    }

    /// Record the operation that failed. An operation set earlier is kept
    /// under the `called` context key, so the chain reads outermost first.
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        if !self.operation.is_empty() {
            self.context.push(("called", self.operation.to_string()));
        }
        self.operation = operation;
        self
    }

    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    /// Attach the wrapped error. Setting it twice is a bug and trips a
    /// debug assertion.
    pub fn set_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.source.is_none(), "source error already set");
        self.source = Some(source.into());
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.status.is_retryable()
    }
}

// Single line, for logs and the CLI's `Error: ...` output:
// `Kind (status) at op, context { k: v } => message`
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.status)?;
        if !self.operation.is_empty() {
            write!(f, " at {}", self.operation)?;
        }
        if !self.context.is_empty() {
            let pairs: Vec<String> = self
                .context
                .iter()
                .map(|(key, value)| format!("{}: {}", key, value))
                .collect();
            write!(f, ", context {{ {} }}", pairs.join(", "))?;
        }
        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.status)?;
        if !self.operation.is_empty() {
            write!(f, " at {}", self.operation)?;
        }
        writeln!(f)?;
        if !self.message.is_empty() {
            writeln!(f, "\n    Message: {}", self.message)?;
        }
        if !self.context.is_empty() {
            writeln!(f, "\n    Context:")?;
            for (key, value) in &self.context {
                writeln!(f, "        {}: {}", key, value)?;
            }
        }
        if let Some(source) = &self.source {
            writeln!(f, "\n    Source: {:?}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// I/O errors carry an obvious kind, so they convert directly
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::IoFailed,
        };
        Error::new(kind, err.to_string())
            .with_operation("io")
            .set_source(err)
    }
}

impl Error {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    /// A required environment variable or setting is absent
    pub fn config_missing(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(ErrorKind::ConfigMissing, format!("'{}' is not set", name))
            .with_context("setting", name)
    }

    /// A setting is present but has an unusable value
    pub fn config_invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(ErrorKind::ConfigInvalid, reason).with_context("setting", name)
    }

    /// One or more template placeholders have no binding
    pub fn missing_parameters<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let listed = names
            .iter()
            .map(|n| format!("'{}'", n))
            .collect::<Vec<_>>()
            .join(", ");
        let mut err = Self::new(
            ErrorKind::MissingParameter,
            format!("no value bound for {}", listed),
        );
        for name in names {
            err = err.with_context("placeholder", name);
        }
        err
    }

    pub fn parse_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseFailed, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::new(ErrorKind::ConfigMissing, "OPENAI_API_KEY is not set");
        assert_eq!(err.kind(), ErrorKind::ConfigMissing);
        assert_eq!(err.message(), "OPENAI_API_KEY is not set");
        assert_eq!(err.status(), ErrorStatus::Permanent);
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::new(ErrorKind::UpstreamRejected, "bad request")
            .with_operation("openai::complete")
            .with_context("model", "gpt-4o-mini")
            .with_context("status", "400");

        assert_eq!(err.operation(), "openai::complete");
        assert_eq!(err.context().len(), 2);
        assert_eq!(err.context()[0], ("model", "gpt-4o-mini".to_string()));
        assert_eq!(err.context_value("status"), Some("400"));
        assert_eq!(err.context_value("missing"), None);
    }

    #[test]
    fn test_operation_chaining() {
        let err = Error::new(ErrorKind::NetworkFailed, "connection reset")
            .with_operation("openai::complete")
            .with_operation("invoker::run");

        assert_eq!(err.operation(), "invoker::run");
        assert_eq!(err.context().len(), 1);
        assert_eq!(err.context()[0], ("called", "openai::complete".to_string()));
    }

    #[test]
    fn test_temporary_status() {
        let err = Error::new(ErrorKind::RateLimited, "slow down");
        assert!(err.is_retryable());

        let err = Error::new(ErrorKind::AuthenticationFailed, "bad key");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_status_follows_kind() {
        let err = Error::new(ErrorKind::NetworkFailed, "connection refused");
        assert_eq!(err.status(), ErrorStatus::Temporary);

        let err = Error::new(ErrorKind::ConfigMissing, "no key");
        assert_eq!(err.status(), ErrorStatus::Permanent);
    }

    #[test]
    fn test_display() {
        let err = Error::new(ErrorKind::RateLimited, "quota exceeded")
            .with_operation("anthropic::complete")
            .with_context("model", "claude-3-5-haiku-latest");

        let display = format!("{}", err);
        assert!(display.contains("RateLimited"));
        assert!(display.contains("temporary"));
        assert!(display.contains("anthropic::complete"));
        assert!(display.contains("model: claude-3-5-haiku-latest"));
        assert!(display.ends_with("=> quota exceeded"));
    }

    #[test]
    fn test_display_without_operation() {
        let err = Error::unexpected("boom");
        assert_eq!(err.to_string(), "Unexpected (permanent) => boom");
    }

    #[test]
    fn test_convenience_constructors() {
        let err = Error::config_missing("OPENAI_API_KEY");
        assert_eq!(err.kind(), ErrorKind::ConfigMissing);
        assert!(err.message().contains("OPENAI_API_KEY"));
        assert_eq!(err.context_value("setting"), Some("OPENAI_API_KEY"));

        let err = Error::config_invalid("TWIN_TEMPERATURE", "not a number");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        let err = Error::missing_parameters(["question", "name"]);
        assert_eq!(err.kind(), ErrorKind::MissingParameter);
        assert_eq!(err.message(), "no value bound for 'question', 'name'");
        assert_eq!(err.context().len(), 2);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "profile.json");
        let err: Error = io_err.into();

        assert_eq!(err.kind(), ErrorKind::FileNotFound);
        assert_eq!(err.operation(), "io");
        assert!(err.source_ref().is_some());
        assert!(std::error::Error::source(&err).is_some());
    }
}
