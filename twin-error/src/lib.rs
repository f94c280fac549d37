//! # twin-error
//!
//! Unified error handling for the agent twin crates.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what went wrong (e.g. ConfigMissing, MissingParameter)
//! - **ErrorStatus**: Know whether trying again could help (Permanent or Temporary)
//! - **Error Context**: Key-value pairs that help locate the cause
//! - **Error Source**: Wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use twin_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::MissingParameter, "no binding for 'question'")
//!         .with_operation("invoker::run")
//!         .with_context("placeholder", "question"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All fallible functions return `Result<T, twin_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - An error is created once; callers only append context
//! - `From<OtherError>` is kept to a minimum so raw errors don't leak

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using the twin Error
pub type Result<T> = std::result::Result<T, Error>;
