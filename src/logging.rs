//! Structured log view of an error instance.
//!
//! [`ErrorLog`] borrows from an [`ErrorInstance`] and cannot outlive it.
//! It exposes every field for structured loggers, writes a bounded single
//! line for plain-text sinks, and records itself as a `tracing` event.
//!
//! Only one level of the causal chain is rendered, matching
//! [`ErrorInstance::to_json`]. Use [`ErrorInstance::chain`] to walk further.

use crate::instance::{Cause, ErrorInstance, Metadata};
use std::borrow::Cow;
use std::fmt;

/// Longest rendering of any single field, in bytes.
const FIELD_LIMIT: usize = 1024;

/// Marker appended to a clipped field.
const CLIPPED: &str = "...[TRUNCATED]";

/// Structured log entry with borrowed data from an [`ErrorInstance`].
///
/// # Example
///
/// ```rust
/// # use taxon_errors::{define_root, CodeTable};
/// let root = define_root("RootError", CodeTable::base())?;
/// let err = root.new_error("Unexpected", ())?;
/// let mut line = String::new();
/// err.log().write_to(&mut line).unwrap();
/// assert_eq!(line, "[RootError/Unexpected] message='An unexpected error occurred!'");
/// # Ok::<(), taxon_errors::ConfigurationError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ErrorLog<'a> {
    type_name: &'a str,
    code: &'a str,
    message: &'a str,
    metadata: Option<&'a Metadata>,
    cause: Option<&'a Cause>,
}

impl<'a> ErrorLog<'a> {
    /// Write a single line with every field truncated.
    ///
    /// Format: `[{type}/{code}] message='{message}' metadata={json} cause='{cause}'`,
    /// with `metadata` and `cause` omitted when absent.
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "[{}/{}] message='{}'",
            clip(self.type_name),
            clip(self.code),
            clip(self.message)
        )?;

        if let Some(metadata) = self.metadata {
            let rendered = metadata.to_string();
            write!(f, " metadata={}", clip(&rendered))?;
        }

        if let Some(cause) = self.cause {
            let rendered = cause.to_string();
            write!(f, " cause='{}'", clip(&rendered))?;
        }

        Ok(())
    }

    /// Record this entry as a `tracing` event at `ERROR` level.
    pub fn emit(&self) {
        tracing::error!(
            error.type_name = self.type_name,
            error.code = self.code,
            error.metadata = self.metadata.map(tracing::field::display),
            error.cause = self.cause.map(tracing::field::display),
            "{}",
            self.message
        );
    }

    /// Display name of the constructing type.
    #[inline]
    pub const fn type_name(&self) -> &'a str {
        self.type_name
    }

    /// The instance's code.
    #[inline]
    pub const fn code(&self) -> &'a str {
        self.code
    }

    /// The resolved message.
    #[inline]
    pub const fn message(&self) -> &'a str {
        self.message
    }

    /// Caller-supplied metadata, if any.
    #[inline]
    pub const fn metadata(&self) -> Option<&'a Metadata> {
        self.metadata
    }

    /// The direct cause, if any.
    #[inline]
    pub const fn cause(&self) -> Option<&'a Cause> {
        self.cause
    }
}

impl fmt::Display for ErrorLog<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

impl ErrorInstance {
    /// Borrow a structured log view of this instance.
    #[inline]
    pub fn log(&self) -> ErrorLog<'_> {
        ErrorLog {
            type_name: self.name(),
            code: self.code(),
            message: self.message(),
            metadata: self.metadata(),
            cause: self.cause(),
        }
    }

    /// Callback-style access to the log view.
    #[inline]
    pub fn with_log<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ErrorLog<'_>) -> R,
    {
        f(&self.log())
    }
}

/// Clip `field` to [`FIELD_LIMIT`] bytes on a char boundary, marking the cut.
fn clip(field: &str) -> Cow<'_, str> {
    if field.len() <= FIELD_LIMIT {
        return Cow::Borrowed(field);
    }
    let budget = FIELD_LIMIT - CLIPPED.len();
    let cut = field
        .char_indices()
        .map(|(at, _)| at)
        .take_while(|&at| at <= budget)
        .last()
        .unwrap_or(0);
    Cow::Owned(format!("{}{CLIPPED}", &field[..cut]))
}
