//! Failures raised while building a taxonomy or constructing an instance.
//!
//! Every failure here is a programming error at the call site: the
//! registry never retries, never falls back to a default code, and never
//! returns a partially built type.

use crate::taxonomy::TypeKey;
use thiserror::Error;

/// Malformed taxonomy definition or construction call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A type was given an empty (or all-whitespace) display name.
    #[error("error type name must not be empty")]
    EmptyName,

    /// A root was defined without any codes.
    #[error("code table must contain at least one code")]
    EmptyCodeTable,

    /// A code name is empty or not usable as a predicate name.
    #[error("invalid code name {code:?}")]
    InvalidCodeName {
        /// The rejected name.
        code: String,
    },

    /// A JSON code table mapped a code to something other than a string.
    #[error("message for code {code:?} is not a string")]
    InvalidMessage {
        /// The code whose message was not a string.
        code: String,
    },

    /// A JSON code table was not an object.
    #[error("code table must be a JSON object")]
    NotAnObject,

    /// The parent key does not name a type in this taxonomy.
    #[error("parent type {key} is not registered in this taxonomy")]
    UnknownParent {
        /// The key that was not issued by this registry.
        key: TypeKey,
    },

    /// Construction was attempted without a code.
    #[error("`code` is a required argument")]
    MissingCode,

    /// The code is not in the constructing type's merged table.
    #[error("unknown code {code:?} for {type_name}")]
    UnknownCode {
        /// The code that was asked for.
        code: String,
        /// Display name of the type that does not know it.
        type_name: String,
    },
}

/// Discriminant of a [`ConfigurationError`], for matching by kind alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigurationErrorKind {
    /// See [`ConfigurationError::EmptyName`].
    EmptyName,
    /// See [`ConfigurationError::EmptyCodeTable`].
    EmptyCodeTable,
    /// See [`ConfigurationError::InvalidCodeName`].
    InvalidCodeName,
    /// See [`ConfigurationError::InvalidMessage`].
    InvalidMessage,
    /// See [`ConfigurationError::NotAnObject`].
    NotAnObject,
    /// See [`ConfigurationError::UnknownParent`].
    UnknownParent,
    /// See [`ConfigurationError::MissingCode`].
    MissingCode,
    /// See [`ConfigurationError::UnknownCode`].
    UnknownCode,
}

impl ConfigurationError {
    /// Get the failure kind.
    #[inline]
    pub const fn kind(&self) -> ConfigurationErrorKind {
        match self {
            Self::EmptyName => ConfigurationErrorKind::EmptyName,
            Self::EmptyCodeTable => ConfigurationErrorKind::EmptyCodeTable,
            Self::InvalidCodeName { .. } => ConfigurationErrorKind::InvalidCodeName,
            Self::InvalidMessage { .. } => ConfigurationErrorKind::InvalidMessage,
            Self::NotAnObject => ConfigurationErrorKind::NotAnObject,
            Self::UnknownParent { .. } => ConfigurationErrorKind::UnknownParent,
            Self::MissingCode => ConfigurationErrorKind::MissingCode,
            Self::UnknownCode { .. } => ConfigurationErrorKind::UnknownCode,
        }
    }

    /// True for failures raised while constructing an instance rather than
    /// while defining a type.
    #[inline]
    pub const fn is_construction_failure(&self) -> bool {
        matches!(self, Self::MissingCode | Self::UnknownCode { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_unknown_code_are_distinct_kinds() {
        let missing = ConfigurationError::MissingCode;
        let unknown = ConfigurationError::UnknownCode {
            code: "Nope".into(),
            type_name: "RootError".into(),
        };

        assert_ne!(missing.kind(), unknown.kind());
        assert!(missing.is_construction_failure());
        assert!(unknown.is_construction_failure());
        assert!(!ConfigurationError::EmptyName.is_construction_failure());
    }

    #[test]
    fn display_names_the_offending_code() {
        let err = ConfigurationError::UnknownCode {
            code: "Nope".into(),
            type_name: "RootError".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("Nope"));
        assert!(rendered.contains("RootError"));
    }
}
