//! Code tables - the named failure kinds each error type knows about.
//!
//! A [`CodeTable`] is an ordered mapping from code name to message template.
//! Tables are built once, handed to the registry, and frozen inside the
//! resulting [`ErrorType`](crate::ErrorType). Nothing in this crate mutates
//! a table after a type has been built from it.
//!
//! # Merge Semantics
//!
//! Subclassing overlays the child's table onto the parent's merged table:
//!
//! - Parent entries keep their position
//! - A child entry with the same code replaces the parent's message in place
//! - New child entries are appended in the order they were declared
//!
//! # Base Codes
//!
//! Every hierarchy inherits [`UNEXPECTED`] and [`BAD_ARGUMENTS`], so any
//! consumer can signal "something went wrong" and "caller misused the API"
//! without defining a custom code.
//!
//! # Code Names
//!
//! Code names must be non-empty and contain no whitespace. With the
//! `strict_taxonomy` feature they must also be identifier-shaped: an ASCII
//! letter followed by ASCII alphanumerics or `_`.
//!
//! # Example
//!
//! ```rust
//! use taxon_errors::CodeTable;
//!
//! let codes = CodeTable::new()
//!     .with("NotFound", "Not found!")
//!     .with("Conflict", "Already exists!");
//!
//! assert_eq!(codes.get("NotFound"), Some("Not found!"));
//! assert_eq!(codes.len(), 2);
//! ```

use crate::{ConfigurationError, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Generic "something went wrong" code present in every hierarchy.
pub const UNEXPECTED: &str = "Unexpected";

/// "Caller misused the API" code present in every hierarchy.
pub const BAD_ARGUMENTS: &str = "BadArguments";

/// Default messages for the base codes. A root may re-word them.
pub const BASE_CODES: [(&str, &str); 2] = [
    (UNEXPECTED, "An unexpected error occurred!"),
    (BAD_ARGUMENTS, "Arguments provided are not valid!"),
];

// ============================================================================
// Code Table
// ============================================================================

/// Ordered mapping from code name to message template.
///
/// Keys and messages are `Arc<str>`: cloning a table or merging it into a
/// child shares the string storage, and the strings themselves can never be
/// changed through any alias.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    entries: IndexMap<Arc<str>, Arc<str>>,
}

impl CodeTable {
    /// Create an empty table.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table holding only the base codes with their default messages.
    pub fn base() -> Self {
        BASE_CODES.iter().copied().collect()
    }

    /// Builder-style insert.
    #[inline]
    pub fn with(mut self, code: impl Into<Arc<str>>, message: impl Into<Arc<str>>) -> Self {
        self.insert(code, message);
        self
    }

    /// Insert or replace a code, returning the previous message.
    ///
    /// Replacing keeps the code's original position.
    pub fn insert(
        &mut self,
        code: impl Into<Arc<str>>,
        message: impl Into<Arc<str>>,
    ) -> Option<Arc<str>> {
        self.entries.insert(code.into(), message.into())
    }

    /// Build a table from a JSON object of `code -> message` strings.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::NotAnObject`] if `value` is not an object
    /// - [`ConfigurationError::InvalidMessage`] if any message is not a string
    /// - [`ConfigurationError::InvalidCodeName`] if any key is not a valid code name
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(ConfigurationError::NotAnObject);
        };

        let mut table = Self::new();
        for (code, message) in map {
            validate_code_name(code)?;
            let Value::String(message) = message else {
                return Err(ConfigurationError::InvalidMessage { code: code.clone() });
            };
            table.insert(code.as_str(), message.as_str());
        }
        Ok(table)
    }

    /// Look up the message for a code.
    #[inline]
    pub fn get(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(|m| m.as_ref())
    }

    /// Check whether a code is present.
    #[inline]
    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    /// Position of a code in declaration order.
    #[inline]
    pub fn position(&self, code: &str) -> Option<usize> {
        self.entries.get_index_of(code)
    }

    /// Number of codes.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no codes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(code, message)` pairs in declaration order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(c, m)| (c.as_ref(), m.as_ref()))
    }

    /// Iterate code names in declaration order.
    pub fn codes(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.entries.keys().map(|c| c.as_ref())
    }

    pub(crate) fn iter_shared(&self) -> impl Iterator<Item = (&Arc<str>, &Arc<str>)> + '_ {
        self.entries.iter()
    }

    /// Validate every code name in the table.
    pub fn validate(&self) -> Result<()> {
        self.codes().try_for_each(validate_code_name)
    }

    /// Overlay `additions` onto this table.
    ///
    /// Returns the merged table and how many of `additions` replaced an
    /// existing entry.
    pub fn overlay(&self, additions: &CodeTable) -> (CodeTable, usize) {
        let mut merged = self.clone();
        let mut overridden = 0;
        for (code, message) in additions.iter_shared() {
            if merged
                .entries
                .insert(Arc::clone(code), Arc::clone(message))
                .is_some()
            {
                overridden += 1;
            }
        }
        (merged, overridden)
    }
}

impl<K, V> FromIterator<(K, V)> for CodeTable
where
    K: Into<Arc<str>>,
    V: Into<Arc<str>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (code, message) in iter {
            table.insert(code, message);
        }
        table
    }
}

impl fmt::Debug for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// ============================================================================
// Code Name Policy
// ============================================================================

/// Validate a single code name.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidCodeName`] if the name is empty,
/// contains whitespace, or (with `strict_taxonomy`) is not identifier-shaped.
pub fn validate_code_name(code: &str) -> Result<()> {
    if is_valid_code_name(code) {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidCodeName {
            code: code.to_owned(),
        })
    }
}

#[cfg(not(feature = "strict_taxonomy"))]
fn is_valid_code_name(code: &str) -> bool {
    !code.is_empty() && !code.chars().any(char::is_whitespace)
}

#[cfg(feature = "strict_taxonomy")]
fn is_valid_code_name(code: &str) -> bool {
    let mut chars = code.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

// ============================================================================
// Tests
// ============================================================================
