//! Error types and the subclass builder.
//!
//! An [`ErrorType`] is a named node in a single-rooted inheritance tree. It
//! carries its merged [`CodeTable`] and a capability table generated from
//! that merged table when the type is built.
//!
//! # Build Once, Freeze After
//!
//! The merge is resolved at [`ErrorType::subclass`] time and stored on the
//! new type. Nothing re-reads the parent's table afterwards, so a grandchild
//! sees codes defined three levels up through a plain map lookup, with no
//! walk up the chain.
//!
//! # Capabilities
//!
//! For every code in the merged table a type exposes:
//!
//! - a predicate, [`Capability::matches`], answering "is this instance of
//!   this code"
//! - a factory, [`Factory::call`], building an instance of this type with
//!   that code
//!
//! # Example
//!
//! ```rust
//! use taxon_errors::{define_root, CodeTable};
//! use serde_json::json;
//!
//! let root = define_root(
//!     "RootError",
//!     CodeTable::new()
//!         .with("Unexpected", "Unexpected!")
//!         .with("BadArguments", "Bad args!"),
//! )?;
//! let sub = root.subclass("SubError", CodeTable::new().with("NotFound", "Not found!"))?;
//!
//! let err = sub.factory("NotFound")?.call(json!({ "id": 42 }));
//! assert_eq!(err.message(), "Not found!");
//! assert!(err.is("NotFound"));
//! assert!(!err.is("Unexpected"));
//! # Ok::<(), taxon_errors::ConfigurationError>(())
//! ```

use crate::instance::{ErrorArgs, ErrorInstance, ErrorProperties};
use crate::{CodeTable, ConfigurationError, Result};
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Define the root of a hierarchy.
///
/// The root's merged table is the base codes overlaid with `codes`.
///
/// # Errors
///
/// - [`ConfigurationError::EmptyName`] if `name` is blank
/// - [`ConfigurationError::EmptyCodeTable`] if `codes` is empty
/// - [`ConfigurationError::InvalidCodeName`] if a code name is rejected
pub fn define_root(name: impl Into<Arc<str>>, codes: CodeTable) -> Result<ErrorType> {
    let name = checked_name(name.into())?;
    if codes.is_empty() {
        debug!(type_name = %name, "rejected root with empty code table");
        return Err(ConfigurationError::EmptyCodeTable);
    }
    codes.validate()?;

    let (merged, overridden) = CodeTable::base().overlay(&codes);
    Ok(ErrorType::build(name, None, codes, merged, overridden))
}

fn checked_name(name: Arc<str>) -> Result<Arc<str>> {
    if name.trim().is_empty() {
        debug!("rejected error type with empty name");
        return Err(ConfigurationError::EmptyName);
    }
    Ok(name)
}

// ============================================================================
// Capability Table
// ============================================================================

/// Generated per-code capability of an [`ErrorType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    code: Arc<str>,
    message: Arc<str>,
    ordinal: usize,
}

impl Capability {
    /// The code this capability tests for and constructs.
    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The message instances built by this capability carry.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub(crate) fn shared_code(&self) -> &Arc<str> {
        &self.code
    }

    #[inline]
    pub(crate) fn shared_message(&self) -> &Arc<str> {
        &self.message
    }

    /// Position of the code in the merged table.
    #[inline]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Name of the generated predicate, e.g. `isNotFound`.
    pub fn predicate_name(&self) -> String {
        format!("is{}", self.code)
    }

    /// Predicate: does `instance` carry this code?
    #[inline]
    pub fn matches(&self, instance: &ErrorInstance) -> bool {
        instance.code() == &*self.code
    }
}

/// Bound factory for one code of one type.
#[derive(Clone, Copy)]
pub struct Factory<'a> {
    ty: &'a ErrorType,
    capability: &'a Capability,
}

impl<'a> Factory<'a> {
    /// The code this factory constructs.
    #[inline]
    pub fn code(&self) -> &'a str {
        self.capability.code()
    }

    /// The type instances are built for.
    #[inline]
    pub const fn error_type(&self) -> &'a ErrorType {
        self.ty
    }

    /// Build a new instance with optional metadata and cause.
    ///
    /// Infallible: the code was resolved when the factory was looked up.
    pub fn call(&self, args: impl Into<ErrorArgs>) -> ErrorInstance {
        ErrorInstance::from_capability(self.ty.clone(), self.capability, args.into())
    }
}

impl fmt::Debug for Factory<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("type", &self.ty.name())
            .field("code", &self.capability.code())
            .finish()
    }
}

// ============================================================================
// Error Type
// ============================================================================

struct TypeInner {
    name: Arc<str>,
    parent: Option<ErrorType>,
    depth: usize,
    own_codes: CodeTable,
    codes: CodeTable,
    capabilities: IndexMap<Arc<str>, Capability>,
}

/// A named, immutable node in an error hierarchy.
///
/// Cloning is cheap and yields a handle to the same type; equality is
/// identity, so two sibling types with the same display name are still
/// different types.
#[derive(Clone)]
pub struct ErrorType {
    inner: Arc<TypeInner>,
}

impl ErrorType {
    fn build(
        name: Arc<str>,
        parent: Option<ErrorType>,
        own_codes: CodeTable,
        codes: CodeTable,
        overridden: usize,
    ) -> Self {
        let capabilities = codes
            .iter_shared()
            .enumerate()
            .map(|(ordinal, (code, message))| {
                let capability = Capability {
                    code: Arc::clone(code),
                    message: Arc::clone(message),
                    ordinal,
                };
                (Arc::clone(code), capability)
            })
            .collect();

        let depth = parent.as_ref().map_or(0, |p| p.depth() + 1);

        debug!(
            type_name = %name,
            parent = parent.as_ref().map(|p| p.name()),
            depth,
            codes = codes.len(),
            overridden,
            "built error type"
        );

        Self {
            inner: Arc::new(TypeInner {
                name,
                parent,
                depth,
                own_codes,
                codes,
                capabilities,
            }),
        }
    }

    /// Derive a new type from this one.
    ///
    /// The child's merged table is this type's merged table overlaid with
    /// `additional`; child entries win on collision. `additional` may be
    /// empty. Display names are not required to be unique.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::EmptyName`] if `name` is blank
    /// - [`ConfigurationError::InvalidCodeName`] if a code name is rejected
    pub fn subclass(&self, name: impl Into<Arc<str>>, additional: CodeTable) -> Result<ErrorType> {
        let name = checked_name(name.into())?;
        additional.validate()?;

        let (merged, overridden) = self.inner.codes.overlay(&additional);
        Ok(Self::build(name, Some(self.clone()), additional, merged, overridden))
    }

    /// Display name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The type this one was derived from; `None` for a root.
    #[inline]
    pub fn parent(&self) -> Option<&ErrorType> {
        self.inner.parent.as_ref()
    }

    /// Number of subclass steps from the root (the root is 0).
    #[inline]
    pub fn depth(&self) -> usize {
        self.inner.depth
    }

    /// True if this type has no parent.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    /// The merged code table.
    #[inline]
    pub fn codes(&self) -> &CodeTable {
        &self.inner.codes
    }

    /// The codes this level added or overrode.
    #[inline]
    pub fn own_codes(&self) -> &CodeTable {
        &self.inner.own_codes
    }

    /// Look up the capability for a code.
    #[inline]
    pub fn capability(&self, code: &str) -> Option<&Capability> {
        self.inner.capabilities.get(code)
    }

    /// All capabilities, in merged-table order.
    pub fn capabilities(&self) -> impl ExactSizeIterator<Item = &Capability> + '_ {
        self.inner.capabilities.values()
    }

    /// Look up the factory for a code.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::MissingCode`] if `code` is empty
    /// - [`ConfigurationError::UnknownCode`] if `code` is not in the merged table
    pub fn factory(&self, code: &str) -> Result<Factory<'_>> {
        if code.is_empty() {
            debug!(type_name = %self.name(), "rejected construction without a code");
            return Err(ConfigurationError::MissingCode);
        }
        match self.capability(code) {
            Some(capability) => Ok(Factory { ty: self, capability }),
            None => {
                debug!(type_name = %self.name(), code, "rejected unknown code");
                Err(ConfigurationError::UnknownCode {
                    code: code.to_owned(),
                    type_name: self.name().to_owned(),
                })
            }
        }
    }

    /// Construct an instance, validating the code.
    ///
    /// `None` and `Some("")` are both treated as a missing code.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::MissingCode`] if no code was given
    /// - [`ConfigurationError::UnknownCode`] if `code` is not in the merged table
    pub fn construct(&self, code: Option<&str>, args: impl Into<ErrorArgs>) -> Result<ErrorInstance> {
        let code = code.unwrap_or_default();
        Ok(self.factory(code)?.call(args))
    }

    /// Construct an instance with a known code string.
    ///
    /// Shorthand for [`construct`](Self::construct) with `Some(code)`.
    #[inline]
    pub fn new_error(&self, code: &str, args: impl Into<ErrorArgs>) -> Result<ErrorInstance> {
        self.construct(Some(code), args)
    }

    /// Rebuild an instance from a [`to_json`](ErrorInstance::to_json) snapshot.
    ///
    /// The cause is re-attached as the same shared reference.
    pub fn from_properties(&self, properties: ErrorProperties) -> Result<ErrorInstance> {
        let ErrorProperties {
            code,
            metadata,
            cause,
        } = properties;
        let args = ErrorArgs {
            metadata,
            cause,
        };
        self.construct(Some(&*code), args)
    }

    /// Iterate this type and its ancestors, self first, root last.
    #[inline]
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Display names from the root down to this type.
    pub fn lineage(&self) -> SmallVec<[&str; 4]> {
        let mut names: SmallVec<[&str; 4]> = self.ancestors().map(ErrorType::name).collect();
        names.reverse();
        names
    }

    /// True if `self` is `other` or was derived from it.
    pub fn is_descendant_of(&self, other: &ErrorType) -> bool {
        self.ancestors().any(|ancestor| ancestor == other)
    }

    /// Identity comparison.
    #[inline]
    pub fn ptr_eq(&self, other: &ErrorType) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for ErrorType {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ErrorType {}

impl fmt::Debug for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorType")
            .field("name", &self.name())
            .field("parent", &self.parent().map(ErrorType::name))
            .field("codes", self.codes())
            .finish()
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Iterator over a type and its ancestors.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    next: Option<&'a ErrorType>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ErrorType;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

// ============================================================================
// Tests
// ============================================================================
