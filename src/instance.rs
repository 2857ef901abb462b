//! Error instances - the values an [`ErrorType`] produces.
//!
//! An [`ErrorInstance`] holds an immutable triple (code, metadata, cause)
//! plus the message resolved from its type's merged table at construction.
//! It is an ordinary Rust error: it implements [`std::error::Error`], and its
//! cause is reported through [`source`](std::error::Error::source).
//!
//! # Metadata / Cause Disambiguation
//!
//! Construction takes a single argument slot for "metadata or cause" plus an
//! optional explicit cause, mirrored by [`ErrorArgs`] and its `From` impls:
//!
//! - `()` - neither
//! - a [`Metadata`] value - metadata only
//! - an [`ErrorInstance`] or a [`Cause`] - cause only, metadata absent
//! - `(Metadata, ErrorInstance)` / `(Metadata, Cause)` - both
//!
//! # Causes Are Shared, Not Owned
//!
//! A [`Cause`] is an `Arc`: the instance holds a link to the prior error for
//! inspection and printing, and [`to_json`](ErrorInstance::to_json) hands
//! back that same link rather than a copy.

use crate::object::ToJson;
use crate::types::{Capability, ErrorType};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Caller-supplied, opaque metadata attached to an instance.
pub type Metadata = Value;

/// Shared link to the error that caused an instance.
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

// ============================================================================
// Construction Arguments
// ============================================================================

/// The single positional "metadata or cause" slot.
#[derive(Debug, Clone)]
pub enum Slot {
    /// The slot holds metadata.
    Metadata(Metadata),
    /// The slot holds an error; it is reinterpreted as the cause.
    Error(Cause),
}

/// Optional metadata and cause for a new instance.
#[derive(Debug, Clone, Default)]
pub struct ErrorArgs {
    pub(crate) metadata: Option<Metadata>,
    pub(crate) cause: Option<Cause>,
}

impl ErrorArgs {
    /// No metadata, no cause.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve positional arguments.
    ///
    /// An error in the slot becomes the cause and leaves metadata absent.
    /// If an explicit cause was also given it is discarded in favour of the
    /// slot's error.
    pub fn positional(slot: Option<Slot>, cause: Option<Cause>) -> Self {
        match slot {
            Some(Slot::Error(error)) => {
                if cause.is_some() {
                    debug!("slot error replaces explicitly supplied cause");
                }
                Self {
                    metadata: None,
                    cause: Some(error),
                }
            }
            Some(Slot::Metadata(metadata)) => Self {
                metadata: Some(metadata),
                cause,
            },
            None => Self {
                metadata: None,
                cause,
            },
        }
    }

    /// Set metadata.
    #[inline]
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set the cause from a shared link.
    #[inline]
    pub fn cause(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Set the cause from any owned error.
    #[inline]
    pub fn caused_by(self, error: impl StdError + Send + Sync + 'static) -> Self {
        self.cause(Arc::new(error))
    }
}

impl From<()> for ErrorArgs {
    fn from(_: ()) -> Self {
        Self::new()
    }
}

impl From<Metadata> for ErrorArgs {
    fn from(metadata: Metadata) -> Self {
        Self::positional(Some(Slot::Metadata(metadata)), None)
    }
}

impl From<Cause> for ErrorArgs {
    fn from(cause: Cause) -> Self {
        Self::positional(Some(Slot::Error(cause)), None)
    }
}

impl From<ErrorInstance> for ErrorArgs {
    fn from(cause: ErrorInstance) -> Self {
        Self::from(Arc::new(cause) as Cause)
    }
}

impl From<Slot> for ErrorArgs {
    fn from(slot: Slot) -> Self {
        Self::positional(Some(slot), None)
    }
}

impl From<(Metadata, Cause)> for ErrorArgs {
    fn from((metadata, cause): (Metadata, Cause)) -> Self {
        Self::positional(Some(Slot::Metadata(metadata)), Some(cause))
    }
}

impl From<(Metadata, ErrorInstance)> for ErrorArgs {
    fn from((metadata, cause): (Metadata, ErrorInstance)) -> Self {
        Self::from((metadata, Arc::new(cause) as Cause))
    }
}

// ============================================================================
// Error Instance
// ============================================================================

/// A value validated against exactly one [`ErrorType`].
///
/// Code, metadata and cause are fixed at construction; there are no setters.
#[derive(Clone)]
#[must_use = "errors should be handled or logged"]
pub struct ErrorInstance {
    ty: ErrorType,
    code: Arc<str>,
    message: Arc<str>,
    metadata: Option<Metadata>,
    cause: Option<Cause>,
}

impl ErrorInstance {
    pub(crate) fn from_capability(ty: ErrorType, capability: &Capability, args: ErrorArgs) -> Self {
        let (code, message) = (capability.shared_code(), capability.shared_message());
        trace!(
            type_name = %ty.name(),
            code = %code,
            has_metadata = args.metadata.is_some(),
            has_cause = args.cause.is_some(),
            "constructed error instance"
        );
        Self {
            ty,
            code: Arc::clone(code),
            message: Arc::clone(message),
            metadata: args.metadata,
            cause: args.cause,
        }
    }

    /// The code.
    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The message resolved from the constructing type's table.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Display name of the constructing type.
    #[inline]
    pub fn name(&self) -> &str {
        self.ty.name()
    }

    /// Caller-supplied metadata, if any.
    #[inline]
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// The error that caused this one, if any.
    #[inline]
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// The type that constructed this instance.
    #[inline]
    pub fn error_type(&self) -> &ErrorType {
        &self.ty
    }

    /// Predicate for `code`.
    ///
    /// False for codes the constructing type does not know.
    #[inline]
    pub fn is(&self, code: &str) -> bool {
        self.ty
            .capability(code)
            .is_some_and(|capability| capability.matches(self))
    }

    /// Evaluate every predicate of the constructing type, in table order.
    ///
    /// Exactly one entry is `true`.
    pub fn predicates(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.ty
            .capabilities()
            .map(move |capability| (capability.code(), capability.matches(self)))
    }

    /// True if the constructing type is `ty` or derives from it.
    #[inline]
    pub fn is_kind_of(&self, ty: &ErrorType) -> bool {
        self.ty.is_descendant_of(ty)
    }

    /// Snapshot of `{code, metadata, cause}`.
    ///
    /// The cause is the same shared link, not a deep copy.
    pub fn to_json(&self) -> ErrorProperties {
        ErrorProperties {
            code: Arc::clone(&self.code),
            metadata: self.metadata.clone(),
            cause: self.cause.clone(),
        }
    }

    /// Walk the causal chain, starting with this instance.
    pub fn chain(&self) -> Chain<'_> {
        Chain {
            next: Some(self as &(dyn StdError + 'static)),
        }
    }
}

impl ToJson for ErrorInstance {
    type Output = ErrorProperties;

    fn to_json(&self) -> ErrorProperties {
        ErrorInstance::to_json(self)
    }
}

impl fmt::Debug for ErrorInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorInstance")
            .field("name", &self.name())
            .field("code", &self.code())
            .field("message", &self.message())
            .field("metadata", &self.metadata)
            .field("cause", &self.cause)
            .finish()
    }
}

impl fmt::Display for ErrorInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.message())
    }
}

impl StdError for ErrorInstance {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

/// Iterator over a causal chain.
pub struct Chain<'a> {
    next: Option<&'a (dyn StdError + 'static)>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

// ============================================================================
// Serialization Hook
// ============================================================================

/// The `{code, metadata, cause}` triple of an instance.
///
/// Equality compares the cause by identity. Serializing renders the cause
/// one level deep, as its display string.
#[derive(Debug, Clone)]
pub struct ErrorProperties {
    /// The code.
    pub code: Arc<str>,
    /// Caller-supplied metadata.
    pub metadata: Option<Metadata>,
    /// Shared link to the causing error.
    pub cause: Option<Cause>,
}

impl PartialEq for ErrorProperties {
    fn eq(&self, other: &Self) -> bool {
        let same_cause = match (&self.cause, &other.cause) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.code == other.code && self.metadata == other.metadata && same_cause
    }
}

impl Serialize for ErrorProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ErrorProperties", 3)?;
        state.serialize_field("code", &*self.code)?;
        state.serialize_field("metadata", &self.metadata)?;
        state.serialize_field("cause", &self.cause.as_ref().map(|c| c.to_string()))?;
        state.end()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{define_root, CodeTable};
    use serde_json::json;

    fn sub() -> ErrorType {
        define_root(
            "RootError",
            CodeTable::new()
                .with("Unexpected", "Unexpected!")
                .with("BadArguments", "Bad args!"),
        )
        .unwrap()
        .subclass("SubError", CodeTable::new().with("NotFound", "Not found!"))
        .unwrap()
    }

    #[derive(Debug)]
    struct Io;

    impl fmt::Display for Io {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("disk on fire")
        }
    }

    impl StdError for Io {}

    #[test]
    fn end_to_end_factory() {
        let err = sub().factory("NotFound").unwrap().call(json!({ "id": 42 }));

        assert_eq!(err.code(), "NotFound");
        assert_eq!(err.message(), "Not found!");
        assert_eq!(err.name(), "SubError");
        assert!(err.is("NotFound"));
        assert!(!err.is("Unexpected"));
        assert_eq!(err.metadata().and_then(|m| m["id"].as_i64()), Some(42));
    }

    #[test]
    fn exactly_one_predicate_holds() {
        let err = sub().new_error("BadArguments", ()).unwrap();
        let holding: Vec<&str> = err
            .predicates()
            .filter(|(_, holds)| *holds)
            .map(|(code, _)| code)
            .collect();
        assert_eq!(holding, vec!["BadArguments"]);
        assert!(!err.is("NoSuchCode"));
    }

    #[test]
    fn error_in_metadata_slot_becomes_cause() {
        let ty = sub();
        let prior = ty.new_error("Unexpected", ()).unwrap();
        let err = ty.new_error("NotFound", prior).unwrap();

        assert!(err.metadata().is_none());
        assert_eq!(err.cause().map(|c| c.to_string()), Some("SubError: Unexpected!".into()));
    }

    #[test]
    fn slot_error_wins_over_explicit_cause() {
        let slot: Cause = Arc::new(Io);
        let explicit: Cause = Arc::new(Io);
        let args = ErrorArgs::positional(Some(Slot::Error(Arc::clone(&slot))), Some(explicit));

        assert!(args.metadata.is_none());
        assert!(Arc::ptr_eq(args.cause.as_ref().unwrap(), &slot));
    }

    #[test]
    fn metadata_and_cause_together() {
        let ty = sub();
        let err = ty
            .new_error("NotFound", (json!({ "id": 1 }), Arc::new(Io) as Cause))
            .unwrap();

        assert_eq!(err.metadata(), Some(&json!({ "id": 1 })));
        assert!(err.cause().is_some());
    }

    #[test]
    fn to_json_shares_the_cause() {
        let cause: Cause = Arc::new(Io);
        let err = sub()
            .new_error("NotFound", ErrorArgs::new().metadata(json!("m")).cause(Arc::clone(&cause)))
            .unwrap();

        let props = err.to_json();
        assert_eq!(&*props.code, "NotFound");
        assert_eq!(props.metadata, Some(json!("m")));
        assert!(Arc::ptr_eq(props.cause.as_ref().unwrap(), &cause));
    }

    #[test]
    fn serialized_properties_render_cause_one_level() {
        let ty = sub();
        let inner = ty.new_error("Unexpected", ErrorArgs::new().caused_by(Io)).unwrap();
        let outer = ty.new_error("NotFound", inner).unwrap();

        let value = serde_json::to_value(outer.to_json()).unwrap();
        assert_eq!(
            value,
            json!({
                "code": "NotFound",
                "metadata": null,
                "cause": "SubError: Unexpected!"
            })
        );
    }

    #[test]
    fn chain_walks_every_cause() {
        let ty = sub();
        let inner = ty.new_error("Unexpected", ErrorArgs::new().caused_by(Io)).unwrap();
        let outer = ty.new_error("NotFound", inner).unwrap();

        let rendered: Vec<String> = outer.chain().map(|e| e.to_string()).collect();
        assert_eq!(
            rendered,
            vec!["SubError: Not found!", "SubError: Unexpected!", "disk on fire"]
        );
    }

    #[test]
    fn instance_is_kind_of_ancestors() {
        let ty = sub();
        let root = ty.parent().unwrap().clone();
        let err = ty.new_error("NotFound", ()).unwrap();

        assert!(err.is_kind_of(&ty));
        assert!(err.is_kind_of(&root));
        assert!(!root.new_error("Unexpected", ()).unwrap().is_kind_of(&ty));
    }

    #[test]
    fn instance_is_a_send_sync_error() {
        fn assert_error<T: StdError + Send + Sync + 'static>() {}
        assert_error::<ErrorInstance>();
    }
}
