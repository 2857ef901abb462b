//! # Taxon Errors
//!
//! Hierarchical, self-describing error taxonomies.
//!
//! A root error type is defined once from a table of codes. Each code maps
//! to a human-readable message. Every subclass overlays its own codes on its
//! parent's merged table, and the result is frozen on the new type together
//! with a generated capability per code: a predicate (`is{Code}`) and a
//! factory producing instances of that code.
//!
//! ## Design Philosophy
//!
//! 1. **Types are build-once.** A merged table is resolved at subclass time
//!    and never recomputed or mutated afterwards.
//! 2. **Children win.** A child entry replaces the parent's entry of the same
//!    code; every other parent entry is inherited unchanged, in order.
//! 3. **Capabilities are plain lookups.** Predicates and factories come from a
//!    table generated over the full merged view, so a grandchild can build
//!    codes defined three levels up without walking the chain.
//! 4. **Misuse fails fast.** Every malformed definition or construction call
//!    returns a [`ConfigurationError`] with a distinguishable kind.
//!
//! ## Quick Start
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
//! assert_eq!(err.code(), "NotFound");
//! assert_eq!(err.message(), "Not found!");
//! assert!(err.is("NotFound"));
//! assert!(!err.is("Unexpected"));
//! assert_eq!(err.metadata().unwrap()["id"], 42);
//! # Ok::<(), taxon_errors::ConfigurationError>(())
//! ```
//!
//! ## Overrides Stay Local
//!
//! ```rust
//! use taxon_errors::{define_root, CodeTable};
//!
//! let root = define_root("RootError", CodeTable::new().with("Unexpected", "Unexpected!"))?;
//! let child = root.subclass("ChildError", CodeTable::new().with("Unexpected", "Overridden!"))?;
//!
//! assert_eq!(child.new_error("Unexpected", ())?.message(), "Overridden!");
//! assert_eq!(root.new_error("Unexpected", ())?.message(), "Unexpected!");
//! # Ok::<(), taxon_errors::ConfigurationError>(())
//! ```
//!
//! ## Causal Chaining
//!
//! An error passed where metadata would go is taken as the cause:
//!
//! ```rust
//! use taxon_errors::{define_root, CodeTable};
//!
//! let root = define_root("RootError", CodeTable::base())?;
//! let low = root.new_error("Unexpected", ())?;
//! let high = root.new_error("BadArguments", low)?;
//!
//! assert!(high.metadata().is_none());
//! assert_eq!(high.chain().count(), 2);
//! # Ok::<(), taxon_errors::ConfigurationError>(())
//! ```
//!
//! ## Collaborators
//!
//! [`PropertyBag`], [`EventEmitter`] and the adapters in [`stream`] share
//! the [`ToJson`] property-bag contract with the error core but are otherwise
//! independent of it.
//!
//! ## Features
//!
//! - `strict_taxonomy`: Require code names to be identifier-shaped
//!   (`[A-Za-z][A-Za-z0-9_]*`), so every predicate name is a valid identifier
//! - `tokio`: `AsyncRead`/`AsyncWrite` implementations for the stream adapters

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::result;

pub mod codes;
pub mod convenience;
pub mod emitter;
pub mod error;
pub mod instance;
pub mod logging;
pub mod object;
pub mod stream;
pub mod taxonomy;
pub mod types;

pub use codes::{validate_code_name, CodeTable, BAD_ARGUMENTS, BASE_CODES, UNEXPECTED};
pub use emitter::{EventEmitter, ListenerId};
pub use error::{ConfigurationError, ConfigurationErrorKind};
pub use instance::{Cause, Chain, ErrorArgs, ErrorInstance, ErrorProperties, Metadata, Slot};
pub use logging::ErrorLog;
pub use object::{PropertyBag, ToJson};
pub use stream::{Duplex, PassThrough, Readable, Transform, Writable};
pub use taxonomy::{Taxonomy, TypeKey};
pub use types::{define_root, Ancestors, Capability, ErrorType, Factory};

/// Type alias for Results of taxonomy definition and construction.
pub type Result<T> = result::Result<T, ConfigurationError>;

#[cfg(test)]
mod unit_tests {
    use super::*;
    use serde_json::json;

    fn hierarchy() -> (ErrorType, ErrorType) {
        let root = define_root(
            "RootError",
            CodeTable::new()
                .with("Unexpected", "Unexpected!")
                .with("BadArguments", "Bad args!"),
        )
        .unwrap();
        let sub = root
            .subclass("SubError", CodeTable::new().with("NotFound", "Not found!"))
            .unwrap();
        (root, sub)
    }

    #[test]
    fn end_to_end_subclass_and_factory() {
        let (_, sub) = hierarchy();
        let err = sub.factory("NotFound").unwrap().call(json!({ "id": 42 }));

        assert_eq!(err.code(), "NotFound");
        assert_eq!(err.message(), "Not found!");
        assert_eq!(err.name(), "SubError");
        assert!(err.is("NotFound"));
        assert!(!err.is("Unexpected"));
        assert_eq!(err.metadata().unwrap()["id"], 42);
    }

    #[test]
    fn end_to_end_override_leaves_parent_untouched() {
        let (_, sub) = hierarchy();
        let child = sub
            .subclass("ChildError", CodeTable::new().with("Unexpected", "Overridden!"))
            .unwrap();

        assert_eq!(child.new_error("Unexpected", ()).unwrap().message(), "Overridden!");
        assert_eq!(sub.new_error("Unexpected", ()).unwrap().message(), "Unexpected!");
        assert!(child.is_descendant_of(&sub));
        assert_eq!(child.lineage().as_slice(), ["RootError", "SubError", "ChildError"]);
    }

    #[test]
    fn construction_failures_are_distinguishable_by_kind() {
        let (root, _) = hierarchy();

        let missing = root.new_error("", ()).unwrap_err();
        let unknown = root.new_error("NotFound", ()).unwrap_err();

        assert_eq!(missing.kind(), ConfigurationErrorKind::MissingCode);
        assert_eq!(unknown.kind(), ConfigurationErrorKind::UnknownCode);
    }

    #[test]
    fn instances_are_std_errors() {
        let (root, sub) = hierarchy();
        let cause = root.new_error("Unexpected", ()).unwrap();
        let err = sub.new_error("NotFound", cause).unwrap();

        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(err);
        assert_eq!(boxed.to_string(), "SubError: Not found!");
        assert_eq!(
            boxed.source().map(ToString::to_string).as_deref(),
            Some("RootError: Unexpected!")
        );
    }

    #[test]
    fn types_are_shareable_across_threads() {
        let (_, sub) = hierarchy();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let sub = sub.clone();
                std::thread::spawn(move || {
                    let child = sub
                        .subclass(format!("Worker{i}"), CodeTable::new().with("Busy", "Busy!"))
                        .unwrap();
                    child.new_error("NotFound", ()).unwrap().name().to_owned()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), format!("Worker{i}"));
        }
        assert!(!sub.codes().contains("Busy"));
    }
}
