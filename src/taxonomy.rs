//! Registry of error types addressed by key.
//!
//! [`ErrorType::subclass`](crate::ErrorType::subclass) needs no registry:
//! a handle to the parent is proof the parent was built. [`Taxonomy`] is for
//! callers that refer to types indirectly, such as plugin hosts, and need
//! "unknown parent" to be a checked failure.
//!
//! # Concurrency
//!
//! Registered types are immutable; the registry only appends. Reads take a
//! shared lock, registration takes the write lock for the duration of one
//! push. Lock poisoning is recovered from, as the registry's only invariant
//! (an append-only list) cannot be broken by a panicking reader.
//!
//! # Example
//!
//! ```rust
//! use taxon_errors::{CodeTable, Taxonomy};
//!
//! let taxonomy = Taxonomy::new();
//! let root = taxonomy.define_root("RootError", CodeTable::base())?;
//! let sub = taxonomy.subclass(root, "SubError", CodeTable::new().with("NotFound", "Not found!"))?;
//!
//! assert_eq!(taxonomy.get(sub).unwrap().name(), "SubError");
//! assert_eq!(taxonomy.children_of(root), vec![sub]);
//! # Ok::<(), taxon_errors::ConfigurationError>(())
//! ```

use crate::{define_root, CodeTable, ConfigurationError, ErrorType, Result};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Handle to a type registered in a [`Taxonomy`].
///
/// A key remembers which registry issued it. Handing it to any other
/// registry fails with [`ConfigurationError::UnknownParent`] even when the
/// index happens to exist there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey {
    registry: u64,
    index: usize,
}

impl TypeKey {
    /// Registration index within the issuing registry.
    #[inline]
    pub const fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.registry)
    }
}

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(0);

/// Append-only registry of error types.
pub struct Taxonomy {
    id: u64,
    types: RwLock<Vec<ErrorType>>,
}

impl Taxonomy {
    /// Create an empty registry with a process-unique identity.
    pub fn new() -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            types: RwLock::new(Vec::new()),
        }
    }

    #[inline]
    fn key(&self, index: usize) -> TypeKey {
        TypeKey {
            registry: self.id,
            index,
        }
    }

    /// Index of `key` in this registry, if this registry issued it.
    #[inline]
    fn local_index(&self, key: TypeKey) -> Option<usize> {
        (key.registry == self.id).then_some(key.index)
    }

    #[inline]
    fn read_types(&self) -> RwLockReadGuard<'_, Vec<ErrorType>> {
        match self.types.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[inline]
    fn write_types(&self) -> RwLockWriteGuard<'_, Vec<ErrorType>> {
        match self.types.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Define a root and register it.
    ///
    /// # Errors
    ///
    /// Same as [`define_root`].
    pub fn define_root(&self, name: &str, codes: CodeTable) -> Result<TypeKey> {
        let ty = define_root(name, codes)?;
        Ok(self.register(ty))
    }

    /// Derive a type from a registered parent and register it.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::UnknownParent`] if `parent` is not in this registry
    /// - anything [`ErrorType::subclass`] returns
    pub fn subclass(&self, parent: TypeKey, name: &str, codes: CodeTable) -> Result<TypeKey> {
        let Some(parent_type) = self.get(parent) else {
            debug!(%parent, type_name = name, "rejected subclass of unknown parent");
            return Err(ConfigurationError::UnknownParent { key: parent });
        };
        let ty = parent_type.subclass(name, codes)?;
        Ok(self.register(ty))
    }

    /// Register an already-built type.
    ///
    /// Registering the same type twice returns the existing key.
    pub fn register(&self, ty: ErrorType) -> TypeKey {
        let mut types = self.write_types();
        if let Some(index) = types.iter().position(|existing| *existing == ty) {
            return self.key(index);
        }
        types.push(ty);
        self.key(types.len() - 1)
    }

    /// Look up a registered type. Keys from other registries yield `None`.
    pub fn get(&self, key: TypeKey) -> Option<ErrorType> {
        let index = self.local_index(key)?;
        self.read_types().get(index).cloned()
    }

    /// Key of a registered type.
    pub fn key_of(&self, ty: &ErrorType) -> Option<TypeKey> {
        self.read_types()
            .iter()
            .position(|existing| existing == ty)
            .map(|index| self.key(index))
    }

    /// Every registered type with the given display name.
    ///
    /// Names are not unique, so this may return several types.
    pub fn find_by_name(&self, name: &str) -> Vec<TypeKey> {
        self.read_types()
            .iter()
            .enumerate()
            .filter(|(_, ty)| ty.name() == name)
            .map(|(index, _)| self.key(index))
            .collect()
    }

    /// Registered types whose parent is `parent`.
    pub fn children_of(&self, parent: TypeKey) -> Vec<TypeKey> {
        let types = self.read_types();
        let Some(parent_type) = self.local_index(parent).and_then(|index| types.get(index)) else {
            return Vec::new();
        };
        types
            .iter()
            .enumerate()
            .filter(|(_, ty)| ty.parent() == Some(parent_type))
            .map(|(index, _)| self.key(index))
            .collect()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.read_types().len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.read_types().is_empty()
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types = self.read_types();
        f.debug_struct("Taxonomy")
            .field("id", &self.id)
            .field("types", &types.iter().map(ErrorType::name).collect::<Vec<_>>())
            .finish()
    }
}
