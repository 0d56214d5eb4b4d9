//! Error types for namespace loading and facade resolution.

use std::error::Error as StdError;
use std::sync::Arc;

/// Failure raised by a child namespace's own initialization.
///
/// The original error is kept behind a shared pointer and forwarded
/// transparently: `Display` and `source()` are exactly the child's.
#[derive(Debug, Clone, thiserror::Error)]
#[error(transparent)]
pub struct ChildError(Arc<dyn StdError + Send + Sync + 'static>);

impl ChildError {
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Arc::new(err))
    }

    /// Child failure carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(MessageError(message.into()))
    }

    /// The child's original error, if it has type `E`.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }

    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct MessageError(String);

/// Errors raised by the namespace registry.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("no loader registered for namespace `{0}`")]
    UnknownNamespace(String),

    #[error("a loader is already registered for namespace `{0}`")]
    AlreadyRegistered(String),

    #[error(transparent)]
    Child(#[from] ChildError),
}

/// Errors surfaced by `LazyFacade::get`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FacadeError {
    /// The name is not in the export table.
    #[error("module `{package}` has no attribute `{name}`")]
    NoSuchExport { package: String, name: String },

    /// The export table maps the name to a symbol its namespace lacks.
    #[error("module `{namespace}` has no attribute `{symbol}` (exported by `{package}` as `{name}`)")]
    MissingSymbol {
        package: String,
        name: String,
        namespace: String,
        symbol: String,
    },

    /// Typed access requested a type the resolved value does not have.
    #[error("`{package}.{name}` holds `{actual}`, not `{expected}`")]
    SymbolType {
        package: String,
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The export table points at a namespace nobody registered.
    #[error("no loader registered for namespace `{namespace}` (needed by `{package}.{name}`)")]
    UnknownNamespace {
        package: String,
        name: String,
        namespace: String,
    },

    /// The child namespace's initialization failed.
    #[error(transparent)]
    Child(#[from] ChildError),
}

impl FacadeError {
    /// Attribute-resolution failures: the name, the symbol, or its type
    /// does not line up with what was requested.
    pub fn is_attribute_error(&self) -> bool {
        matches!(
            self,
            Self::NoSuchExport { .. } | Self::MissingSymbol { .. } | Self::SymbolType { .. }
        )
    }

    pub fn child(&self) -> Option<&ChildError> {
        match self {
            Self::Child(err) => Some(err),
            _ => None,
        }
    }
}
