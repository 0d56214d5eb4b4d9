//! # lazymod kernel
//!
//! Lazily loaded package facades: a package declares its whole exported
//! surface up front, but each child namespace is initialized only when a
//! consumer first reads one of its names.
//!
//! ## Architecture
//!
//! ```text
//! FacadeManifest        ← single declarative source (TOML / JSON)
//!     │
//! ExportTable           ← name → Submodule{module} | Attribute{module, symbol}
//!     │
//! LazyFacade            ← get(name) / names(), per-facade resolution cache
//!     │
//! ModuleRegistry        ← process-wide, once-per-namespace initialization
//!     │
//! NamespaceLoader       ← the child's own "load me" entry point
//!     │
//! Namespace / Symbol    ← initialized child and its type-erased values
//! ```

pub mod error;
pub mod export;
pub mod facade;
pub mod manifest;
pub mod namespace;
pub mod path;
pub mod registry;

pub use error::{ChildError, FacadeError, RegistryError};
pub use export::{ExportRow, ExportTable, ExportTableError, ResolutionRule};
pub use facade::{LazyFacade, Resolved};
pub use manifest::{FACADE_MANIFEST_KIND, FACADE_MANIFEST_SCHEMA, FacadeManifest, ManifestError};
pub use namespace::{Namespace, NamespaceBuilder, Symbol};
pub use path::{DottedName, PathError, is_identifier};
pub use registry::{ModuleRegistry, NamespaceLoader};
