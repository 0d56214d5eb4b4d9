//! Static declaration list tooling for lazymod facades.
//!
//! The runtime export table and the declaration list that source-reading
//! tools consume are two renderings of one manifest. This crate generates
//! the latter and reports drift between them as deterministic reports.

mod binding;
mod codegen;
mod declarations;
mod parity;

pub use binding::{
    EXPORT_BINDING_CHECK_KIND, FAILURE_CLASS_BINDING_CHILD_FAILED,
    FAILURE_CLASS_BINDING_MISSING_SYMBOL, FAILURE_CLASS_BINDING_UNKNOWN_NAMESPACE,
    check_export_bindings,
};
pub use codegen::{DIGEST_LINE_PREFIX, GENERATED_BANNER, render_declarations};
pub use declarations::{DeclarationError, parse_declared_exports, parse_manifest_digest};
pub use parity::{
    DECLARATION_PARITY_CHECK_KIND, FAILURE_CLASS_DIGEST_DRIFT, FAILURE_CLASS_DUPLICATE_NAME,
    FAILURE_CLASS_MISSING_EXPORT, FAILURE_CLASS_UNRESOLVABLE_NAME, ParityFinding, ParityReport,
    ParitySummary, check_declaration_parity, check_generated_drift, is_current_rendering,
};
