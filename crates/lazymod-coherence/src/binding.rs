//! Export-binding check: every exported name actually resolves.
//!
//! Unlike the declaration checks this one runs the facade, so every child
//! namespace gets initialized.

use crate::parity::{ParityFinding, ParityReport};
use lazymod_kernel::{FacadeError, LazyFacade};
use tracing::warn;

pub const EXPORT_BINDING_CHECK_KIND: &str = "lazymod.export_binding.check.v1";

pub const FAILURE_CLASS_BINDING_MISSING_SYMBOL: &str = "binding.missing_symbol";
pub const FAILURE_CLASS_BINDING_UNKNOWN_NAMESPACE: &str = "binding.unknown_namespace";
pub const FAILURE_CLASS_BINDING_CHILD_FAILED: &str = "binding.child_failed";

fn failure_class(err: &FacadeError) -> &'static str {
    match err {
        FacadeError::UnknownNamespace { .. } => FAILURE_CLASS_BINDING_UNKNOWN_NAMESPACE,
        FacadeError::Child(_) => FAILURE_CLASS_BINDING_CHILD_FAILED,
        FacadeError::NoSuchExport { .. }
        | FacadeError::MissingSymbol { .. }
        | FacadeError::SymbolType { .. } => FAILURE_CLASS_BINDING_MISSING_SYMBOL,
    }
}

pub fn check_export_bindings(facade: &LazyFacade) -> ParityReport {
    let names = facade.names();
    let mut findings = Vec::new();
    for name in &names {
        if let Err(err) = facade.get(name) {
            warn!(package = %facade.package(), export = %name, error = %err, "export does not bind");
            findings.push(ParityFinding {
                subject: name.clone(),
                class: failure_class(&err).to_string(),
                message: err.to_string(),
            });
        }
    }
    ParityReport::from_findings(
        EXPORT_BINDING_CHECK_KIND,
        facade.package().full_name(),
        findings,
        names.len(),
        names.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazymod_kernel::{ChildError, DottedName, ExportTable, ModuleRegistry, Namespace};
    use std::sync::Arc;

    #[test]
    fn every_kind_of_broken_binding_is_classified() {
        let registry = Arc::new(ModuleRegistry::new());
        registry
            .register(
                DottedName::parse("xai.grad_cam").unwrap(),
                |p: &DottedName| -> Result<Namespace, ChildError> {
                    Ok(Namespace::builder(p.clone()).symbol("GradCAM", ()).build())
                },
            )
            .unwrap();
        registry
            .register(
                DottedName::parse("xai.saliency").unwrap(),
                |p: &DottedName| -> Result<Namespace, ChildError> { Ok(Namespace::builder(p.clone()).build()) },
            )
            .unwrap();
        registry
            .register(
                DottedName::parse("xai.eigen_cam").unwrap(),
                |_: &DottedName| -> Result<Namespace, ChildError> { Err(ChildError::msg("no backend")) },
            )
            .unwrap();
        let table = ExportTable::attach(
            DottedName::parse("xai").unwrap(),
            Vec::<&str>::new(),
            [
                ("eigen_cam", vec!["EigenCAM"]),
                ("grad_cam", vec!["GradCAM"]),
                ("label_tracker", vec!["LabelTracker"]),
                ("saliency", vec!["Saliency"]),
            ],
        )
        .unwrap();
        let facade = LazyFacade::new(table, registry);

        let report = check_export_bindings(&facade);
        assert!(!report.accepted());
        assert_eq!(
            report.failure_classes,
            vec![
                FAILURE_CLASS_BINDING_CHILD_FAILED,
                FAILURE_CLASS_BINDING_MISSING_SYMBOL,
                FAILURE_CLASS_BINDING_UNKNOWN_NAMESPACE,
            ]
        );
        let subjects: Vec<&str> = report.findings.iter().map(|f| f.subject.as_str()).collect();
        assert_eq!(subjects, vec!["EigenCAM", "Saliency", "LabelTracker"]);
        assert_eq!(report.summary.exported_count, 4);
        assert!(facade.is_resolved("GradCAM"));
    }

    #[test]
    fn fully_bound_facade_is_accepted() {
        let registry = Arc::new(ModuleRegistry::new());
        registry
            .insert(
                Namespace::builder(DottedName::parse("pkg.core").unwrap())
                    .symbol("Op", 1u8)
                    .build(),
            )
            .unwrap();
        let table = ExportTable::attach(
            DottedName::parse("pkg").unwrap(),
            ["core"],
            [("core", ["Op"])],
        )
        .unwrap();
        let report = check_export_bindings(&LazyFacade::new(table, registry));
        assert!(report.accepted());
        assert_eq!(report.summary.error_count, 0);
    }
}
