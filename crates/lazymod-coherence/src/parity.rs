//! Parity between a facade's export table and its static declaration list.

use crate::codegen::render_declarations;
use crate::declarations::{DeclarationError, parse_declared_exports, parse_manifest_digest};
use lazymod_kernel::{ExportTable, FacadeManifest};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub const DECLARATION_PARITY_CHECK_KIND: &str = "lazymod.declaration_parity.check.v1";

pub const FAILURE_CLASS_MISSING_EXPORT: &str = "declaration.missing_export";
pub const FAILURE_CLASS_UNRESOLVABLE_NAME: &str = "declaration.unresolvable_name";
pub const FAILURE_CLASS_DUPLICATE_NAME: &str = "declaration.duplicate_name";
pub const FAILURE_CLASS_DIGEST_DRIFT: &str = "declaration.digest_drift";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParityFinding {
    pub subject: String,
    pub class: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParitySummary {
    pub exported_count: usize,
    pub checked_count: usize,
    pub error_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParityReport {
    pub check_kind: String,
    pub package: String,
    pub result: String,
    pub failure_classes: Vec<String>,
    pub findings: Vec<ParityFinding>,
    pub summary: ParitySummary,
}

impl ParityReport {
    pub(crate) fn from_findings(
        check_kind: &str,
        package: &str,
        mut findings: Vec<ParityFinding>,
        exported_count: usize,
        checked_count: usize,
    ) -> Self {
        findings.sort_by(|a, b| {
            a.class
                .cmp(&b.class)
                .then_with(|| a.subject.cmp(&b.subject))
                .then_with(|| a.message.cmp(&b.message))
        });
        findings.dedup();
        let failure_classes: Vec<String> = findings
            .iter()
            .map(|finding| finding.class.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let result = if failure_classes.is_empty() {
            "accepted"
        } else {
            "rejected"
        };
        Self {
            check_kind: check_kind.to_string(),
            package: package.to_string(),
            result: result.to_string(),
            failure_classes,
            summary: ParitySummary {
                exported_count,
                checked_count,
                error_count: findings.len(),
            },
            findings,
        }
    }

    pub fn accepted(&self) -> bool {
        self.result == "accepted"
    }
}

/// Compare the table's names against a declaration list.
pub fn check_declaration_parity(table: &ExportTable, declared: &[String]) -> ParityReport {
    let mut findings = Vec::new();
    let package = table.package().full_name();

    let mut occurrences: BTreeMap<&str, usize> = BTreeMap::new();
    for name in declared {
        *occurrences.entry(name.as_str()).or_default() += 1;
    }

    for (name, count) in &occurrences {
        if *count > 1 {
            findings.push(ParityFinding {
                subject: (*name).to_string(),
                class: FAILURE_CLASS_DUPLICATE_NAME.to_string(),
                message: format!("`{name}` is declared {count} times"),
            });
        }
        if !table.contains(name) {
            findings.push(ParityFinding {
                subject: (*name).to_string(),
                class: FAILURE_CLASS_UNRESOLVABLE_NAME.to_string(),
                message: format!("`{name}` is declared but `{package}` does not export it"),
            });
        }
    }

    for (name, _) in table.iter() {
        if !occurrences.contains_key(name) {
            findings.push(ParityFinding {
                subject: name.to_string(),
                class: FAILURE_CLASS_MISSING_EXPORT.to_string(),
                message: format!("`{package}` exports `{name}` but it is not declared"),
            });
        }
    }

    debug!(package, declared = declared.len(), findings = findings.len(), "declaration parity checked");
    ParityReport::from_findings(
        DECLARATION_PARITY_CHECK_KIND,
        package,
        findings,
        table.len(),
        declared.len(),
    )
}

/// Check a generated declaration module against the manifest it claims to
/// come from: name parity plus the digest recorded in its banner.
pub fn check_generated_drift(
    manifest: &FacadeManifest,
    source: &str,
) -> Result<ParityReport, DeclarationError> {
    let table = manifest.export_table()?;
    let declared = parse_declared_exports(source)?;
    let mut report = check_declaration_parity(&table, &declared);

    let expected = manifest.digest();
    let digest_finding = match parse_manifest_digest(source) {
        Some(found) if found == expected => None,
        Some(found) => Some(format!(
            "banner digest {found} does not match manifest digest {expected}"
        )),
        None => Some(format!(
            "no manifest digest banner; regenerate to record {expected}"
        )),
    };
    if let Some(message) = digest_finding {
        let mut findings = std::mem::take(&mut report.findings);
        findings.push(ParityFinding {
            subject: manifest.package.to_string(),
            class: FAILURE_CLASS_DIGEST_DRIFT.to_string(),
            message,
        });
        report = ParityReport::from_findings(
            DECLARATION_PARITY_CHECK_KIND,
            manifest.package.full_name(),
            findings,
            report.summary.exported_count,
            report.summary.checked_count,
        );
    }
    Ok(report)
}

/// Whether `source` is byte-identical to what codegen would render now.
pub fn is_current_rendering(manifest: &FacadeManifest, source: &str) -> bool {
    render_declarations(manifest) == source
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazymod_kernel::DottedName;

    fn manifest() -> FacadeManifest {
        let mut manifest = FacadeManifest::new(DottedName::parse("fastestimator.trace.xai").unwrap());
        for (module, symbol) in [("grad_cam", "GradCAM"), ("saliency", "Saliency")] {
            manifest
                .submod_attrs
                .insert(module.to_string(), vec![symbol.to_string()]);
        }
        manifest
    }

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn equal_sets_are_accepted() {
        let table = manifest().export_table().unwrap();
        let report = check_declaration_parity(&table, &names(&["Saliency", "GradCAM"]));
        assert!(report.accepted());
        assert!(report.failure_classes.is_empty());
        assert_eq!(report.summary.exported_count, 2);
        assert_eq!(report.summary.checked_count, 2);
    }

    #[test]
    fn drift_in_both_directions_is_reported() {
        let table = manifest().export_table().unwrap();
        let report = check_declaration_parity(
            &table,
            &names(&["GradCAM", "GradCAM", "EigenCAM"]),
        );
        assert!(!report.accepted());
        assert_eq!(
            report.failure_classes,
            vec![
                FAILURE_CLASS_DUPLICATE_NAME,
                FAILURE_CLASS_MISSING_EXPORT,
                FAILURE_CLASS_UNRESOLVABLE_NAME,
            ]
        );
        let subjects: Vec<(&str, &str)> = report
            .findings
            .iter()
            .map(|f| (f.class.as_str(), f.subject.as_str()))
            .collect();
        assert_eq!(
            subjects,
            vec![
                (FAILURE_CLASS_DUPLICATE_NAME, "GradCAM"),
                (FAILURE_CLASS_MISSING_EXPORT, "Saliency"),
                (FAILURE_CLASS_UNRESOLVABLE_NAME, "EigenCAM"),
            ]
        );
        assert_eq!(report.summary.error_count, 3);
    }

    #[test]
    fn generated_source_has_no_drift() {
        let manifest = manifest();
        let source = render_declarations(&manifest);
        let report = check_generated_drift(&manifest, &source).unwrap();
        assert!(report.accepted(), "{report:?}");
        assert!(is_current_rendering(&manifest, &source));
    }

    #[test]
    fn stale_banner_is_digest_drift() {
        let manifest = manifest();
        let source = render_declarations(&manifest);
        let mut changed = manifest.clone();
        changed
            .submod_attrs
            .insert("eigen_cam".to_string(), vec!["EigenCAM".to_string()]);

        let report = check_generated_drift(&changed, &source).unwrap();
        assert_eq!(
            report.failure_classes,
            vec![FAILURE_CLASS_DIGEST_DRIFT, FAILURE_CLASS_MISSING_EXPORT]
        );
        assert!(!is_current_rendering(&changed, &source));
    }

    #[test]
    fn hand_written_list_without_banner_is_drift() {
        let manifest = manifest();
        let source = r#"pub const DECLARED_EXPORTS: &[&str] = &["GradCAM", "Saliency"];"#;
        let report = check_generated_drift(&manifest, source).unwrap();
        assert_eq!(report.failure_classes, vec![FAILURE_CLASS_DIGEST_DRIFT]);
        assert_eq!(report.findings[0].subject, "fastestimator.trace.xai");
    }

    #[test]
    fn missing_constant_is_an_error() {
        assert_eq!(
            check_generated_drift(&manifest(), "// empty"),
            Err(DeclarationError::MissingConstant)
        );
    }
}
