//! Export tables: exported name -> resolution rule.
//!
//! A table is the runtime half of a package's declared surface. Names are
//! unique across both rule kinds; every child module a rule points at is a
//! direct child of the table's package.

use crate::path::{DottedName, PathError, is_identifier};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportTableError {
    #[error("exported name `{name}` is declared twice ({first} and {second})")]
    DuplicateExport {
        name: String,
        first: String,
        second: String,
    },

    #[error("exported name `{0}` is not a valid identifier")]
    InvalidName(String),

    #[error("child module `{0}` is not a valid identifier")]
    InvalidModule(String),

    #[error(transparent)]
    Path(#[from] PathError),
}

/// How an exported name resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionRule {
    /// The name is the child module itself.
    Submodule { module: String },
    /// The name is `symbol`, defined inside child `module`.
    Attribute { module: String, symbol: String },
}

impl ResolutionRule {
    /// Child module (relative to the package) this rule loads.
    pub fn module(&self) -> &str {
        match self {
            Self::Submodule { module } | Self::Attribute { module, .. } => module,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Submodule { module } => format!("submodule `{module}`"),
            Self::Attribute { module, symbol } => format!("attribute `{module}.{symbol}`"),
        }
    }
}

/// One row of an export table, flattened for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub name: String,
    pub kind: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    package: DottedName,
    rules: BTreeMap<String, ResolutionRule>,
}

impl ExportTable {
    pub fn new(package: DottedName) -> Self {
        Self {
            package,
            rules: BTreeMap::new(),
        }
    }

    /// Build a table from child submodules plus, per child module, the
    /// symbols it re-exports under their own names.
    pub fn attach<S, M, A>(
        package: DottedName,
        submodules: impl IntoIterator<Item = S>,
        submod_attrs: impl IntoIterator<Item = (M, A)>,
    ) -> Result<Self, ExportTableError>
    where
        S: AsRef<str>,
        M: AsRef<str>,
        A: IntoIterator<Item = S>,
    {
        let mut table = Self::new(package);
        for module in submodules {
            table.add_submodule(module.as_ref())?;
        }
        for (module, attrs) in submod_attrs {
            for attr in attrs {
                table.add_attribute(attr.as_ref(), module.as_ref(), attr.as_ref())?;
            }
        }
        Ok(table)
    }

    pub fn add_submodule(&mut self, module: &str) -> Result<(), ExportTableError> {
        self.insert(
            module,
            ResolutionRule::Submodule {
                module: module.to_string(),
            },
        )
    }

    /// Export `symbol` from child `module` as `name`.
    pub fn add_attribute(
        &mut self,
        name: &str,
        module: &str,
        symbol: &str,
    ) -> Result<(), ExportTableError> {
        if !is_identifier(symbol) {
            return Err(ExportTableError::InvalidName(symbol.to_string()));
        }
        self.insert(
            name,
            ResolutionRule::Attribute {
                module: module.to_string(),
                symbol: symbol.to_string(),
            },
        )
    }

    fn insert(&mut self, name: &str, rule: ResolutionRule) -> Result<(), ExportTableError> {
        if !is_identifier(name) {
            return Err(ExportTableError::InvalidName(name.to_string()));
        }
        if !is_identifier(rule.module()) {
            return Err(ExportTableError::InvalidModule(rule.module().to_string()));
        }
        if let Some(existing) = self.rules.get(name) {
            return Err(ExportTableError::DuplicateExport {
                name: name.to_string(),
                first: existing.describe(),
                second: rule.describe(),
            });
        }
        self.rules.insert(name.to_string(), rule);
        Ok(())
    }

    #[inline]
    pub fn package(&self) -> &DottedName {
        &self.package
    }

    pub fn rule(&self, name: &str) -> Option<&ResolutionRule> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Every exported name, sorted.
    pub fn names(&self) -> Vec<String> {
        self.rules.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolutionRule)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Distinct child modules referenced by any rule.
    pub fn child_modules(&self) -> BTreeSet<&str> {
        self.rules.values().map(ResolutionRule::module).collect()
    }

    /// Full dotted path of a child module of this package.
    pub fn namespace_path(&self, module: &str) -> Result<DottedName, PathError> {
        self.package.child(module)
    }

    pub fn rows(&self) -> Vec<ExportRow> {
        self.rules
            .iter()
            .map(|(name, rule)| {
                let namespace = format!("{}.{}", self.package, rule.module());
                match rule {
                    ResolutionRule::Submodule { .. } => ExportRow {
                        name: name.clone(),
                        kind: "submodule".to_string(),
                        namespace,
                        symbol: None,
                    },
                    ResolutionRule::Attribute { symbol, .. } => ExportRow {
                        name: name.clone(),
                        kind: "attribute".to_string(),
                        namespace,
                        symbol: Some(symbol.clone()),
                    },
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numpyop_table() -> ExportTable {
        ExportTable::attach(
            DottedName::parse("fastestimator.op.numpyop").unwrap(),
            ["meta", "multivariate", "univariate"],
            [(
                "numpyop",
                ["Batch", "Delete", "LambdaOp", "NumpyOp", "RemoveIf", "forward_numpyop"],
            )],
        )
        .unwrap()
    }

    #[test]
    fn attach_builds_both_rule_kinds() {
        let table = numpyop_table();
        assert_eq!(table.len(), 9);
        assert_eq!(
            table.rule("meta"),
            Some(&ResolutionRule::Submodule {
                module: "meta".to_string()
            })
        );
        assert_eq!(
            table.rule("LambdaOp"),
            Some(&ResolutionRule::Attribute {
                module: "numpyop".to_string(),
                symbol: "LambdaOp".to_string()
            })
        );
        assert!(!table.contains("numpyop"));
    }

    #[test]
    fn names_are_sorted() {
        let names = numpyop_table().names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.first().map(String::as_str), Some("Batch"));
        assert_eq!(names.last().map(String::as_str), Some("univariate"));
    }

    #[test]
    fn child_modules_are_distinct() {
        let table = numpyop_table();
        let modules: Vec<&str> = table.child_modules().into_iter().collect();
        assert_eq!(modules, vec!["meta", "multivariate", "numpyop", "univariate"]);
        assert_eq!(
            table.namespace_path("numpyop").unwrap().full_name(),
            "fastestimator.op.numpyop.numpyop"
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = ExportTable::attach(
            DottedName::parse("pkg").unwrap(),
            ["saliency"],
            [("saliency", ["saliency"])],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ExportTableError::DuplicateExport {
                name: "saliency".to_string(),
                first: "submodule `saliency`".to_string(),
                second: "attribute `saliency.saliency`".to_string(),
            }
        );
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut table = ExportTable::new(DottedName::parse("pkg").unwrap());
        assert_eq!(
            table.add_submodule("grad-cam"),
            Err(ExportTableError::InvalidName("grad-cam".to_string()))
        );
        assert_eq!(
            table.add_attribute("GradCAM", "grad cam", "GradCAM"),
            Err(ExportTableError::InvalidModule("grad cam".to_string()))
        );
        assert!(table.is_empty());
    }

    #[test]
    fn rows_flatten_rules() {
        let rows = numpyop_table().rows();
        let batch = rows.iter().find(|row| row.name == "Batch").unwrap();
        assert_eq!(batch.kind, "attribute");
        assert_eq!(batch.namespace, "fastestimator.op.numpyop.numpyop");
        assert_eq!(batch.symbol.as_deref(), Some("Batch"));
        let meta = rows.iter().find(|row| row.name == "meta").unwrap();
        assert_eq!(meta.kind, "submodule");
        assert_eq!(meta.symbol, None);
    }
}
