//! Dotted namespace paths (`pkg.child.leaf`).
//!
//! Every namespace the registry knows about, and every package a facade
//! fronts, is addressed by a `DottedName`. Parsing validates each component
//! as an identifier so malformed paths fail at construction instead of at
//! first lookup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Errors raised while parsing a dotted path or identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("empty namespace path")]
    Empty,

    #[error("empty component in namespace path `{0}`")]
    EmptyComponent(String),

    #[error("invalid identifier `{component}` in namespace path `{path}`")]
    InvalidComponent { path: String, component: String },
}

/// Whether `token` is a valid identifier: a letter or `_` followed by
/// letters, digits, or `_`.
pub fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Parsed dotted path with pre-split components.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DottedName {
    full_name: Arc<str>,
    parts: Vec<Arc<str>>,
}

impl DottedName {
    pub fn parse(name: &str) -> Result<Self, PathError> {
        if name.is_empty() {
            return Err(PathError::Empty);
        }
        let mut parts = Vec::new();
        for part in name.split('.') {
            if part.is_empty() {
                return Err(PathError::EmptyComponent(name.to_string()));
            }
            if !is_identifier(part) {
                return Err(PathError::InvalidComponent {
                    path: name.to_string(),
                    component: part.to_string(),
                });
            }
            parts.push(Arc::from(part));
        }
        Ok(Self {
            full_name: Arc::from(name),
            parts,
        })
    }

    #[inline]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[inline]
    pub fn parts(&self) -> &[Arc<str>] {
        &self.parts
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.parts.len()
    }

    /// Last component, e.g. `numpyop` for `fastestimator.op.numpyop`.
    #[inline]
    pub fn leaf(&self) -> &str {
        self.parts.last().map(|part| part.as_ref()).unwrap_or_default()
    }

    /// Enclosing package, or `None` for a top-level name.
    pub fn parent(&self) -> Option<DottedName> {
        let (parent, _) = self.full_name.rsplit_once('.')?;
        Some(Self {
            full_name: Arc::from(parent),
            parts: self.parts[..self.parts.len() - 1].to_vec(),
        })
    }

    /// Child path `self.component`.
    pub fn child(&self, component: &str) -> Result<DottedName, PathError> {
        if !is_identifier(component) {
            return Err(PathError::InvalidComponent {
                path: format!("{}.{component}", self.full_name),
                component: component.to_string(),
            });
        }
        let mut parts = self.parts.clone();
        parts.push(Arc::from(component));
        Ok(Self {
            full_name: Arc::from(format!("{}.{component}", self.full_name)),
            parts,
        })
    }

    /// Whether `self` lives strictly inside `package`.
    pub fn is_within(&self, package: &DottedName) -> bool {
        self.parts.len() > package.parts.len() && self.parts.starts_with(&package.parts)
    }
}

impl fmt::Display for DottedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

impl FromStr for DottedName {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DottedName {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DottedName> for String {
    fn from(value: DottedName) -> Self {
        value.full_name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_path() {
        let name = DottedName::parse("fastestimator.op.numpyop").unwrap();
        assert_eq!(name.depth(), 3);
        assert_eq!(name.leaf(), "numpyop");
        assert_eq!(name.parent().unwrap().full_name(), "fastestimator.op");
        assert!(DottedName::parse("fastestimator").unwrap().parent().is_none());
    }

    #[test]
    fn rejects_malformed_paths() {
        assert_eq!(DottedName::parse(""), Err(PathError::Empty));
        assert!(matches!(
            DottedName::parse("op..numpyop"),
            Err(PathError::EmptyComponent(_))
        ));
        assert!(matches!(
            DottedName::parse(".op"),
            Err(PathError::EmptyComponent(_))
        ));
        assert!(matches!(
            DottedName::parse("op.2d"),
            Err(PathError::InvalidComponent { component, .. }) if component == "2d"
        ));
    }

    #[test]
    fn child_and_containment() {
        let pkg = DottedName::parse("fastestimator.trace.xai").unwrap();
        let child = pkg.child("grad_cam").unwrap();
        assert_eq!(child.full_name(), "fastestimator.trace.xai.grad_cam");
        assert!(child.is_within(&pkg));
        assert!(!pkg.is_within(&pkg));
        assert!(pkg.child("grad-cam").is_err());
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("forward_numpyop"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("EigenCAM"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("9lives"));
        assert!(!is_identifier("with space"));
    }

    #[test]
    fn serde_uses_plain_string() {
        let name: DottedName = serde_json::from_str("\"a.b\"").unwrap();
        assert_eq!(name.full_name(), "a.b");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"a.b\"");
        assert!(serde_json::from_str::<DottedName>("\"a..b\"").is_err());
    }
}
