//! Declarative facade manifests.
//!
//! A manifest is the single source of truth for a package's exported
//! surface: the runtime export table is built from it, and the static
//! declaration list is generated from it.
//!
//! ```toml
//! schema = 1
//! manifestKind = "lazymod.facade_manifest.v1"
//! package = "fastestimator.op.numpyop"
//! submodules = ["meta", "multivariate", "univariate"]
//!
//! [submodAttrs]
//! numpyop = ["Batch", "Delete", "LambdaOp", "NumpyOp", "RemoveIf", "forward_numpyop"]
//! ```

use crate::export::{ExportTable, ExportTableError};
use crate::path::DottedName;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const FACADE_MANIFEST_KIND: &str = "lazymod.facade_manifest.v1";
pub const FACADE_MANIFEST_SCHEMA: u32 = 1;
pub const MANIFEST_DIGEST_PREFIX: &str = "facman1_";

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml manifest at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid json manifest at {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported manifest extension for {0} (expected .toml or .json)")]
    UnsupportedFormat(String),

    #[error("manifest schema must equal 1, found {0}")]
    Schema(u32),

    #[error("manifestKind must equal lazymod.facade_manifest.v1, found {0}")]
    Kind(String),

    #[error(transparent)]
    Table(#[from] ExportTableError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacadeManifest {
    pub schema: u32,
    pub manifest_kind: String,
    pub package: DottedName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub submodules: Vec<String>,
    #[serde(default)]
    pub submod_attrs: BTreeMap<String, Vec<String>>,
}

impl FacadeManifest {
    /// Manifest with the current schema/kind and no exports.
    pub fn new(package: DottedName) -> Self {
        Self {
            schema: FACADE_MANIFEST_SCHEMA,
            manifest_kind: FACADE_MANIFEST_KIND.to_string(),
            package,
            doc: None,
            submodules: Vec::new(),
            submod_attrs: BTreeMap::new(),
        }
    }

    /// Load a manifest, picking the format from the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| ManifestError::ReadFile {
            path: label.clone(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::parse_toml(&text, &label),
            Some("json") => Self::parse_json(&text, &label),
            _ => Err(ManifestError::UnsupportedFormat(label)),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ManifestError> {
        Self::parse_toml(text, "<inline>")
    }

    pub fn from_json_str(text: &str) -> Result<Self, ManifestError> {
        Self::parse_json(text, "<inline>")
    }

    fn parse_toml(text: &str, label: &str) -> Result<Self, ManifestError> {
        let manifest: Self = toml::from_str(text).map_err(|source| ManifestError::ParseToml {
            path: label.to_string(),
            source,
        })?;
        manifest.validate()
    }

    fn parse_json(text: &str, label: &str) -> Result<Self, ManifestError> {
        let manifest: Self =
            serde_json::from_str(text).map_err(|source| ManifestError::ParseJson {
                path: label.to_string(),
                source,
            })?;
        manifest.validate()
    }

    fn validate(self) -> Result<Self, ManifestError> {
        if self.schema != FACADE_MANIFEST_SCHEMA {
            return Err(ManifestError::Schema(self.schema));
        }
        if self.manifest_kind != FACADE_MANIFEST_KIND {
            return Err(ManifestError::Kind(self.manifest_kind));
        }
        self.export_table()?;
        Ok(self)
    }

    pub fn export_table(&self) -> Result<ExportTable, ExportTableError> {
        ExportTable::attach(
            self.package.clone(),
            &self.submodules,
            &self.submod_attrs,
        )
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Content digest over the order-insensitive export surface.
    pub fn digest(&self) -> String {
        let mut submodules = self.submodules.clone();
        submodules.sort();
        let submod_attrs: BTreeMap<&str, Vec<&str>> = self
            .submod_attrs
            .iter()
            .map(|(module, attrs)| {
                let mut attrs: Vec<&str> = attrs.iter().map(String::as_str).collect();
                attrs.sort_unstable();
                (module.as_str(), attrs)
            })
            .collect();
        let canonical = json!({
            "schema": self.schema,
            "manifestKind": self.manifest_kind,
            "package": self.package.full_name(),
            "submodules": submodules,
            "submodAttrs": submod_attrs,
        });
        let bytes = canonical.to_string();
        let mut hasher = Sha256::new();
        hasher.update(bytes.as_bytes());
        format!("{MANIFEST_DIGEST_PREFIX}{:x}", hasher.finalize())
    }
}
