//! The lazy module facade.
//!
//! A `LazyFacade` fronts one package. Its full member list is known up front
//! (the export table), but no child namespace is loaded until a caller asks
//! for a name that lives in it. Resolved values are memoized per facade;
//! namespace initialization is memoized by the registry, so two names from
//! the same child share one initialized namespace.
//!
//! Per-name lifecycle:
//!
//! ```text
//! Unresolved ──get──▶ Resolving ──ok──▶ Resolved   (cached, terminal)
//!                         │
//!                         └──err──▶ Unresolved     (nothing cached; retry reloads)
//! ```

use crate::error::{FacadeError, RegistryError};
use crate::export::{ExportTable, ResolutionRule};
use crate::namespace::{Namespace, Symbol};
use crate::path::DottedName;
use crate::registry::ModuleRegistry;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// A resolved exported name.
#[derive(Debug, Clone)]
pub enum Resolved {
    Namespace(Arc<Namespace>),
    Symbol(Symbol),
}

impl Resolved {
    pub fn as_namespace(&self) -> Option<&Arc<Namespace>> {
        match self {
            Self::Namespace(ns) => Some(ns),
            Self::Symbol(_) => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Self::Symbol(symbol) => Some(symbol),
            Self::Namespace(_) => None,
        }
    }

    /// Identity comparison: both values are the same shared instance.
    pub fn ptr_eq(&self, other: &Resolved) -> bool {
        match (self, other) {
            (Self::Namespace(a), Self::Namespace(b)) => Arc::ptr_eq(a, b),
            (Self::Symbol(a), Self::Symbol(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Namespace(_) => std::any::type_name::<Namespace>(),
            Self::Symbol(symbol) => symbol.type_name(),
        }
    }
}

pub struct LazyFacade {
    table: ExportTable,
    registry: Arc<ModuleRegistry>,
    cache: RwLock<HashMap<String, Resolved>>,
}

impl fmt::Debug for LazyFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyFacade")
            .field("package", &self.table.package().full_name())
            .field("exports", &self.table.len())
            .field("resolved", &self.resolved_names())
            .finish()
    }
}

impl LazyFacade {
    pub fn new(table: ExportTable, registry: Arc<ModuleRegistry>) -> Self {
        Self {
            table,
            registry,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Facade backed by the process-wide registry.
    pub fn with_global_registry(table: ExportTable) -> Self {
        Self::new(table, ModuleRegistry::global())
    }

    #[inline]
    pub fn package(&self) -> &DottedName {
        self.table.package()
    }

    #[inline]
    pub fn table(&self) -> &ExportTable {
        &self.table
    }

    #[inline]
    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    pub fn rule(&self, name: &str) -> Option<&ResolutionRule> {
        self.table.rule(name)
    }

    /// Every exported name, sorted. Pure metadata: loads nothing.
    pub fn names(&self) -> Vec<String> {
        self.table.names()
    }

    /// Resolve `name`, loading its child namespace on first use.
    pub fn get(&self, name: &str) -> Result<Resolved, FacadeError> {
        if let Some(hit) = self.cached(name) {
            return Ok(hit);
        }

        let rule = self
            .table
            .rule(name)
            .ok_or_else(|| FacadeError::NoSuchExport {
                package: self.package().to_string(),
                name: name.to_string(),
            })?;
        let resolved = self.resolve(name, rule)?;

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        // A concurrent caller may have published first; keep its value.
        let value = cache
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(package = %self.table.package(), export = name, "resolved export");
                resolved
            })
            .clone();
        Ok(value)
    }

    /// Resolve `name` as a child namespace.
    pub fn get_namespace(&self, name: &str) -> Result<Arc<Namespace>, FacadeError> {
        match self.get(name)? {
            Resolved::Namespace(ns) => Ok(ns),
            other => Err(self.type_mismatch::<Namespace>(name, &other)),
        }
    }

    /// Resolve `name` as a symbol holding a `T`.
    pub fn get_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, FacadeError> {
        let resolved = self.get(name)?;
        resolved
            .as_symbol()
            .and_then(Symbol::downcast::<T>)
            .ok_or_else(|| self.type_mismatch::<T>(name, &resolved))
    }

    /// Resolve every exported name now, stopping at the first failure.
    pub fn preload(&self) -> Result<(), FacadeError> {
        for name in self.table.names() {
            self.get(&name)?;
        }
        Ok(())
    }

    pub fn is_resolved(&self, name: &str) -> bool {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Names resolved so far, sorted.
    pub fn resolved_names(&self) -> Vec<String> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = cache.keys().cloned().collect();
        names.sort();
        names
    }

    fn cached(&self, name: &str) -> Option<Resolved> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn resolve(&self, name: &str, rule: &ResolutionRule) -> Result<Resolved, FacadeError> {
        let namespace_path = format!("{}.{}", self.package(), rule.module());
        let unknown = || FacadeError::UnknownNamespace {
            package: self.package().to_string(),
            name: name.to_string(),
            namespace: namespace_path.clone(),
        };
        let path = self
            .table
            .namespace_path(rule.module())
            .map_err(|_| unknown())?;
        let ns = self.registry.load(&path).map_err(|err| match err {
            RegistryError::Child(child) => FacadeError::Child(child),
            RegistryError::UnknownNamespace(_) | RegistryError::AlreadyRegistered(_) => unknown(),
        })?;

        match rule {
            ResolutionRule::Submodule { .. } => Ok(Resolved::Namespace(ns)),
            ResolutionRule::Attribute { symbol, .. } => ns
                .get(symbol)
                .cloned()
                .map(Resolved::Symbol)
                .ok_or_else(|| FacadeError::MissingSymbol {
                    package: self.package().to_string(),
                    name: name.to_string(),
                    namespace: ns.path().to_string(),
                    symbol: symbol.clone(),
                }),
        }
    }

    fn type_mismatch<T>(&self, name: &str, resolved: &Resolved) -> FacadeError {
        FacadeError::SymbolType {
            package: self.package().to_string(),
            name: name.to_string(),
            expected: std::any::type_name::<T>(),
            actual: resolved.type_name(),
        }
    }
}
