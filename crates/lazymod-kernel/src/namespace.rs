//! Initialized child namespaces and the symbols they define.
//!
//! A `Namespace` is produced exactly once per path by its loader and then
//! shared (`Arc<Namespace>`) by every facade that re-exports from it. Its
//! symbol map is frozen at construction so readers never take a lock.

use crate::path::DottedName;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Type-erased shared value defined by a namespace.
#[derive(Clone)]
pub struct Symbol {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Symbol {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Rust type name of the stored value, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Shared handle to the stored value, if it is a `T`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    /// Identity comparison: both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Symbol) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.value), Arc::as_ptr(&other.value))
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Symbol")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// A fully initialized child namespace.
#[derive(Debug)]
pub struct Namespace {
    path: DottedName,
    doc: Option<String>,
    symbols: BTreeMap<String, Symbol>,
}

impl Namespace {
    pub fn builder(path: DottedName) -> NamespaceBuilder {
        NamespaceBuilder {
            path,
            doc: None,
            symbols: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn path(&self) -> &DottedName {
        &self.path
    }

    #[inline]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Defined symbol names in sorted order.
    pub fn symbol_names(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Collects a namespace's symbols before it is frozen.
#[derive(Debug)]
pub struct NamespaceBuilder {
    path: DottedName,
    doc: Option<String>,
    symbols: BTreeMap<String, Symbol>,
}

impl NamespaceBuilder {
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Define `name`; a later definition of the same name replaces the
    /// earlier one.
    pub fn symbol<T: Any + Send + Sync>(self, name: impl Into<String>, value: T) -> Self {
        self.shared_symbol(name, Symbol::new(value))
    }

    pub fn shared_symbol(mut self, name: impl Into<String>, symbol: Symbol) -> Self {
        self.symbols.insert(name.into(), symbol);
        self
    }

    pub fn build(self) -> Namespace {
        Namespace {
            path: self.path,
            doc: self.doc,
            symbols: self.symbols,
        }
    }
}
