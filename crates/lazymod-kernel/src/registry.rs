//! Process-wide namespace registry: the "load me once" mechanism.
//!
//! Each registered path owns a loader and a memo slot. The first successful
//! `load` runs the loader and publishes the result; every later `load` of the
//! same path returns the same `Arc<Namespace>`. A failed load publishes
//! nothing, so the next caller runs the loader again.
//!
//! ```text
//! ModuleRegistry
//!   └── entries: RwLock<HashMap<path, Arc<Entry>>>
//!         └── Entry
//!               ├── loader        (child's entry point)
//!               ├── value         OnceLock<Arc<Namespace>>   ← lock-free hit path
//!               ├── init          Mutex<()>                  ← serializes first loads
//!               └── initializing  Mutex<Option<ThreadId>>    ← detects re-entry
//! ```
//!
//! A loader that loads its own path, directly or through another loader on
//! the same thread, gets a "circular initialization" error instead of
//! blocking on its own init lock.

use crate::error::{ChildError, RegistryError};
use crate::namespace::Namespace;
use crate::path::DottedName;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};
use std::thread::{self, ThreadId};
use tracing::{debug, warn};

/// A child namespace's initialization entry point.
///
/// `load` may load other namespaces from the same registry. Loading the path
/// being initialized (or a path whose loader is already running further up
/// the same thread) fails with a circular initialization error.
pub trait NamespaceLoader: Send + Sync {
    fn load(&self, path: &DottedName) -> Result<Namespace, ChildError>;
}

impl<F> NamespaceLoader for F
where
    F: Fn(&DottedName) -> Result<Namespace, ChildError> + Send + Sync,
{
    fn load(&self, path: &DottedName) -> Result<Namespace, ChildError> {
        self(path)
    }
}

struct Entry {
    path: DottedName,
    loader: Box<dyn NamespaceLoader>,
    value: OnceLock<Arc<Namespace>>,
    init: Mutex<()>,
    initializing: Mutex<Option<ThreadId>>,
    attempts: AtomicUsize,
}

/// Clears the initializing thread when the loader returns or unwinds.
struct InitializingGuard<'a>(&'a Mutex<Option<ThreadId>>);

impl Drop for InitializingGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Entry {
    fn get_or_init(&self) -> Result<Arc<Namespace>, ChildError> {
        if let Some(ns) = self.value.get() {
            return Ok(Arc::clone(ns));
        }

        let current = thread::current().id();
        if *self.initializing.lock().unwrap_or_else(PoisonError::into_inner) == Some(current) {
            warn!(namespace = %self.path, "circular namespace initialization");
            return Err(ChildError::msg(format!(
                "circular initialization of `{}`",
                self.path
            )));
        }

        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(ns) = self.value.get() {
            return Ok(Arc::clone(ns));
        }
        *self.initializing.lock().unwrap_or_else(PoisonError::into_inner) = Some(current);
        let _initializing = InitializingGuard(&self.initializing);

        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(namespace = %self.path, attempt, "initializing namespace");
        match self.loader.load(&self.path) {
            Ok(ns) => {
                let ns = Arc::new(ns);
                // Only the init-lock holder writes the slot.
                let _ = self.value.set(Arc::clone(&ns));
                Ok(ns)
            }
            Err(err) => {
                warn!(namespace = %self.path, attempt, error = %err, "namespace initialization failed");
                Err(err)
            }
        }
    }
}

/// Registry of child namespaces keyed by dotted path.
#[derive(Default)]
pub struct ModuleRegistry {
    entries: RwLock<HashMap<String, Arc<Entry>>>,
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("registered", &self.registered_paths())
            .field("loaded", &self.loaded_paths())
            .finish()
    }
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry. Created on first use, never torn down.
    pub fn global() -> Arc<ModuleRegistry> {
        static GLOBAL: OnceLock<Arc<ModuleRegistry>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(ModuleRegistry::new())))
    }

    /// Register `loader` as the entry point for `path`.
    pub fn register<F>(&self, path: DottedName, loader: F) -> Result<(), RegistryError>
    where
        F: Fn(&DottedName) -> Result<Namespace, ChildError> + Send + Sync + 'static,
    {
        self.register_loader(path, loader)
    }

    pub fn register_loader<L>(&self, path: DottedName, loader: L) -> Result<(), RegistryError>
    where
        L: NamespaceLoader + 'static,
    {
        self.insert_entry(path, Box::new(loader), OnceLock::new())
    }

    /// Register a namespace that is already initialized. Its loader slot is
    /// never consulted.
    pub fn insert(&self, namespace: Namespace) -> Result<(), RegistryError> {
        let path = namespace.path().clone();
        let rejected = |p: &DottedName| -> Result<Namespace, ChildError> {
            Err(ChildError::msg(format!(
                "namespace `{p}` was inserted pre-initialized"
            )))
        };
        self.insert_entry(path, Box::new(rejected), OnceLock::from(Arc::new(namespace)))
    }

    fn insert_entry(
        &self,
        path: DottedName,
        loader: Box<dyn NamespaceLoader>,
        value: OnceLock<Arc<Namespace>>,
    ) -> Result<(), RegistryError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(path.full_name()) {
            return Err(RegistryError::AlreadyRegistered(path.to_string()));
        }
        let key = path.to_string();
        let entry = Entry {
            path,
            loader,
            value,
            init: Mutex::new(()),
            initializing: Mutex::new(None),
            attempts: AtomicUsize::new(0),
        };
        entries.insert(key, Arc::new(entry));
        Ok(())
    }

    /// Load `path`, running its loader only if no earlier load succeeded.
    pub fn load(&self, path: &DottedName) -> Result<Arc<Namespace>, RegistryError> {
        let entry = self
            .entry(path.full_name())
            .ok_or_else(|| RegistryError::UnknownNamespace(path.to_string()))?;
        Ok(entry.get_or_init()?)
    }

    pub fn is_registered(&self, path: &str) -> bool {
        self.entry(path).is_some()
    }

    /// Whether `path` has been initialized successfully.
    pub fn is_loaded(&self, path: &str) -> bool {
        self.entry(path)
            .is_some_and(|entry| entry.value.get().is_some())
    }

    /// How many times the loader for `path` has been invoked.
    pub fn init_attempts(&self, path: &str) -> usize {
        self.entry(path)
            .map_or(0, |entry| entry.attempts.load(Ordering::SeqCst))
    }

    pub fn registered_paths(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut paths: Vec<String> = entries.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn loaded_paths(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut paths: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.value.get().is_some())
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort();
        paths
    }

    fn entry(&self, path: &str) -> Option<Arc<Entry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    fn path(raw: &str) -> DottedName {
        DottedName::parse(raw).unwrap()
    }

    #[test]
    fn load_is_memoized() {
        let registry = ModuleRegistry::new();
        registry
            .register(path("pkg.meta"), |p: &DottedName| {
                Ok(Namespace::builder(p.clone()).symbol("Sometimes", 1u8).build())
            })
            .unwrap();

        assert!(!registry.is_loaded("pkg.meta"));
        let first = registry.load(&path("pkg.meta")).unwrap();
        let second = registry.load(&path("pkg.meta")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.init_attempts("pkg.meta"), 1);
        assert!(registry.is_loaded("pkg.meta"));
        assert_eq!(registry.loaded_paths(), vec!["pkg.meta".to_string()]);
    }

    #[test]
    fn unknown_and_duplicate_paths() {
        let registry = ModuleRegistry::new();
        assert!(matches!(
            registry.load(&path("pkg.nowhere")),
            Err(RegistryError::UnknownNamespace(p)) if p == "pkg.nowhere"
        ));

        let loader = |p: &DottedName| -> Result<Namespace, ChildError> {
            Ok(Namespace::builder(p.clone()).build())
        };
        registry.register(path("pkg.a"), loader).unwrap();
        assert!(matches!(
            registry.register(path("pkg.a"), loader),
            Err(RegistryError::AlreadyRegistered(_))
        ));
        assert_eq!(registry.registered_paths(), vec!["pkg.a".to_string()]);
    }

    #[test]
    fn failed_load_is_retried() {
        let registry = ModuleRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        registry
            .register(path("pkg.flaky"), move |p: &DottedName| {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ChildError::msg("first import fails"))
                } else {
                    Ok(Namespace::builder(p.clone()).build())
                }
            })
            .unwrap();

        let err = registry.load(&path("pkg.flaky")).unwrap_err();
        assert_eq!(err.to_string(), "first import fails");
        assert!(!registry.is_loaded("pkg.flaky"));
        assert!(registry.load(&path("pkg.flaky")).is_ok());
        assert_eq!(registry.init_attempts("pkg.flaky"), 2);
    }

    #[test]
    fn inserted_namespace_never_runs_loader() {
        let registry = ModuleRegistry::new();
        registry
            .insert(Namespace::builder(path("pkg.ready")).symbol("x", 1i32).build())
            .unwrap();
        let ns = registry.load(&path("pkg.ready")).unwrap();
        assert!(ns.contains("x"));
        assert_eq!(registry.init_attempts("pkg.ready"), 0);
    }

    #[test]
    fn concurrent_first_loads_initialize_once() {
        let registry = Arc::new(ModuleRegistry::new());
        registry
            .register(path("pkg.slow"), |p: &DottedName| {
                thread::sleep(std::time::Duration::from_millis(20));
                Ok(Namespace::builder(p.clone()).build())
            })
            .unwrap();

        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.load(&path("pkg.slow")).unwrap()
                })
            })
            .collect();
        let loaded: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(registry.init_attempts("pkg.slow"), 1);
        assert!(loaded.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn reentrant_load_fails_instead_of_deadlocking() {
        let registry = Arc::new(ModuleRegistry::new());
        let inner_results = Arc::new(Mutex::new(Vec::new()));

        let handle = Arc::downgrade(&registry);
        let seen = Arc::clone(&inner_results);
        registry
            .register(path("pkg.selfish"), move |p: &DottedName| {
                let registry = handle
                    .upgrade()
                    .ok_or_else(|| ChildError::msg("registry dropped"))?;
                let inner = registry.load(p).map(|_| ()).map_err(|err| err.to_string());
                seen.lock().unwrap().push(inner);
                Ok(Namespace::builder(p.clone()).build())
            })
            .unwrap();

        // pkg.ping -> pkg.pong -> pkg.ping on one thread.
        let handle = Arc::downgrade(&registry);
        registry
            .register(path("pkg.ping"), move |p: &DottedName| {
                let registry = handle
                    .upgrade()
                    .ok_or_else(|| ChildError::msg("registry dropped"))?;
                registry.load(&path("pkg.pong")).map_err(ChildError::new)?;
                Ok(Namespace::builder(p.clone()).build())
            })
            .unwrap();
        let handle = Arc::downgrade(&registry);
        registry
            .register(path("pkg.pong"), move |p: &DottedName| {
                let registry = handle
                    .upgrade()
                    .ok_or_else(|| ChildError::msg("registry dropped"))?;
                registry.load(&path("pkg.ping")).map_err(ChildError::new)?;
                Ok(Namespace::builder(p.clone()).build())
            })
            .unwrap();

        assert!(registry.load(&path("pkg.selfish")).is_ok());
        assert_eq!(
            *inner_results.lock().unwrap(),
            vec![Err("circular initialization of `pkg.selfish`".to_string())]
        );
        assert_eq!(registry.init_attempts("pkg.selfish"), 1);

        let err = registry.load(&path("pkg.ping")).unwrap_err();
        assert_eq!(err.to_string(), "circular initialization of `pkg.ping`");
        assert!(!registry.is_loaded("pkg.ping"));
        assert!(!registry.is_loaded("pkg.pong"));

        // The marker is cleared, so a later attempt runs the loader again.
        assert!(registry.load(&path("pkg.ping")).is_err());
        assert_eq!(registry.init_attempts("pkg.ping"), 2);
    }
}
