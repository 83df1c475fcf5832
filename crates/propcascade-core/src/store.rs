//! The shared property store
//!
//! A [`PropertyStore`] is the configuration context an application reads its
//! settings from. [`PropertyStore::load_and_publish`] fills it once from the
//! locations named by its own `propertyLocations` entry; values that were
//! already in the store are never overwritten.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::loader::Loader;
use crate::placeholder::resolve_placeholders;
use crate::properties::PropertySet;

// Process-wide store for applications that don't pass one around
static GLOBAL_STORE: OnceLock<PropertyStore> = OnceLock::new();

/// Merge `loaded` into `target` without replacing existing values
///
/// Keys present in both keep the target's value; keys only in `loaded` are
/// added. An empty `loaded` set leaves the target untouched.
pub fn publish(loaded: PropertySet, target: &mut PropertySet) {
    if loaded.is_empty() {
        return;
    }
    target.merge_without_overwrite(loaded);
}

/// A property set shared between threads, loaded at most once
#[derive(Debug, Default)]
pub struct PropertyStore {
    properties: RwLock<PropertySet>,
    initialized: AtomicBool,
}

impl PropertyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with `properties`
    ///
    /// Seeded values take precedence over anything loaded later.
    pub fn with_properties(properties: PropertySet) -> Self {
        Self {
            properties: RwLock::new(properties),
            initialized: AtomicBool::new(false),
        }
    }

    /// The process-wide store, created empty on first use
    pub fn global() -> &'static PropertyStore {
        GLOBAL_STORE.get_or_init(PropertyStore::new)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.read().get(key).map(str::to_string)
    }

    /// Set a value, returning the previous one
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.write().insert(key, value)
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.write().remove(key)
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> PropertySet {
        self.read().clone()
    }

    /// Whether [`load_and_publish`](Self::load_and_publish) has run
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Allow the next `load_and_publish` call to load again
    ///
    /// Stored values are kept. Meant for tests that exercise loading more
    /// than once in the same process.
    pub fn reset(&self) {
        self.initialized.store(false, Ordering::Release);
    }

    /// Load the locations named by `propertyLocations` and publish them
    ///
    /// Runs the whole load, publish and resolve sequence under the write
    /// lock, so readers see the store either before or after it. Later
    /// calls return immediately. Never fails: locations that can't be
    /// loaded are logged and skipped.
    pub fn load_and_publish(&self, loader: &Loader) {
        if self.is_initialized() {
            return;
        }

        let mut properties = self.write();
        if self.is_initialized() {
            return;
        }

        let locations = properties.locations().unwrap_or_default().to_string();
        let loaded = loader.load_locations(&locations);
        let loaded_keys: Vec<String> = loaded.keys().map(str::to_string).collect();

        publish(loaded, &mut properties);
        resolve_placeholders(&mut properties);

        log::info!(
            "Loaded {} properties from '{}'",
            loaded_keys.len(),
            locations
        );
        log::debug!("Loaded property keys: {}", loaded_keys.join(", "));

        self.initialized.store(true, Ordering::Release);
    }

    fn read(&self) -> RwLockReadGuard<'_, PropertySet> {
        self.properties
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PropertySet> {
        self.properties
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoaderOptions;
    use crate::location::Scheme;
    use crate::properties::PROPERTY_LOCATIONS;
    use crate::source::SourceRegistry;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn set(entries: &[(&str, &str)]) -> PropertySet {
        entries.iter().copied().collect()
    }

    /// Loader whose resources are `name=value` lines keyed by path
    fn counting_loader(
        resources: &'static [(&'static str, &'static str)],
    ) -> (Loader, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reads);

        let mut sources = SourceRegistry::new();
        sources.register_fn(Scheme::Resource, move |path| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(resources
                .iter()
                .find(|(name, _)| *name == path)
                .map(|(_, text)| text.as_bytes().to_vec()))
        });

        (Loader::with_sources(sources, LoaderOptions::default()), reads)
    }

    #[test]
    fn test_publish_keeps_existing_values() {
        let mut store = set(&[("bleibt", "bestehen")]);
        publish(set(&[("bleibt", "weg"), ("a", "Anton")]), &mut store);

        assert_eq!(store, set(&[("bleibt", "bestehen"), ("a", "Anton")]));
    }

    #[test]
    fn test_publish_empty_is_noop() {
        let mut store = set(&[("x", "1")]);
        publish(PropertySet::new(), &mut store);

        assert_eq!(store, set(&[("x", "1")]));
    }

    #[test]
    fn test_without_locations_nothing_is_loaded() {
        let (loader, reads) = counting_loader(&[]);
        let store = PropertyStore::new();

        store.load_and_publish(&loader);

        assert!(store.is_initialized());
        assert!(store.snapshot().is_empty());
        assert_eq!(reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_locations_value() {
        let (loader, _) = counting_loader(&[]);
        let store = PropertyStore::with_properties(set(&[(PROPERTY_LOCATIONS, "")]));

        store.load_and_publish(&loader);

        assert_eq!(store.snapshot(), set(&[(PROPERTY_LOCATIONS, "")]));
    }

    #[test]
    fn test_load_and_publish_fills_store() {
        let (loader, _) = counting_loader(&[("a.properties", "a=Anton\nbleibt=weg")]);
        let store = PropertyStore::with_properties(set(&[
            (PROPERTY_LOCATIONS, "classpath:a.properties"),
            ("bleibt", "bestehen"),
        ]));

        store.load_and_publish(&loader);

        assert_eq!(store.get("a").as_deref(), Some("Anton"));
        assert_eq!(store.get("bleibt").as_deref(), Some("bestehen"));
    }

    #[test]
    fn test_placeholders_resolve_against_whole_store() {
        let (loader, _) = counting_loader(&[("a.properties", "greeting=Hallo ${user}")]);
        let store = PropertyStore::with_properties(set(&[
            (PROPERTY_LOCATIONS, "classpath:a.properties"),
            ("user", "Max"),
        ]));

        store.load_and_publish(&loader);

        assert_eq!(store.get("greeting").as_deref(), Some("Hallo Max"));
    }

    #[test]
    fn test_second_call_does_not_load_again() {
        let (loader, reads) = counting_loader(&[("a.properties", "a=Anton")]);
        let store = PropertyStore::with_properties(set(&[(
            PROPERTY_LOCATIONS,
            "classpath:a.properties",
        )]));

        store.load_and_publish(&loader);
        let first = store.snapshot();
        store.set(PROPERTY_LOCATIONS, "classpath:other.properties");
        store.load_and_publish(&loader);

        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert_eq!(store.get("a"), first.get("a").map(str::to_string));
    }

    #[test]
    fn test_reset_allows_reloading() {
        let (loader, reads) = counting_loader(&[("a.properties", "a=Anton")]);
        let store = PropertyStore::with_properties(set(&[(
            PROPERTY_LOCATIONS,
            "classpath:a.properties",
        )]));

        store.load_and_publish(&loader);
        store.remove("a");
        store.reset();
        assert!(!store.is_initialized());

        store.load_and_publish(&loader);

        assert_eq!(reads.load(Ordering::SeqCst), 2);
        assert_eq!(store.get("a").as_deref(), Some("Anton"));
    }

    #[test]
    fn test_concurrent_callers_load_once() {
        let (loader, reads) = counting_loader(&[("a.properties", "a=Anton")]);
        let store = PropertyStore::with_properties(set(&[(
            PROPERTY_LOCATIONS,
            "classpath:a.properties",
        )]));

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    store.load_and_publish(&loader);
                    assert_eq!(store.get("a").as_deref(), Some("Anton"));
                });
            }
        });

        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_global_store_is_shared() {
        assert!(std::ptr::eq(PropertyStore::global(), PropertyStore::global()));
    }
}
