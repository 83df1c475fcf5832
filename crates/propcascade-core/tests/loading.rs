//! End-to-end loading against the resources in `tests/fixtures`

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use propcascade_core::{
    resolve_placeholders, Loader, LoaderOptions, PropertySet, PropertyStore, PROPERTY_LOCATIONS,
};

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn loader() -> Loader {
    Loader::with_options(LoaderOptions {
        resource_roots: vec![fixtures()],
        ..LoaderOptions::default()
    })
}

fn store_with_locations(locations: &str) -> PropertyStore {
    let mut seed = PropertySet::new();
    seed.insert(PROPERTY_LOCATIONS, locations);
    PropertyStore::with_properties(seed)
}

#[test]
fn test_locations_not_specified() {
    let store = PropertyStore::new();
    store.load_and_publish(&loader());

    assert!(store.is_initialized());
    assert!(store.snapshot().is_empty());
}

#[test]
fn test_locations_is_empty() {
    let store = store_with_locations("");
    store.load_and_publish(&loader());

    assert_eq!(store.snapshot().len(), 1);
}

#[test]
fn test_specify_property_file_via_store() {
    let store = store_with_locations("classpath:a.properties");
    store.load_and_publish(&loader());

    assert_eq!(store.get("a").as_deref(), Some("Anton"));
    assert_eq!(store.get("greeting").as_deref(), Some("Hallo Anton"));
}

#[test]
fn test_last_specified_file_overrules_previous_files() {
    let store = store_with_locations("classpath:a.properties,classpath:config/b.properties,");
    store.load_and_publish(&loader());

    assert_eq!(store.get("a").as_deref(), Some("Anne"));
    assert_eq!(store.get("b").as_deref(), Some("berta"));
    assert_eq!(store.get("c").as_deref(), Some("Christoph"));
    // placeholders see the final merged values
    assert_eq!(store.get("greeting").as_deref(), Some("Hallo Anne"));
}

#[test]
fn test_unknown_locations_are_handled_gracefully() {
    let props = loader().load_locations("classpath:config/gibtsNicht.properties");
    assert!(props.is_empty());
}

#[test]
fn test_file_system_resource_can_be_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("test.properties");
    std::fs::write(&file, "f=Felix").unwrap();

    let store = store_with_locations(&format!("file:{}", file.display()));
    store.load_and_publish(&loader());

    assert_eq!(store.get("f").as_deref(), Some("Felix"));
}

#[test]
fn test_existing_values_are_not_overwritten() {
    let store = store_with_locations("classpath:a.properties");
    store.set("bleibt", "bestehen");

    store.load_and_publish(&loader());

    assert_eq!(store.get("bleibt").as_deref(), Some("bestehen"));
}

#[test]
fn test_property_files_can_reference_more_locations() {
    let props = loader().load_locations("classpath:config/b.properties");

    assert_eq!(props.get("c"), Some("Christoph"));
    // b.properties' own entry beats the one it pulled in
    assert_eq!(props.get("b"), Some("berta"));
    assert_eq!(
        props.get(PROPERTY_LOCATIONS),
        Some("classpath:config/c.properties")
    );
}

#[test]
fn test_strict_loading_matches_lenient_when_everything_loads() {
    let list = "classpath:a.properties,classpath:config/b.properties";
    let loader = loader();

    assert_eq!(loader.try_load_locations(list).unwrap(), loader.load_locations(list));
}

#[test]
fn test_standalone_resolution() {
    let mut props = loader().load_locations("classpath:a.properties");
    resolve_placeholders(&mut props);

    assert_eq!(props.get("greeting"), Some("Hallo Anton"));
}

#[test]
fn test_load_and_publish_is_idempotent() {
    let store = store_with_locations("classpath:a.properties");
    let loader = loader();

    store.load_and_publish(&loader);
    let first = store.snapshot();
    store.load_and_publish(&loader);

    assert_eq!(store.snapshot(), first);
}
