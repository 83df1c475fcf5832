//! Recursive property loading
//!
//! Loads a comma-separated location list into one [`PropertySet`]:
//! - later locations in a list override earlier ones
//! - a loaded set that declares `propertyLocations` pulls those locations
//!   in too, but its own entries win over what they contribute
//! - the `propertyLocations` entry itself stays in the result

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::format;
use crate::location::{parse_locations, Location, Scheme};
use crate::properties::PropertySet;
use crate::source::SourceRegistry;

/// Default limit for nested `propertyLocations`
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Options for a [`Loader`]
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Directories searched, in order, for `classpath:` resources
    pub resource_roots: Vec<PathBuf>,
    /// Refuse to re-enter a location that is already being loaded
    pub detect_cycles: bool,
    /// Maximum nesting of `propertyLocations`; always enforced
    pub max_depth: usize,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            resource_roots: Vec::new(),
            detect_cycles: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailurePolicy {
    /// Log the failure and carry on with the next location
    Skip,
    /// Stop at the first failure
    Fail,
}

/// Loads property sets from location lists
#[derive(Clone)]
pub struct Loader {
    sources: SourceRegistry,
    options: LoaderOptions,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    /// Create a loader with the built-in readers and default options
    pub fn new() -> Self {
        Self::with_options(LoaderOptions::default())
    }

    /// Create a loader with the built-in readers
    pub fn with_options(options: LoaderOptions) -> Self {
        Self {
            sources: SourceRegistry::with_builtins(options.resource_roots.clone()),
            options,
        }
    }

    /// Create a loader with a custom reader registry
    pub fn with_sources(sources: SourceRegistry, options: LoaderOptions) -> Self {
        Self { sources, options }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Load a location list, skipping locations that fail
    ///
    /// Each failure is logged as a warning; the remaining locations are
    /// still loaded. Blank input gives an empty set.
    pub fn load_locations(&self, locations: &str) -> PropertySet {
        // Skip never yields an error
        self.load_list(locations, &mut Vec::new(), FailurePolicy::Skip)
            .unwrap_or_default()
    }

    /// Load a location list, failing on the first location that can't be loaded
    pub fn try_load_locations(&self, locations: &str) -> Result<PropertySet> {
        self.load_list(locations, &mut Vec::new(), FailurePolicy::Fail)
    }

    /// Load one location together with everything it includes
    pub fn load_location(&self, location: &Location) -> Result<PropertySet> {
        self.load_one(location, &mut Vec::new(), FailurePolicy::Fail)
    }

    fn load_list(
        &self,
        locations: &str,
        chain: &mut Vec<String>,
        policy: FailurePolicy,
    ) -> Result<PropertySet> {
        let mut loaded = PropertySet::new();

        for parsed in parse_locations(locations) {
            match parsed.and_then(|location| self.load_one(&location, chain, policy)) {
                Ok(props) => loaded.extend_overriding(props),
                Err(e) if policy == FailurePolicy::Skip => {
                    log::warn!("Cannot load properties, skipping location. {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(loaded)
    }

    fn load_one(
        &self,
        location: &Location,
        chain: &mut Vec<String>,
        policy: FailurePolicy,
    ) -> Result<PropertySet> {
        if location.is_blank() {
            return Ok(PropertySet::new());
        }

        let key = chain_key(location);
        if self.options.detect_cycles && chain.contains(&key) {
            let mut cycle = chain.clone();
            cycle.push(key);
            return Err(Error::circular_include(location.to_string(), cycle));
        }
        if chain.len() >= self.options.max_depth {
            return Err(Error::include_depth_exceeded(
                location.to_string(),
                self.options.max_depth,
            ));
        }

        log::debug!("Loading properties from location {}", location);

        let Some(bytes) = self.sources.read(location)? else {
            return Ok(PropertySet::new());
        };
        let local = format::parse_bytes(&bytes, &location.path)
            .map_err(|e| e.with_location(location.to_string()))?;

        let Some(nested_locations) = local.locations().map(str::to_string) else {
            return Ok(local);
        };

        chain.push(key);
        let nested = self.load_list(&nested_locations, chain, policy);
        chain.pop();

        let mut merged = nested?;
        merged.extend_overriding(local);
        Ok(merged)
    }
}

/// Identity of a location on the include chain
fn chain_key(location: &Location) -> String {
    match location.scheme {
        Scheme::Resource => format!(
            "{}{}",
            Scheme::Resource.prefix(),
            location.path.trim().trim_start_matches('/')
        ),
        Scheme::File => std::fs::canonicalize(location.path.trim())
            .map(|path| format!("{}{}", Scheme::File.prefix(), path.display()))
            .unwrap_or_else(|_| location.to_string()),
    }
}
