//! Source readers
//!
//! A source reader turns the path of a [`Location`] into raw bytes. There is
//! one reader per [`Scheme`]; the [`SourceRegistry`] picks the reader by the
//! location's scheme so the loader never cares where bytes come from.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::location::{Location, Scheme};

/// Trait for source reader implementations
pub trait SourceReader: Send + Sync {
    /// Read the data stored at `path`
    ///
    /// `Ok(None)` means "no data here" and loads as an empty set.
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// The scheme this reader serves
    fn scheme(&self) -> Scheme;
}

/// A simple function-based source reader
pub struct FnSourceReader<F>
where
    F: Fn(&str) -> Result<Option<Vec<u8>>> + Send + Sync,
{
    scheme: Scheme,
    func: F,
}

impl<F> FnSourceReader<F>
where
    F: Fn(&str) -> Result<Option<Vec<u8>>> + Send + Sync,
{
    /// Create a new function-based reader
    pub fn new(scheme: Scheme, func: F) -> Self {
        Self { scheme, func }
    }
}

impl<F> SourceReader for FnSourceReader<F>
where
    F: Fn(&str) -> Result<Option<Vec<u8>>> + Send + Sync,
{
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        (self.func)(path)
    }

    fn scheme(&self) -> Scheme {
        self.scheme
    }
}

/// Reader for packaged resources (`classpath:`)
///
/// Resources are looked up first among the embedded resources, then under
/// each resource root in order. A missing resource is not an error.
#[derive(Debug, Clone, Default)]
pub struct ResourceReader {
    roots: Vec<PathBuf>,
    embedded: HashMap<String, Vec<u8>>,
}

impl ResourceReader {
    /// Create a reader searching the given root directories
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            embedded: HashMap::new(),
        }
    }

    /// Add a resource compiled into the binary, e.g. with `include_bytes!`
    pub fn with_embedded(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        self.embedded
            .insert(resource_name(&name).to_string(), data.into());
        self
    }
}

/// Resource names are relative to the roots, `/app.properties` included
fn resource_name(path: &str) -> &str {
    path.trim_start_matches('/')
}

impl SourceReader for ResourceReader {
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let name = resource_name(path);

        if let Some(data) = self.embedded.get(name) {
            log::trace!("Resource '{}' found among embedded resources", name);
            return Ok(Some(data.clone()));
        }

        for root in &self.roots {
            let candidate = root.join(name);
            match std::fs::read(&candidate) {
                Ok(data) => {
                    log::trace!("Resource '{}' found at {}", name, candidate.display());
                    return Ok(Some(data));
                }
                Err(e) if is_missing(&e) => continue,
                Err(e) => {
                    return Err(Error::read_failed(
                        candidate.display().to_string(),
                        e.to_string(),
                    ))
                }
            }
        }

        log::trace!("Resource '{}' not found", name);
        Ok(None)
    }

    fn scheme(&self) -> Scheme {
        Scheme::Resource
    }
}

/// Reader for filesystem paths (`file:`)
#[derive(Debug, Clone, Copy, Default)]
pub struct FileReader;

impl SourceReader for FileReader {
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        match std::fs::read(Path::new(path)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::file_not_found(path)),
            Err(e) => Err(Error::read_failed(path, e.to_string())),
        }
    }

    fn scheme(&self) -> Scheme {
        Scheme::File
    }
}

// A root may hold a file where a resource directory is expected
fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory | io::ErrorKind::IsADirectory
    )
}

/// Registry of source readers, one per scheme
#[derive(Clone, Default)]
pub struct SourceRegistry {
    readers: HashMap<Scheme, Arc<dyn SourceReader>>,
}

impl SourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in resource and file readers
    pub fn with_builtins(resource_roots: Vec<PathBuf>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ResourceReader::new(resource_roots)));
        registry.register(Arc::new(FileReader));
        registry
    }

    /// Register a reader, replacing any reader for the same scheme
    pub fn register(&mut self, reader: Arc<dyn SourceReader>) {
        self.readers.insert(reader.scheme(), reader);
    }

    /// Register a function as the reader for `scheme`
    pub fn register_fn<F>(&mut self, scheme: Scheme, func: F)
    where
        F: Fn(&str) -> Result<Option<Vec<u8>>> + Send + Sync + 'static,
    {
        self.register(Arc::new(FnSourceReader::new(scheme, func)));
    }

    /// Get the reader for a scheme
    pub fn get(&self, scheme: Scheme) -> Option<&Arc<dyn SourceReader>> {
        self.readers.get(&scheme)
    }

    /// Read a location with the reader registered for its scheme
    pub fn read(&self, location: &Location) -> Result<Option<Vec<u8>>> {
        let reader = self
            .readers
            .get(&location.scheme)
            .ok_or_else(|| Error::no_reader(location.scheme))?;

        reader
            .read(&location.path)
            .map_err(|e| e.with_location(location.to_string()))
    }
}
