//! propcascade-core: cascading properties loader
//!
//! Loads `key=value` property files from comma-separated location lists,
//! follows `propertyLocations` includes, resolves `${name}` placeholders
//! and publishes the result into a shared store without overwriting values
//! that are already there.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use propcascade_core::{Loader, LoaderOptions, ResourceReader, SourceRegistry};
//!
//! let resources = ResourceReader::default()
//!     .with_embedded("app.properties", "propertyLocations=classpath:base.properties\nname=${user} app")
//!     .with_embedded("base.properties", "user=max\nname=base");
//!
//! let mut sources = SourceRegistry::with_builtins(Vec::new());
//! sources.register(Arc::new(resources));
//! let loader = Loader::with_sources(sources, LoaderOptions::default());
//!
//! let mut props = loader.load_locations("classpath:app.properties");
//! propcascade_core::resolve_placeholders(&mut props);
//! assert_eq!(props.get("name"), Some("max app"));
//! ```

pub mod error;
pub mod format;
pub mod loader;
pub mod location;
pub mod placeholder;
pub mod properties;
pub mod source;
pub mod store;

pub use error::{Error, ErrorKind, Result};
pub use loader::{Loader, LoaderOptions};
pub use location::{parse_locations, Location, Scheme};
pub use placeholder::resolve_placeholders;
pub use properties::{PropertySet, PROPERTY_LOCATIONS};
pub use source::{FileReader, ResourceReader, SourceReader, SourceRegistry};
pub use store::{publish, PropertyStore};
