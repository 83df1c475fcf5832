//! Location strings
//!
//! A location list looks like `classpath:app.properties,file:/etc/app.properties`.
//! Each entry names a scheme and a path; the scheme picks the source reader.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Where a location's bytes come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Packaged resource (`classpath:`)
    Resource,
    /// Filesystem path (`file:`)
    File,
}

impl Scheme {
    /// All recognized schemes, in prefix-matching order
    pub const ALL: [Scheme; 2] = [Scheme::Resource, Scheme::File];

    /// The prefix that selects this scheme in a location string
    pub fn prefix(&self) -> &'static str {
        match self {
            Scheme::Resource => "classpath:",
            Scheme::File => "file:",
        }
    }
}

/// A scheme-tagged path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub scheme: Scheme,
    pub path: String,
}

impl Location {
    pub fn new(scheme: Scheme, path: impl Into<String>) -> Self {
        Self {
            scheme,
            path: path.into(),
        }
    }

    /// Shorthand for a `classpath:` location
    pub fn resource(path: impl Into<String>) -> Self {
        Self::new(Scheme::Resource, path)
    }

    /// Shorthand for a `file:` location
    pub fn file(path: impl Into<String>) -> Self {
        Self::new(Scheme::File, path)
    }

    /// A blank path never touches storage and loads as an empty set
    pub fn is_blank(&self) -> bool {
        self.path.trim().is_empty()
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(segment: &str) -> Result<Self> {
        Scheme::ALL
            .iter()
            .find(|scheme| segment.starts_with(scheme.prefix()))
            .map(|scheme| Location::new(*scheme, strip_scheme(scheme.prefix(), segment)))
            .ok_or_else(|| Error::unknown_scheme(segment))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.scheme.prefix(), self.path)
    }
}

/// Remove exactly `prefix` from the front of `location`
///
/// Locations that don't carry the prefix are returned unchanged.
pub fn strip_scheme<'a>(prefix: &str, location: &'a str) -> &'a str {
    location.strip_prefix(prefix).unwrap_or(location)
}

/// Split a comma-separated location list
///
/// Blank input and blank entries (e.g. from a trailing comma) are skipped.
/// Every other entry yields either a parsed [`Location`] or the error for
/// that entry alone, so one bad entry never hides its siblings.
pub fn parse_locations(input: &str) -> Vec<Result<Location>> {
    if input.trim().is_empty() {
        return Vec::new();
    }

    input
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::parse)
        .collect()
}
