//! Error types for propcascade
//!
//! Errors carry the location they came from, an optional position inside
//! the source text and an actionable help message.

use std::fmt;

use crate::location::Scheme;

/// Result type alias for propcascade operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for propcascade operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Location string the error relates to (e.g., "classpath:app.properties")
    pub location: Option<String>,
    /// Position in the source text, if available
    pub source_location: Option<SourceLocation>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Position in a properties source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: Option<usize>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed properties text
    Parse,
    /// Reading a location failed
    Source(SourceErrorKind),
    /// A location includes itself, directly or transitively
    CircularInclude,
    /// Nested `propertyLocations` went deeper than the configured limit
    IncludeDepthExceeded { max_depth: usize },
}

/// Specific source read error categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Location has neither `classpath:` nor `file:` prefix
    UnknownScheme { location: String },
    /// Filesystem path does not exist
    FileNotFound { path: String },
    /// The reader failed for another reason
    ReadFailed { path: String, message: String },
    /// No reader registered for the scheme
    NoReader { scheme: Scheme },
}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            location: None,
            source_location: None,
            help: None,
            cause: None,
        }
    }

    /// Create a new parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::new(ErrorKind::Parse)
        }
    }

    /// Create an unknown scheme error
    pub fn unknown_scheme(location: impl Into<String>) -> Self {
        let location = location.into();
        Self {
            location: Some(location.clone()),
            help: Some(format!(
                "Use one scheme from {{\"{}\", \"{}\"}}",
                Scheme::Resource.prefix(),
                Scheme::File.prefix()
            )),
            ..Self::new(ErrorKind::Source(SourceErrorKind::UnknownScheme { location }))
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            help: Some(format!(
                "Check that '{}' exists, or use a classpath: location for optional files",
                path
            )),
            ..Self::new(ErrorKind::Source(SourceErrorKind::FileNotFound { path }))
        }
    }

    /// Create a read failure error
    pub fn read_failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Source(SourceErrorKind::ReadFailed {
            path: path.into(),
            message: message.into(),
        }))
    }

    /// Create a missing reader error
    pub fn no_reader(scheme: Scheme) -> Self {
        Self {
            help: Some(format!(
                "Register a source reader for '{}' locations",
                scheme.prefix()
            )),
            ..Self::new(ErrorKind::Source(SourceErrorKind::NoReader { scheme }))
        }
    }

    /// Create a circular include error
    pub fn circular_include(location: impl Into<String>, chain: Vec<String>) -> Self {
        Self {
            location: Some(location.into()),
            help: Some("Remove one of the propertyLocations entries to break the cycle".into()),
            cause: Some(format!("Chain: {}", chain.join(" → "))),
            ..Self::new(ErrorKind::CircularInclude)
        }
    }

    /// Create an include depth error
    pub fn include_depth_exceeded(location: impl Into<String>, max_depth: usize) -> Self {
        Self {
            location: Some(location.into()),
            help: Some("Flatten the propertyLocations chain or raise max_depth".into()),
            ..Self::new(ErrorKind::IncludeDepthExceeded { max_depth })
        }
    }

    /// Add location context to the error
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Add source position to the error
    pub fn with_source_location(mut self, loc: SourceLocation) -> Self {
        self.source_location = Some(loc);
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Whether this error means the data simply isn't there
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Source(SourceErrorKind::FileNotFound { .. })
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Parse => write!(f, "Parse error")?,
            ErrorKind::Source(s) => match s {
                SourceErrorKind::UnknownScheme { location } => {
                    write!(f, "Unknown location scheme: {}", location)?
                }
                SourceErrorKind::FileNotFound { path } => write!(f, "File not found: {}", path)?,
                SourceErrorKind::ReadFailed { path, message } => {
                    write!(f, "Failed to read '{}': {}", path, message)?
                }
                SourceErrorKind::NoReader { scheme } => {
                    write!(f, "No source reader for scheme '{}'", scheme.prefix())?
                }
            },
            ErrorKind::CircularInclude => write!(f, "Circular propertyLocations include")?,
            ErrorKind::IncludeDepthExceeded { max_depth } => write!(
                f,
                "propertyLocations nested deeper than {} levels",
                max_depth
            )?,
        }

        if let Some(location) = &self.location {
            write!(f, "\n  Location: {}", location)?;
        }

        if let Some(loc) = &self.source_location {
            write!(f, "\n  File: {}", loc.file)?;
            if let Some(line) = loc.line {
                write!(f, ":{}", line)?;
            }
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_scheme_error_display() {
        let err = Error::unknown_scheme("http://example.com/app.properties");
        let display = format!("{}", err);

        assert!(display.contains("Unknown location scheme: http://example.com/app.properties"));
        assert!(display.contains("Location: http://example.com/app.properties"));
        assert!(display.contains("\"classpath:\", \"file:\""));
    }

    #[test]
    fn test_circular_include_error_display() {
        let err = Error::circular_include(
            "file:/etc/a.properties",
            vec![
                "file:/etc/a.properties".into(),
                "file:/etc/b.properties".into(),
                "file:/etc/a.properties".into(),
            ],
        );
        let display = format!("{}", err);

        assert!(display.contains("Circular propertyLocations include"));
        assert!(display.contains(
            "file:/etc/a.properties → file:/etc/b.properties → file:/etc/a.properties"
        ));
    }

    #[test]
    fn test_file_not_found_error() {
        let err = Error::file_not_found("/missing.properties");

        assert!(err.is_not_found());
        assert_eq!(
            err.kind,
            ErrorKind::Source(SourceErrorKind::FileNotFound {
                path: "/missing.properties".into()
            })
        );
        assert!(err.to_string().contains("Help:"));
    }

    #[test]
    fn test_parse_error_with_source_location() {
        let err = Error::parse("Malformed \\uxxxx encoding").with_source_location(SourceLocation {
            file: "app.properties".into(),
            line: Some(7),
        });
        let display = format!("{}", err);

        assert!(display.starts_with("Parse error"));
        assert!(display.contains("app.properties:7"));
        assert!(display.contains("Malformed \\uxxxx encoding"));
    }

    #[test]
    fn test_with_location_and_help() {
        let err = Error::read_failed("conf/app.properties", "permission denied")
            .with_location("classpath:conf/app.properties")
            .with_help("Check file permissions");
        let display = format!("{}", err);

        assert!(display.contains("Failed to read 'conf/app.properties': permission denied"));
        assert!(display.contains("Location: classpath:conf/app.properties"));
        assert!(display.contains("Help: Check file permissions"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_depth_exceeded_error() {
        let err = Error::include_depth_exceeded("classpath:deep.properties", 32);

        assert_eq!(err.kind, ErrorKind::IncludeDepthExceeded { max_depth: 32 });
        assert!(err.to_string().contains("deeper than 32 levels"));
    }

    #[test]
    fn test_no_reader_error() {
        let err = Error::no_reader(Scheme::File);

        assert!(err.to_string().contains("No source reader for scheme 'file:'"));
    }
}
