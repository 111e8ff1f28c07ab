use thiserror::Error;

/// Main library error type covering fetch, decode, and graph-traversal failures
#[derive(Error, Debug)]
pub enum XbrlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status error: {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timeout: {url} after {timeout_seconds} seconds")]
    Timeout { url: String, timeout_seconds: u64 },

    #[error("Empty document: {location}")]
    EmptyDocument { location: String },

    #[error("XML parse error: {location} - {details}")]
    XmlParse { location: String, details: String },

    #[error("Cyclic schema import detected: {path}")]
    CyclicImport { path: String },

    #[error("No schemaRef found: {path}")]
    MissingSchemaRef { path: String },

    #[error("Manifest lists no instances: {path}")]
    EmptyManifest { path: String },

    #[error("Linkbase not found in schema: {path}")]
    LinkbaseNotFound { path: String },

    #[error("Arc endpoint label unresolved: {side}={label}")]
    ArcEndpointMissing { side: &'static str, label: String },

    #[error("Locator href unresolved: {href}")]
    UnresolvedLocator { href: String },

    #[error("Unknown entry document root element: {root}")]
    UnknownEntryRoot { root: String },
}

/// Errors raised by the inline-XBRL value transforms.
///
/// These never surface to callers of the extractor; a failed transform keeps
/// the raw literal.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Unrecognized date literal: {literal}")]
    DateLiteral { literal: String },

    #[error("Impossible calendar date: {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("Unparseable numeric literal: {literal}")]
    NumericLiteral { literal: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, XbrlError>;

impl XbrlError {
    /// Wrap a roxmltree error with the location of the offending document.
    pub(crate) fn xml(location: &str, err: roxmltree::Error) -> Self {
        XbrlError::XmlParse {
            location: location.to_string(),
            details: err.to_string(),
        }
    }
}
