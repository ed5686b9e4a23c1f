use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScienceError {
    #[error("invalid DOI: {0}")]
    InvalidDoi(String),

    #[error("invalid arXiv ID: {0}")]
    InvalidArxivId(String),

    #[error("unsupported identifier: {0}")]
    UnsupportedIdentifier(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error from {0}: {1}")]
    ApiError(String, String),

    #[error("rate limit from {0}, retry after {1}s")]
    RateLimit(String, u64),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{source_name} response is missing `{field}`")]
    MissingField {
        source_name: &'static str,
        field: &'static str,
    },

    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] mdpaper_core::CoreError),

    #[error("could not resolve {identifier}: {source}")]
    Resolution {
        identifier: String,
        #[source]
        source: Box<ScienceError>,
    },
}

impl ScienceError {
    pub fn resolution(identifier: &str, source: ScienceError) -> Self {
        match source {
            already @ Self::Resolution { .. } => already,
            other => Self::Resolution {
                identifier: identifier.to_string(),
                source: Box::new(other),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ScienceError>;
