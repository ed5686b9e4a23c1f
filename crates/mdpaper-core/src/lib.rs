//! md-paper core: citation records, note markers, DOI reconciliation, paths, config.

pub mod config;
pub mod error;
pub mod models;
pub mod notes;
pub mod paths;

pub use config::AppConfig;
pub use error::{CoreError, Result};
pub use models::{CitationLine, LiteratureRecord, VenueType};
pub use notes::{Marker, MarkerKind, MarkerOutcome, NoteUpdate};
