pub mod citation;
pub mod record;

pub use citation::CitationLine;
pub use record::{LiteratureRecord, VenueType};
