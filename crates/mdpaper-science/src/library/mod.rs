//! Note-level pipelines: rewriting literature markers and reconciling a
//! directory of PDFs with the note that lists them.

pub mod markers;
pub mod renamer;

pub use markers::{MarkerPipeline, NoteReport};
pub use renamer::{PdfRenamer, RenameEntry, RenameSummary};
