//! Note documents: literature markers, marker rewriting and DOI-keyed line
//! reconciliation.

pub mod doi;
pub mod editor;
pub mod marker;
pub mod reconcile;

pub use doi::{find_doi, normalize_doi};
pub use editor::{apply, plan, render, MarkerOutcome, UNRESOLVED_FLAG};
pub use marker::{find_markers, Marker, MarkerKind};
pub use reconcile::{line_ending, reconcile_lines, DoiIndex, NoteEntry, NoteUpdate};
