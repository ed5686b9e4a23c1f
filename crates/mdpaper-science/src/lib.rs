//! md-paper science: identifier resolution against CrossRef, bioRxiv/medRxiv
//! and arXiv, PDF retrieval and the note pipelines built on them.

pub mod error;
pub mod http;
pub mod identifiers;
pub mod arxiv;
pub mod sources;
pub mod resolver;
pub mod pdf;
pub mod library;

pub use error::{Result, ScienceError};
pub use http::ClientConfig;
pub use library::{MarkerPipeline, PdfRenamer, RenameSummary};
pub use resolver::{ResolveMetadata, Resolver, SourceHint};
