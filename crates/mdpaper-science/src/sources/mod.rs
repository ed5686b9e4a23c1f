//! Metadata backends. Each one is a [`crate::resolver::MetadataStrategy`].

pub mod biorxiv;
pub mod crossref;

pub use biorxiv::BioRxivSource;
pub use crossref::CrossRefSource;
