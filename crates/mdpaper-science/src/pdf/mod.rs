//! PDF text extraction and retrieval.

pub mod fetch;
pub mod text;

pub use fetch::{HttpPdfFetcher, PdfFetcher};
pub use text::{LopdfExtractor, PdfTextExtractor};
