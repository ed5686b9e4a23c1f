use std::path::Path;

use lopdf::Document;
use tracing::debug;

use crate::error::{Result, ScienceError};

pub trait PdfTextExtractor: Send + Sync {
    /// Text of at most `max_pages` pages, joined with newlines.
    fn extract_text(&self, pdf_path: &Path, max_pages: usize) -> Result<String>;
}

/// Pure-Rust extraction through `lopdf`. A page that fails to decode
/// contributes empty text instead of failing the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

impl PdfTextExtractor for LopdfExtractor {
    fn extract_text(&self, pdf_path: &Path, max_pages: usize) -> Result<String> {
        if max_pages == 0 {
            return Ok(String::new());
        }

        let document = Document::load(pdf_path).map_err(|err| {
            ScienceError::PdfExtraction(format!(
                "lopdf failed to open {}: {err}",
                pdf_path.display()
            ))
        })?;

        let chunks = document
            .get_pages()
            .keys()
            .copied()
            .take(max_pages)
            .map(|page| {
                document.extract_text(&[page]).unwrap_or_else(|err| {
                    debug!("page {page} of {}: {err}", pdf_path.display());
                    String::new()
                })
            })
            .collect::<Vec<_>>();

        Ok(chunks.join("\n"))
    }
}
