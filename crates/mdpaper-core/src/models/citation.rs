use std::fmt;

use crate::models::record::LiteratureRecord;

/// A record rendered as one Markdown bullet, optionally linking a local PDF.
#[derive(Debug, Clone)]
pub struct CitationLine<'a> {
    pub record: &'a LiteratureRecord,
    /// PDF path relative to the note's directory.
    pub pdf_path: Option<String>,
}

impl<'a> CitationLine<'a> {
    pub fn new(record: &'a LiteratureRecord) -> Self {
        Self {
            record,
            pdf_path: None,
        }
    }

    pub fn with_pdf(mut self, relative_path: impl Into<String>) -> Self {
        self.pdf_path = Some(relative_path.into());
        self
    }

    fn citation_suffix(&self) -> String {
        match self.record.cited_count {
            Some(n) => format!(" (citations: {n})"),
            None => String::new(),
        }
    }
}

impl fmt::Display for CitationLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.record;
        write!(
            f,
            "- **{}**. {} et.al. **{}**, **{}** ",
            r.title,
            r.first_author(),
            r.display_venue(),
            r.year
        )?;
        if let Some(pdf) = &self.pdf_path {
            write!(f, "([pdf]({pdf}))")?;
        }
        write!(f, "([link]({})).{}", r.url, self.citation_suffix())
    }
}
