use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

/// A bullet holding a brace-wrapped identifier: `- {10.1038/nature14539}`.
pub static MARKER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"- \{.{3,}\}").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// `- {{id}}`: the PDF is already on disk, only refresh the metadata.
    MetadataOnly,
    NeedsPdf,
}

/// A literature marker found in a note. Identity is the matched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub text: String,
    pub span: Range<usize>,
}

impl Marker {
    pub fn kind(&self) -> MarkerKind {
        if self.text.ends_with("}}") {
            MarkerKind::MetadataOnly
        } else {
            MarkerKind::NeedsPdf
        }
    }

    /// The identifier between the opening brace(s) and the next `}`.
    pub fn identifier(&self) -> &str {
        let body = match self.text.find('{') {
            Some(open) => &self.text[open..],
            None => self.text.as_str(),
        };
        let body = body.trim_start_matches('{');
        body.split('}').next().unwrap_or_default().trim()
    }
}

/// All markers in order of appearance, duplicates included.
pub fn find_markers(text: &str) -> Vec<Marker> {
    MARKER_REGEX
        .find_iter(text)
        .map(|m| Marker {
            text: m.as_str().to_string(),
            span: m.range(),
        })
        .collect()
}
