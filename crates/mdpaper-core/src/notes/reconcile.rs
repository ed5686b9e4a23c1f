//! DOI-keyed reconciliation of citation lines into an existing note.
//!
//! Each note line is scanned for a DOI. Incoming entries whose DOI is already
//! present replace that line in place; everything else is appended after a
//! single blank separator line.

use std::collections::HashMap;

use crate::notes::doi::{find_doi, normalize_doi};

/// Normalized DOI → index of the (last) line mentioning it.
#[derive(Debug, Clone, Default)]
pub struct DoiIndex {
    positions: HashMap<String, usize>,
}

impl DoiIndex {
    pub fn build<S: AsRef<str>>(lines: &[S]) -> Self {
        let positions = lines
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| find_doi(line.as_ref()).map(|doi| (doi, idx)))
            .collect();
        Self { positions }
    }

    pub fn get(&self, doi: &str) -> Option<usize> {
        normalize_doi(doi).and_then(|d| self.positions.get(&d).copied())
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// A formatted citation line and the DOI it should be matched on.
#[derive(Debug, Clone)]
pub struct NoteEntry {
    pub doi: Option<String>,
    pub line: String,
}

/// Result of reconciling entries into a note's lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteUpdate {
    pub lines: Vec<String>,
    pub replaced: usize,
    pub appended: usize,
}

impl NoteUpdate {
    pub fn is_noop(&self) -> bool {
        self.replaced == 0 && self.appended == 0
    }

    /// Full document text with a trailing newline.
    pub fn to_text(&self) -> String {
        self.to_text_with("\n")
    }

    /// Like [`Self::to_text`], joining lines with `newline`.
    pub fn to_text_with(&self, newline: &str) -> String {
        let mut text = self.lines.join(newline);
        text.push_str(newline);
        text
    }
}

/// `"\r\n"` when the document's first line break is CRLF, else `"\n"`.
pub fn line_ending(text: &str) -> &'static str {
    match text.find('\n') {
        Some(idx) if text[..idx].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

/// Replace lines whose DOI is known, append the rest.
///
/// Replacing a line with identical text is not counted as a change, so a
/// rerun over an up-to-date note reports a no-op.
pub fn reconcile_lines(existing: &[String], entries: &[NoteEntry]) -> NoteUpdate {
    let index = DoiIndex::build(existing);
    let mut lines = existing.to_vec();
    let mut appended_lines = Vec::new();
    let mut replaced = 0;

    for entry in entries {
        match entry.doi.as_deref().and_then(|doi| index.get(doi)) {
            Some(idx) => {
                if lines[idx] != entry.line {
                    lines[idx] = entry.line.clone();
                    replaced += 1;
                }
            }
            None => appended_lines.push(entry.line.clone()),
        }
    }

    let appended = appended_lines.len();
    if appended > 0 {
        if lines.last().is_some_and(|last| !last.trim().is_empty()) {
            lines.push(String::new());
        }
        lines.extend(appended_lines);
    }

    NoteUpdate {
        lines,
        replaced,
        appended,
    }
}
