use std::collections::HashMap;

use crate::notes::marker::{find_markers, Marker};

/// Appended to markers that could not be resolved so they stay visible in the note.
pub const UNRESOLVED_FLAG: &str = " **Not Correct, Check it**";

/// What a single marker turns into when the note is rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerOutcome {
    Resolved(String),
    Unresolved(String),
}

impl MarkerOutcome {
    pub fn rendered(&self) -> String {
        match self {
            Self::Resolved(line) => line.clone(),
            Self::Unresolved(original) => format!("{original}{UNRESOLVED_FLAG}"),
        }
    }
}

/// Pair every marker in `text` with its outcome under `substitutions`.
pub fn plan(text: &str, substitutions: &HashMap<String, String>) -> Vec<(Marker, MarkerOutcome)> {
    find_markers(text)
        .into_iter()
        .map(|marker| {
            let outcome = match substitutions.get(&marker.text) {
                Some(line) => MarkerOutcome::Resolved(line.clone()),
                None => MarkerOutcome::Unresolved(marker.text.clone()),
            };
            (marker, outcome)
        })
        .collect()
}

/// Replace each planned marker span; text between markers is copied as is.
pub fn render(text: &str, planned: &[(Marker, MarkerOutcome)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (marker, outcome) in planned {
        out.push_str(&text[cursor..marker.span.start]);
        out.push_str(&outcome.rendered());
        cursor = marker.span.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Rewrite every marker of `text` in one pass.
pub fn apply(text: &str, substitutions: &HashMap<String, String>) -> String {
    render(text, &plan(text, substitutions))
}
