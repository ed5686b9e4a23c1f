use std::fmt;

use serde::{Deserialize, Serialize};

/// Author string used when a source lists no usable authors.
pub const NO_AUTHOR: &str = "No author";
/// Venue string used when a source lists no container title.
pub const NO_JOURNAL: &str = "No journal";

/// Kind of venue a paper was published in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueType {
    Journal,
    Conference,
    #[default]
    Unknown,
}

impl VenueType {
    /// Classify a source type string such as `journal-article` or
    /// `proceedings-article`.
    pub fn from_source_type(raw: &str) -> Self {
        let raw = raw.to_lowercase();
        if raw.contains("journal") {
            Self::Journal
        } else if raw.contains("proceedings") || raw.contains("conference") {
            Self::Conference
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for VenueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Journal => write!(f, "journal"),
            Self::Conference => write!(f, "conference"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Canonical bibliographic record produced by every metadata backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteratureRecord {
    pub title: String,
    /// "Family Given" names joined with " and ".
    pub authors: String,
    pub venue: String,
    pub venue_short: String,
    pub venue_type: VenueType,
    /// May be partial ("2022", "2022-3") or a single space when unknown.
    pub year: String,
    pub url: String,
    pub pdf_link: Option<String>,
    pub cited_count: Option<u64>,
    /// Lowercase, trailing `).,;` stripped.
    pub doi: Option<String>,
}

impl LiteratureRecord {
    pub fn first_author(&self) -> &str {
        self.authors
            .split(" and ")
            .next()
            .unwrap_or(self.authors.as_str())
    }

    /// Short venue when known, otherwise the full venue name.
    pub fn display_venue(&self) -> &str {
        if !self.venue_short.trim().is_empty() {
            &self.venue_short
        } else if !self.venue.trim().is_empty() {
            &self.venue
        } else {
            "Unknown venue"
        }
    }
}

/// Join "Family Given" author names, falling back to [`NO_AUTHOR`].
pub fn join_authors<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = names
        .into_iter()
        .map(|n| n.as_ref().trim().to_string())
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(" and ");
    if joined.is_empty() {
        NO_AUTHOR.to_string()
    } else {
        joined
    }
}

/// Derive a venue abbreviation from a trailing parenthesized segment,
/// e.g. "International Conference on Robotics and Automation (ICRA)" → "ICRA".
pub fn derive_venue_short(venue: &str) -> String {
    if let (Some(open), Some(_)) = (venue.rfind('('), venue.rfind(')')) {
        let tail = &venue[open + 1..];
        let abbrev = tail.split(')').next().unwrap_or_default().trim();
        let compact = abbrev.chars().filter(|c| c.is_ascii_alphanumeric()).count();
        if (2..=15).contains(&compact) {
            return abbrev.to_string();
        }
    }
    venue.to_string()
}
