use chrono::{DateTime, Datelike, Utc};
use mdpaper_core::models::record::{derive_venue_short, join_authors};
use mdpaper_core::{LiteratureRecord, VenueType};

use crate::identifiers::{ArxivId, Doi};

pub const ARXIV_VENUE: &str = "arXiv";

#[derive(Debug, Clone)]
pub struct ArxivEntry {
    pub arxiv_id: ArxivId,
    pub doi: Option<Doi>,
    pub title: String,
    /// Names as listed by arXiv ("Given Family").
    pub authors: Vec<String>,
    pub published: DateTime<Utc>,
    pub journal_ref: Option<String>,
    pub pdf_url: String,
    pub abs_url: String,
}

impl ArxivEntry {
    /// The journal reference becomes the venue when arXiv lists one.
    pub fn into_record(self) -> LiteratureRecord {
        let venue = self
            .journal_ref
            .unwrap_or_else(|| ARXIV_VENUE.to_string());
        LiteratureRecord {
            title: self.title,
            authors: join_authors(self.authors.iter().map(|name| family_first(name))),
            venue_short: derive_venue_short(&venue),
            venue,
            venue_type: VenueType::Unknown,
            year: self.published.year().to_string(),
            url: self.abs_url,
            pdf_link: Some(self.pdf_url),
            cited_count: None,
            doi: self.doi.map(|d| d.normalized),
        }
    }
}

/// "Ashish Vaswani" → "Vaswani Ashish", matching the registry's "Family Given".
fn family_first(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.split_last() {
        Some((family, given)) if !given.is_empty() => format!("{} {}", family, given.join(" ")),
        _ => parts.join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_first_reorders_names() {
        assert_eq!(family_first("Ashish Vaswani"), "Vaswani Ashish");
        assert_eq!(family_first("Aidan N. Gomez"), "Gomez Aidan N.");
        assert_eq!(family_first("Plato"), "Plato");
        assert_eq!(family_first(""), "");
    }

    fn entry(journal_ref: Option<&str>) -> ArxivEntry {
        let arxiv_id = ArxivId::parse("2301.04567").unwrap();
        ArxivEntry {
            doi: None,
            title: "A Paper".to_string(),
            authors: vec!["Jane Doe".to_string()],
            published: "2023-01-11T00:00:00Z".parse().unwrap(),
            journal_ref: journal_ref.map(str::to_string),
            pdf_url: arxiv_id.pdf_url.clone(),
            abs_url: arxiv_id.abs_url.clone(),
            arxiv_id,
        }
    }

    #[test]
    fn journal_ref_is_the_venue() {
        let rec = entry(Some("Proc. Robotics Conf. (ICRA) 2023")).into_record();
        assert_eq!(rec.venue, "Proc. Robotics Conf. (ICRA) 2023");
        assert_eq!(rec.venue_short, "ICRA");
        assert_eq!(rec.display_venue(), "ICRA");

        let rec = entry(None).into_record();
        assert_eq!(rec.venue, "arXiv");
        assert_eq!(rec.venue_short, "arXiv");
        assert_eq!(rec.year, "2023");
    }
}
