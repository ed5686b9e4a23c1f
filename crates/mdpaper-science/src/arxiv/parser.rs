use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::arxiv::types::ArxivEntry;
use crate::error::{Result, ScienceError};
use crate::identifiers::{ArxivId, Doi};

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: String,
    title: String,
    published: String,
    #[serde(rename = "author", default)]
    authors: Vec<AtomAuthor>,
    #[serde(rename = "arxiv:journal_ref", alias = "journal_ref")]
    journal_ref: Option<String>,
    #[serde(rename = "arxiv:doi", alias = "doi")]
    doi: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@type")]
    link_type: Option<String>,
}

pub fn parse_atom_response(xml: &str) -> Result<Vec<ArxivEntry>> {
    let feed: AtomFeed =
        from_str(xml).map_err(|e| ScienceError::Parse(format!("invalid atom xml: {e}")))?;

    feed.entries.into_iter().map(parse_entry).collect()
}

fn parse_entry(entry: AtomEntry) -> Result<ArxivEntry> {
    let arxiv_id = ArxivId::parse(entry.id.trim())
        .map_err(|_| ScienceError::Parse(format!("invalid arXiv id in entry: {}", entry.id)))?;

    let title = clean_text(&entry.title);
    if title.is_empty() {
        return Err(ScienceError::MissingField {
            source_name: "arXiv",
            field: "title",
        });
    }

    let published = DateTime::parse_from_rfc3339(entry.published.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ScienceError::Parse(format!("invalid published datetime: {e}")))?;

    let authors = entry
        .authors
        .into_iter()
        .map(|author| clean_text(&author.name))
        .filter(|name| !name.is_empty())
        .collect();

    let pdf_url = entry
        .links
        .iter()
        .find(|link| link.link_type.as_deref() == Some("application/pdf"))
        .and_then(|link| link.href.as_deref())
        .map(normalize_arxiv_url)
        .unwrap_or_else(|| arxiv_id.pdf_url.clone());

    Ok(ArxivEntry {
        doi: entry.doi.and_then(|value| Doi::parse(value.trim()).ok()),
        title,
        authors,
        published,
        journal_ref: entry.journal_ref.map(|j| clean_text(&j)).filter(|j| !j.is_empty()),
        pdf_url,
        abs_url: arxiv_id.abs_url.clone(),
        arxiv_id,
    })
}

fn clean_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_arxiv_url(url: &str) -> String {
    match url.strip_prefix("http://arxiv.org/") {
        Some(rest) => format!("https://arxiv.org/{rest}"),
        None => url.to_string(),
    }
}
