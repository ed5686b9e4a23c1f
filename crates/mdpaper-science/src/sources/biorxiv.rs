use async_trait::async_trait;
use mdpaper_core::models::record::join_authors;
use mdpaper_core::{LiteratureRecord, VenueType};
use serde::Deserialize;
use tracing::warn;

use crate::error::{Result, ScienceError};
use crate::http::{ClientConfig, RateLimitedClient};
use crate::identifiers::{Doi, PaperId};
use crate::resolver::{Lookup, MetadataStrategy, SourceKind};

/// Preprint servers, queried in this order.
pub const SERVERS: &[&str] = &["biorxiv", "medrxiv"];

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    collection: Vec<PreprintItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreprintItem {
    pub doi: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub authors: String,
    pub date: Option<String>,
    pub server: Option<String>,
    pub published: Option<String>,
}

impl PreprintItem {
    /// DOI of the journal version, when the server reports one.
    pub fn published_doi(&self) -> Option<Doi> {
        self.published
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty() && *p != "NA")
            .and_then(|p| Doi::parse(p).ok())
    }
}

/// bioRxiv / medRxiv `details` API.
pub struct BioRxivSource {
    client: RateLimitedClient,
    base_url: String,
}

impl BioRxivSource {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_base_url("https://api.biorxiv.org", config)
    }

    pub fn with_base_url(base_url: &str, config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client: RateLimitedClient::new(config)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Latest version of the preprint on `server`, if the server knows it.
    pub async fn fetch_details(&self, server: &str, doi: &Doi) -> Result<Option<PreprintItem>> {
        let url = format!("{}/details/{}/{}", self.base_url, server, doi.normalized);
        let resp: DetailsResponse = self.client.get_json(&url).await?;
        Ok(resp.collection.into_iter().last())
    }
}

#[async_trait]
impl MetadataStrategy for BioRxivSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Preprint
    }

    fn accepts(&self, id: &PaperId) -> bool {
        matches!(id, PaperId::Preprint(_))
    }

    async fn lookup(&self, id: &PaperId) -> Result<Lookup> {
        let Some(doi) = id.doi() else {
            return Ok(Lookup::NotFound);
        };

        let mut last_error = None;
        for server in SERVERS {
            match self.fetch_details(server, doi).await {
                Ok(Some(item)) => {
                    if let Some(published) = item.published_doi() {
                        return Ok(Lookup::Delegate(published));
                    }
                    return record_from_item(&item, server, doi).map(Lookup::Found);
                }
                Ok(None) => {}
                Err(err) => {
                    warn!("{server}: lookup of {} failed: {err}", doi.normalized);
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(err) => Err(err),
            None => Ok(Lookup::NotFound),
        }
    }
}

/// Year from a `YYYY-MM-DD` date; a single space when the date has no `-`.
pub fn preprint_year(date: &str) -> String {
    let parts: Vec<&str> = date.split('-').collect();
    if parts.len() > 1 {
        parts[0].to_string()
    } else {
        " ".to_string()
    }
}

pub fn record_from_item(item: &PreprintItem, server: &str, requested: &Doi) -> Result<LiteratureRecord> {
    let title = item
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ScienceError::MissingField {
            source_name: "bioRxiv",
            field: "title",
        })?
        .to_string();

    let server_name = item
        .server
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(server)
        .to_string();
    let doi = item
        .doi
        .as_deref()
        .and_then(|d| Doi::parse(d).ok())
        .map(|d| d.normalized)
        .unwrap_or_else(|| requested.normalized.clone());
    let url = format!("https://www.{}.org/content/{}", server_name.to_lowercase(), doi);

    Ok(LiteratureRecord {
        title,
        authors: join_authors(item.authors.split(';')),
        venue: server_name.clone(),
        venue_short: server_name,
        venue_type: VenueType::Unknown,
        year: preprint_year(item.date.as_deref().unwrap_or_default()),
        pdf_link: Some(format!("{url}.full.pdf")),
        url,
        cited_count: None,
        doi: Some(doi),
    })
}
