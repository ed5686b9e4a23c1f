use async_trait::async_trait;
use mdpaper_core::models::record::{derive_venue_short, join_authors, NO_JOURNAL};
use mdpaper_core::notes::normalize_doi;
use mdpaper_core::{LiteratureRecord, VenueType};
use serde_json::Value;

use crate::error::{Result, ScienceError};
use crate::http::{ClientConfig, RateLimitedClient};
use crate::identifiers::{Doi, PaperId};
use crate::resolver::{Lookup, MetadataStrategy, SourceKind};

const SOURCE: &str = "CrossRef";

/// The DOI registry backend (`api.crossref.org/works/{doi}`).
pub struct CrossRefSource {
    client: RateLimitedClient,
    base_url: String,
}

impl CrossRefSource {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_base_url("https://api.crossref.org", config)
    }

    pub fn with_base_url(base_url: &str, config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client: RateLimitedClient::new(config)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_by_doi(&self, doi: &Doi) -> Result<LiteratureRecord> {
        let url = format!("{}/works/{}", self.base_url, doi.normalized);
        let val: Value = self.client.get_json(&url).await?;
        record_from_work(&val["message"], doi)
    }
}

#[async_trait]
impl MetadataStrategy for CrossRefSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Registry
    }

    fn accepts(&self, id: &PaperId) -> bool {
        id.doi().is_some()
    }

    async fn lookup(&self, id: &PaperId) -> Result<Lookup> {
        match id.doi() {
            Some(doi) => self.fetch_by_doi(doi).await.map(Lookup::Found),
            None => Ok(Lookup::NotFound),
        }
    }
}

fn missing(field: &'static str) -> ScienceError {
    ScienceError::MissingField {
        source_name: SOURCE,
        field,
    }
}

/// Normalize a CrossRef `message` object. Every field the citation line needs
/// is required; a partial work fails the whole lookup.
pub fn record_from_work(v: &Value, requested: &Doi) -> Result<LiteratureRecord> {
    if v.is_null() {
        return Err(ScienceError::Parse("CrossRef response has no message".to_string()));
    }

    let title = v["title"][0]
        .as_str()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| missing("title"))?
        .to_string();

    let year = v["published"]["date-parts"][0]
        .as_array()
        .filter(|parts| !parts.is_empty())
        .map(|parts| {
            parts
                .iter()
                .map(|p| match p {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("-")
        })
        .ok_or_else(|| missing("published.date-parts"))?;

    let url = v["URL"].as_str().ok_or_else(|| missing("URL"))?.to_string();
    let pdf_link = v["link"][0]["URL"]
        .as_str()
        .ok_or_else(|| missing("link"))?
        .to_string();
    let cited_count = v["is-referenced-by-count"]
        .as_u64()
        .ok_or_else(|| missing("is-referenced-by-count"))?;

    let venue = first_str(&v["short-container-title"])
        .or_else(|| first_str(&v["container-title"]))
        .unwrap_or(NO_JOURNAL)
        .to_string();
    let venue_type = v["type"]
        .as_str()
        .map(VenueType::from_source_type)
        .unwrap_or_default();

    let doi = v["DOI"]
        .as_str()
        .and_then(normalize_doi)
        .unwrap_or_else(|| requested.normalized.clone());

    Ok(LiteratureRecord {
        title,
        authors: parse_authors(v),
        venue_short: derive_venue_short(&venue),
        venue,
        venue_type,
        year,
        url,
        pdf_link: Some(pdf_link),
        cited_count: Some(cited_count),
        doi: Some(doi),
    })
}

fn first_str(v: &Value) -> Option<&str> {
    v.as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// "Family Given" for authors listing both parts.
fn parse_authors(v: &Value) -> String {
    let names = v["author"]
        .as_array()
        .map(|authors| {
            authors
                .iter()
                .filter_map(|a| match (a["family"].as_str(), a["given"].as_str()) {
                    (Some(family), Some(given)) => Some(format!("{family} {given}")),
                    _ => None,
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    join_authors(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpaper_core::models::record::NO_AUTHOR;
    use mockito::Server;
    use serde_json::json;

    fn work() -> Value {
        json!({
            "DOI": "10.1038/S41467-022-29269-6",
            "type": "journal-article",
            "title": ["Photonic neuromorphic computing"],
            "author": [
                {"given": "Jane", "family": "Doe"},
                {"name": "Consortium"},
                {"given": "Rick", "family": "Roe"}
            ],
            "published": {"date-parts": [[2022, 4, 5]]},
            "container-title": ["Nature Communications"],
            "short-container-title": ["Nat Commun"],
            "URL": "http://dx.doi.org/10.1038/s41467-022-29269-6",
            "link": [{"URL": "https://www.nature.com/articles/s41467-022-29269-6.pdf"}],
            "is-referenced-by-count": 42
        })
    }

    fn requested() -> Doi {
        Doi::parse("10.1038/s41467-022-29269-6").unwrap()
    }

    #[test]
    fn normalizes_full_work() {
        let rec = record_from_work(&work(), &requested()).unwrap();
        assert_eq!(rec.title, "Photonic neuromorphic computing");
        assert_eq!(rec.authors, "Doe Jane and Roe Rick");
        assert_eq!(rec.venue, "Nat Commun");
        assert_eq!(rec.venue_short, "Nat Commun");
        assert_eq!(rec.venue_type, VenueType::Journal);
        assert_eq!(rec.year, "2022-4-5");
        assert_eq!(rec.cited_count, Some(42));
        assert_eq!(rec.doi.as_deref(), Some("10.1038/s41467-022-29269-6"));
        assert_eq!(
            rec.pdf_link.as_deref(),
            Some("https://www.nature.com/articles/s41467-022-29269-6.pdf")
        );
    }

    #[test]
    fn conference_abbreviation_and_defaults() {
        let mut v = work();
        v["type"] = json!("proceedings-article");
        v["short-container-title"] = json!([]);
        v["container-title"] = json!(["2023 IEEE International Conference on Robotics and Automation (ICRA)"]);
        v["author"] = json!([{"name": "Anonymous"}]);
        v["published"] = json!({"date-parts": [[2023]]});

        let rec = record_from_work(&v, &requested()).unwrap();
        assert_eq!(rec.venue_type, VenueType::Conference);
        assert_eq!(rec.venue_short, "ICRA");
        assert_eq!(rec.authors, NO_AUTHOR);
        assert_eq!(rec.year, "2023");
    }

    #[test]
    fn no_container_title_is_no_journal() {
        let mut v = work();
        v.as_object_mut().unwrap().remove("short-container-title");
        v.as_object_mut().unwrap().remove("container-title");
        v.as_object_mut().unwrap().remove("type");
        let rec = record_from_work(&v, &requested()).unwrap();
        assert_eq!(rec.venue, "No journal");
        assert_eq!(rec.venue_short, "No journal");
        assert_eq!(rec.venue_type, VenueType::Unknown);
    }

    #[test]
    fn missing_required_fields_fail() {
        for field in ["title", "URL", "link", "is-referenced-by-count", "published"] {
            let mut v = work();
            v.as_object_mut().unwrap().remove(field);
            let err = record_from_work(&v, &requested()).unwrap_err();
            assert!(
                matches!(err, ScienceError::MissingField { .. }),
                "{field}: {err}"
            );
        }
    }

    #[tokio::test]
    async fn test_crossref_fetch_by_doi() {
        let mut server = Server::new_async().await;
        let body = json!({"status": "ok", "message": work()}).to_string();
        let _m = server
            .mock("GET", "/works/10.1038/s41467-022-29269-6")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let source = CrossRefSource::with_base_url(&server.url(), &ClientConfig::unthrottled()).unwrap();
        let id = PaperId::classify("10.1038/s41467-022-29269-6").unwrap();
        let Lookup::Found(rec) = source.lookup(&id).await.unwrap() else {
            panic!("expected a record");
        };
        assert_eq!(rec.year, "2022-4-5");
        assert_eq!(rec.venue_short, "Nat Commun");
    }

    #[tokio::test]
    async fn test_crossref_not_found_is_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/works/10.1000/missing")
            .with_status(404)
            .with_body("Resource not found.")
            .create_async()
            .await;

        let source = CrossRefSource::with_base_url(&server.url(), &ClientConfig::unthrottled()).unwrap();
        let doi = Doi::parse("10.1000/missing").unwrap();
        assert!(matches!(
            source.fetch_by_doi(&doi).await,
            Err(ScienceError::ApiError(_, _))
        ));
    }
}
