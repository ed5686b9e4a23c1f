use async_trait::async_trait;

use crate::arxiv::parser::parse_atom_response;
use crate::arxiv::types::ArxivEntry;
use crate::error::{Result, ScienceError};
use crate::http::{ClientConfig, RateLimitedClient};
use crate::identifiers::{ArxivId, PaperId};
use crate::resolver::{Lookup, MetadataStrategy, SourceKind};

pub struct ArxivClient {
    client: RateLimitedClient,
    base_url: String,
}

impl ArxivClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_base_url("http://export.arxiv.org/api/query", config)
    }

    pub fn with_base_url(base_url: &str, config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client: RateLimitedClient::new(config)?,
            base_url: base_url.to_string(),
        })
    }

    pub async fn fetch_entry(&self, id: &ArxivId) -> Result<Option<ArxivEntry>> {
        let url = if self.base_url.contains('?') {
            format!("{}&id_list={}", self.base_url, id.id)
        } else {
            format!("{}?id_list={}", self.base_url, id.id)
        };

        let xml = self.client.get(&url).await?;
        Ok(parse_atom_response(&xml)?.into_iter().next())
    }
}

#[async_trait]
impl MetadataStrategy for ArxivClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Arxiv
    }

    fn accepts(&self, id: &PaperId) -> bool {
        matches!(id, PaperId::Arxiv(_))
    }

    async fn lookup(&self, id: &PaperId) -> Result<Lookup> {
        let PaperId::Arxiv(arxiv_id) = id else {
            return Ok(Lookup::NotFound);
        };
        match self.fetch_entry(arxiv_id).await? {
            Some(entry) if entry.arxiv_id.id == arxiv_id.id => Ok(Lookup::Found(entry.into_record())),
            Some(entry) => Err(ScienceError::Parse(format!(
                "asked arXiv for {} but got {}",
                arxiv_id.id, entry.arxiv_id.id
            ))),
            None => Ok(Lookup::NotFound),
        }
    }
}
