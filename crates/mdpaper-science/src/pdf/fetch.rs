use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{Result, ScienceError};
use crate::http::{ClientConfig, RateLimitedClient};
use crate::identifiers::PaperId;
use crate::sources::biorxiv::SERVERS;

const PDF_MAGIC: &[u8] = b"%PDF";

#[async_trait]
pub trait PdfFetcher: Send + Sync {
    /// Save the PDF behind `url` to `dest`.
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;

    /// Retrieve the PDF through locations derived from the identifier alone.
    async fn fetch_by_identifier(&self, identifier: &str, dest: &Path) -> Result<()>;
}

pub struct HttpPdfFetcher {
    client: RateLimitedClient,
}

impl HttpPdfFetcher {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client: RateLimitedClient::new(config)?,
        })
    }
}

/// Candidate PDF locations for an identifier, best first.
pub fn fallback_urls(identifier: &str) -> Result<Vec<String>> {
    Ok(match PaperId::classify(identifier)? {
        PaperId::Arxiv(id) => vec![id.pdf_url],
        PaperId::Preprint(doi) => SERVERS
            .iter()
            .map(|server| format!("https://www.{server}.org/content/{}.full.pdf", doi.normalized))
            .collect(),
        PaperId::Doi(doi) => vec![doi.url],
    })
}

async fn write_pdf(bytes: &[u8], dest: &Path) -> Result<()> {
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ScienceError::Download(format!(
            "response for {} is not a PDF",
            dest.display()
        )));
    }
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(dest, bytes).await?;
    Ok(())
}

#[async_trait]
impl PdfFetcher for HttpPdfFetcher {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let bytes = self.client.get_pdf_bytes(url).await?;
        write_pdf(&bytes, dest).await?;
        info!("downloaded {url} -> {}", dest.display());
        Ok(())
    }

    async fn fetch_by_identifier(&self, identifier: &str, dest: &Path) -> Result<()> {
        let mut last_error = None;
        for url in fallback_urls(identifier)? {
            match self.download(&url, dest).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    debug!("fallback {url} failed: {err}");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| ScienceError::Download(identifier.to_string())))
    }
}
