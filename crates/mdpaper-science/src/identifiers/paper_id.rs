use std::fmt;

use crate::error::{Result, ScienceError};
use crate::identifiers::{arxiv::ArxivId, doi::Doi};

/// An identifier from a note marker, classified by the backend that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaperId {
    Doi(Doi),
    /// bioRxiv / medRxiv DOI (`10.1101/...`).
    Preprint(Doi),
    Arxiv(ArxivId),
}

impl PaperId {
    pub fn classify(identifier: &str) -> Result<Self> {
        if let Ok(doi) = Doi::parse(identifier) {
            return Ok(if doi.is_preprint() {
                Self::Preprint(doi)
            } else {
                Self::Doi(doi)
            });
        }
        if let Ok(id) = ArxivId::parse(identifier) {
            return Ok(Self::Arxiv(id));
        }
        Err(ScienceError::UnsupportedIdentifier(identifier.to_string()))
    }

    pub fn doi(&self) -> Option<&Doi> {
        match self {
            Self::Doi(doi) | Self::Preprint(doi) => Some(doi),
            Self::Arxiv(_) => None,
        }
    }
}

impl fmt::Display for PaperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doi(doi) | Self::Preprint(doi) => write!(f, "{}", doi.normalized),
            Self::Arxiv(id) => write!(f, "arXiv:{}", id.id),
        }
    }
}
