use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScienceError};

// New format: YYMM.NNNN or YYMM.NNNNN (with optional version)
static NEW_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}\.\d{4,5})(v(\d+))?$").expect("valid regex"));

// Old format: category/YYMMNNN
static OLD_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z\-]+(?:\.[A-Z]{2})?/\d{7})(v(\d+))?$").expect("valid regex"));

const PREFIXES: &[&str] = &[
    "https://arxiv.org/abs/",
    "http://arxiv.org/abs/",
    "https://arxiv.org/pdf/",
    "http://arxiv.org/pdf/",
    "arXiv:",
    "arxiv:",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArxivId {
    pub raw: String,
    pub id: String,
    pub version: Option<u8>,
    pub abs_url: String,
    pub pdf_url: String,
}

impl ArxivId {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let stripped = PREFIXES
            .iter()
            .find_map(|p| input.strip_prefix(p))
            .map(|s| s.trim_end_matches(".pdf"))
            .unwrap_or(input);

        let caps = NEW_FORMAT
            .captures(stripped)
            .or_else(|| OLD_FORMAT.captures(stripped))
            .ok_or_else(|| ScienceError::InvalidArxivId(input.to_string()))?;
        let id = caps
            .get(1)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ScienceError::InvalidArxivId(input.to_string()))?;
        let version = caps.get(3).and_then(|v| v.as_str().parse::<u8>().ok());

        Ok(Self {
            raw: input.to_string(),
            abs_url: format!("https://arxiv.org/abs/{id}"),
            pdf_url: format!("https://arxiv.org/pdf/{id}"),
            id,
            version,
        })
    }
}
