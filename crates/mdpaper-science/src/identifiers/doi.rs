use mdpaper_core::notes::normalize_doi;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScienceError};

/// DOI prefix shared by bioRxiv and medRxiv preprints.
pub const PREPRINT_PREFIX: &str = "10.1101/";

const URL_PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Doi {
    pub raw: String,
    pub normalized: String,
    pub url: String,
}

impl Doi {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        let stripped = URL_PREFIXES
            .iter()
            .find_map(|p| input.strip_prefix(p))
            .or_else(|| {
                let lower = input.get(..4).map(str::to_ascii_lowercase);
                (lower.as_deref() == Some("doi:")).then(|| input[4..].trim_start())
            })
            .unwrap_or(input);

        // must start with "10.", contain "/", and have a non-empty suffix
        if !stripped.starts_with("10.") {
            return Err(ScienceError::InvalidDoi(input.to_string()));
        }
        let slash_pos = stripped
            .find('/')
            .ok_or_else(|| ScienceError::InvalidDoi(input.to_string()))?;
        if stripped[slash_pos + 1..].trim().is_empty() || stripped.contains(char::is_whitespace) {
            return Err(ScienceError::InvalidDoi(input.to_string()));
        }

        let normalized =
            normalize_doi(stripped).ok_or_else(|| ScienceError::InvalidDoi(input.to_string()))?;
        let url = format!("https://doi.org/{normalized}");

        Ok(Self {
            raw: input.to_string(),
            normalized,
            url,
        })
    }

    pub fn is_preprint(&self) -> bool {
        self.normalized.starts_with(PREPRINT_PREFIX)
    }
}
