use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Root application configuration, loaded from `~/.config/md-paper/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub sources: SourcesConfig,
    pub notes: NotesConfig,
    pub pdf: PdfConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Proxy address applied to both http and https, e.g. `127.0.0.1:7890`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub min_interval_ms: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub crossref_base_url: String,
    pub biorxiv_base_url: String,
    pub arxiv_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    /// File extensions treated as notes when `--input` is a directory.
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Pages scanned for an embedded DOI.
    pub max_pages: usize,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            user_agent: format!("md-paper/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            min_interval_ms: 100,
            max_retries: 2,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            crossref_base_url: "https://api.crossref.org".to_string(),
            biorxiv_base_url: "https://api.biorxiv.org".to_string(),
            arxiv_base_url: "http://export.arxiv.org/api/query".to_string(),
        }
    }
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_string(), "markdown".to_string()],
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { max_pages: 5 }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/md-paper/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("MDPAPER_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("md-paper")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Command-line proxy wins over the config file; blank values disable it.
    pub fn set_proxy(&mut self, proxy: Option<String>) {
        if let Some(p) = proxy {
            let p = p.trim().to_string();
            self.network.proxy = if p.is_empty() { None } else { Some(p) };
        }
    }
}
