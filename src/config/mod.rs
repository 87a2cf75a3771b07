/// Application configuration module
use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub catalog: CatalogSource,
    pub catalog_timeout_seconds: u64,
    pub catalog_sample_fallback: bool,
    pub default_page_size: usize,
}

/// Where the static catalog document comes from
#[derive(Clone, Debug, PartialEq)]
pub enum CatalogSource {
    File(PathBuf),
    Url(String),
    /// Directory holding `k2.json`, `kepler.json` and `tess.json` mission tables
    Surveys(PathBuf),
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        // URL, then survey directory, then local document
        let catalog = if let Some(url) = env_non_empty("CATALOG_URL") {
            CatalogSource::Url(url)
        } else if let Some(dir) = env_non_empty("CATALOG_SURVEY_DIR") {
            CatalogSource::Surveys(PathBuf::from(dir))
        } else {
            CatalogSource::File(
                env::var("CATALOG_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("data/exoplanets.json")),
            )
        };

        let default_page_size = env_u64("DEFAULT_PAGE_SIZE", 5) as usize;
        if default_page_size == 0 {
            anyhow::bail!("DEFAULT_PAGE_SIZE must be at least 1");
        }

        Ok(Self {
            bind_addr,
            catalog,
            catalog_timeout_seconds: env_u64("CATALOG_TIMEOUT_SECONDS", 30),
            catalog_sample_fallback: env_bool("CATALOG_SAMPLE_FALLBACK", false),
            default_page_size,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            catalog: CatalogSource::File(PathBuf::from("data/exoplanets.json")),
            catalog_timeout_seconds: 30,
            catalog_sample_fallback: false,
            default_page_size: 5,
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key).map(|s| s.trim().to_ascii_lowercase()) {
        Ok(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Ok(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
