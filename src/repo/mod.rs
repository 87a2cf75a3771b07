/// Repository layer over the immutable in-memory catalog
mod surveys;

pub use surveys::{
    group_into_systems, load_surveys, parse_survey_table, sample_catalog, K2Row, KeplerRow,
    SurveyRecord, SurveyRow, TessRow, SURVEY_ROW_CAP,
};

use crate::clients::CatalogClient;
use crate::config::{AppConfig, CatalogSource};
use crate::domain::{Planet, StarSystem};
use crate::errors::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Read-only star system catalog, loaded once
#[derive(Clone, Debug)]
pub struct CatalogRepo {
    systems: Arc<[StarSystem]>,
    loaded_at: DateTime<Utc>,
}

impl CatalogRepo {
    pub fn new(systems: Vec<StarSystem>) -> Self {
        Self {
            systems: systems.into(),
            loaded_at: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Shared handle to the catalog; identity doubles as the cache key
    pub fn systems(&self) -> &Arc<[StarSystem]> {
        &self.systems
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn total_planets(&self) -> usize {
        self.systems.iter().map(|s| s.planets.len()).sum()
    }

    /// Look up a system by hostname
    pub fn find_system(&self, hostname: &str) -> Option<&StarSystem> {
        self.systems.iter().find(|s| s.hostname == hostname)
    }

    /// Look up a planet by name, together with its host system
    pub fn find_planet(&self, planet_name: &str) -> Option<(&StarSystem, &Planet)> {
        self.systems.iter().find_map(|s| {
            s.planets
                .iter()
                .find(|p| p.planet_name == planet_name)
                .map(|p| (s, p))
        })
    }

    /// Load a catalog document from disk
    pub async fn from_file(path: &Path) -> ApiResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let json: Value = serde_json::from_slice(&bytes)?;
        Ok(Self::new(parse_catalog_document(json)?))
    }

    pub async fn from_client(client: &CatalogClient) -> ApiResult<Self> {
        Ok(Self::new(client.fetch_systems().await?))
    }
}

/// Decode a catalog document: a bare array, or an object with a `systems` array
pub fn parse_catalog_document(json: Value) -> ApiResult<Vec<StarSystem>> {
    let items = match json {
        Value::Array(_) => json,
        Value::Object(mut map) => match map.remove("systems") {
            Some(arr @ Value::Array(_)) => arr,
            _ => {
                return Err(ApiError::Catalog(
                    "catalog object has no `systems` array".to_string(),
                ))
            }
        },
        _ => {
            return Err(ApiError::Catalog(
                "catalog document must be an array or object".to_string(),
            ))
        }
    };
    Ok(serde_json::from_value(items)?)
}

/// Load the catalog from its configured source.
///
/// Never fails: any error degrades to an empty catalog so the engine still
/// comes up with a well-defined state. With `catalog_sample_fallback` set, an
/// empty result is replaced by the placeholder sample catalog.
pub async fn load_catalog(config: &AppConfig) -> CatalogRepo {
    let result = match &config.catalog {
        CatalogSource::File(path) => {
            info!("Loading catalog from file {}", path.display());
            CatalogRepo::from_file(path).await
        }
        CatalogSource::Url(url) => {
            match CatalogClient::new(url.clone(), config.catalog_timeout_seconds) {
                Ok(client) => {
                    info!("Loading catalog from {}", client.base_url());
                    CatalogRepo::from_client(&client).await
                }
                Err(e) => Err(e),
            }
        }
        CatalogSource::Surveys(dir) => {
            info!("Merging survey tables from {}", dir.display());
            Ok(CatalogRepo::new(load_surveys(dir).await))
        }
    };

    let repo = match result {
        Ok(repo) => repo,
        Err(e) => {
            warn!("Catalog load failed, continuing with empty catalog: {}", e);
            CatalogRepo::empty()
        }
    };

    if repo.is_empty() && config.catalog_sample_fallback {
        warn!("No catalog data loaded, using sample systems");
        return CatalogRepo::new(sample_catalog());
    }

    info!(
        "Catalog loaded: {} systems, {} planets",
        repo.len(),
        repo.total_planets()
    );
    repo
}
