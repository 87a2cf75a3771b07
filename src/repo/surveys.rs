//! Mission candidate tables (K2, Kepler, TESS) merged into star systems
use crate::domain::{Planet, StarProperties, StarSystem, Telescope};
use crate::errors::{ApiError, ApiResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Rows taken from the head of each mission table
pub const SURVEY_ROW_CAP: usize = 500;

const SAMPLE_PLANETS: usize = 50;

/// One planet row after field mapping, before grouping by host
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRecord {
    pub hostname: String,
    pub star: StarProperties,
    pub planet: Planet,
}

/// A mission table row that can be mapped onto the catalog model
pub trait SurveyRow: DeserializeOwned {
    const TELESCOPE: Telescope;
    const FILE_NAME: &'static str;

    /// `None` when the row lacks a field the catalog requires
    fn into_record(self, index: usize) -> Option<SurveyRecord>;
}

/// K2 planets and candidates table
#[derive(Debug, Clone, Deserialize)]
pub struct K2Row {
    pub pl_name: String,
    pub hostname: String,
    pub disposition: Option<String>,
    pub pl_orbper: Option<f64>,
    pub pl_rade: Option<f64>,
    pub pl_eqt: Option<f64>,
    pub pl_insol: Option<f64>,
    pub st_teff: Option<f64>,
    pub st_rad: Option<f64>,
    pub st_mass: Option<f64>,
    pub ra: f64,
    pub dec: f64,
    pub sy_dist: Option<f64>,
    pub disc_year: Option<i32>,
}

/// Kepler objects of interest table
#[derive(Debug, Clone, Deserialize)]
pub struct KeplerRow {
    pub kepoi_name: String,
    pub kepler_name: Option<String>,
    pub koi_disposition: Option<String>,
    pub koi_period: Option<f64>,
    pub koi_prad: Option<f64>,
    pub koi_teq: Option<f64>,
    pub koi_insol: Option<f64>,
    pub koi_steff: Option<f64>,
    pub koi_srad: Option<f64>,
    pub ra: f64,
    pub dec: f64,
}

/// TESS objects of interest table
#[derive(Debug, Clone, Deserialize)]
pub struct TessRow {
    pub toi: f64,
    pub tfopwg_disp: Option<String>,
    pub pl_orbper: Option<f64>,
    pub pl_rade: Option<f64>,
    pub pl_eqt: Option<f64>,
    pub pl_insol: Option<f64>,
    pub st_teff: Option<f64>,
    pub st_rad: Option<f64>,
    pub st_dist: Option<f64>,
    pub ra: f64,
    pub dec: f64,
}

/// Fields shared by every mission after renaming
struct RowFields {
    name: String,
    hostname: String,
    period: Option<f64>,
    radius: Option<f64>,
    eq_temp: Option<f64>,
    insolation: Option<f64>,
    star_temp: Option<f64>,
    star_radius: Option<f64>,
    star_mass: Option<f64>,
    ra: f64,
    dec: f64,
    distance: f64,
    year: Option<i32>,
}

/// Layered placeholder distance for rows without one
fn estimated_distance(index: usize) -> f64 {
    100.0 + (index % 200) as f64
}

fn assemble(telescope: Telescope, fields: RowFields) -> Option<SurveyRecord> {
    Some(SurveyRecord {
        hostname: fields.hostname,
        star: StarProperties {
            temperature_k: fields.star_temp?,
            radius_solar: fields.star_radius.unwrap_or(1.0),
            mass_solar: fields.star_mass.unwrap_or(1.0),
            metallicity: None,
            distance_pc: fields.distance,
            ra_deg: fields.ra,
            dec_deg: fields.dec,
            spectral_type: None,
        },
        planet: Planet {
            planet_name: fields.name,
            radius_earth: fields.radius?,
            mass_earth: None,
            equilibrium_temp_k: fields.eq_temp?,
            insolation_earth: fields.insolation,
            eccentricity: None,
            orbital_period_days: fields.period?,
            discovery_year: fields.year.unwrap_or(telescope.first_light_year()),
            discovery_method: "Transit".to_string(),
            discovery_facility: Some(telescope.label().to_string()),
        },
    })
}

impl SurveyRow for K2Row {
    const TELESCOPE: Telescope = Telescope::K2;
    const FILE_NAME: &'static str = "k2.json";

    fn into_record(self, index: usize) -> Option<SurveyRecord> {
        assemble(
            Self::TELESCOPE,
            RowFields {
                name: self.pl_name,
                hostname: self.hostname,
                period: self.pl_orbper,
                radius: self.pl_rade,
                eq_temp: self.pl_eqt,
                insolation: self.pl_insol,
                star_temp: self.st_teff,
                star_radius: self.st_rad,
                star_mass: self.st_mass,
                ra: self.ra,
                dec: self.dec,
                distance: self.sy_dist.unwrap_or_else(|| estimated_distance(index)),
                year: self.disc_year,
            },
        )
    }
}

impl SurveyRow for KeplerRow {
    const TELESCOPE: Telescope = Telescope::Kepler;
    const FILE_NAME: &'static str = "kepler.json";

    fn into_record(self, index: usize) -> Option<SurveyRecord> {
        // "Kepler-22 b" is hosted by "Kepler-22"; unnamed KOIs by their KOI stem
        let hostname = match &self.kepler_name {
            Some(name) => name.split_whitespace().next().unwrap_or(name).to_string(),
            None => self
                .kepoi_name
                .split('.')
                .next()
                .unwrap_or(&self.kepoi_name)
                .to_string(),
        };
        let name = self.kepler_name.unwrap_or(self.kepoi_name);

        assemble(
            Self::TELESCOPE,
            RowFields {
                name,
                hostname,
                period: self.koi_period,
                radius: self.koi_prad,
                eq_temp: self.koi_teq,
                insolation: self.koi_insol,
                star_temp: self.koi_steff,
                star_radius: self.koi_srad,
                star_mass: None,
                ra: self.ra,
                dec: self.dec,
                distance: estimated_distance(index),
                year: None,
            },
        )
    }
}

impl SurveyRow for TessRow {
    const TELESCOPE: Telescope = Telescope::Tess;
    const FILE_NAME: &'static str = "tess.json";

    fn into_record(self, index: usize) -> Option<SurveyRecord> {
        assemble(
            Self::TELESCOPE,
            RowFields {
                name: format!("TOI-{}", self.toi),
                hostname: format!("TOI-{}", self.toi.floor() as i64),
                period: self.pl_orbper,
                radius: self.pl_rade,
                eq_temp: self.pl_eqt,
                insolation: self.pl_insol,
                star_temp: self.st_teff,
                star_radius: self.st_rad,
                star_mass: None,
                ra: self.ra,
                dec: self.dec,
                distance: self.st_dist.unwrap_or_else(|| estimated_distance(index)),
                year: None,
            },
        )
    }
}

/// Map the first [`SURVEY_ROW_CAP`] rows of one mission table.
///
/// Rows that fail to decode or lack a required measurement are skipped.
pub fn parse_survey_table<R: SurveyRow>(json: Value) -> ApiResult<Vec<SurveyRecord>> {
    let Value::Array(rows) = json else {
        return Err(ApiError::Catalog(format!(
            "{} table is not an array",
            R::TELESCOPE.label()
        )));
    };

    let considered = rows.len().min(SURVEY_ROW_CAP);
    let records: Vec<SurveyRecord> = rows
        .into_iter()
        .take(SURVEY_ROW_CAP)
        .enumerate()
        .filter_map(|(index, row)| serde_json::from_value::<R>(row).ok()?.into_record(index))
        .collect();

    if records.len() < considered {
        debug!(
            "Skipped {} incomplete {} rows",
            considered - records.len(),
            R::TELESCOPE.label()
        );
    }
    Ok(records)
}

async fn read_survey<R: SurveyRow>(dir: &Path) -> ApiResult<Vec<SurveyRecord>> {
    let bytes = tokio::fs::read(dir.join(R::FILE_NAME)).await?;
    parse_survey_table::<R>(serde_json::from_slice(&bytes)?)
}

/// Group mapped rows by host, keeping first-seen order; the first row of a
/// host supplies its star properties.
pub fn group_into_systems(records: impl IntoIterator<Item = SurveyRecord>) -> Vec<StarSystem> {
    let mut systems: Vec<StarSystem> = Vec::new();
    let mut by_host: HashMap<String, usize> = HashMap::new();

    for record in records {
        match by_host.get(&record.hostname) {
            Some(&i) => systems[i].planets.push(record.planet),
            None => {
                by_host.insert(record.hostname.clone(), systems.len());
                systems.push(StarSystem {
                    hostname: record.hostname,
                    star_properties: record.star,
                    planets: vec![record.planet],
                });
            }
        }
    }
    systems
}

/// Load all three mission tables from `dir`.
///
/// A table that is missing or malformed is logged and left out; the others
/// still load.
pub async fn load_surveys(dir: &Path) -> Vec<StarSystem> {
    let (k2, kepler, tess) = tokio::join!(
        read_survey::<K2Row>(dir),
        read_survey::<KeplerRow>(dir),
        read_survey::<TessRow>(dir),
    );

    let mut records = Vec::new();
    for (telescope, result) in [
        (Telescope::K2, k2),
        (Telescope::Kepler, kepler),
        (Telescope::Tess, tess),
    ] {
        match result {
            Ok(rows) => {
                info!("Loaded {} {} planets", rows.len(), telescope.label());
                records.extend(rows);
            }
            Err(e) => warn!("Failed to load {} table: {}", telescope.label(), e),
        }
    }

    group_into_systems(records)
}

/// Deterministic value in [0, 1) for placeholder fields
fn spread(index: usize, salt: f64) -> f64 {
    ((index as f64 + 1.0) * 0.618_033_988_749_895 + salt).fract()
}

/// Placeholder catalog of one-planet systems cycling through the missions
pub fn sample_catalog() -> Vec<StarSystem> {
    (0..SAMPLE_PLANETS)
        .map(|i| {
            let telescope = Telescope::ALL[i % Telescope::ALL.len()];
            StarSystem {
                hostname: format!("Sample Star {}", i + 1),
                star_properties: StarProperties {
                    temperature_k: 3000.0 + spread(i, 0.5) * 4000.0,
                    radius_solar: 0.5 + spread(i, 0.6) * 2.0,
                    mass_solar: 0.5 + spread(i, 0.7) * 1.5,
                    metallicity: None,
                    distance_pc: 10.0 + spread(i, 0.8) * 500.0,
                    ra_deg: spread(i, 0.9) * 360.0,
                    dec_deg: (spread(i, 0.05) - 0.5) * 180.0,
                    spectral_type: None,
                },
                planets: vec![Planet {
                    planet_name: format!("{} Sample {}", telescope.label(), i + 1),
                    radius_earth: 0.5 + spread(i, 0.2) * 3.0,
                    mass_earth: None,
                    equilibrium_temp_k: 200.0 + spread(i, 0.3) * 1500.0,
                    insolation_earth: Some(spread(i, 0.4) * 100.0),
                    eccentricity: None,
                    orbital_period_days: 10.0 + spread(i, 0.1) * 365.0,
                    discovery_year: telescope.first_light_year(),
                    discovery_method: "Transit".to_string(),
                    discovery_facility: Some(telescope.label().to_string()),
                }],
            }
        })
        .collect()
}
