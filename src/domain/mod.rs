/// Domain models for the application
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One confirmed or candidate planet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub planet_name: String,
    pub radius_earth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_earth: Option<f64>,
    #[serde(rename = "equilibrium_temp_K")]
    pub equilibrium_temp_k: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insolation_earth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eccentricity: Option<f64>,
    pub orbital_period_days: f64,
    pub discovery_year: i32,
    pub discovery_method: String,
    /// Survey telescope for records merged from mission tables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_facility: Option<String>,
}

/// Host star physical properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarProperties {
    #[serde(rename = "temperature_K")]
    pub temperature_k: f64,
    pub radius_solar: f64,
    pub mass_solar: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metallicity: Option<f64>,
    pub distance_pc: f64,
    pub ra_deg: f64,
    pub dec_deg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectral_type: Option<String>,
}

/// A host star and its planets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarSystem {
    pub hostname: String,
    pub star_properties: StarProperties,
    pub planets: Vec<Planet>,
}

/// Favorites hold either kind of catalog entity.
///
/// Untagged on the wire: a record with `hostname` is a system, a record with
/// `planet_name` is a planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FavoriteItem {
    System(StarSystem),
    Planet(Planet),
}

impl FavoriteItem {
    /// True when both items are the same kind with the same business key
    pub fn same_key(&self, other: &FavoriteItem) -> bool {
        match (self, other) {
            (FavoriteItem::System(a), FavoriteItem::System(b)) => a.hostname == b.hostname,
            (FavoriteItem::Planet(a), FavoriteItem::Planet(b)) => a.planet_name == b.planet_name,
            _ => false,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            FavoriteItem::System(s) => &s.hostname,
            FavoriteItem::Planet(p) => &p.planet_name,
        }
    }
}

/// Derived planet tag, never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanetCategory {
    Cold,
    Hot,
    Habitable,
    GasGiant,
}

/// User-controlled query parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub search: String,
    pub temperature_range: [f64; 2],
    pub planet_radius_range: [f64; 2],
    pub orbital_period_range: [f64; 2],
    pub discovery_year_range: [i32; 2],
    pub discovery_method: String,
    pub habitable_zone_only: bool,
    pub max_star_systems: usize,
    pub current_star_system_index: usize,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            search: String::new(),
            temperature_range: [2000.0, 10000.0],
            planet_radius_range: [0.1, 30.0],
            orbital_period_range: [0.1, 5000.0],
            discovery_year_range: [1995, 2025],
            discovery_method: "all".to_string(),
            habitable_zone_only: false,
            max_star_systems: 5,
            current_star_system_index: 0,
        }
    }
}

impl Filters {
    /// Shallow-merge a partial update
    pub fn merge(mut self, patch: FiltersPatch) -> Self {
        if let Some(v) = patch.search {
            self.search = v;
        }
        if let Some(v) = patch.temperature_range {
            self.temperature_range = v;
        }
        if let Some(v) = patch.planet_radius_range {
            self.planet_radius_range = v;
        }
        if let Some(v) = patch.orbital_period_range {
            self.orbital_period_range = v;
        }
        if let Some(v) = patch.discovery_year_range {
            self.discovery_year_range = v;
        }
        if let Some(v) = patch.discovery_method {
            self.discovery_method = v;
        }
        if let Some(v) = patch.habitable_zone_only {
            self.habitable_zone_only = v;
        }
        if let Some(v) = patch.max_star_systems {
            self.max_star_systems = v;
        }
        if let Some(v) = patch.current_star_system_index {
            self.current_star_system_index = v;
        }
        self
    }
}

/// Partial filter update for `UPDATE_FILTERS`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FiltersPatch {
    pub search: Option<String>,
    pub temperature_range: Option<[f64; 2]>,
    pub planet_radius_range: Option<[f64; 2]>,
    pub orbital_period_range: Option<[f64; 2]>,
    pub discovery_year_range: Option<[i32; 2]>,
    pub discovery_method: Option<String>,
    pub habitable_zone_only: Option<bool>,
    pub max_star_systems: Option<usize>,
    pub current_star_system_index: Option<usize>,
}

/// Presentation toggles carried alongside the filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewControls {
    pub show_orbits: bool,
    pub scale_planet_sizes: bool,
    pub star_brightness: f64,
    pub star_spacing: f64,
}

impl Default for ViewControls {
    fn default() -> Self {
        Self {
            show_orbits: true,
            scale_planet_sizes: true,
            star_brightness: 1.0,
            star_spacing: 50.0,
        }
    }
}

impl ViewControls {
    pub fn merge(mut self, patch: ViewControlsPatch) -> Self {
        if let Some(v) = patch.show_orbits {
            self.show_orbits = v;
        }
        if let Some(v) = patch.scale_planet_sizes {
            self.scale_planet_sizes = v;
        }
        if let Some(v) = patch.star_brightness {
            self.star_brightness = v;
        }
        if let Some(v) = patch.star_spacing {
            self.star_spacing = v;
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewControlsPatch {
    pub show_orbits: Option<bool>,
    pub scale_planet_sizes: Option<bool>,
    pub star_brightness: Option<f64>,
    pub star_spacing: Option<f64>,
}

/// Aggregate statistics over a list of star systems
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_stars: usize,
    pub total_planets: usize,
    pub habitable_planets: usize,
    pub gas_giants: usize,
    pub rocky_planets: usize,
    pub average_temperature: f64,
    pub average_planet_radius: f64,
    pub discovery_methods: BTreeSet<String>,
    pub discovery_years: BTreeSet<i32>,
}

/// Catalog-wide counters next to the page planet count
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    pub total_stars: usize,
    pub total_planets: usize,
    pub filtered_planets: usize,
}

/// Current page of the filtered catalog
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemPage {
    pub systems: Vec<StarSystem>,
    pub total_filtered: usize,
    pub current_star_system_index: usize,
    pub max_star_systems: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Statistics response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsReport {
    pub summary: CatalogSummary,
    pub page: Statistics,
    pub filtered: Statistics,
    pub habitable_share: String,
}

/// Planet with its derived tags
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetDetail {
    pub planet: Planet,
    pub hostname: String,
    pub category: PlanetCategory,
    pub habitable: bool,
    pub favorite: bool,
    pub multi_selected: bool,
    pub display: PlanetDisplay,
}

/// Pre-formatted values and render hints for a planet
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetDisplay {
    pub temperature: String,
    pub radius: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mass: Option<String>,
    pub period: String,
    pub discovery_year: String,
    pub color: &'static str,
    pub render_size: f64,
    pub marker_size: f64,
    pub orbit_radius: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telescope: Option<TelescopeStyle>,
}

/// Survey telescopes whose candidate tables can be merged into the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Telescope {
    K2,
    Kepler,
    Tess,
}

impl Telescope {
    pub const ALL: [Telescope; 3] = [Telescope::K2, Telescope::Kepler, Telescope::Tess];

    pub fn label(self) -> &'static str {
        match self {
            Telescope::K2 => "K2",
            Telescope::Kepler => "Kepler",
            Telescope::Tess => "TESS",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    /// Mission start, used when a table row carries no discovery year
    pub fn first_light_year(self) -> i32 {
        match self {
            Telescope::Kepler => 2009,
            Telescope::K2 => 2014,
            Telescope::Tess => 2018,
        }
    }

    pub fn style(self) -> TelescopeStyle {
        match self {
            Telescope::K2 => TelescopeStyle::new("#3b82f6", "#1d4ed8", "#60a5fa"),
            Telescope::Kepler => TelescopeStyle::new("#10b981", "#047857", "#34d399"),
            Telescope::Tess => TelescopeStyle::new("#ef4444", "#dc2626", "#f87171"),
        }
    }
}

/// Marker colors for a survey telescope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelescopeStyle {
    pub primary_color: &'static str,
    pub secondary_color: &'static str,
    pub glow_color: &'static str,
}

impl TelescopeStyle {
    const fn new(
        primary_color: &'static str,
        secondary_color: &'static str,
        glow_color: &'static str,
    ) -> Self {
        Self {
            primary_color,
            secondary_color,
            glow_color,
        }
    }

    /// Style for a facility label; unknown facilities get the neutral gray
    pub fn for_facility(label: &str) -> Self {
        Telescope::from_label(label)
            .map(Telescope::style)
            .unwrap_or(Self::new("#6b7280", "#374151", "#9ca3af"))
    }
}

/// Star system with its derived tags
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemDetail {
    pub system: StarSystem,
    pub stellar_class: &'static str,
    pub star_color: &'static str,
    pub favorite: bool,
    pub display: SystemDisplay,
}

/// Pre-formatted values and scene placement for a host star
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemDisplay {
    pub temperature: String,
    pub radius: String,
    pub mass: String,
    pub distance: String,
    pub position: [f64; 3],
    pub render_size: f64,
}

/// Health check response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub now: DateTime<Utc>,
    pub catalog_systems: usize,
    pub loaded_at: DateTime<Utc>,
    pub is_loading: bool,
}
