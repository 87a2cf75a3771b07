//! Derived views over the catalog: filtering, pagination, categorization,
//! statistics and sorting. All functions are pure and never mutate inputs.

use crate::domain::{CatalogSummary, Filters, Planet, PlanetCategory, StarSystem, Statistics};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Inclusive habitable-zone bounds on equilibrium temperature, in kelvin
pub const HABITABLE_MIN_K: f64 = 200.0;
pub const HABITABLE_MAX_K: f64 = 320.0;

/// Radius above which a planet is a gas giant, in Earth radii
pub const GAS_GIANT_RADIUS_EARTH: f64 = 4.0;

pub fn is_in_habitable_zone(planet: &Planet) -> bool {
    (HABITABLE_MIN_K..=HABITABLE_MAX_K).contains(&planet.equilibrium_temp_k)
}

pub fn is_gas_giant(planet: &Planet) -> bool {
    planet.radius_earth > GAS_GIANT_RADIUS_EARTH
}

/// Categorize a planet. Size wins over temperature.
pub fn categorize_planet(planet: &Planet) -> PlanetCategory {
    if is_gas_giant(planet) {
        PlanetCategory::GasGiant
    } else if is_in_habitable_zone(planet) {
        PlanetCategory::Habitable
    } else if planet.equilibrium_temp_k < HABITABLE_MIN_K {
        PlanetCategory::Cold
    } else {
        PlanetCategory::Hot
    }
}

/// Temperature class of a host star, with its display color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StellarClass {
    BrownDwarf,
    M,
    K,
    G,
    F,
    A,
    B,
    O,
}

impl StellarClass {
    /// Eight-band step function over effective temperature
    pub fn from_temperature(temperature_k: f64) -> Self {
        match temperature_k {
            t if t < 2400.0 => StellarClass::BrownDwarf,
            t if t < 3700.0 => StellarClass::M,
            t if t < 5200.0 => StellarClass::K,
            t if t < 6000.0 => StellarClass::G,
            t if t < 7500.0 => StellarClass::F,
            t if t < 10000.0 => StellarClass::A,
            t if t < 30000.0 => StellarClass::B,
            _ => StellarClass::O,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StellarClass::BrownDwarf => "brown-dwarf",
            StellarClass::M => "M",
            StellarClass::K => "K",
            StellarClass::G => "G",
            StellarClass::F => "F",
            StellarClass::A => "A",
            StellarClass::B => "B",
            StellarClass::O => "O",
        }
    }

    pub fn color_hex(self) -> &'static str {
        match self {
            StellarClass::BrownDwarf => "#ff4500",
            StellarClass::M => "#ff6b35",
            StellarClass::K => "#ffa500",
            StellarClass::G => "#ffff00",
            StellarClass::F => "#ffffff",
            StellarClass::A => "#add8e6",
            StellarClass::B => "#0066ff",
            StellarClass::O => "#8a2be2",
        }
    }
}

pub fn star_color_from_temperature(temperature_k: f64) -> &'static str {
    StellarClass::from_temperature(temperature_k).color_hex()
}

fn within(value: f64, range: [f64; 2]) -> bool {
    value >= range[0] && value <= range[1]
}

/// Planet-level predicate; a system needs at least one planet passing it
pub fn planet_matches(planet: &Planet, filters: &Filters) -> bool {
    within(planet.radius_earth, filters.planet_radius_range)
        && within(planet.orbital_period_days, filters.orbital_period_range)
        && planet.discovery_year >= filters.discovery_year_range[0]
        && planet.discovery_year <= filters.discovery_year_range[1]
        && (filters.discovery_method == "all" || planet.discovery_method == filters.discovery_method)
        && (!filters.habitable_zone_only || is_in_habitable_zone(planet))
}

pub fn system_matches(system: &StarSystem, filters: &Filters) -> bool {
    if !filters.search.is_empty() {
        let needle = filters.search.to_lowercase();
        let hostname_match = system.hostname.to_lowercase().contains(&needle);
        let planet_match = system
            .planets
            .iter()
            .any(|p| p.planet_name.to_lowercase().contains(&needle));
        if !hostname_match && !planet_match {
            return false;
        }
    }

    within(system.star_properties.temperature_k, filters.temperature_range)
        && system.planets.iter().any(|p| planet_matches(p, filters))
}

/// All systems passing the filters, in catalog order, before pagination
pub fn filter_star_systems<'a>(systems: &'a [StarSystem], filters: &Filters) -> Vec<&'a StarSystem> {
    systems.iter().filter(|s| system_matches(s, filters)).collect()
}

/// Slice `[index, index + page_size)`, clamped to the input
pub fn paginate<T>(items: &[T], index: usize, page_size: usize) -> &[T] {
    let start = index.min(items.len());
    let end = index.saturating_add(page_size).min(items.len());
    &items[start..end]
}

pub fn calculate_statistics<'a, I>(systems: I) -> Statistics
where
    I: IntoIterator<Item = &'a StarSystem>,
{
    let mut stats = Statistics::default();
    let mut temp_sum = 0.0;
    let mut radius_sum = 0.0;

    for system in systems {
        stats.total_stars += 1;
        for planet in &system.planets {
            stats.total_planets += 1;
            temp_sum += planet.equilibrium_temp_k;
            radius_sum += planet.radius_earth;

            if is_in_habitable_zone(planet) {
                stats.habitable_planets += 1;
            }
            if is_gas_giant(planet) {
                stats.gas_giants += 1;
            } else {
                stats.rocky_planets += 1;
            }

            stats.discovery_methods.insert(planet.discovery_method.clone());
            stats.discovery_years.insert(planet.discovery_year);
        }
    }

    if stats.total_planets > 0 {
        stats.average_temperature = temp_sum / stats.total_planets as f64;
        stats.average_planet_radius = radius_sum / stats.total_planets as f64;
    }
    stats
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Distance,
    Temperature,
    Planets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Stable sort into a new vector
pub fn sort_star_systems(systems: &[StarSystem], key: SortKey, order: SortOrder) -> Vec<StarSystem> {
    let mut sorted = systems.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Name => a
                .hostname
                .to_lowercase()
                .cmp(&b.hostname.to_lowercase())
                .then_with(|| a.hostname.cmp(&b.hostname)),
            SortKey::Distance => a
                .star_properties
                .distance_pc
                .total_cmp(&b.star_properties.distance_pc),
            SortKey::Temperature => a
                .star_properties
                .temperature_k
                .total_cmp(&b.star_properties.temperature_k),
            SortKey::Planets => a.planets.len().cmp(&b.planets.len()),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    sorted
}

/// Everything the consumers derive from catalog + filters
#[derive(Debug, Clone)]
pub struct DerivedViews {
    /// Current page of filtered systems
    pub systems: Vec<StarSystem>,
    pub total_filtered: usize,
    /// Planets of the current page
    pub filtered_planets: Vec<Planet>,
    pub page_statistics: Statistics,
    pub filtered_statistics: Statistics,
    pub summary: CatalogSummary,
}

impl DerivedViews {
    pub fn compute(catalog: &[StarSystem], filters: &Filters) -> Self {
        let filtered = filter_star_systems(catalog, filters);
        let page = paginate(
            &filtered,
            filters.current_star_system_index,
            filters.max_star_systems,
        );

        let systems: Vec<StarSystem> = page.iter().map(|s| (*s).clone()).collect();
        let filtered_planets: Vec<Planet> =
            systems.iter().flat_map(|s| s.planets.iter().cloned()).collect();

        let summary = CatalogSummary {
            total_stars: catalog.len(),
            total_planets: catalog.iter().map(|s| s.planets.len()).sum(),
            filtered_planets: filtered_planets.len(),
        };

        Self {
            page_statistics: calculate_statistics(&systems),
            filtered_statistics: calculate_statistics(filtered.iter().copied()),
            total_filtered: filtered.len(),
            systems,
            filtered_planets,
            summary,
        }
    }
}

/// Single-entry memo keyed on catalog identity and the filter values
#[derive(Debug, Default)]
pub struct ViewCache {
    entry: Option<CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    catalog: Arc<[StarSystem]>,
    filters: Filters,
    views: Arc<DerivedViews>,
}

impl ViewCache {
    pub fn get_or_compute(&mut self, catalog: &Arc<[StarSystem]>, filters: &Filters) -> Arc<DerivedViews> {
        if let Some(entry) = &self.entry {
            if Arc::ptr_eq(&entry.catalog, catalog) && entry.filters == *filters {
                debug!("Derived views cache hit");
                return Arc::clone(&entry.views);
            }
        }

        debug!("Recomputing derived views");
        let views = Arc::new(DerivedViews::compute(catalog, filters));
        self.entry = Some(CacheEntry {
            catalog: Arc::clone(catalog),
            filters: filters.clone(),
            views: Arc::clone(&views),
        });
        views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StarProperties;

    fn planet(name: &str, radius: f64, eq_temp: f64) -> Planet {
        Planet {
            planet_name: name.to_string(),
            radius_earth: radius,
            mass_earth: None,
            equilibrium_temp_k: eq_temp,
            insolation_earth: None,
            eccentricity: None,
            orbital_period_days: 100.0,
            discovery_year: 2015,
            discovery_method: "Transit".to_string(),
            discovery_facility: None,
        }
    }

    fn system(hostname: &str, temp: f64, planets: Vec<Planet>) -> StarSystem {
        StarSystem {
            hostname: hostname.to_string(),
            star_properties: StarProperties {
                temperature_k: temp,
                radius_solar: 1.0,
                mass_solar: 1.0,
                metallicity: None,
                distance_pc: 100.0,
                ra_deg: 10.0,
                dec_deg: -5.0,
                spectral_type: None,
            },
            planets,
        }
    }

    /// System A: habitable transit planet; System B: hot gas giant found by RV
    fn scenario_catalog() -> Vec<StarSystem> {
        let mut a_planet = planet("A b", 1.0, 288.0);
        a_planet.orbital_period_days = 365.0;
        a_planet.discovery_year = 2010;

        let mut b_planet = planet("B b", 12.0, 1200.0);
        b_planet.orbital_period_days = 10.0;
        b_planet.discovery_year = 2020;
        b_planet.discovery_method = "Radial Velocity".to_string();

        vec![
            system("A", 5800.0, vec![a_planet]),
            system("B", 15000.0, vec![b_planet]),
        ]
    }

    fn names(systems: &[&StarSystem]) -> Vec<String> {
        systems.iter().map(|s| s.hostname.clone()).collect()
    }

    fn wide_filters() -> Filters {
        Filters {
            temperature_range: [0.0, 50000.0],
            ..Filters::default()
        }
    }

    #[test]
    fn test_gas_giant_wins_over_habitable() {
        assert_eq!(categorize_planet(&planet("x", 10.0, 250.0)), PlanetCategory::GasGiant);
        assert_eq!(categorize_planet(&planet("x", 4.5, 100.0)), PlanetCategory::GasGiant);
    }

    #[test]
    fn test_habitable_boundaries_inclusive() {
        assert_eq!(categorize_planet(&planet("x", 1.0, 199.0)), PlanetCategory::Cold);
        assert_eq!(categorize_planet(&planet("x", 1.0, 200.0)), PlanetCategory::Habitable);
        assert_eq!(categorize_planet(&planet("x", 1.0, 320.0)), PlanetCategory::Habitable);
        assert_eq!(categorize_planet(&planet("x", 1.0, 321.0)), PlanetCategory::Hot);
        // exactly 4 Earth radii is not a gas giant
        assert_eq!(categorize_planet(&planet("x", 4.0, 250.0)), PlanetCategory::Habitable);
    }

    #[test]
    fn test_nan_temperature_is_hot_and_not_habitable() {
        let p = planet("x", 1.0, f64::NAN);
        assert!(!is_in_habitable_zone(&p));
        assert_eq!(categorize_planet(&p), PlanetCategory::Hot);
    }

    #[test]
    fn test_stellar_class_bands() {
        assert_eq!(StellarClass::from_temperature(2000.0), StellarClass::BrownDwarf);
        assert_eq!(StellarClass::from_temperature(2400.0), StellarClass::M);
        assert_eq!(StellarClass::from_temperature(5778.0), StellarClass::G);
        assert_eq!(StellarClass::from_temperature(9999.0), StellarClass::A);
        assert_eq!(StellarClass::from_temperature(10000.0), StellarClass::B);
        assert_eq!(StellarClass::from_temperature(45000.0), StellarClass::O);
        assert_eq!(star_color_from_temperature(5778.0), "#ffff00");
    }

    #[test]
    fn test_end_to_end_scenario() {
        let catalog = scenario_catalog();

        let habitable = Filters {
            habitable_zone_only: true,
            ..wide_filters()
        };
        assert_eq!(names(&filter_star_systems(&catalog, &habitable)), vec!["A"]);

        let rv = Filters {
            discovery_method: "Radial Velocity".to_string(),
            ..wide_filters()
        };
        assert_eq!(names(&filter_star_systems(&catalog, &rv)), vec!["B"]);
    }

    #[test]
    fn test_default_temperature_range_excludes_hot_star() {
        let catalog = scenario_catalog();
        assert_eq!(
            names(&filter_star_systems(&catalog, &Filters::default())),
            vec!["A"]
        );
    }

    #[test]
    fn test_search_matches_hostname_or_planet_case_insensitive() {
        let catalog = vec![
            system("Kepler-22", 5500.0, vec![planet("Kepler-22 b", 2.4, 262.0)]),
            system("TRAPPIST-1", 2566.0, vec![planet("TRAPPIST-1 e", 0.9, 251.0)]),
        ];
        let by_host = Filters {
            search: "kepler".to_string(),
            ..wide_filters()
        };
        assert_eq!(names(&filter_star_systems(&catalog, &by_host)), vec!["Kepler-22"]);

        let by_planet = Filters {
            search: "1 E".to_string(),
            ..wide_filters()
        };
        assert_eq!(names(&filter_star_systems(&catalog, &by_planet)), vec!["TRAPPIST-1"]);
    }

    #[test]
    fn test_planet_filters_are_exists_quantifier() {
        // neither planet satisfies both radius and method on its own
        let mut small_rv = planet("S b", 1.0, 500.0);
        small_rv.discovery_method = "Radial Velocity".to_string();
        let big_transit = planet("S c", 20.0, 500.0);
        let catalog = vec![system("S", 5000.0, vec![small_rv, big_transit])];

        let filters = Filters {
            planet_radius_range: [0.5, 2.0],
            discovery_method: "Transit".to_string(),
            ..wide_filters()
        };
        assert!(filter_star_systems(&catalog, &filters).is_empty());

        let filters = Filters {
            planet_radius_range: [0.5, 2.0],
            ..wide_filters()
        };
        let kept = filter_star_systems(&catalog, &filters);
        // the system is kept whole, planets are not pruned
        assert_eq!(kept[0].planets.len(), 2);
    }

    #[test]
    fn test_system_without_planets_is_excluded() {
        let catalog = vec![system("Lonely", 5000.0, vec![])];
        assert!(filter_star_systems(&catalog, &Filters::default()).is_empty());
    }

    #[test]
    fn test_narrowing_ranges_never_grows_result() {
        let catalog: Vec<StarSystem> = (0..40)
            .map(|i| {
                let mut p = planet(&format!("P{}", i), 0.5 + i as f64 * 0.7, 150.0 + i as f64 * 20.0);
                p.orbital_period_days = 1.0 + i as f64 * 50.0;
                p.discovery_year = 1995 + (i % 30);
                system(&format!("S{}", i), 2500.0 + i as f64 * 200.0, vec![p])
            })
            .collect();

        let mut filters = Filters::default();
        let mut previous = filter_star_systems(&catalog, &filters).len();
        for step in 1..10 {
            let s = step as f64;
            filters.temperature_range = [2000.0 + s * 200.0, 10000.0 - s * 300.0];
            filters.planet_radius_range = [0.1 + s * 0.5, 30.0 - s];
            filters.orbital_period_range = [0.1 + s * 10.0, 5000.0 - s * 100.0];
            filters.discovery_year_range = [1995 + step, 2025 - step];
            let current = filter_star_systems(&catalog, &filters).len();
            assert!(current <= previous, "step {} grew {} -> {}", step, previous, current);
            previous = current;
        }
    }

    #[test]
    fn test_paginate_clamps() {
        let items = [1, 2, 3, 4, 5, 6, 7];
        assert_eq!(paginate(&items, 0, 5), &[1, 2, 3, 4, 5]);
        assert_eq!(paginate(&items, 5, 5), &[6, 7]);
        assert!(paginate(&items, 50, 5).is_empty());
        assert!(paginate(&items, 2, 0).is_empty());
        assert_eq!(paginate(&items, 3, usize::MAX), &[4, 5, 6, 7]);
    }

    #[test]
    fn test_statistics_zero_guard() {
        let stats = calculate_statistics(&Vec::<StarSystem>::new());
        assert_eq!(stats.total_stars, 0);
        assert_eq!(stats.average_temperature, 0.0);
        assert_eq!(stats.average_planet_radius, 0.0);

        let empty_system = vec![system("Lonely", 5000.0, vec![])];
        let stats = calculate_statistics(&empty_system);
        assert_eq!(stats.total_stars, 1);
        assert_eq!(stats.average_temperature, 0.0);
        assert!(!stats.average_planet_radius.is_nan());
    }

    #[test]
    fn test_statistics_binary_rocky_split() {
        let catalog = vec![system(
            "S",
            5000.0,
            vec![
                planet("hab", 1.0, 250.0),
                planet("cold", 1.0, 100.0),
                planet("giant", 11.0, 300.0),
            ],
        )];
        let stats = calculate_statistics(&catalog);
        assert_eq!(stats.total_planets, 3);
        assert_eq!(stats.habitable_planets, 2);
        assert_eq!(stats.gas_giants, 1);
        assert_eq!(stats.rocky_planets, 2);
        assert!((stats.average_temperature - 650.0 / 3.0).abs() < 1e-9);
        assert!((stats.average_planet_radius - 13.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.discovery_methods.len(), 1);
        assert!(stats.discovery_years.contains(&2015));
    }

    #[test]
    fn test_sort_star_systems() {
        let mut near = system("beta", 4000.0, vec![planet("b1", 1.0, 300.0)]);
        near.star_properties.distance_pc = 5.0;
        let far = system(
            "Alpha",
            6000.0,
            vec![planet("a1", 1.0, 300.0), planet("a2", 1.0, 300.0)],
        );
        let catalog = vec![near, far];

        let by_name = sort_star_systems(&catalog, SortKey::Name, SortOrder::Asc);
        assert_eq!(by_name[0].hostname, "Alpha");
        let by_distance = sort_star_systems(&catalog, SortKey::Distance, SortOrder::Asc);
        assert_eq!(by_distance[0].hostname, "beta");
        let by_planets = sort_star_systems(&catalog, SortKey::Planets, SortOrder::Desc);
        assert_eq!(by_planets[0].hostname, "Alpha");
        let by_temp = sort_star_systems(&catalog, SortKey::Temperature, SortOrder::Desc);
        assert_eq!(by_temp[0].hostname, "Alpha");
    }

    #[test]
    fn test_derived_views_page_vs_filtered() {
        let catalog: Vec<StarSystem> = (0..7)
            .map(|i| system(&format!("S{}", i), 5000.0, vec![planet(&format!("P{}", i), 1.0, 250.0)]))
            .collect();
        let filters = Filters {
            current_star_system_index: 5,
            ..Filters::default()
        };
        let views = DerivedViews::compute(&catalog, &filters);
        assert_eq!(views.total_filtered, 7);
        assert_eq!(views.systems.len(), 2);
        assert_eq!(views.filtered_planets.len(), 2);
        assert_eq!(views.page_statistics.total_stars, 2);
        assert_eq!(views.filtered_statistics.total_stars, 7);
        assert_eq!(views.summary.total_stars, 7);
        assert_eq!(views.summary.filtered_planets, 2);
    }

    #[test]
    fn test_view_cache_reuses_until_filters_change() {
        let catalog: Arc<[StarSystem]> = scenario_catalog().into();
        let mut cache = ViewCache::default();
        let filters = Filters::default();

        let first = cache.get_or_compute(&catalog, &filters);
        let second = cache.get_or_compute(&catalog, &filters);
        assert!(Arc::ptr_eq(&first, &second));

        let changed = Filters {
            temperature_range: [0.0, 50000.0],
            ..Filters::default()
        };
        let third = cache.get_or_compute(&catalog, &changed);
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.total_filtered, 2);

        let other_catalog: Arc<[StarSystem]> = scenario_catalog().into();
        let fourth = cache.get_or_compute(&other_catalog, &changed);
        assert!(!Arc::ptr_eq(&third, &fourth));
    }
}
