/// Business logic services layer
use crate::domain::{
    FavoriteItem, Health, Planet, PlanetDetail, PlanetDisplay, StarSystem, StatisticsReport,
    SystemDetail, SystemDisplay, SystemPage, TelescopeStyle,
};
use crate::engine::{
    categorize_planet, is_in_habitable_zone, sort_star_systems, DerivedViews, SortKey, SortOrder,
    StellarClass, ViewCache,
};
use crate::errors::{ApiError, ApiResult};
use crate::repo::CatalogRepo;
use crate::store::{reduce, Action, ExplorerState};
use crate::utils::{
    celestial_to_cartesian, format_distance, format_mass, format_percentage, format_period,
    format_radius, format_solar_mass, format_solar_radius, format_temperature, format_year,
    orbital_radius, planet_color, planet_render_size, planet_size, star_render_size,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// State and memoized views, guarded together
struct Store {
    state: ExplorerState,
    cache: ViewCache,
}

impl Store {
    fn apply(&mut self, action: Action) {
        debug!("Dispatching {}", action_kind(&action));
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    fn views(&mut self, catalog: &CatalogRepo) -> Arc<DerivedViews> {
        self.cache
            .get_or_compute(catalog.systems(), &self.state.filters)
    }

    fn page(&mut self, catalog: &CatalogRepo) -> SystemPage {
        let views = self.views(catalog);
        let filters = &self.state.filters;
        SystemPage {
            systems: views.systems.clone(),
            total_filtered: views.total_filtered,
            current_star_system_index: filters.current_star_system_index,
            max_star_systems: filters.max_star_systems,
            has_next: filters
                .current_star_system_index
                .saturating_add(filters.max_star_systems)
                < views.total_filtered,
            has_previous: filters.current_star_system_index > 0,
        }
    }
}

/// Owner of the explorer state.
///
/// All transitions run under one lock, so toggles that read then dispatch
/// are atomic with respect to every other transition.
pub struct ExplorerService {
    catalog: CatalogRepo,
    store: Mutex<Store>,
}

impl ExplorerService {
    pub fn new(catalog: CatalogRepo, initial: ExplorerState) -> Self {
        Self {
            catalog,
            store: Mutex::new(Store {
                state: initial,
                cache: ViewCache::default(),
            }),
        }
    }

    pub fn catalog(&self) -> &CatalogRepo {
        &self.catalog
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> ExplorerState {
        self.store.lock().await.state.clone()
    }

    pub async fn dispatch(&self, action: Action) -> ExplorerState {
        let mut store = self.store.lock().await;
        store.apply(action);
        store.state.clone()
    }

    /// Decode a JSON action and apply it; unknown kinds leave state unchanged
    pub async fn dispatch_value(&self, value: Value) -> ApiResult<ExplorerState> {
        match Action::decode(value)? {
            Some(action) => Ok(self.dispatch(action).await),
            None => {
                debug!("Ignoring unknown action");
                Ok(self.snapshot().await)
            }
        }
    }

    /// Called once after the catalog load attempt, whatever its outcome
    pub async fn finish_loading(&self) {
        self.dispatch(Action::SetLoading(false)).await;
        info!("Explorer ready with {} systems", self.catalog.len());
    }

    pub async fn views(&self) -> Arc<DerivedViews> {
        self.store.lock().await.views(&self.catalog)
    }

    pub async fn page(&self) -> SystemPage {
        self.store.lock().await.page(&self.catalog)
    }

    pub async fn filtered_planets(&self) -> Vec<Planet> {
        self.views().await.filtered_planets.clone()
    }

    pub async fn statistics(&self) -> StatisticsReport {
        let views = self.views().await;
        let filtered = &views.filtered_statistics;
        let share = if filtered.total_planets > 0 {
            filtered.habitable_planets as f64 / filtered.total_planets as f64
        } else {
            0.0
        };
        StatisticsReport {
            summary: views.summary,
            page: views.page_statistics.clone(),
            filtered: filtered.clone(),
            habitable_share: format_percentage(share),
        }
    }

    /// Advance one page, only when a further page exists
    pub async fn next_page(&self) -> SystemPage {
        let mut store = self.store.lock().await;
        if store.page(&self.catalog).has_next {
            store.apply(Action::NextStarSystemBatch);
        }
        store.page(&self.catalog)
    }

    pub async fn previous_page(&self) -> SystemPage {
        let mut store = self.store.lock().await;
        store.apply(Action::PreviousStarSystemBatch);
        store.page(&self.catalog)
    }

    /// Jump to an offset, clamped so the page is never past the last system
    pub async fn set_page_index(&self, index: usize) -> SystemPage {
        let mut store = self.store.lock().await;
        let total = store.views(&self.catalog).total_filtered;
        store.apply(Action::SetStarSystemIndex(index.min(total.saturating_sub(1))));
        store.page(&self.catalog)
    }

    pub async fn is_favorite(&self, item: &FavoriteItem) -> bool {
        self.store.lock().await.state.is_favorite(item)
    }

    /// Flip favorite membership; returns whether the item is now a favorite
    pub async fn toggle_favorite(&self, item: FavoriteItem) -> bool {
        let mut store = self.store.lock().await;
        let action = store.state.toggle_favorite_action(item.clone());
        store.apply(action);
        store.state.is_favorite(&item)
    }

    /// Flip multi-selection membership; returns whether the planet is now selected
    pub async fn toggle_multi_select(&self, planet: Planet) -> bool {
        let mut store = self.store.lock().await;
        let action = store.state.toggle_multi_select_action(planet.clone());
        store.apply(action);
        store.state.is_multi_selected(&planet)
    }

    /// Whole catalog in the requested order
    pub fn sorted_catalog(&self, key: SortKey, order: SortOrder) -> Vec<StarSystem> {
        sort_star_systems(self.catalog.systems(), key, order)
    }

    pub async fn planet_detail(&self, planet_name: &str) -> ApiResult<PlanetDetail> {
        let (system, planet) = self
            .catalog
            .find_planet(planet_name)
            .ok_or_else(|| ApiError::NotFound(format!("planet {}", planet_name)))?;

        let store = self.store.lock().await;
        let scale = store.state.view_controls.scale_planet_sizes;
        let favorite = store
            .state
            .is_favorite(&FavoriteItem::Planet(planet.clone()));
        let multi_selected = store.state.is_multi_selected(planet);
        drop(store);

        Ok(PlanetDetail {
            hostname: system.hostname.clone(),
            category: categorize_planet(planet),
            habitable: is_in_habitable_zone(planet),
            favorite,
            multi_selected,
            display: PlanetDisplay {
                temperature: format_temperature(planet.equilibrium_temp_k),
                radius: format_radius(planet.radius_earth),
                mass: planet.mass_earth.map(format_mass),
                period: format_period(planet.orbital_period_days),
                discovery_year: format_year(planet.discovery_year),
                color: planet_color(planet.equilibrium_temp_k),
                render_size: planet_render_size(planet.radius_earth, scale),
                marker_size: planet_size(planet.radius_earth),
                orbit_radius: orbital_radius(
                    planet.orbital_period_days,
                    system.star_properties.mass_solar,
                ),
                telescope: planet
                    .discovery_facility
                    .as_deref()
                    .map(TelescopeStyle::for_facility),
            },
            planet: planet.clone(),
        })
    }

    pub async fn system_detail(&self, hostname: &str) -> ApiResult<SystemDetail> {
        let system = self
            .catalog
            .find_system(hostname)
            .ok_or_else(|| ApiError::NotFound(format!("star system {}", hostname)))?;

        let favorite = self
            .is_favorite(&FavoriteItem::System(system.clone()))
            .await;
        let star = &system.star_properties;
        let class = StellarClass::from_temperature(star.temperature_k);

        Ok(SystemDetail {
            stellar_class: class.label(),
            star_color: class.color_hex(),
            favorite,
            display: SystemDisplay {
                temperature: format_temperature(star.temperature_k),
                radius: format_solar_radius(star.radius_solar),
                mass: format_solar_mass(star.mass_solar),
                distance: format_distance(star.distance_pc),
                position: celestial_to_cartesian(star.ra_deg, star.dec_deg, star.distance_pc),
                render_size: star_render_size(star.radius_solar),
            },
            system: system.clone(),
        })
    }

    pub async fn health(&self) -> Health {
        Health {
            status: "ok",
            now: Utc::now(),
            catalog_systems: self.catalog.len(),
            loaded_at: self.catalog.loaded_at(),
            is_loading: self.store.lock().await.state.is_loading,
        }
    }
}

fn action_kind(action: &Action) -> &'static str {
    match action {
        Action::SetSelectedStar(_) => "SET_SELECTED_STAR",
        Action::SetSelectedPlanet(_) => "SET_SELECTED_PLANET",
        Action::SetSelectedStarSystem(_) => "SET_SELECTED_STAR_SYSTEM",
        Action::AddToMultiSelection(_) => "ADD_TO_MULTI_SELECTION",
        Action::RemoveFromMultiSelection(_) => "REMOVE_FROM_MULTI_SELECTION",
        Action::ClearMultiSelection => "CLEAR_MULTI_SELECTION",
        Action::AddToFavorites(_) => "ADD_TO_FAVORITES",
        Action::RemoveFromFavorites(_) => "REMOVE_FROM_FAVORITES",
        Action::UpdateFilters(_) => "UPDATE_FILTERS",
        Action::UpdateViewControls(_) => "UPDATE_VIEW_CONTROLS",
        Action::SetCameraPreset(_) => "SET_CAMERA_PRESET",
        Action::SetLoading(_) => "SET_LOADING",
        Action::NextStarSystemBatch => "NEXT_STAR_SYSTEM_BATCH",
        Action::PreviousStarSystemBatch => "PREVIOUS_STAR_SYSTEM_BATCH",
        Action::SetStarSystemIndex(_) => "SET_STAR_SYSTEM_INDEX",
        Action::ResetFilters => "RESET_FILTERS",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FiltersPatch, PlanetCategory, StarProperties, ViewControlsPatch};

    fn planet(name: &str, radius: f64, eq_temp: f64) -> Planet {
        Planet {
            planet_name: name.to_string(),
            radius_earth: radius,
            mass_earth: Some(1.0),
            equilibrium_temp_k: eq_temp,
            insolation_earth: None,
            eccentricity: None,
            orbital_period_days: 365.25,
            discovery_year: 2012,
            discovery_method: "Transit".to_string(),
            discovery_facility: None,
        }
    }

    fn system(hostname: &str, planets: Vec<Planet>) -> StarSystem {
        StarSystem {
            hostname: hostname.to_string(),
            star_properties: StarProperties {
                temperature_k: 5778.0,
                radius_solar: 1.0,
                mass_solar: 1.0,
                metallicity: None,
                distance_pc: 10.0,
                ra_deg: 0.0,
                dec_deg: 0.0,
                spectral_type: Some("G2V".to_string()),
            },
            planets,
        }
    }

    fn service(count: usize) -> ExplorerService {
        let systems = (0..count)
            .map(|i| {
                system(
                    &format!("Star-{}", i),
                    vec![planet(&format!("Star-{} b", i), 1.0, 250.0)],
                )
            })
            .collect();
        ExplorerService::new(CatalogRepo::new(systems), ExplorerState::default())
    }

    #[tokio::test]
    async fn test_view_controls_change_reuses_views() {
        let service = service(3);
        let before = service.views().await;
        service
            .dispatch(Action::UpdateViewControls(ViewControlsPatch {
                show_orbits: Some(false),
                ..Default::default()
            }))
            .await;
        service.dispatch(Action::SetCameraPreset("system".into())).await;
        let after = service.views().await;
        assert!(Arc::ptr_eq(&before, &after));

        service
            .dispatch(Action::UpdateFilters(FiltersPatch {
                search: Some("Star-1".into()),
                ..Default::default()
            }))
            .await;
        let filtered = service.views().await;
        assert!(!Arc::ptr_eq(&before, &filtered));
        assert_eq!(filtered.total_filtered, 1);
    }

    #[tokio::test]
    async fn test_next_page_stops_at_last_page() {
        let service = service(7);
        let page = service.next_page().await;
        assert_eq!(page.current_star_system_index, 5);
        assert_eq!(page.systems.len(), 2);
        assert!(!page.has_next);

        let page = service.next_page().await;
        assert_eq!(page.current_star_system_index, 5);

        let page = service.previous_page().await;
        assert_eq!(page.current_star_system_index, 0);
        let page = service.previous_page().await;
        assert_eq!(page.current_star_system_index, 0);
        assert!(!page.has_previous);
    }

    #[tokio::test]
    async fn test_set_page_index_clamps_to_filtered_count() {
        let service = service(7);
        let page = service.set_page_index(100).await;
        assert_eq!(page.current_star_system_index, 6);
        assert_eq!(page.systems.len(), 1);

        let empty = ExplorerService::new(CatalogRepo::empty(), ExplorerState::default());
        assert_eq!(empty.set_page_index(3).await.current_star_system_index, 0);
    }

    #[tokio::test]
    async fn test_toggle_favorite_round_trip() {
        let service = service(1);
        let item = FavoriteItem::System(service.catalog().systems()[0].clone());
        assert!(service.toggle_favorite(item.clone()).await);
        assert!(service.is_favorite(&item).await);
        assert!(!service.toggle_favorite(item.clone()).await);
        assert!(service.snapshot().await.favorites.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_toggles_never_duplicate() {
        let service = Arc::new(service(1));
        let p = service.catalog().systems()[0].planets[0].clone();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let service = Arc::clone(&service);
                let p = p.clone();
                tokio::spawn(async move { service.toggle_multi_select(p).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        // an even number of flips lands back on empty
        assert!(service.snapshot().await.multi_selected_planets.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_action_leaves_state_unchanged() {
        let service = service(2);
        let before = service.snapshot().await;
        let after = service
            .dispatch_value(serde_json::json!({"type": "WARP_DRIVE", "payload": 9}))
            .await
            .unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_finish_loading_clears_flag_on_empty_catalog() {
        let service = ExplorerService::new(CatalogRepo::empty(), ExplorerState::default());
        assert!(service.health().await.is_loading);
        service.finish_loading().await;
        let health = service.health().await;
        assert!(!health.is_loading);
        assert_eq!(health.catalog_systems, 0);
        assert_eq!(service.page().await.total_filtered, 0);
    }

    #[tokio::test]
    async fn test_survey_planet_detail_carries_telescope_style() {
        let service = ExplorerService::new(
            CatalogRepo::new(crate::repo::sample_catalog()),
            ExplorerState::default(),
        );
        let detail = service.planet_detail("Kepler Sample 2").await.unwrap();
        let style = detail.display.telescope.unwrap();
        assert_eq!(style.primary_color, "#10b981");
        assert!((0.53..=2.0).contains(&detail.display.marker_size));
    }

    #[tokio::test]
    async fn test_planet_and_system_detail() {
        let service = service(1);
        let detail = service.planet_detail("Star-0 b").await.unwrap();
        assert_eq!(detail.hostname, "Star-0");
        assert_eq!(detail.category, PlanetCategory::Habitable);
        assert!(detail.habitable);
        assert!(!detail.favorite);
        assert_eq!(detail.display.temperature, "250 K");
        assert_eq!(detail.display.mass.as_deref(), Some("1.00 M⊕"));
        assert!(detail.display.telescope.is_none());

        let system = service.system_detail("Star-0").await.unwrap();
        assert_eq!(system.stellar_class, "G");
        assert_eq!(system.star_color, "#ffff00");
        assert_eq!(system.display.temperature, "5,778 K");

        assert!(matches!(
            service.planet_detail("nope").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_statistics_report() {
        let service = service(7);
        let report = service.statistics().await;
        assert_eq!(report.summary.total_stars, 7);
        assert_eq!(report.summary.filtered_planets, 5);
        assert_eq!(report.page.total_planets, 5);
        assert_eq!(report.filtered.total_planets, 7);
        assert_eq!(report.habitable_share, "100.0%");
    }
}
