/// Application routes configuration
use crate::handlers::{
    dispatch, get_catalog_planet, get_catalog_system, get_planets, get_state, get_statistics,
    get_systems, health, list_catalog, next_page, previous_page, set_page_index, toggle_favorite,
    toggle_multi_selection, AppState,
};
use axum::{
    routing::{get, post},
    Router,
};

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health))
        // State container
        .route("/state", get(get_state))
        .route("/dispatch", post(dispatch))
        // Derived views
        .route("/systems", get(get_systems))
        .route("/planets", get(get_planets))
        .route("/statistics", get(get_statistics))
        // Catalog lookups
        .route("/catalog/systems", get(list_catalog))
        .route("/catalog/systems/:hostname", get(get_catalog_system))
        .route("/catalog/planets/:name", get(get_catalog_planet))
        // Selection
        .route("/favorites/toggle", post(toggle_favorite))
        .route("/multi-selection/toggle", post(toggle_multi_selection))
        // Pagination
        .route("/pages/next", post(next_page))
        .route("/pages/previous", post(previous_page))
        .route("/pages/index", post(set_page_index))
        .with_state(state)
}
