/// HTTP request handlers
use crate::domain::{
    FavoriteItem, Health, Planet, PlanetDetail, StarSystem, StatisticsReport, SystemDetail,
    SystemPage,
};
use crate::engine::{SortKey, SortOrder};
use crate::errors::ApiError;
use crate::services::ExplorerService;
use crate::store::ExplorerState;
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub explorer: Arc<ExplorerService>,
}

/// Successful response wrapper
#[derive(Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub ok: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { ok: true, data }
    }
}

/// JSON body extractor whose rejections use the error envelope
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query extractor whose rejections use the error envelope
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

type JsonResult<T> = Result<Json<SuccessResponse<T>>, ApiError>;

fn ok<T: Serialize>(data: T) -> JsonResult<T> {
    Ok(Json(SuccessResponse::new(data)))
}

#[derive(Serialize)]
pub struct StateBody {
    pub state: ExplorerState,
}

#[derive(Serialize)]
pub struct PlanetsBody {
    pub planets: Vec<Planet>,
}

#[derive(Serialize)]
pub struct SystemsBody {
    pub systems: Vec<StarSystem>,
}

#[derive(Serialize)]
pub struct ToggleBody {
    pub key: String,
    pub active: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SortParams {
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub order: SortOrder,
}

#[derive(Debug, Deserialize)]
pub struct IndexBody {
    pub index: usize,
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(state.explorer.health().await)
}

/// Current state snapshot
pub async fn get_state(State(state): State<AppState>) -> JsonResult<StateBody> {
    ok(StateBody {
        state: state.explorer.snapshot().await,
    })
}

/// Apply one action and return the resulting state
pub async fn dispatch(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> JsonResult<StateBody> {
    let next = state.explorer.dispatch_value(body).await?;
    ok(StateBody { state: next })
}

/// Current page of filtered systems
pub async fn get_systems(State(state): State<AppState>) -> JsonResult<SystemPage> {
    ok(state.explorer.page().await)
}

/// Planets of the current page
pub async fn get_planets(State(state): State<AppState>) -> JsonResult<PlanetsBody> {
    ok(PlanetsBody {
        planets: state.explorer.filtered_planets().await,
    })
}

pub async fn get_statistics(State(state): State<AppState>) -> JsonResult<StatisticsReport> {
    ok(state.explorer.statistics().await)
}

/// Whole catalog, sorted
pub async fn list_catalog(
    ApiQuery(params): ApiQuery<SortParams>,
    State(state): State<AppState>,
) -> JsonResult<SystemsBody> {
    ok(SystemsBody {
        systems: state.explorer.sorted_catalog(params.sort, params.order),
    })
}

pub async fn get_catalog_system(
    Path(hostname): Path<String>,
    State(state): State<AppState>,
) -> JsonResult<SystemDetail> {
    ok(state.explorer.system_detail(&hostname).await?)
}

pub async fn get_catalog_planet(
    Path(planet_name): Path<String>,
    State(state): State<AppState>,
) -> JsonResult<PlanetDetail> {
    ok(state.explorer.planet_detail(&planet_name).await?)
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    ApiJson(item): ApiJson<FavoriteItem>,
) -> JsonResult<ToggleBody> {
    let key = item.key().to_string();
    let active = state.explorer.toggle_favorite(item).await;
    ok(ToggleBody { key, active })
}

pub async fn toggle_multi_selection(
    State(state): State<AppState>,
    ApiJson(planet): ApiJson<Planet>,
) -> JsonResult<ToggleBody> {
    let key = planet.planet_name.clone();
    let active = state.explorer.toggle_multi_select(planet).await;
    ok(ToggleBody { key, active })
}

pub async fn next_page(State(state): State<AppState>) -> JsonResult<SystemPage> {
    ok(state.explorer.next_page().await)
}

pub async fn previous_page(State(state): State<AppState>) -> JsonResult<SystemPage> {
    ok(state.explorer.previous_page().await)
}

/// Jump to an offset, clamped to the filtered count
pub async fn set_page_index(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<IndexBody>,
) -> JsonResult<SystemPage> {
    ok(state.explorer.set_page_index(body.index).await)
}
