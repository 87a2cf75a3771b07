//! Explorer state container and its reducer.
//!
//! Every mutation is an [`Action`] fed through [`reduce`], a pure
//! `(state, action) -> state` transition. Nothing here performs I/O.

use crate::domain::{
    FavoriteItem, Filters, FiltersPatch, Planet, StarSystem, ViewControls, ViewControlsPatch,
};
use crate::errors::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Discrete state transitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    SetSelectedStar(Option<StarSystem>),
    SetSelectedPlanet(Option<Planet>),
    SetSelectedStarSystem(Option<StarSystem>),
    AddToMultiSelection(Planet),
    RemoveFromMultiSelection(Planet),
    ClearMultiSelection,
    AddToFavorites(FavoriteItem),
    RemoveFromFavorites(FavoriteItem),
    UpdateFilters(FiltersPatch),
    UpdateViewControls(ViewControlsPatch),
    SetCameraPreset(String),
    SetLoading(bool),
    NextStarSystemBatch,
    PreviousStarSystemBatch,
    SetStarSystemIndex(usize),
    ResetFilters,
}

impl Action {
    /// Wire names of every action kind
    pub const KINDS: [&'static str; 16] = [
        "SET_SELECTED_STAR",
        "SET_SELECTED_PLANET",
        "SET_SELECTED_STAR_SYSTEM",
        "ADD_TO_MULTI_SELECTION",
        "REMOVE_FROM_MULTI_SELECTION",
        "CLEAR_MULTI_SELECTION",
        "ADD_TO_FAVORITES",
        "REMOVE_FROM_FAVORITES",
        "UPDATE_FILTERS",
        "UPDATE_VIEW_CONTROLS",
        "SET_CAMERA_PRESET",
        "SET_LOADING",
        "NEXT_STAR_SYSTEM_BATCH",
        "PREVIOUS_STAR_SYSTEM_BATCH",
        "SET_STAR_SYSTEM_INDEX",
        "RESET_FILTERS",
    ];

    /// Decode an action from its JSON envelope.
    ///
    /// Unknown kinds decode to `None` and are ignored by the caller. A known
    /// kind with a malformed payload is rejected.
    pub fn decode(value: Value) -> ApiResult<Option<Action>> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::InvalidInput("action requires a string `type`".into()))?;

        if !Self::KINDS.contains(&kind) {
            return Ok(None);
        }

        let kind = kind.to_string();
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ApiError::InvalidInput(format!("malformed {} payload: {}", kind, e)))
    }
}

/// The whole explorer state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerState {
    pub selected_star: Option<StarSystem>,
    pub selected_planet: Option<Planet>,
    pub selected_star_system: Option<StarSystem>,
    pub multi_selected_planets: Vec<Planet>,
    pub favorites: Vec<FavoriteItem>,
    pub filters: Filters,
    pub view_controls: ViewControls,
    pub camera_preset: String,
    pub is_loading: bool,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self {
            selected_star: None,
            selected_planet: None,
            selected_star_system: None,
            multi_selected_planets: Vec::new(),
            favorites: Vec::new(),
            filters: Filters::default(),
            view_controls: ViewControls::default(),
            camera_preset: "galaxy".to_string(),
            is_loading: true,
        }
    }
}

impl ExplorerState {
    /// Initial state with a configured page size
    pub fn with_page_size(max_star_systems: usize) -> Self {
        let mut state = Self::default();
        state.filters.max_star_systems = max_star_systems;
        state
    }

    pub fn is_favorite(&self, item: &FavoriteItem) -> bool {
        self.favorites.iter().any(|fav| fav.same_key(item))
    }

    pub fn is_multi_selected(&self, planet: &Planet) -> bool {
        self.multi_selected_planets
            .iter()
            .any(|p| p.planet_name == planet.planet_name)
    }

    /// Action that flips favorite membership of `item`
    pub fn toggle_favorite_action(&self, item: FavoriteItem) -> Action {
        if self.is_favorite(&item) {
            Action::RemoveFromFavorites(item)
        } else {
            Action::AddToFavorites(item)
        }
    }

    /// Action that flips multi-selection membership of `planet`
    pub fn toggle_multi_select_action(&self, planet: Planet) -> Action {
        if self.is_multi_selected(&planet) {
            Action::RemoveFromMultiSelection(planet)
        } else {
            Action::AddToMultiSelection(planet)
        }
    }
}

/// Apply one action. Pure: no I/O, no failure.
pub fn reduce(mut state: ExplorerState, action: Action) -> ExplorerState {
    match action {
        Action::SetSelectedStar(star) => {
            state.selected_star_system = star.clone();
            state.selected_star = star;
            state.selected_planet = None;
        }
        Action::SetSelectedPlanet(planet) => {
            // selected_star_system survives so the system context is kept
            state.selected_planet = planet;
            state.selected_star = None;
        }
        Action::SetSelectedStarSystem(system) => {
            state.selected_star = system.clone();
            state.selected_star_system = system;
            state.selected_planet = None;
        }
        Action::AddToMultiSelection(planet) => {
            if !state.is_multi_selected(&planet) {
                state.multi_selected_planets.push(planet);
            }
        }
        Action::RemoveFromMultiSelection(planet) => {
            state
                .multi_selected_planets
                .retain(|p| p.planet_name != planet.planet_name);
        }
        Action::ClearMultiSelection => state.multi_selected_planets.clear(),
        Action::AddToFavorites(item) => state.favorites.push(item),
        Action::RemoveFromFavorites(item) => state.favorites.retain(|fav| !fav.same_key(&item)),
        Action::UpdateFilters(patch) => state.filters = state.filters.merge(patch),
        Action::UpdateViewControls(patch) => {
            state.view_controls = state.view_controls.merge(patch)
        }
        Action::SetCameraPreset(preset) => state.camera_preset = preset,
        Action::SetLoading(loading) => state.is_loading = loading,
        Action::NextStarSystemBatch => {
            state.filters.current_star_system_index += state.filters.max_star_systems;
        }
        Action::PreviousStarSystemBatch => {
            state.filters.current_star_system_index = state
                .filters
                .current_star_system_index
                .saturating_sub(state.filters.max_star_systems);
        }
        Action::SetStarSystemIndex(index) => state.filters.current_star_system_index = index,
        Action::ResetFilters => state.filters = Filters::default(),
    }
    state
}
