//! Exoplanet catalog explorer: an in-memory catalog with a filter/selection
//! state engine, served as a JSON API.

pub mod clients;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod handlers;
pub mod repo;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

pub use handlers::AppState;
pub use routes::build_router;
