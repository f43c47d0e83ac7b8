//! HTTP surface of the to-do API.
//!
//! # Endpoints
//!
//! - `GET /health`: Health check
//! - `GET /api-docs`: Interactive API reference
//! - `GET /api-docs/openapi.json`: Generated OpenAPI document
//! - `/api/items`: Item CRUD (see [`items`])
//! - `/api/lists`: List CRUD (see [`lists`])
//!
//! A trailing slash is ignored, so `/api/items/` routes like `/api/items`.

pub mod error;
pub mod items;
pub mod lists;
pub mod openapi;
pub mod storage;

pub use storage::Store;

use axum::{routing::get, Json, Router};
use serde::Serialize;
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// The application service: the router behind trailing-slash trimming.
pub type App = NormalizePath<Router>;

/// Builds the application service.
///
/// Path normalization wraps the router from outside, since a layer added
/// with `Router::layer` only runs after a route has been matched.
pub fn router(state: AppState) -> App {
    let api_routes = Router::new()
        .nest("/items", items::routes())
        .nest("/lists", lists::routes());

    let router = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .merge(openapi::docs_ui())
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    NormalizePath::trim_trailing_slash(router)
}
