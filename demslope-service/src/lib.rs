//! demslope Service Library
//!
//! HTTP handlers and types for the terrain service.
//! This library is used by both the demslope-service binary and integration tests.

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use demslope::TerrainResolver;

/// Application state shared across handlers.
pub struct AppState {
    /// Resolver for terrain queries.
    pub resolver: TerrainResolver,
}

/// Build the API router (without docs or middleware layers).
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/terrain", get(handlers::get_terrain))
        .route("/terrain/:lat/:lon", get(handlers::get_terrain_path))
        .route("/site/:name", get(handlers::get_site))
        .route("/health", get(handlers::health_check))
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use handlers::{ErrorResponse, HealthResponse, SiteResponse, TerrainQuery, TerrainResponse};
