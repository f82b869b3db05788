//! HTTP request handlers for the terrain service.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use demslope::{Coordinate, SiteReport, TerrainError, TerrainReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::AppState;

/// Query parameters for the terrain endpoint.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct TerrainQuery {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

/// Terrain attributes at a coordinate.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TerrainResponse {
    /// Latitude queried.
    pub latitude: f64,
    /// Longitude queried.
    pub longitude: f64,
    /// Elevation in meters, `null` when unavailable.
    pub elevation_m: Option<f64>,
    /// Slope in degrees, `null` when unavailable.
    pub slope_deg: Option<f64>,
}

impl From<TerrainReport> for TerrainResponse {
    fn from(report: TerrainReport) -> Self {
        Self {
            latitude: report.latitude,
            longitude: report.longitude,
            elevation_m: report.elevation_m,
            slope_deg: report.slope_deg,
        }
    }
}

/// Terrain attributes at a named site.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SiteResponse {
    /// Site name.
    pub name: String,
    /// Representative latitude of the site.
    pub latitude: f64,
    /// Representative longitude of the site.
    pub longitude: f64,
    /// Elevation in meters, `null` when unavailable.
    pub elevation_m: Option<f64>,
    /// Slope in degrees, `null` when unavailable.
    pub slope_deg: Option<f64>,
}

impl From<SiteReport> for SiteResponse {
    fn from(report: SiteReport) -> Self {
        Self {
            name: report.name,
            latitude: report.latitude,
            longitude: report.longitude,
            elevation_m: report.elevation_m,
            slope_deg: report.slope_deg,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Get terrain attributes for given coordinates.
///
/// # Returns
///
/// - `200 OK` with elevation and slope (either may be `null`)
/// - `400 Bad Request` if parameters are missing or not numbers
/// - `500 Internal Server Error` if the covering tile is corrupt
#[utoipa::path(
    get,
    path = "/terrain",
    tag = "terrain",
    params(TerrainQuery),
    responses(
        (status = 200, description = "Terrain attributes", body = TerrainResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 500, description = "Tile could not be read", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn get_terrain(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TerrainQuery>,
) -> Response {
    resolve_point(state, Coordinate::new(query.lat, query.lon)).await
}

/// Get terrain attributes with coordinates in the path.
#[utoipa::path(
    get,
    path = "/terrain/{lat}/{lon}",
    tag = "terrain",
    params(
        ("lat" = f64, Path, description = "Latitude in decimal degrees"),
        ("lon" = f64, Path, description = "Longitude in decimal degrees")
    ),
    responses(
        (status = 200, description = "Terrain attributes", body = TerrainResponse),
        (status = 400, description = "Invalid path parameters"),
        (status = 500, description = "Tile could not be read", body = ErrorResponse)
    )
)]
pub async fn get_terrain_path(
    State(state): State<Arc<AppState>>,
    Path((lat, lon)): Path<(f64, f64)>,
) -> Response {
    resolve_point(state, Coordinate::new(lat, lon)).await
}

/// Get terrain attributes for a named site.
#[utoipa::path(
    get,
    path = "/site/{name}",
    tag = "terrain",
    params(("name" = String, Path, description = "Site name (case-insensitive)")),
    responses(
        (status = 200, description = "Site terrain attributes", body = SiteResponse),
        (status = 404, description = "Unknown site or missing site tile", body = ErrorResponse),
        (status = 500, description = "Tile could not be read", body = ErrorResponse)
    )
)]
pub async fn get_site(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    tracing::debug!(site = %name, "Site query");

    let lookup = name.clone();
    let result = tokio::task::spawn_blocking(move || state.resolver.resolve_site(&lookup)).await;

    match result {
        Ok(Ok(report)) => {
            tracing::info!(
                site = %report.name,
                elevation = ?report.elevation_m,
                slope = ?report.slope_deg,
                "Site resolved"
            );
            (StatusCode::OK, Json(SiteResponse::from(report))).into_response()
        }
        Ok(Err(e)) => {
            tracing::warn!(site = %name, error = %e, "Site query failed");
            error_response(e)
        }
        Err(e) => join_error_response(e),
    }
}

/// Resolve a coordinate off the async runtime.
async fn resolve_point(state: Arc<AppState>, coordinate: Coordinate) -> Response {
    tracing::debug!(
        lat = coordinate.latitude,
        lon = coordinate.longitude,
        "Terrain query"
    );

    let result = tokio::task::spawn_blocking(move || state.resolver.resolve(coordinate)).await;

    match result {
        Ok(Ok(resolution)) => {
            let report = resolution.into_report();
            tracing::info!(
                lat = report.latitude,
                lon = report.longitude,
                elevation = ?report.elevation_m,
                slope = ?report.slope_deg,
                "Terrain resolved"
            );
            (StatusCode::OK, Json(TerrainResponse::from(report))).into_response()
        }
        Ok(Err(e)) => {
            tracing::warn!(
                lat = coordinate.latitude,
                lon = coordinate.longitude,
                error = %e,
                "Terrain query failed"
            );
            error_response(e)
        }
        Err(e) => join_error_response(e),
    }
}

/// Map a library error to a status code and JSON body.
fn error_response(e: TerrainError) -> Response {
    let status = match &e {
        TerrainError::UnknownSite { .. } | TerrainError::TileNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(ErrorResponse { error: e.to_string() })).into_response()
}

fn join_error_response(e: tokio::task::JoinError) -> Response {
    tracing::error!(error = %e, "Resolution task failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal error".to_string(),
        }),
    )
        .into_response()
}

/// Health check endpoint.
///
/// Returns service status and version.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
