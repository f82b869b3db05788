//! demslope Service - HTTP microservice for terrain elevation and slope queries.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DEMSLOPE_DATA_DIR` | Directory containing DEM tiles | Current directory |
//! | `DEMSLOPE_PORT` | HTTP server port | 8080 |
//! | `DEMSLOPE_REMOTE_URL` | Point-elevation endpoint, `none`/`off` to disable | OpenTopoData srtm90m |
//! | `DEMSLOPE_REMOTE_TIMEOUT_SECS` | Remote request timeout | 10 |
//! | `DEMSLOPE_SLOPE_SOURCE` | `table` or `raster` | `table` |
//! | `DEMSLOPE_SLOPE_TABLE` | JSON slope table | Built-in table |
//! | `DEMSLOPE_SITES` | JSON site registry | Built-in sites |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /terrain?lat=X&lon=Y` - Elevation and slope at coordinates
//! - `GET /terrain/{lat}/{lon}` - Same, with coordinates in the path
//! - `GET /site/{name}` - Elevation and slope at a named site
//! - `GET /health` - Health check
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use demslope::{TerrainResolver, TerrainResolverBuilder};
use demslope_service::{handlers, router, AppState};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation for the terrain service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "demslope Terrain Service",
        version = "0.1.0",
        description = "REST API for terrain elevation and slope from local DEM tiles with remote fallback.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::get_terrain,
        handlers::get_terrain_path,
        handlers::get_site,
        handlers::health_check,
    ),
    components(
        schemas(
            handlers::TerrainQuery,
            handlers::TerrainResponse,
            handlers::SiteResponse,
            handlers::ErrorResponse,
            handlers::HealthResponse,
        )
    ),
    tags(
        (name = "terrain", description = "Elevation and slope query endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
struct ApiDoc;

/// Build the resolver from environment variables.
///
/// Falls back to the current directory when `DEMSLOPE_DATA_DIR` is unset.
fn build_resolver() -> demslope::Result<TerrainResolver> {
    if std::env::var_os("DEMSLOPE_DATA_DIR").is_none() {
        tracing::warn!("DEMSLOPE_DATA_DIR not set, using current directory");
    }
    TerrainResolverBuilder::from_env_or(".")?.build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "demslope_service=info,demslope=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load port from environment (service-specific config)
    let port: u16 = std::env::var("DEMSLOPE_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    // The remote fallback uses a blocking HTTP client, which must be created
    // outside the async runtime.
    let resolver = tokio::task::spawn_blocking(build_resolver).await??;

    tracing::info!(
        data_dir = %resolver.data_dir().display(),
        slope_source = resolver.slope_provider().name(),
        remote = resolver.has_remote(),
        sites = resolver.sites().len(),
        port = port,
        "Starting demslope service"
    );

    let state = Arc::new(AppState { resolver });

    // Build router
    let app = router(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
