pub mod diet;
pub mod health;
pub mod range;
pub mod sleep;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::oura::models::SleepDocument;
use crate::services::rate_limit::ClientIpKeyExtractor;

/// Body limit for export webhooks
const INGEST_BODY_LIMIT: usize = 16 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        health::readyz,
        sleep::list_sleep,
        sleep::get_sleep_by_day,
        sleep::get_sleep,
        sleep::create_sleep,
        diet::ingest_dietary_energy,
        diet::echo,
        diet::list_diet,
    ),
    components(
        schemas(
            sleep::SleepRecordResponse,
            sleep::SleepRangeResponse,
            SleepDocument,
            diet::HealthExport,
            diet::ExportData,
            diet::ExportMetric,
            diet::DietIngestResponse,
            diet::DietDayResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sleep", description = "Stored sleep sessions"),
        (name = "diet", description = "Daily dietary energy from health exports"),
    ),
    info(
        title = "Oura Sleep API",
        description = "Sleep sessions synced from the Oura Ring API, plus dietary energy from health exports",
        version = "0.1.0"
    )
)]
struct ApiDoc;

/// Build the HTTP router.
///
/// # Errors
///
/// Returns `AppError::Internal` if the rate limiter configuration is rejected
/// (zero rate or burst).
pub fn build_router(state: AppState) -> AppResult<Router> {
    let config = &state.config;

    let data_routes = Router::new()
        .route("/sleep", get(sleep::list_sleep).post(sleep::create_sleep))
        .route("/sleep/day/{day}", get(sleep::get_sleep_by_day))
        .route("/sleep/{id}", get(sleep::get_sleep))
        .route("/diet", get(diet::list_diet));

    let api_routes = if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
        data_routes
    } else {
        tracing::info!(
            per_second = config.rate_limit_per_second,
            burst = config.rate_limit_burst,
            "Rate limiting configured"
        );

        let limiter = GovernorConfigBuilder::default()
            .key_extractor(ClientIpKeyExtractor)
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .finish()
            .ok_or_else(|| AppError::Internal("Invalid rate limiter configuration".to_string()))?;

        data_routes.layer(GovernorLayer {
            config: Arc::new(limiter),
        })
    }
    .layer(RequestBodyLimitLayer::new(1024 * 1024)); // 1MB body limit

    // Export webhooks: paths fixed by the exporting app, bodies can be a full day of metrics
    let ingest_routes = Router::new()
        .route("/dietary-energy/", post(diet::ingest_dietary_energy))
        .route("/echo/", post(diet::echo))
        .layer(DefaultBodyLimit::max(INGEST_BODY_LIMIT))
        .layer(RequestBodyLimitLayer::new(INGEST_BODY_LIMIT));

    // Health check routes (NO rate limiting)
    let health_routes = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    Ok(Router::new()
        .nest("/api", api_routes)
        .merge(ingest_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
