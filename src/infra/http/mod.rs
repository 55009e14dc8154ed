pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

pub use state::ApiState;

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use sqlx::Error as SqlxError;

use crate::application::error::ErrorReport;
use crate::cache::{CacheState, response_cache_layer};
use crate::infra::db::PostgresRepositories;

/// Read/write API router with the response-cache layer wrapped around it.
/// The layer order matters: the request-context layer runs first on the
/// way in, the cache layer runs last before the handlers so cache hits are
/// still logged.
pub fn build_api_router(state: ApiState, cache: CacheState) -> Router {
    Router::new()
        .route(
            "/api/v1/inventory/items",
            get(handlers::inventory::list_items).post(handlers::inventory::create_item),
        )
        .route(
            "/api/v1/inventory/items/{id}",
            get(handlers::inventory::get_item).delete(handlers::inventory::delete_item),
        )
        .route(
            "/api/v1/inventory/items/{id}/adjustments",
            get(handlers::inventory::list_adjustments),
        )
        .route(
            "/api/v1/inventory/adjustments",
            post(handlers::inventory::create_adjustment),
        )
        .route(
            "/api/v1/inventory/aggregated",
            get(handlers::inventory::aggregated),
        )
        .route(
            "/api/v1/ponds",
            get(handlers::ponds::list_ponds).post(handlers::ponds::create_pond),
        )
        .route("/api/v1/ponds/{id}", get(handlers::ponds::get_pond))
        .route(
            "/api/v1/ponds/{id}/readings",
            get(handlers::readings::list_readings).post(handlers::readings::create_reading),
        )
        .route("/api/v1/admin/cache/purge", post(handlers::admin::purge_cache))
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            cache,
            response_cache_layer,
        ))
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

/// Liveness/readiness router. Mounted beside the API router, outside the
/// cache layer, so health state is never served stale.
pub fn health_router(db: Arc<PostgresRepositories>) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .with_state(db)
}

async fn health(State(db): State<Arc<PostgresRepositories>>) -> Response {
    db_health_response(db.health_check().await)
}

fn db_health_response(result: Result<(), SqlxError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
