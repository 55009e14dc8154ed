//! Maintenance handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::infra::http::state::ApiState;

/// Unconditionally drop every cached response. Maintenance path only;
/// normal write flow relies on targeted prefix invalidation.
pub async fn purge_cache(State(state): State<ApiState>) -> impl IntoResponse {
    state.invalidator.purge_all();
    StatusCode::NO_CONTENT
}
