//! Pond handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::ponds::CreatePondCommand;

use super::{models::*, pond_to_api};
use crate::infra::http::error::ApiError;
use crate::infra::http::state::ApiState;

pub async fn create_pond(
    State(state): State<ApiState>,
    Json(payload): Json<PondCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CreatePondCommand {
        name: payload.name,
        area_sq_m: payload.area_sq_m,
    };

    let record = state
        .ponds
        .create_pond(command)
        .await
        .map_err(pond_to_api)?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list_ponds(
    State(state): State<ApiState>,
    Query(query): Query<LangQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ponds = state.ponds.list_ponds().await.map_err(pond_to_api)?;

    let views: Vec<PondView> = ponds
        .into_iter()
        .map(|record| pond_view(record, &query.lang))
        .collect();

    Ok(Json(views))
}

pub async fn get_pond(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LangQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pond = state
        .ponds
        .find_pond(id)
        .await
        .map_err(pond_to_api)?
        .ok_or_else(|| ApiError::not_found("pond not found"))?;

    Ok(Json(pond_view(pond, &query.lang)))
}
