//! Water-quality reading handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::readings::{RecordReadingCommand, TreatmentUsage};

use super::{models::*, reading_to_api};
use crate::infra::http::error::ApiError;
use crate::infra::http::state::ApiState;

pub async fn create_reading(
    State(state): State<ApiState>,
    Path(pond_id): Path<Uuid>,
    Json(payload): Json<ReadingCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = RecordReadingCommand {
        pond_id,
        season_id: payload.season_id,
        measured_at: payload.measured_at,
        ph: payload.ph,
        dissolved_oxygen_mg_l: payload.dissolved_oxygen_mg_l,
        temperature_c: payload.temperature_c,
        salinity_ppt: payload.salinity_ppt,
        ammonia_mg_l: payload.ammonia_mg_l,
        notes: payload.notes,
        treatments: payload
            .treatments
            .into_iter()
            .map(|treatment| TreatmentUsage {
                item_id: treatment.item_id,
                quantity: treatment.quantity,
                note: treatment.note,
            })
            .collect(),
    };

    let result = state
        .readings
        .record_reading(command)
        .await
        .map_err(reading_to_api)?;

    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn list_readings(
    State(state): State<ApiState>,
    Path(pond_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.unwrap_or(100).clamp(1, 500);

    let readings = state
        .readings
        .list_readings(pond_id, limit)
        .await
        .map_err(reading_to_api)?;

    Ok(Json(readings))
}
