//! Inventory handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::inventory::{CreateItemCommand, RecordAdjustmentCommand};
use crate::application::repos::{StockFilter, UsageFilter};

use super::{inventory_to_api, models::*};
use crate::infra::http::error::ApiError;
use crate::infra::http::state::ApiState;

pub async fn create_item(
    State(state): State<ApiState>,
    Json(payload): Json<ItemCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = CreateItemCommand {
        name: payload.name,
        category: payload.category,
        unit: payload.unit,
        cost_per_unit: payload.cost_per_unit,
        low_stock_threshold: payload.low_stock_threshold,
        initial_quantity: payload.initial_quantity,
    };

    let record = state
        .inventory
        .create_item(command)
        .await
        .map_err(inventory_to_api)?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list_items(
    State(state): State<ApiState>,
    Query(query): Query<ItemListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = StockFilter {
        category: query.category,
        include_inactive: query.include_inactive,
    };

    let items = state
        .inventory
        .list_items(&filter)
        .await
        .map_err(inventory_to_api)?;

    let views: Vec<ItemView> = items
        .into_iter()
        .map(|record| item_view(record, &query.lang))
        .collect();

    Ok(Json(views))
}

pub async fn get_item(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LangQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let stock = state
        .inventory
        .item_with_quantity(id)
        .await
        .map_err(inventory_to_api)?
        .ok_or_else(|| ApiError::not_found("inventory item not found"))?;

    Ok(Json(stock_view(stock, &query.lang)))
}

pub async fn delete_item(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .inventory
        .soft_delete_item(id)
        .await
        .map_err(inventory_to_api)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_adjustment(
    State(state): State<ApiState>,
    Json(payload): Json<AdjustmentCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(quantity_change) = payload.quantity_change else {
        return Err(ApiError::bad_request(
            "validation failed",
            Some("quantity_change is required".to_string()),
        ));
    };

    let command = RecordAdjustmentCommand {
        item_id: payload.inventory_item_id,
        kind: payload.adjustment_type,
        quantity_change,
        reason: payload.reason,
        pond_id: payload.pond_id,
        season_id: payload.season_id,
        related_document_id: payload.related_document_id,
        related_document_kind: payload.related_document_kind,
    };

    let record = state
        .inventory
        .record_adjustment(command)
        .await
        .map_err(inventory_to_api)?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list_adjustments(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.unwrap_or(100).clamp(1, 500);

    let history = state
        .inventory
        .list_adjustments(id, limit)
        .await
        .map_err(inventory_to_api)?;

    Ok(Json(history))
}

pub async fn aggregated(
    State(state): State<ApiState>,
    Query(query): Query<AggregatedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let stock_filter = StockFilter {
        category: query.category,
        include_inactive: false,
    };
    let usage_filter = UsageFilter {
        season_id: query.season_id,
        pond_id: query.pond_id,
        category: query.category,
        item_name: query.item_name.clone(),
    };

    let stock = state
        .inventory
        .stock_levels(&stock_filter)
        .await
        .map_err(inventory_to_api)?;
    let usage = state
        .inventory
        .usage_summary(&usage_filter)
        .await
        .map_err(inventory_to_api)?;

    let response = AggregatedInventoryResponse {
        current_stock: stock
            .into_iter()
            .map(|row| stock_view(row, &query.lang))
            .collect(),
        usage_summary: usage
            .into_iter()
            .map(|row| usage_view(row, &query.lang))
            .collect(),
    };

    Ok(Json(response))
}
