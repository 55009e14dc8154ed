//! Request and response models for the JSON API.
//!
//! Write endpoints echo full records (every translation included); read
//! endpoints serialize localized views resolved through
//! [`LocalizedText::localize`] with the request's `lang` parameter.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{InventoryItemRecord, ItemStock, PondRecord, UsageRow};
use crate::domain::locale::{FALLBACK_LANGUAGE, LocalizedText};
use crate::domain::types::{AdjustmentKind, ItemCategory, RelatedDocumentKind};

fn default_lang() -> String {
    FALLBACK_LANGUAGE.to_string()
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct ItemCreateRequest {
    pub name: LocalizedText,
    pub category: ItemCategory,
    pub unit: String,
    pub cost_per_unit: f64,
    pub low_stock_threshold: Option<f64>,
    pub initial_quantity: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AdjustmentCreateRequest {
    pub inventory_item_id: Uuid,
    pub adjustment_type: AdjustmentKind,
    /// Optional at the wire level so a missing value maps to a 400 with a
    /// precise hint instead of a generic deserialization failure.
    pub quantity_change: Option<f64>,
    pub reason: Option<String>,
    pub pond_id: Option<Uuid>,
    pub season_id: Option<Uuid>,
    pub related_document_id: Option<Uuid>,
    pub related_document_kind: Option<RelatedDocumentKind>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PondCreateRequest {
    pub name: LocalizedText,
    pub area_sq_m: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TreatmentRequest {
    pub item_id: Uuid,
    pub quantity: f64,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReadingCreateRequest {
    pub season_id: Option<Uuid>,
    pub measured_at: OffsetDateTime,
    pub ph: Option<f64>,
    pub dissolved_oxygen_mg_l: Option<f64>,
    pub temperature_c: Option<f64>,
    pub salinity_ppt: Option<f64>,
    pub ammonia_mg_l: Option<f64>,
    pub notes: Option<String>,
    #[serde(default)]
    pub treatments: Vec<TreatmentRequest>,
}

// ============================================================================
// Query parameters
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LangQuery {
    #[serde(default = "default_lang")]
    pub lang: String,
}

#[derive(Debug, Deserialize)]
pub struct ItemListQuery {
    pub category: Option<ItemCategory>,
    #[serde(default)]
    pub include_inactive: bool,
    #[serde(default = "default_lang")]
    pub lang: String,
}

#[derive(Debug, Deserialize)]
pub struct AggregatedQuery {
    pub season_id: Option<Uuid>,
    pub pond_id: Option<Uuid>,
    pub category: Option<ItemCategory>,
    pub item_name: Option<String>,
    #[serde(default = "default_lang")]
    pub lang: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

// ============================================================================
// Localized views
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ItemView {
    pub id: Uuid,
    pub name: String,
    pub category: ItemCategory,
    pub unit: String,
    pub cost_per_unit: f64,
    pub low_stock_threshold: Option<f64>,
    pub active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub fn item_view(record: InventoryItemRecord, lang: &str) -> ItemView {
    let name = record.name.localize(lang).to_string();
    ItemView {
        id: record.id,
        name,
        category: record.category,
        unit: record.unit,
        cost_per_unit: record.cost_per_unit,
        low_stock_threshold: record.low_stock_threshold,
        active: record.active,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

#[derive(Debug, Serialize)]
pub struct ItemStockView {
    #[serde(flatten)]
    pub item: ItemView,
    pub current_quantity: f64,
    pub low_stock: bool,
}

pub fn stock_view(stock: ItemStock, lang: &str) -> ItemStockView {
    let low_stock = stock.is_low();
    ItemStockView {
        item: item_view(stock.item, lang),
        current_quantity: stock.current_quantity,
        low_stock,
    }
}

#[derive(Debug, Serialize)]
pub struct UsageRowView {
    pub pond_id: Option<Uuid>,
    pub item_id: Uuid,
    pub item_name: String,
    pub category: ItemCategory,
    pub unit: String,
    pub total_quantity_used: f64,
    pub total_cost_used: f64,
}

pub fn usage_view(row: UsageRow, lang: &str) -> UsageRowView {
    let item_name = row.item_name.localize(lang).to_string();
    UsageRowView {
        pond_id: row.pond_id,
        item_id: row.item_id,
        item_name,
        category: row.category,
        unit: row.unit,
        total_quantity_used: row.total_quantity_used,
        total_cost_used: row.total_cost_used,
    }
}

#[derive(Debug, Serialize)]
pub struct PondView {
    pub id: Uuid,
    pub name: String,
    pub area_sq_m: Option<f64>,
    pub active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub fn pond_view(record: PondRecord, lang: &str) -> PondView {
    let name = record.name.localize(lang).to_string();
    PondView {
        id: record.id,
        name,
        area_sq_m: record.area_sq_m,
        active: record.active,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

#[derive(Debug, Serialize)]
pub struct AggregatedInventoryResponse {
    pub current_stock: Vec<ItemStockView>,
    pub usage_summary: Vec<UsageRowView>,
}
