//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::locale::LocalizedText;
use crate::domain::types::{AdjustmentKind, ItemCategory, RelatedDocumentKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PondRecord {
    pub id: Uuid,
    pub name: LocalizedText,
    pub area_sq_m: Option<f64>,
    pub active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryItemRecord {
    pub id: Uuid,
    pub name: LocalizedText,
    pub category: ItemCategory,
    pub unit: String,
    pub cost_per_unit: f64,
    pub low_stock_threshold: Option<f64>,
    pub active: bool,
    pub deleted_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// One row of the append-only stock ledger. Rows are never updated or
/// deleted; an item's current quantity is the sum of its rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentRecord {
    pub id: Uuid,
    pub item_id: Uuid,
    pub kind: AdjustmentKind,
    pub quantity_change: f64,
    pub reason: Option<String>,
    pub pond_id: Option<Uuid>,
    pub season_id: Option<Uuid>,
    pub related_document_id: Option<Uuid>,
    pub related_document_kind: Option<RelatedDocumentKind>,
    pub recorded_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterQualityReadingRecord {
    pub id: Uuid,
    pub pond_id: Uuid,
    pub season_id: Option<Uuid>,
    pub measured_at: OffsetDateTime,
    pub ph: Option<f64>,
    pub dissolved_oxygen_mg_l: Option<f64>,
    pub temperature_c: Option<f64>,
    pub salinity_ppt: Option<f64>,
    pub ammonia_mg_l: Option<f64>,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Derived stock level for one item, recomputed from the ledger on read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemStock {
    pub item: InventoryItemRecord,
    pub current_quantity: f64,
}

impl ItemStock {
    /// True when a threshold is set and the derived quantity sits at or
    /// below it.
    pub fn is_low(&self) -> bool {
        self.item
            .low_stock_threshold
            .is_some_and(|threshold| self.current_quantity <= threshold)
    }
}

/// One grouped row of the usage projection: total consumption and cost of
/// an item against a pond.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRow {
    pub pond_id: Option<Uuid>,
    pub item_id: Uuid,
    pub item_name: LocalizedText,
    pub category: ItemCategory,
    pub unit: String,
    pub total_quantity_used: f64,
    pub total_cost_used: f64,
}
