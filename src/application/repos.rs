//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{
    AdjustmentRecord, InventoryItemRecord, ItemStock, PondRecord, UsageRow,
    WaterQualityReadingRecord,
};
use crate::domain::locale::LocalizedText;
use crate::domain::types::{AdjustmentKind, ItemCategory, RelatedDocumentKind};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StockFilter {
    pub category: Option<ItemCategory>,
    pub include_inactive: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UsageFilter {
    pub season_id: Option<Uuid>,
    pub pond_id: Option<Uuid>,
    pub category: Option<ItemCategory>,
    pub item_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateInventoryItemParams {
    pub name: LocalizedText,
    pub category: ItemCategory,
    pub unit: String,
    pub cost_per_unit: f64,
    pub low_stock_threshold: Option<f64>,
    /// When present, the adapter appends an `initial_stock` ledger row in
    /// the same transaction as the item insert. The item itself never
    /// stores a base quantity.
    pub initial_quantity: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewAdjustmentParams {
    pub item_id: Uuid,
    pub kind: AdjustmentKind,
    pub quantity_change: f64,
    pub reason: Option<String>,
    pub pond_id: Option<Uuid>,
    pub season_id: Option<Uuid>,
    pub related_document_id: Option<Uuid>,
    pub related_document_kind: Option<RelatedDocumentKind>,
}

#[derive(Debug, Clone)]
pub struct CreatePondParams {
    pub name: LocalizedText,
    pub area_sq_m: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewReadingParams {
    pub pond_id: Uuid,
    pub season_id: Option<Uuid>,
    pub measured_at: OffsetDateTime,
    pub ph: Option<f64>,
    pub dissolved_oxygen_mg_l: Option<f64>,
    pub temperature_c: Option<f64>,
    pub salinity_ppt: Option<f64>,
    pub ammonia_mg_l: Option<f64>,
    pub notes: Option<String>,
}

#[async_trait]
pub trait InventoryRepo: Send + Sync {
    async fn create_item(
        &self,
        params: CreateInventoryItemParams,
    ) -> Result<InventoryItemRecord, RepoError>;

    async fn find_item(&self, id: Uuid) -> Result<Option<InventoryItemRecord>, RepoError>;

    async fn list_items(&self, filter: &StockFilter)
    -> Result<Vec<InventoryItemRecord>, RepoError>;

    /// Flip the item inactive and stamp `deleted_at`; the row stays in
    /// place so ledger history keeps resolving. `NotFound` when the item
    /// is absent or already inactive.
    async fn soft_delete_item(&self, id: Uuid) -> Result<InventoryItemRecord, RepoError>;

    async fn append_adjustment(
        &self,
        params: NewAdjustmentParams,
    ) -> Result<AdjustmentRecord, RepoError>;

    async fn list_adjustments(
        &self,
        item_id: Uuid,
        limit: u32,
    ) -> Result<Vec<AdjustmentRecord>, RepoError>;

    /// `SUM(quantity_change)` over the item's ledger rows; zero for an
    /// item with no rows.
    async fn current_quantity(&self, item_id: Uuid) -> Result<f64, RepoError>;

    async fn current_stock(&self, filter: &StockFilter) -> Result<Vec<ItemStock>, RepoError>;

    /// Usage projection grouped by pond and item, recomputed from the
    /// ledger and catalog on every call.
    async fn usage_summary(&self, filter: &UsageFilter) -> Result<Vec<UsageRow>, RepoError>;
}

#[async_trait]
pub trait PondsRepo: Send + Sync {
    async fn create_pond(&self, params: CreatePondParams) -> Result<PondRecord, RepoError>;

    async fn find_pond(&self, id: Uuid) -> Result<Option<PondRecord>, RepoError>;

    async fn list_ponds(&self) -> Result<Vec<PondRecord>, RepoError>;
}

#[async_trait]
pub trait ReadingsRepo: Send + Sync {
    async fn create_reading(
        &self,
        params: NewReadingParams,
    ) -> Result<WaterQualityReadingRecord, RepoError>;

    async fn list_readings(
        &self,
        pond_id: Uuid,
        limit: u32,
    ) -> Result<Vec<WaterQualityReadingRecord>, RepoError>;
}
