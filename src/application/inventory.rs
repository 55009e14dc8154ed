//! Inventory service: catalog writes and the append-only stock ledger.
//!
//! Quantities are never stored as a mutable counter. Every stock change is
//! an independent ledger append, and every quantity surfaced to callers is
//! recomputed as the sum of the item's rows.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::application::repos::{
    CreateInventoryItemParams, InventoryRepo, NewAdjustmentParams, RepoError, StockFilter,
    UsageFilter,
};
use crate::cache::CacheInvalidator;
use crate::domain::entities::{AdjustmentRecord, InventoryItemRecord, ItemStock, UsageRow};
use crate::domain::locale::LocalizedText;
use crate::domain::types::{AdjustmentKind, ItemCategory, RelatedDocumentKind};

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error("inventory item missing or inactive")]
    ItemUnavailable,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreateItemCommand {
    pub name: LocalizedText,
    pub category: ItemCategory,
    pub unit: String,
    pub cost_per_unit: f64,
    pub low_stock_threshold: Option<f64>,
    pub initial_quantity: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RecordAdjustmentCommand {
    pub item_id: Uuid,
    pub kind: AdjustmentKind,
    pub quantity_change: f64,
    pub reason: Option<String>,
    pub pond_id: Option<Uuid>,
    pub season_id: Option<Uuid>,
    pub related_document_id: Option<Uuid>,
    pub related_document_kind: Option<RelatedDocumentKind>,
}

#[derive(Clone)]
pub struct InventoryService {
    repo: Arc<dyn InventoryRepo>,
    invalidator: Option<Arc<CacheInvalidator>>,
}

impl InventoryService {
    pub fn new(repo: Arc<dyn InventoryRepo>) -> Self {
        Self {
            repo,
            invalidator: None,
        }
    }

    /// Set the cache invalidator for this service (optional).
    pub fn with_invalidator_opt(mut self, invalidator: Option<Arc<CacheInvalidator>>) -> Self {
        self.invalidator = invalidator;
        self
    }

    pub async fn create_item(
        &self,
        command: CreateItemCommand,
    ) -> Result<InventoryItemRecord, InventoryError> {
        if command.name.is_blank() {
            return Err(InventoryError::ConstraintViolation("name"));
        }
        if command.unit.trim().is_empty() {
            return Err(InventoryError::ConstraintViolation("unit"));
        }
        if !command.cost_per_unit.is_finite() || command.cost_per_unit < 0.0 {
            return Err(InventoryError::ConstraintViolation("cost_per_unit"));
        }
        if let Some(threshold) = command.low_stock_threshold
            && (!threshold.is_finite() || threshold < 0.0)
        {
            return Err(InventoryError::ConstraintViolation("low_stock_threshold"));
        }
        if let Some(initial) = command.initial_quantity
            && (!initial.is_finite() || initial <= 0.0)
        {
            return Err(InventoryError::ConstraintViolation("initial_quantity"));
        }

        let params = CreateInventoryItemParams {
            name: command.name,
            category: command.category,
            unit: command.unit.trim().to_string(),
            cost_per_unit: command.cost_per_unit,
            low_stock_threshold: command.low_stock_threshold,
            initial_quantity: command.initial_quantity,
        };

        let item = self.repo.create_item(params).await?;
        self.invalidate();
        Ok(item)
    }

    pub async fn find_item(
        &self,
        id: Uuid,
    ) -> Result<Option<InventoryItemRecord>, InventoryError> {
        self.repo.find_item(id).await.map_err(InventoryError::from)
    }

    pub async fn list_items(
        &self,
        filter: &StockFilter,
    ) -> Result<Vec<InventoryItemRecord>, InventoryError> {
        self.repo
            .list_items(filter)
            .await
            .map_err(InventoryError::from)
    }

    /// Soft delete: the item stops accepting adjustments but its ledger
    /// history stays intact and countable. Irreversible.
    pub async fn soft_delete_item(
        &self,
        id: Uuid,
    ) -> Result<InventoryItemRecord, InventoryError> {
        let item = self.repo.soft_delete_item(id).await?;
        self.invalidate();
        Ok(item)
    }

    /// Append one signed ledger row. The referenced item must exist and be
    /// active; history against later-deactivated items remains valid, but
    /// no new rows may target them.
    pub async fn record_adjustment(
        &self,
        command: RecordAdjustmentCommand,
    ) -> Result<AdjustmentRecord, InventoryError> {
        if !command.quantity_change.is_finite() || command.quantity_change == 0.0 {
            return Err(InventoryError::ConstraintViolation("quantity_change"));
        }

        match self.repo.find_item(command.item_id).await? {
            Some(item) if item.active => {}
            _ => return Err(InventoryError::ItemUnavailable),
        }

        let params = NewAdjustmentParams {
            item_id: command.item_id,
            kind: command.kind,
            quantity_change: command.quantity_change,
            reason: command.reason,
            pond_id: command.pond_id,
            season_id: command.season_id,
            related_document_id: command.related_document_id,
            related_document_kind: command.related_document_kind,
        };

        let record = self.repo.append_adjustment(params).await?;
        self.invalidate();
        Ok(record)
    }

    /// The item (active or not) with its derived quantity, or `None` when
    /// the id is unknown.
    pub async fn item_with_quantity(
        &self,
        id: Uuid,
    ) -> Result<Option<ItemStock>, InventoryError> {
        let Some(item) = self.repo.find_item(id).await? else {
            return Ok(None);
        };
        let current_quantity = self.repo.current_quantity(id).await?;
        Ok(Some(ItemStock {
            item,
            current_quantity,
        }))
    }

    /// Ledger history for an item. Soft-deleted items keep their history
    /// readable; only unknown ids are an error.
    pub async fn list_adjustments(
        &self,
        item_id: Uuid,
        limit: u32,
    ) -> Result<Vec<AdjustmentRecord>, InventoryError> {
        if self.repo.find_item(item_id).await?.is_none() {
            return Err(InventoryError::Repo(RepoError::NotFound));
        }
        self.repo
            .list_adjustments(item_id, limit)
            .await
            .map_err(InventoryError::from)
    }

    pub async fn stock_levels(
        &self,
        filter: &StockFilter,
    ) -> Result<Vec<ItemStock>, InventoryError> {
        self.repo
            .current_stock(filter)
            .await
            .map_err(InventoryError::from)
    }

    pub async fn usage_summary(
        &self,
        filter: &UsageFilter,
    ) -> Result<Vec<UsageRow>, InventoryError> {
        self.repo
            .usage_summary(filter)
            .await
            .map_err(InventoryError::from)
    }

    fn invalidate(&self) {
        if let Some(invalidator) = &self.invalidator {
            invalidator.inventory_changed();
        }
    }
}
