use async_trait::async_trait;
use sqlx::QueryBuilder;
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{
        CreateInventoryItemParams, InventoryRepo, NewAdjustmentParams, RepoError, StockFilter,
        UsageFilter,
    },
    domain::{
        entities::{AdjustmentRecord, InventoryItemRecord, ItemStock, UsageRow},
        locale::LocalizedText,
        types::{AdjustmentKind, ItemCategory, RelatedDocumentKind},
    },
};

use super::{PostgresRepositories, map_sqlx_error};

const ITEM_COLUMNS: &str = "id, name, category, unit, cost_per_unit, low_stock_threshold, \
     active, deleted_at, created_at, updated_at";

const ADJUSTMENT_COLUMNS: &str = "id, item_id, kind, quantity_change, reason, pond_id, \
     season_id, related_document_id, related_document_kind, recorded_at";

#[derive(sqlx::FromRow)]
struct InventoryItemRow {
    id: Uuid,
    name: Json<LocalizedText>,
    category: ItemCategory,
    unit: String,
    cost_per_unit: f64,
    low_stock_threshold: Option<f64>,
    active: bool,
    deleted_at: Option<OffsetDateTime>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<InventoryItemRow> for InventoryItemRecord {
    fn from(row: InventoryItemRow) -> Self {
        Self {
            id: row.id,
            name: row.name.0,
            category: row.category,
            unit: row.unit,
            cost_per_unit: row.cost_per_unit,
            low_stock_threshold: row.low_stock_threshold,
            active: row.active,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AdjustmentRow {
    id: Uuid,
    item_id: Uuid,
    kind: AdjustmentKind,
    quantity_change: f64,
    reason: Option<String>,
    pond_id: Option<Uuid>,
    season_id: Option<Uuid>,
    related_document_id: Option<Uuid>,
    related_document_kind: Option<RelatedDocumentKind>,
    recorded_at: OffsetDateTime,
}

impl From<AdjustmentRow> for AdjustmentRecord {
    fn from(row: AdjustmentRow) -> Self {
        Self {
            id: row.id,
            item_id: row.item_id,
            kind: row.kind,
            quantity_change: row.quantity_change,
            reason: row.reason,
            pond_id: row.pond_id,
            season_id: row.season_id,
            related_document_id: row.related_document_id,
            related_document_kind: row.related_document_kind,
            recorded_at: row.recorded_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ItemStockRow {
    id: Uuid,
    name: Json<LocalizedText>,
    category: ItemCategory,
    unit: String,
    cost_per_unit: f64,
    low_stock_threshold: Option<f64>,
    active: bool,
    deleted_at: Option<OffsetDateTime>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    current_quantity: f64,
}

impl From<ItemStockRow> for ItemStock {
    fn from(row: ItemStockRow) -> Self {
        Self {
            item: InventoryItemRecord {
                id: row.id,
                name: row.name.0,
                category: row.category,
                unit: row.unit,
                cost_per_unit: row.cost_per_unit,
                low_stock_threshold: row.low_stock_threshold,
                active: row.active,
                deleted_at: row.deleted_at,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            current_quantity: row.current_quantity,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UsageSummaryRow {
    pond_id: Option<Uuid>,
    item_id: Uuid,
    item_name: Json<LocalizedText>,
    category: ItemCategory,
    unit: String,
    total_quantity_used: f64,
    total_cost_used: f64,
}

impl From<UsageSummaryRow> for UsageRow {
    fn from(row: UsageSummaryRow) -> Self {
        Self {
            pond_id: row.pond_id,
            item_id: row.item_id,
            item_name: row.item_name.0,
            category: row.category,
            unit: row.unit,
            total_quantity_used: row.total_quantity_used,
            total_cost_used: row.total_cost_used,
        }
    }
}

fn apply_stock_filter<'q>(qb: &mut QueryBuilder<'q, sqlx::Postgres>, filter: &'q StockFilter) {
    if !filter.include_inactive {
        qb.push(" AND i.active ");
    }
    if let Some(category) = filter.category {
        qb.push(" AND i.category = ");
        qb.push_bind(category);
    }
}

#[async_trait]
impl InventoryRepo for PostgresRepositories {
    async fn create_item(
        &self,
        params: CreateInventoryItemParams,
    ) -> Result<InventoryItemRecord, RepoError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;

        let row: InventoryItemRow = sqlx::query_as(
            "INSERT INTO inventory_items (name, category, unit, cost_per_unit, low_stock_threshold) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, category, unit, cost_per_unit, low_stock_threshold, \
                 active, deleted_at, created_at, updated_at",
        )
        .bind(Json(&params.name))
        .bind(params.category)
        .bind(&params.unit)
        .bind(params.cost_per_unit)
        .bind(params.low_stock_threshold)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        // The only representation of an initial quantity is this ledger
        // row; the item never stores a base counter.
        if let Some(initial) = params.initial_quantity {
            sqlx::query(
                "INSERT INTO inventory_adjustments (item_id, kind, quantity_change, reason) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(row.id)
            .bind(AdjustmentKind::InitialStock)
            .bind(initial)
            .bind("initial stock at item creation")
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_item(&self, id: Uuid) -> Result<Option<InventoryItemRecord>, RepoError> {
        let row: Option<InventoryItemRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(InventoryItemRecord::from))
    }

    async fn list_items(
        &self,
        filter: &StockFilter,
    ) -> Result<Vec<InventoryItemRecord>, RepoError> {
        let mut qb = QueryBuilder::new(
            "SELECT i.id, i.name, i.category, i.unit, i.cost_per_unit, i.low_stock_threshold, \
             i.active, i.deleted_at, i.created_at, i.updated_at \
             FROM inventory_items i WHERE 1=1 ",
        );
        apply_stock_filter(&mut qb, filter);
        qb.push(" ORDER BY i.created_at ASC, i.id ASC ");

        let rows = qb
            .build_query_as::<InventoryItemRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(InventoryItemRecord::from).collect())
    }

    async fn soft_delete_item(&self, id: Uuid) -> Result<InventoryItemRecord, RepoError> {
        let row: Option<InventoryItemRow> = sqlx::query_as(&format!(
            "UPDATE inventory_items \
             SET active = FALSE, deleted_at = now(), updated_at = now() \
             WHERE id = $1 AND active \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(InventoryItemRecord::from).ok_or(RepoError::NotFound)
    }

    async fn append_adjustment(
        &self,
        params: NewAdjustmentParams,
    ) -> Result<AdjustmentRecord, RepoError> {
        let row: AdjustmentRow = sqlx::query_as(&format!(
            "INSERT INTO inventory_adjustments \
                 (item_id, kind, quantity_change, reason, pond_id, season_id, \
                  related_document_id, related_document_kind) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {ADJUSTMENT_COLUMNS}"
        ))
        .bind(params.item_id)
        .bind(params.kind)
        .bind(params.quantity_change)
        .bind(params.reason)
        .bind(params.pond_id)
        .bind(params.season_id)
        .bind(params.related_document_id)
        .bind(params.related_document_kind)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn list_adjustments(
        &self,
        item_id: Uuid,
        limit: u32,
    ) -> Result<Vec<AdjustmentRecord>, RepoError> {
        let rows: Vec<AdjustmentRow> = sqlx::query_as(&format!(
            "SELECT {ADJUSTMENT_COLUMNS} FROM inventory_adjustments \
             WHERE item_id = $1 \
             ORDER BY recorded_at DESC, id ASC \
             LIMIT $2"
        ))
        .bind(item_id)
        .bind(limit as i64)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(AdjustmentRecord::from).collect())
    }

    async fn current_quantity(&self, item_id: Uuid) -> Result<f64, RepoError> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity_change), 0)::DOUBLE PRECISION \
             FROM inventory_adjustments WHERE item_id = $1",
        )
        .bind(item_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn current_stock(&self, filter: &StockFilter) -> Result<Vec<ItemStock>, RepoError> {
        let mut qb = QueryBuilder::new(
            "SELECT i.id, i.name, i.category, i.unit, i.cost_per_unit, i.low_stock_threshold, \
             i.active, i.deleted_at, i.created_at, i.updated_at, \
             COALESCE(SUM(a.quantity_change), 0)::DOUBLE PRECISION AS current_quantity \
             FROM inventory_items i \
             LEFT JOIN inventory_adjustments a ON a.item_id = i.id \
             WHERE 1=1 ",
        );
        apply_stock_filter(&mut qb, filter);
        qb.push(" GROUP BY i.id ORDER BY i.created_at ASC, i.id ASC ");

        let rows = qb
            .build_query_as::<ItemStockRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ItemStock::from).collect())
    }

    async fn usage_summary(&self, filter: &UsageFilter) -> Result<Vec<UsageRow>, RepoError> {
        let mut qb = QueryBuilder::new(
            "SELECT a.pond_id, i.id AS item_id, i.name AS item_name, i.category, i.unit, \
             SUM(-a.quantity_change)::DOUBLE PRECISION AS total_quantity_used, \
             SUM(-a.quantity_change * i.cost_per_unit)::DOUBLE PRECISION AS total_cost_used \
             FROM inventory_adjustments a \
             INNER JOIN inventory_items i ON i.id = a.item_id \
             WHERE a.kind = ",
        );
        qb.push_bind(AdjustmentKind::Usage);

        if let Some(pond_id) = filter.pond_id {
            qb.push(" AND a.pond_id = ");
            qb.push_bind(pond_id);
        }

        if let Some(season_id) = filter.season_id {
            qb.push(" AND a.season_id = ");
            qb.push_bind(season_id);
        }

        if let Some(category) = filter.category {
            qb.push(" AND i.category = ");
            qb.push_bind(category);
        }

        if let Some(needle) = filter.item_name.as_ref().and_then(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }) {
            qb.push(
                " AND EXISTS (SELECT 1 FROM jsonb_each_text(i.name) trans \
                 WHERE trans.value ILIKE ",
            );
            qb.push_bind(format!("%{}%", needle));
            qb.push(")");
        }

        qb.push(" GROUP BY a.pond_id, i.id ORDER BY total_cost_used DESC, i.id ASC ");

        let rows = qb
            .build_query_as::<UsageSummaryRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(UsageRow::from).collect())
    }
}
