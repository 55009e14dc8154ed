//! Ledger semantics end to end: derived quantities under concurrency and
//! the degraded-but-available policy for treatment side effects.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use stagno::application::inventory::{InventoryService, RecordAdjustmentCommand};
use stagno::application::readings::{
    ReadingError, ReadingService, RecordReadingCommand, TreatmentUsage,
};
use stagno::application::repos::{
    CreateInventoryItemParams, CreatePondParams, InventoryRepo, NewAdjustmentParams,
    NewReadingParams, PondsRepo, ReadingsRepo, RepoError, StockFilter, UsageFilter,
};
use stagno::domain::entities::{
    AdjustmentRecord, InventoryItemRecord, ItemStock, PondRecord, UsageRow,
    WaterQualityReadingRecord,
};
use stagno::domain::locale::LocalizedText;
use stagno::domain::types::{AdjustmentKind, ItemCategory};

#[derive(Default)]
struct Ledger {
    items: Mutex<HashMap<Uuid, InventoryItemRecord>>,
    rows: Mutex<Vec<AdjustmentRecord>>,
}

impl Ledger {
    fn seed_item(&self, name: &str, cost_per_unit: f64) -> Uuid {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        self.items.lock().expect("items lock").insert(
            id,
            InventoryItemRecord {
                id,
                name: LocalizedText::new().with("en", name),
                category: ItemCategory::Chemical,
                unit: "kg".to_string(),
                cost_per_unit,
                low_stock_threshold: None,
                active: true,
                deleted_at: None,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    fn sum(&self, item_id: Uuid) -> f64 {
        self.rows
            .lock()
            .expect("rows lock")
            .iter()
            .filter(|row| row.item_id == item_id)
            .map(|row| row.quantity_change)
            .sum()
    }
}

#[async_trait]
impl InventoryRepo for Ledger {
    async fn create_item(
        &self,
        params: CreateInventoryItemParams,
    ) -> Result<InventoryItemRecord, RepoError> {
        let id = self.seed_item("created", params.cost_per_unit);
        let item = self
            .items
            .lock()
            .expect("items lock")
            .get(&id)
            .cloned()
            .expect("seeded item");
        if let Some(initial) = params.initial_quantity {
            self.rows.lock().expect("rows lock").push(AdjustmentRecord {
                id: Uuid::new_v4(),
                item_id: id,
                kind: AdjustmentKind::InitialStock,
                quantity_change: initial,
                reason: None,
                pond_id: None,
                season_id: None,
                related_document_id: None,
                related_document_kind: None,
                recorded_at: OffsetDateTime::now_utc(),
            });
        }
        Ok(item)
    }

    async fn find_item(&self, id: Uuid) -> Result<Option<InventoryItemRecord>, RepoError> {
        Ok(self.items.lock().expect("items lock").get(&id).cloned())
    }

    async fn list_items(
        &self,
        _filter: &StockFilter,
    ) -> Result<Vec<InventoryItemRecord>, RepoError> {
        Ok(self
            .items
            .lock()
            .expect("items lock")
            .values()
            .cloned()
            .collect())
    }

    async fn soft_delete_item(&self, id: Uuid) -> Result<InventoryItemRecord, RepoError> {
        let mut items = self.items.lock().expect("items lock");
        match items.get_mut(&id) {
            Some(item) if item.active => {
                item.active = false;
                item.deleted_at = Some(OffsetDateTime::now_utc());
                Ok(item.clone())
            }
            _ => Err(RepoError::NotFound),
        }
    }

    async fn append_adjustment(
        &self,
        params: NewAdjustmentParams,
    ) -> Result<AdjustmentRecord, RepoError> {
        let record = AdjustmentRecord {
            id: Uuid::new_v4(),
            item_id: params.item_id,
            kind: params.kind,
            quantity_change: params.quantity_change,
            reason: params.reason,
            pond_id: params.pond_id,
            season_id: params.season_id,
            related_document_id: params.related_document_id,
            related_document_kind: params.related_document_kind,
            recorded_at: OffsetDateTime::now_utc(),
        };
        self.rows.lock().expect("rows lock").push(record.clone());
        Ok(record)
    }

    async fn list_adjustments(
        &self,
        item_id: Uuid,
        limit: u32,
    ) -> Result<Vec<AdjustmentRecord>, RepoError> {
        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .filter(|row| row.item_id == item_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn current_quantity(&self, item_id: Uuid) -> Result<f64, RepoError> {
        Ok(self.sum(item_id))
    }

    async fn current_stock(&self, filter: &StockFilter) -> Result<Vec<ItemStock>, RepoError> {
        let items = self.list_items(filter).await?;
        let mut stock = Vec::with_capacity(items.len());
        for item in items {
            let current_quantity = self.sum(item.id);
            stock.push(ItemStock {
                item,
                current_quantity,
            });
        }
        Ok(stock)
    }

    async fn usage_summary(&self, filter: &UsageFilter) -> Result<Vec<UsageRow>, RepoError> {
        let items = self.items.lock().expect("items lock").clone();
        let rows = self.rows.lock().expect("rows lock").clone();
        let mut grouped: HashMap<(Option<Uuid>, Uuid), UsageRow> = HashMap::new();

        for row in rows
            .iter()
            .filter(|row| row.kind == AdjustmentKind::Usage)
            .filter(|row| filter.pond_id.is_none_or(|p| Some(p) == row.pond_id))
        {
            let Some(item) = items.get(&row.item_id) else {
                continue;
            };
            let entry = grouped
                .entry((row.pond_id, row.item_id))
                .or_insert_with(|| UsageRow {
                    pond_id: row.pond_id,
                    item_id: item.id,
                    item_name: item.name.clone(),
                    category: item.category,
                    unit: item.unit.clone(),
                    total_quantity_used: 0.0,
                    total_cost_used: 0.0,
                });
            entry.total_quantity_used += -row.quantity_change;
            entry.total_cost_used += -row.quantity_change * item.cost_per_unit;
        }

        Ok(grouped.into_values().collect())
    }
}

#[derive(Default)]
struct Ponds {
    ponds: Mutex<HashMap<Uuid, PondRecord>>,
}

impl Ponds {
    fn seed(&self, active: bool) -> Uuid {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        self.ponds.lock().expect("ponds lock").insert(
            id,
            PondRecord {
                id,
                name: LocalizedText::new().with("en", "Pond 1"),
                area_sq_m: None,
                active,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }
}

#[async_trait]
impl PondsRepo for Ponds {
    async fn create_pond(&self, params: CreatePondParams) -> Result<PondRecord, RepoError> {
        let id = self.seed(true);
        let mut ponds = self.ponds.lock().expect("ponds lock");
        let pond = ponds.get_mut(&id).expect("seeded pond");
        pond.name = params.name;
        pond.area_sq_m = params.area_sq_m;
        Ok(pond.clone())
    }

    async fn find_pond(&self, id: Uuid) -> Result<Option<PondRecord>, RepoError> {
        Ok(self.ponds.lock().expect("ponds lock").get(&id).cloned())
    }

    async fn list_ponds(&self) -> Result<Vec<PondRecord>, RepoError> {
        Ok(self
            .ponds
            .lock()
            .expect("ponds lock")
            .values()
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct Readings {
    readings: Mutex<Vec<WaterQualityReadingRecord>>,
}

#[async_trait]
impl ReadingsRepo for Readings {
    async fn create_reading(
        &self,
        params: NewReadingParams,
    ) -> Result<WaterQualityReadingRecord, RepoError> {
        let record = WaterQualityReadingRecord {
            id: Uuid::new_v4(),
            pond_id: params.pond_id,
            season_id: params.season_id,
            measured_at: params.measured_at,
            ph: params.ph,
            dissolved_oxygen_mg_l: params.dissolved_oxygen_mg_l,
            temperature_c: params.temperature_c,
            salinity_ppt: params.salinity_ppt,
            ammonia_mg_l: params.ammonia_mg_l,
            notes: params.notes,
            created_at: OffsetDateTime::now_utc(),
        };
        self.readings
            .lock()
            .expect("readings lock")
            .push(record.clone());
        Ok(record)
    }

    async fn list_readings(
        &self,
        pond_id: Uuid,
        limit: u32,
    ) -> Result<Vec<WaterQualityReadingRecord>, RepoError> {
        Ok(self
            .readings
            .lock()
            .expect("readings lock")
            .iter()
            .filter(|row| row.pond_id == pond_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

fn reading_command(pond_id: Uuid, treatments: Vec<TreatmentUsage>) -> RecordReadingCommand {
    RecordReadingCommand {
        pond_id,
        season_id: None,
        measured_at: OffsetDateTime::now_utc(),
        ph: Some(7.9),
        dissolved_oxygen_mg_l: Some(5.2),
        temperature_c: Some(29.0),
        salinity_ppt: None,
        ammonia_mg_l: None,
        notes: None,
        treatments,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adjustments_both_count() {
    let ledger = Arc::new(Ledger::default());
    let item_id = ledger.seed_item("Fish Feed", 2.0);
    let service = InventoryService::new(ledger.clone());

    let plus = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .record_adjustment(RecordAdjustmentCommand {
                    item_id,
                    kind: AdjustmentKind::Purchase,
                    quantity_change: 10.0,
                    reason: None,
                    pond_id: None,
                    season_id: None,
                    related_document_id: None,
                    related_document_kind: None,
                })
                .await
        })
    };
    let minus = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .record_adjustment(RecordAdjustmentCommand {
                    item_id,
                    kind: AdjustmentKind::Usage,
                    quantity_change: -3.0,
                    reason: None,
                    pond_id: None,
                    season_id: None,
                    related_document_id: None,
                    related_document_kind: None,
                })
                .await
        })
    };

    plus.await.expect("join").expect("plus adjustment");
    minus.await.expect("join").expect("minus adjustment");

    // both appends landed; the derived sum is order-independent
    assert_eq!(ledger.sum(item_id), 7.0);
}

#[tokio::test]
async fn failed_treatment_is_reported_not_fatal() {
    let ledger = Arc::new(Ledger::default());
    let ponds = Arc::new(Ponds::default());
    let readings = Arc::new(Readings::default());

    let pond_id = ponds.seed(true);
    let lime = ledger.seed_item("Lime", 0.8);
    let ghost = Uuid::new_v4();

    let service = ReadingService::new(
        readings.clone(),
        ponds.clone(),
        InventoryService::new(ledger.clone()),
    );

    let result = service
        .record_reading(reading_command(
            pond_id,
            vec![
                TreatmentUsage {
                    item_id: lime,
                    quantity: 3.0,
                    note: Some("ph correction".to_string()),
                },
                TreatmentUsage {
                    item_id: ghost,
                    quantity: 1.0,
                    note: None,
                },
            ],
        ))
        .await
        .expect("reading persists");

    assert_eq!(result.treatments.len(), 2);
    assert!(result.treatments[0].is_recorded());
    assert!(!result.treatments[1].is_recorded());

    // the reading and the one good ledger row both landed
    assert_eq!(readings.readings.lock().expect("lock").len(), 1);
    assert_eq!(ledger.sum(lime), -3.0);
}

#[tokio::test]
async fn nonpositive_treatment_quantity_rejects_the_request() {
    let ledger = Arc::new(Ledger::default());
    let ponds = Arc::new(Ponds::default());
    let readings = Arc::new(Readings::default());

    let pond_id = ponds.seed(true);
    let lime = ledger.seed_item("Lime", 0.8);

    let service = ReadingService::new(
        readings.clone(),
        ponds.clone(),
        InventoryService::new(ledger.clone()),
    );

    let result = service
        .record_reading(reading_command(
            pond_id,
            vec![TreatmentUsage {
                item_id: lime,
                quantity: 0.0,
                note: None,
            }],
        ))
        .await;

    assert!(matches!(
        result,
        Err(ReadingError::ConstraintViolation("treatment quantity"))
    ));
    // validation happens before the primary write
    assert!(readings.readings.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn inactive_pond_rejects_readings() {
    let ledger = Arc::new(Ledger::default());
    let ponds = Arc::new(Ponds::default());
    let readings = Arc::new(Readings::default());

    let pond_id = ponds.seed(false);

    let service = ReadingService::new(
        readings.clone(),
        ponds.clone(),
        InventoryService::new(ledger),
    );

    let result = service
        .record_reading(reading_command(pond_id, Vec::new()))
        .await;

    assert!(matches!(result, Err(ReadingError::PondUnavailable)));
}

#[tokio::test]
async fn treatment_usage_flows_into_the_pond_scoped_projection() {
    let ledger = Arc::new(Ledger::default());
    let ponds = Arc::new(Ponds::default());
    let readings = Arc::new(Readings::default());

    let pond_id = ponds.seed(true);
    let other_pond = ponds.seed(true);
    let chlorine = ledger.seed_item("Chlorine", 4.0);

    let inventory = InventoryService::new(ledger.clone());
    let service = ReadingService::new(readings, ponds, inventory.clone());

    service
        .record_reading(reading_command(
            pond_id,
            vec![TreatmentUsage {
                item_id: chlorine,
                quantity: 5.0,
                note: None,
            }],
        ))
        .await
        .expect("first reading");
    service
        .record_reading(reading_command(
            other_pond,
            vec![TreatmentUsage {
                item_id: chlorine,
                quantity: 2.0,
                note: None,
            }],
        ))
        .await
        .expect("second reading");

    let rows = inventory
        .usage_summary(&UsageFilter {
            pond_id: Some(pond_id),
            ..Default::default()
        })
        .await
        .expect("summary");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].pond_id, Some(pond_id));
    assert_eq!(rows[0].total_quantity_used, 5.0);
    assert_eq!(rows[0].total_cost_used, 20.0);

    let ponds_ledger_rows = ledger.rows.lock().expect("rows lock");
    assert!(
        ponds_ledger_rows
            .iter()
            .all(|row| row.related_document_id.is_some())
    );
}
