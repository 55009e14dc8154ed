//! Water-quality capture with best-effort inventory side effects.
//!
//! The reading is the primary write. Treatments attached to it consume
//! inventory through the ledger, and each of those appends is reported as
//! an explicit outcome value: a failed append never rolls back or blocks
//! the reading. Field data capture outranks ledger completeness.

use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::application::inventory::{InventoryService, RecordAdjustmentCommand};
use crate::application::repos::{NewReadingParams, PondsRepo, ReadingsRepo, RepoError};
use crate::cache::CacheInvalidator;
use crate::domain::entities::{AdjustmentRecord, WaterQualityReadingRecord};
use crate::domain::types::{AdjustmentKind, RelatedDocumentKind};

#[derive(Debug, Error)]
pub enum ReadingError {
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error("pond missing or inactive")]
    PondUnavailable,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// One inventory consumption attached to a reading.
#[derive(Debug, Clone)]
pub struct TreatmentUsage {
    pub item_id: Uuid,
    pub quantity: f64,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecordReadingCommand {
    pub pond_id: Uuid,
    pub season_id: Option<Uuid>,
    pub measured_at: OffsetDateTime,
    pub ph: Option<f64>,
    pub dissolved_oxygen_mg_l: Option<f64>,
    pub temperature_c: Option<f64>,
    pub salinity_ppt: Option<f64>,
    pub ammonia_mg_l: Option<f64>,
    pub notes: Option<String>,
    pub treatments: Vec<TreatmentUsage>,
}

/// What happened to one treatment's ledger append. Surfaced to callers so
/// a degraded write is visible in the response, not buried in logs.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TreatmentOutcome {
    Recorded { adjustment: AdjustmentRecord },
    Failed { item_id: Uuid, reason: String },
}

impl TreatmentOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, TreatmentOutcome::Recorded { .. })
    }
}

#[derive(Debug, Serialize)]
pub struct ReadingWithOutcomes {
    pub reading: WaterQualityReadingRecord,
    pub treatments: Vec<TreatmentOutcome>,
}

#[derive(Clone)]
pub struct ReadingService {
    readings: Arc<dyn ReadingsRepo>,
    ponds: Arc<dyn PondsRepo>,
    inventory: InventoryService,
    invalidator: Option<Arc<CacheInvalidator>>,
}

impl ReadingService {
    pub fn new(
        readings: Arc<dyn ReadingsRepo>,
        ponds: Arc<dyn PondsRepo>,
        inventory: InventoryService,
    ) -> Self {
        Self {
            readings,
            ponds,
            inventory,
            invalidator: None,
        }
    }

    /// Set the cache invalidator for this service (optional).
    pub fn with_invalidator_opt(mut self, invalidator: Option<Arc<CacheInvalidator>>) -> Self {
        self.invalidator = invalidator;
        self
    }

    pub async fn record_reading(
        &self,
        command: RecordReadingCommand,
    ) -> Result<ReadingWithOutcomes, ReadingError> {
        // Treatment quantities are validated up front: a malformed request
        // is a client error, not a degraded side effect.
        for treatment in &command.treatments {
            if !treatment.quantity.is_finite() || treatment.quantity <= 0.0 {
                return Err(ReadingError::ConstraintViolation("treatment quantity"));
            }
        }

        match self.ponds.find_pond(command.pond_id).await? {
            Some(pond) if pond.active => {}
            _ => return Err(ReadingError::PondUnavailable),
        }

        let reading = self
            .readings
            .create_reading(NewReadingParams {
                pond_id: command.pond_id,
                season_id: command.season_id,
                measured_at: command.measured_at,
                ph: command.ph,
                dissolved_oxygen_mg_l: command.dissolved_oxygen_mg_l,
                temperature_c: command.temperature_c,
                salinity_ppt: command.salinity_ppt,
                ammonia_mg_l: command.ammonia_mg_l,
                notes: command.notes,
            })
            .await?;

        let mut outcomes = Vec::with_capacity(command.treatments.len());
        for treatment in command.treatments {
            let append = self
                .inventory
                .record_adjustment(RecordAdjustmentCommand {
                    item_id: treatment.item_id,
                    kind: AdjustmentKind::Usage,
                    quantity_change: -treatment.quantity,
                    reason: treatment.note,
                    pond_id: Some(command.pond_id),
                    season_id: command.season_id,
                    related_document_id: Some(reading.id),
                    related_document_kind: Some(RelatedDocumentKind::WaterQualityReading),
                })
                .await;

            match append {
                Ok(adjustment) => outcomes.push(TreatmentOutcome::Recorded { adjustment }),
                Err(error) => {
                    counter!("stagno_ledger_side_effect_failed_total").increment(1);
                    warn!(
                        reading_id = %reading.id,
                        item_id = %treatment.item_id,
                        error = %error,
                        "treatment usage could not be recorded; reading kept"
                    );
                    outcomes.push(TreatmentOutcome::Failed {
                        item_id: treatment.item_id,
                        reason: error.to_string(),
                    });
                }
            }
        }

        if let Some(invalidator) = &self.invalidator {
            invalidator.readings_changed(command.pond_id);
        }

        Ok(ReadingWithOutcomes {
            reading,
            treatments: outcomes,
        })
    }

    /// Readings under a pond. Inactive ponds keep their history readable.
    pub async fn list_readings(
        &self,
        pond_id: Uuid,
        limit: u32,
    ) -> Result<Vec<WaterQualityReadingRecord>, ReadingError> {
        if self.ponds.find_pond(pond_id).await?.is_none() {
            return Err(ReadingError::PondUnavailable);
        }
        self.readings
            .list_readings(pond_id, limit)
            .await
            .map_err(ReadingError::from)
    }
}
