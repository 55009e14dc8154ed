use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{NewReadingParams, ReadingsRepo, RepoError},
    domain::entities::WaterQualityReadingRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

const READING_COLUMNS: &str = "id, pond_id, season_id, measured_at, ph, \
     dissolved_oxygen_mg_l, temperature_c, salinity_ppt, ammonia_mg_l, notes, created_at";

#[derive(sqlx::FromRow)]
struct ReadingRow {
    id: Uuid,
    pond_id: Uuid,
    season_id: Option<Uuid>,
    measured_at: OffsetDateTime,
    ph: Option<f64>,
    dissolved_oxygen_mg_l: Option<f64>,
    temperature_c: Option<f64>,
    salinity_ppt: Option<f64>,
    ammonia_mg_l: Option<f64>,
    notes: Option<String>,
    created_at: OffsetDateTime,
}

impl From<ReadingRow> for WaterQualityReadingRecord {
    fn from(row: ReadingRow) -> Self {
        Self {
            id: row.id,
            pond_id: row.pond_id,
            season_id: row.season_id,
            measured_at: row.measured_at,
            ph: row.ph,
            dissolved_oxygen_mg_l: row.dissolved_oxygen_mg_l,
            temperature_c: row.temperature_c,
            salinity_ppt: row.salinity_ppt,
            ammonia_mg_l: row.ammonia_mg_l,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ReadingsRepo for PostgresRepositories {
    async fn create_reading(
        &self,
        params: NewReadingParams,
    ) -> Result<WaterQualityReadingRecord, RepoError> {
        let row: ReadingRow = sqlx::query_as(&format!(
            "INSERT INTO water_quality_readings \
                 (pond_id, season_id, measured_at, ph, dissolved_oxygen_mg_l, \
                  temperature_c, salinity_ppt, ammonia_mg_l, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {READING_COLUMNS}"
        ))
        .bind(params.pond_id)
        .bind(params.season_id)
        .bind(params.measured_at)
        .bind(params.ph)
        .bind(params.dissolved_oxygen_mg_l)
        .bind(params.temperature_c)
        .bind(params.salinity_ppt)
        .bind(params.ammonia_mg_l)
        .bind(params.notes)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn list_readings(
        &self,
        pond_id: Uuid,
        limit: u32,
    ) -> Result<Vec<WaterQualityReadingRecord>, RepoError> {
        let rows: Vec<ReadingRow> = sqlx::query_as(&format!(
            "SELECT {READING_COLUMNS} FROM water_quality_readings \
             WHERE pond_id = $1 \
             ORDER BY measured_at DESC, id ASC \
             LIMIT $2"
        ))
        .bind(pond_id)
        .bind(limit as i64)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(WaterQualityReadingRecord::from).collect())
    }
}
