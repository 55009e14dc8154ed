use async_trait::async_trait;
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{CreatePondParams, PondsRepo, RepoError},
    domain::{entities::PondRecord, locale::LocalizedText},
};

use super::{PostgresRepositories, map_sqlx_error};

const POND_COLUMNS: &str = "id, name, area_sq_m, active, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct PondRow {
    id: Uuid,
    name: Json<LocalizedText>,
    area_sq_m: Option<f64>,
    active: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<PondRow> for PondRecord {
    fn from(row: PondRow) -> Self {
        Self {
            id: row.id,
            name: row.name.0,
            area_sq_m: row.area_sq_m,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl PondsRepo for PostgresRepositories {
    async fn create_pond(&self, params: CreatePondParams) -> Result<PondRecord, RepoError> {
        let row: PondRow = sqlx::query_as(&format!(
            "INSERT INTO ponds (name, area_sq_m) VALUES ($1, $2) RETURNING {POND_COLUMNS}"
        ))
        .bind(Json(&params.name))
        .bind(params.area_sq_m)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_pond(&self, id: Uuid) -> Result<Option<PondRecord>, RepoError> {
        let row: Option<PondRow> =
            sqlx::query_as(&format!("SELECT {POND_COLUMNS} FROM ponds WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        Ok(row.map(PondRecord::from))
    }

    async fn list_ponds(&self) -> Result<Vec<PondRecord>, RepoError> {
        let rows: Vec<PondRow> = sqlx::query_as(&format!(
            "SELECT {POND_COLUMNS} FROM ponds ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PondRecord::from).collect())
    }
}
