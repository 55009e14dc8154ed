//! Pond catalog service.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::application::repos::{CreatePondParams, PondsRepo, RepoError};
use crate::cache::CacheInvalidator;
use crate::domain::entities::PondRecord;
use crate::domain::locale::LocalizedText;

#[derive(Debug, Error)]
pub enum PondError {
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreatePondCommand {
    pub name: LocalizedText,
    pub area_sq_m: Option<f64>,
}

#[derive(Clone)]
pub struct PondService {
    repo: Arc<dyn PondsRepo>,
    invalidator: Option<Arc<CacheInvalidator>>,
}

impl PondService {
    pub fn new(repo: Arc<dyn PondsRepo>) -> Self {
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

    pub async fn create_pond(&self, command: CreatePondCommand) -> Result<PondRecord, PondError> {
        if command.name.is_blank() {
            return Err(PondError::ConstraintViolation("name"));
        }
        if let Some(area) = command.area_sq_m
            && (!area.is_finite() || area <= 0.0)
        {
            return Err(PondError::ConstraintViolation("area_sq_m"));
        }

        let pond = self
            .repo
            .create_pond(CreatePondParams {
                name: command.name,
                area_sq_m: command.area_sq_m,
            })
            .await?;

        if let Some(invalidator) = &self.invalidator {
            invalidator.pond_changed();
        }

        Ok(pond)
    }

    pub async fn find_pond(&self, id: Uuid) -> Result<Option<PondRecord>, PondError> {
        self.repo.find_pond(id).await.map_err(PondError::from)
    }

    pub async fn list_ponds(&self) -> Result<Vec<PondRecord>, PondError> {
        self.repo.list_ponds().await.map_err(PondError::from)
    }
}
