//! HTTP handlers, request/response models, and error mapping.

pub mod admin;
pub mod inventory;
pub mod ponds;
pub mod readings;

pub mod models;

use crate::application::inventory::InventoryError;
use crate::application::ponds::PondError;
use crate::application::readings::ReadingError;
use crate::application::repos::RepoError;
use crate::infra::http::error::{ApiError, codes};

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::NotFound => ApiError::not_found("resource not found"),
        RepoError::Duplicate { constraint } => ApiError::conflict(
            codes::DUPLICATE,
            "duplicate record",
            Some(constraint),
        ),
        RepoError::InvalidInput { message } => ApiError::new(
            axum::http::StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::conflict(
            codes::INTEGRITY,
            "integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::db_timeout(),
        RepoError::Persistence(message) => ApiError::internal(Some(message)),
    }
}

pub(crate) fn inventory_to_api(err: InventoryError) -> ApiError {
    match err {
        InventoryError::ConstraintViolation(field) => {
            ApiError::bad_request("validation failed", Some(field.to_string()))
        }
        InventoryError::ItemUnavailable => {
            ApiError::not_found("inventory item missing or inactive")
        }
        InventoryError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn pond_to_api(err: PondError) -> ApiError {
    match err {
        PondError::ConstraintViolation(field) => {
            ApiError::bad_request("validation failed", Some(field.to_string()))
        }
        PondError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn reading_to_api(err: ReadingError) -> ApiError {
    match err {
        ReadingError::ConstraintViolation(field) => {
            ApiError::bad_request("validation failed", Some(field.to_string()))
        }
        ReadingError::PondUnavailable => ApiError::not_found("pond missing or inactive"),
        ReadingError::Repo(repo) => repo_to_api(repo),
    }
}
