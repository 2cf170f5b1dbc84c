// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage-layer error taxonomy; converts into [`robosched_core::ApiError`]
//! at the API seam.

use robosched_core::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("optimistic concurrency conflict: {entity} {id} was modified concurrently")]
    Conflict { entity: &'static str, id: String },

    #[error("invalid stored data for {entity} {id}: {message}")]
    Corrupt { entity: &'static str, id: String, message: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("migration error: {0}")]
    Migration(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::Conflict { entity, id } => {
                tracing::warn!(entity, id, "optimistic concurrency conflict");
                ApiError::Conflict
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}
