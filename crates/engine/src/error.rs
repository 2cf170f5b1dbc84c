// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Component error enums that converge on [`robosched_core::ApiError`] at
//! the API boundary (spec §7).

use robosched_core::ApiError;
use thiserror::Error;

/// Errors from the pre-execution pipeline and experiment executor
/// (spec §4.D, §4.E).
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("prerequisite step failed: {0}")]
    Pipeline(String),

    #[error("experiment path did not resolve to an existing .med file: {0}")]
    PathNotFound(String),

    #[error("failed to spawn vendor binary: {0}")]
    Spawn(String),

    #[error("execution timeout")]
    Timeout,

    #[error("vendor reported abort: {0}")]
    VendorAbort(String),
}

/// Errors from the scheduler engine's own bookkeeping (distinct from a
/// single execution's outcome, which lives on the `JobExecution` row).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] robosched_storage::StoreError),

    #[error(transparent)]
    Execute(#[from] ExecuteError),

    #[error("scheduler is already running")]
    AlreadyRunning,

    #[error("scheduler is not running")]
    NotRunning,
}

impl From<ExecuteError> for ApiError {
    fn from(err: ExecuteError) -> Self {
        match err {
            ExecuteError::Timeout => ApiError::VendorTimeout,
            ExecuteError::VendorAbort(msg) => ApiError::VendorAbort(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Store(e) => e.into(),
            EngineError::Execute(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
