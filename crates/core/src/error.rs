// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! API-boundary error taxonomy (spec §7).
//!
//! Narrower component errors (`StoreError`, `ExecuteError`, ...) convert
//! into `ApiError` at the seam; only the API boundary and the top of the
//! scheduler loop need to reason about the full taxonomy.

use thiserror::Error;

/// Error kinds surfaced to any caller of the API (§6.5, §7).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: stored value has moved on")]
    Conflict,

    #[error("validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("permission denied: {0}")]
    Permission(String),

    #[error("vendor busy")]
    VendorBusy,

    #[error("vendor timeout")]
    VendorTimeout,

    #[error("vendor abort: {0}")]
    VendorAbort(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Stable string tag for the error kind, used in logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict => "conflict",
            ApiError::Validation { .. } => "validation",
            ApiError::Permission(_) => "permission",
            ApiError::VendorBusy => "vendor_busy",
            ApiError::VendorTimeout => "vendor_timeout",
            ApiError::VendorAbort(_) => "vendor_abort",
            ApiError::Transport(_) => "transport",
            ApiError::Internal(_) => "internal",
        }
    }
}
