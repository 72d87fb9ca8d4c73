// src/error.rs

//! Error types for the two fault domains that cross module boundaries.
//! Orchestration code stays on `anyhow::Result`; these exist so callers can
//! tell a timeout from an outage without string matching.

use thiserror::Error;

/// Faults from a generation backend. All of these are swallowed by the
/// cascade — they only decide whether to fall through to the next provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider not configured or unreachable")]
    Unavailable,

    #[error("provider timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response shape: {0}")]
    BadResponse(String),
}

/// Faults from the memory backend. Retrieval degrades to an empty result on
/// these; stores are logged and dropped (the next turn retries naturally).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("record not found: {0}")]
    NotFound(String),
}
