//! Error types for reconciliation operations.

use crate::provider::ProviderError;
use crate::store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the reconciliation engine.
#[derive(Error, Debug)]
pub enum ReconError {
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
