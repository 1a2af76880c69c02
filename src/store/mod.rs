//! Local call-record store.
//!
//! The store holds the durable ownership index: one record per external call
//! id, optionally linked to an owning user. The uniqueness constraint on the
//! external call id is the only cross-request serialization point in the
//! system; conflicting creations are resolved by treating the duplicate-key
//! error as "someone else won the race".

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Durable index entry mapping an external call id to its owning user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub id: Uuid,
    /// Provider call id. Unique across all records, immutable after creation.
    pub external_call_id: String,
    /// Opaque key-value map copied from the payload at creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    /// None means the record is unlinked; set at most once, never cleared.
    pub owner_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a record; ids and timestamps are the store's job.
#[derive(Debug, Clone, Default)]
pub struct NewCallRecord {
    pub external_call_id: String,
    pub owner_user_id: Option<Uuid>,
    pub metadata: Option<Map<String, Value>>,
}

/// Store-level errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Unique-constraint violation on the external call id. Expected under
    /// concurrent reconciliation; callers re-read the winner's record.
    #[error("Record already exists for external call id: {0}")]
    DuplicateExternalId(String),

    #[error("Record not found for external call id: {0}")]
    RecordNotFound(String),
}

/// Persistence operations over call records.
#[async_trait]
pub trait CallRecordStore: Send + Sync {
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<CallRecord>, StoreError>;

    async fn find_all(&self) -> Result<Vec<CallRecord>, StoreError>;

    async fn find_all_by_owner(&self, owner_user_id: Uuid) -> Result<Vec<CallRecord>, StoreError>;

    async fn find_all_unowned(&self) -> Result<Vec<CallRecord>, StoreError>;

    /// Create a record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateExternalId`] if a record with the same
    /// external call id already exists. The check-and-insert is atomic.
    async fn create(&self, new: NewCallRecord) -> Result<CallRecord, StoreError>;

    /// Persist field changes on an existing record and bump `updated_at`.
    ///
    /// The external call id is the lookup key and cannot change.
    async fn save(&self, record: &CallRecord) -> Result<CallRecord, StoreError>;
}
