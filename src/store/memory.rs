//! In-memory call-record store backed by a concurrent map.

use super::{CallRecord, CallRecordStore, NewCallRecord, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

/// Thread-safe in-memory store keyed by external call id.
///
/// The DashMap entry API makes the duplicate check and the insert a single
/// atomic step, so racing `create` calls for the same external call id
/// resolve to exactly one stored record.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, CallRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

#[async_trait]
impl CallRecordStore for MemoryStore {
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<CallRecord>, StoreError> {
        Ok(self.records.get(external_id).map(|e| e.value().clone()))
    }

    async fn find_all(&self) -> Result<Vec<CallRecord>, StoreError> {
        Ok(self.records.iter().map(|e| e.value().clone()).collect())
    }

    async fn find_all_by_owner(&self, owner_user_id: Uuid) -> Result<Vec<CallRecord>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|e| e.value().owner_user_id == Some(owner_user_id))
            .map(|e| e.value().clone())
            .collect())
    }

    async fn find_all_unowned(&self) -> Result<Vec<CallRecord>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|e| e.value().owner_user_id.is_none())
            .map(|e| e.value().clone())
            .collect())
    }

    async fn create(&self, new: NewCallRecord) -> Result<CallRecord, StoreError> {
        let now = Utc::now();
        let record = CallRecord {
            id: Uuid::new_v4(),
            external_call_id: new.external_call_id.clone(),
            metadata: new.metadata,
            owner_user_id: new.owner_user_id,
            created_at: now,
            updated_at: now,
        };

        match self.records.entry(new.external_call_id) {
            Entry::Occupied(occupied) => Err(StoreError::DuplicateExternalId(
                occupied.key().clone(),
            )),
            Entry::Vacant(vacant) => {
                vacant.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn save(&self, record: &CallRecord) -> Result<CallRecord, StoreError> {
        let mut entry = self
            .records
            .get_mut(&record.external_call_id)
            .ok_or_else(|| StoreError::RecordNotFound(record.external_call_id.clone()))?;

        let mut updated = record.clone();
        updated.updated_at = Utc::now();
        *entry.value_mut() = updated.clone();
        Ok(updated)
    }
}
