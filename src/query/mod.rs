//! Query façade.
//!
//! The layer HTTP handlers call into: listing operations served through a
//! short-lived TTL cache keyed by requesting scope, plus the uncached
//! maintenance and ingestion paths.

mod cache;

pub use cache::{Clock, ManualClock, SystemClock, TtlCache};

use crate::provider::{CallFilters, ExternalCall};
use crate::recon::{CallEntry, ReconError, Reconciler, RelinkOutcome};
use crate::store::CallRecord;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Cache key: who is asking.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Admin,
    User(Uuid),
}

/// Façade over the reconciliation engine with per-scope result caching.
///
/// Repeated reads within the TTL (default 5 s) are served from cache;
/// relink and webhook ingestion bypass the cache and invalidate it.
pub struct QueryFacade {
    recon: Arc<Reconciler>,
    cache: TtlCache<Scope, Arc<Vec<CallEntry>>>,
}

impl QueryFacade {
    pub fn new(recon: Arc<Reconciler>, ttl: Duration) -> Self {
        Self::with_clock(recon, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(recon: Arc<Reconciler>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            recon,
            cache: TtlCache::with_clock(ttl, clock),
        }
    }

    /// Calls linked to one user, newest first.
    pub async fn calls_for_user(&self, user_id: Uuid) -> Result<Arc<Vec<CallEntry>>, ReconError> {
        let scope = Scope::User(user_id);
        if let Some(cached) = self.cache.get(&scope) {
            tracing::debug!(%user_id, "Serving user calls from cache");
            return Ok(cached);
        }
        let entries = Arc::new(self.recon.list_for_user(user_id).await?);
        self.cache.insert(scope, entries.clone());
        Ok(entries)
    }

    /// All claimed calls, reconciling the index on the way, newest first.
    pub async fn calls_for_admin(&self) -> Result<Arc<Vec<CallEntry>>, ReconError> {
        if let Some(cached) = self.cache.get(&Scope::Admin) {
            tracing::debug!("Serving admin calls from cache");
            return Ok(cached);
        }
        let entries = Arc::new(self.recon.sync_and_list_for_admin().await?);
        self.cache.insert(Scope::Admin, entries.clone());
        Ok(entries)
    }

    /// Live filtered single-page listing; never cached.
    pub async fn live_calls(&self, filters: &CallFilters) -> Result<Vec<ExternalCall>, ReconError> {
        self.recon.list_live(filters).await
    }

    /// Run the relink maintenance pass and drop all cached listings.
    pub async fn relink(&self) -> Result<RelinkOutcome, ReconError> {
        let outcome = self.recon.relink_all_users().await?;
        self.cache.clear();
        Ok(outcome)
    }

    /// Index a webhook-announced call and invalidate affected listings.
    pub async fn ingest(&self, external_id: &str, payload: &Value) -> Result<CallRecord, ReconError> {
        let record = self.recon.ingest_call(external_id, payload).await?;
        self.cache.invalidate(&Scope::Admin);
        if let Some(owner) = record.owner_user_id {
            self.cache.invalidate(&Scope::User(owner));
        }
        Ok(record)
    }
}
