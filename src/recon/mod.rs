//! Reconciliation engine.
//!
//! Keeps the local call-record index consistent with the provider's call
//! list and keeps records linked to the right users. All operations are
//! request-scoped: sequential awaits, no background work, safe to run
//! concurrently because the store's external-id uniqueness constraint
//! serializes conflicting creations.

mod error;
mod linker;

pub use error::ReconError;
pub use linker::{LinkMatch, LinkPipeline, LinkStrategy, UserIndex};

use crate::directory::UserDirectory;
use crate::extract;
use crate::provider::{fetch_all_calls, CallFilters, CallProvider, ExternalCall};
use crate::store::{CallRecord, CallRecordStore, NewCallRecord, StoreError};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// Tuning knobs for reconciliation passes.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions {
    /// Page size requested from the provider's list endpoint.
    pub page_size: u32,
    /// Hard ceiling on pages fetched per pass.
    pub max_pages: u32,
    /// Maximum individual fetch-by-id fallbacks per user listing. Bounds
    /// tail latency, not correctness; records beyond the cap are marked
    /// missing without a fetch.
    pub fallback_fetch_cap: usize,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_pages: 100,
            fallback_fetch_cap: 50,
        }
    }
}

/// A record paired with its provider call, or an explicit failure marker.
///
/// Listings always render every record; a call the provider cannot produce
/// shows up as an error row instead of vanishing.
#[derive(Debug, Clone, Serialize)]
pub struct CallEntry {
    pub record: CallRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call: Option<ExternalCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// True when the provider reported the call gone (404-class), false for
    /// transient failures.
    pub is_deleted: bool,
}

impl CallEntry {
    fn present(record: CallRecord, call: ExternalCall) -> Self {
        Self {
            record,
            call: Some(call),
            error: None,
            is_deleted: false,
        }
    }

    fn missing(record: CallRecord, error: Option<String>, is_deleted: bool) -> Self {
        Self {
            record,
            call: None,
            error,
            is_deleted,
        }
    }
}

/// Result counts of a relink pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelinkOutcome {
    /// Existing unlinked records that gained an owner.
    pub updated: usize,
    /// Records created for calls with no local index entry.
    pub created: usize,
}

/// The reconciliation engine. See module docs.
pub struct Reconciler {
    provider: Arc<dyn CallProvider>,
    store: Arc<dyn CallRecordStore>,
    directory: Arc<dyn UserDirectory>,
    linker: LinkPipeline,
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(
        provider: Arc<dyn CallProvider>,
        store: Arc<dyn CallRecordStore>,
        directory: Arc<dyn UserDirectory>,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            provider,
            store,
            directory,
            linker: LinkPipeline::standard(),
            options,
        }
    }

    async fn fetch_full_list(&self) -> Result<Vec<ExternalCall>, ReconError> {
        let calls = fetch_all_calls(
            self.provider.as_ref(),
            &CallFilters::default(),
            self.options.page_size,
            self.options.max_pages,
        )
        .await?;
        Ok(calls)
    }

    async fn user_index(&self) -> UserIndex {
        let users = self.directory.list_all().await;
        UserIndex::build(&users)
    }

    /// Create a record for a call, treating a duplicate-key failure as a
    /// benign race: re-read and return the winner's record.
    async fn create_or_adopt(
        &self,
        external_id: &str,
        owner: Option<Uuid>,
        payload: &Value,
    ) -> Result<(CallRecord, bool), ReconError> {
        let new = NewCallRecord {
            external_call_id: external_id.to_string(),
            owner_user_id: owner,
            metadata: payload
                .get("metadata")
                .and_then(Value::as_object)
                .cloned(),
        };
        match self.store.create(new).await {
            Ok(record) => Ok((record, true)),
            Err(StoreError::DuplicateExternalId(_)) => {
                tracing::debug!(external_id, "Lost creation race, adopting existing record");
                let record = self
                    .store
                    .find_by_external_id(external_id)
                    .await?
                    .ok_or_else(|| StoreError::RecordNotFound(external_id.to_string()))?;
                Ok((record, false))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Sync the local index against the full provider listing and return
    /// every claimed call (linked to some user), newest first.
    ///
    /// Idempotent: a second run with no new provider calls mutates nothing.
    pub async fn sync_and_list_for_admin(&self) -> Result<Vec<CallEntry>, ReconError> {
        let calls = self.fetch_full_list().await?;
        let users = self.user_index().await;

        let mut records: HashMap<String, CallRecord> = self
            .store
            .find_all()
            .await?
            .into_iter()
            .map(|r| (r.external_call_id.clone(), r))
            .collect();

        let mut calls_by_id: HashMap<String, ExternalCall> = HashMap::new();
        for call in calls {
            let Some(external_id) = call.external_id() else {
                tracing::warn!("Provider call without an extractable id, skipping");
                continue;
            };
            calls_by_id.insert(external_id, call);
        }

        for (external_id, call) in &calls_by_id {
            match records.get(external_id) {
                None => {
                    let owner = users.match_agent_name(call.payload());
                    let (record, created) = self
                        .create_or_adopt(external_id, owner, call.payload())
                        .await?;
                    if created {
                        tracing::info!(
                            external_id,
                            linked = record.owner_user_id.is_some(),
                            "Indexed new provider call"
                        );
                    }
                    records.insert(external_id.clone(), record);
                }
                Some(record) if record.owner_user_id.is_none() => {
                    if let Some(owner) = users.match_agent_name(call.payload()) {
                        let mut updated = record.clone();
                        updated.owner_user_id = Some(owner);
                        let saved = self.store.save(&updated).await?;
                        tracing::info!(external_id, %owner, "Linked call record to user");
                        records.insert(external_id.clone(), saved);
                    }
                }
                Some(_) => {}
            }
        }

        let mut entries: Vec<CallEntry> = records
            .into_values()
            .filter(|r| r.owner_user_id.is_some())
            .map(|record| match calls_by_id.get(&record.external_call_id) {
                Some(call) => CallEntry::present(record, call.clone()),
                // Claimed locally but absent from the full listing: the
                // provider no longer returns it.
                None => CallEntry::missing(record, None, true),
            })
            .collect();

        sort_newest_first(&mut entries);
        Ok(entries)
    }

    /// List the calls already linked to one user, newest first.
    ///
    /// No reconciliation happens here - linking is an explicit admin
    /// operation, not a side effect of every read.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<CallEntry>, ReconError> {
        let user = self
            .directory
            .find_by_id(user_id)
            .await
            .ok_or(ReconError::UserNotFound(user_id))?;

        let records = self.store.find_all_by_owner(user.id).await?;
        let calls = self.fetch_full_list().await?;
        let calls_by_id: HashMap<String, ExternalCall> = calls
            .into_iter()
            .filter_map(|c| c.external_id().map(|id| (id, c)))
            .collect();

        let mut fallback_fetches = 0usize;
        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            if let Some(call) = calls_by_id.get(&record.external_call_id) {
                entries.push(CallEntry::present(record, call.clone()));
                continue;
            }

            // Not in the listing; it may still exist outside the fetched
            // window, so try one direct fetch, up to the cap.
            if fallback_fetches >= self.options.fallback_fetch_cap {
                entries.push(CallEntry::missing(
                    record,
                    Some("not fetched: fallback cap reached".to_string()),
                    true,
                ));
                continue;
            }
            fallback_fetches += 1;

            match self.provider.get_call(&record.external_call_id).await {
                Ok(call) => entries.push(CallEntry::present(record, call)),
                Err(e) => {
                    let is_deleted = e.is_not_found();
                    tracing::debug!(
                        external_id = %record.external_call_id,
                        error = %e,
                        is_deleted,
                        "Fallback call fetch failed"
                    );
                    entries.push(CallEntry::missing(record, Some(e.to_string()), is_deleted));
                }
            }
        }

        sort_newest_first(&mut entries);
        Ok(entries)
    }

    /// Re-run the linking pass over every unlinked record and the full
    /// provider listing, creating missing records.
    ///
    /// Safe to repeat and to run alongside reads: only ever sets an owner
    /// from null, or creates records - never deletes or unlinks.
    pub async fn relink_all_users(&self) -> Result<RelinkOutcome, ReconError> {
        let calls = self.fetch_full_list().await?;
        let users = self.user_index().await;

        let calls_by_id: HashMap<String, ExternalCall> = calls
            .into_iter()
            .filter_map(|c| c.external_id().map(|id| (id, c)))
            .collect();

        let mut outcome = RelinkOutcome::default();

        for record in self.store.find_all_unowned().await? {
            let Some(call) = calls_by_id.get(&record.external_call_id) else {
                continue;
            };
            if let Some(owner) = users.match_agent_name(call.payload()) {
                let mut updated = record;
                updated.owner_user_id = Some(owner);
                self.store.save(&updated).await?;
                outcome.updated += 1;
            }
        }

        let known: HashSet<String> = self
            .store
            .find_all()
            .await?
            .into_iter()
            .map(|r| r.external_call_id)
            .collect();

        for (external_id, call) in &calls_by_id {
            if known.contains(external_id) {
                continue;
            }
            let owner = users.match_agent_name(call.payload());
            let (_, created) = self
                .create_or_adopt(external_id, owner, call.payload())
                .await?;
            if created {
                outcome.created += 1;
            }
        }

        tracing::info!(
            updated = outcome.updated,
            created = outcome.created,
            "Relink pass complete"
        );
        Ok(outcome)
    }

    /// Index a call announced by a provider webhook.
    ///
    /// The linking pipeline runs at creation; when another path already
    /// created the record, the existing record is adopted and linked if it
    /// was still unlinked.
    pub async fn ingest_call(
        &self,
        external_id: &str,
        payload: &Value,
    ) -> Result<CallRecord, ReconError> {
        let users = self.user_index().await;
        let owner = self.linker.resolve(payload, &users).map(|m| m.user_id);

        let (mut record, created) = self.create_or_adopt(external_id, owner, payload).await?;
        if !created && record.owner_user_id.is_none() {
            if let Some(owner) = owner {
                record.owner_user_id = Some(owner);
                record = self.store.save(&record).await?;
            }
        }
        Ok(record)
    }

    /// Live single-page listing with active-agent filtering.
    ///
    /// Calls whose agent identity matches no currently active agent are
    /// dropped; calls carrying no agent identity at all are kept (absence
    /// of agent info must not hide a call). A roster lookup failure keeps
    /// every call and logs the leak.
    pub async fn list_live(&self, filters: &CallFilters) -> Result<Vec<ExternalCall>, ReconError> {
        let page = self.provider.list_page(filters, None).await?;

        let agents = match self.provider.list_active_agents().await {
            Ok(agents) => agents,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Active-agent lookup failed, returning calls unfiltered"
                );
                return Ok(page.items);
            }
        };

        let mut active: HashSet<String> = HashSet::new();
        for agent in agents {
            active.insert(agent.id);
            if let Some(name) = agent.name {
                active.insert(name);
            }
        }

        let items = page
            .items
            .into_iter()
            .filter(|call| {
                let id = extract::agent_id(call.payload());
                let name = call.agent_name();
                match (id, name) {
                    (None, None) => true,
                    (id, name) => {
                        id.map_or(false, |v| active.contains(&v))
                            || name.map_or(false, |v| active.contains(&v))
                    }
                }
            })
            .collect();
        Ok(items)
    }
}

/// Sort entries by effective call date, newest first.
fn sort_newest_first(entries: &mut [CallEntry]) {
    entries.sort_by_key(|e| {
        std::cmp::Reverse(extract::effective_date(
            e.call.as_ref().map(|c| c.payload()),
            Some(e.record.created_at),
        ))
    });
}
