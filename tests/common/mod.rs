//! Shared test utilities for Callsync integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use callsync::directory::{MemoryDirectory, Role, User, UserDirectory};
use callsync::provider::{
    ActiveAgent, CallFilters, CallPage, CallProvider, ExternalCall, ProviderError,
};
use callsync::recon::{ReconcileOptions, Reconciler};
use callsync::store::MemoryStore;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Build a provider-shaped call payload.
pub fn call(id: &str, agent: Option<&str>, ts_ms: i64) -> ExternalCall {
    let mut payload = json!({
        "call_id": id,
        "start_timestamp": ts_ms,
    });
    if let Some(agent) = agent {
        payload["agent_name"] = json!(agent);
    }
    ExternalCall(payload)
}

/// Scriptable in-memory provider.
///
/// Two listing modes: a static listing returned whole on every call (for
/// reconciliation tests that list repeatedly), or a scripted page sequence
/// consumed in order (for pagination tests).
pub struct FakeProvider {
    listing: Vec<ExternalCall>,
    script: Mutex<VecDeque<Result<CallPage, ProviderError>>>,
    scripted: bool,
    direct_calls: HashMap<String, ExternalCall>,
    transient_ids: Vec<String>,
    agents: Vec<ActiveAgent>,
    agents_fail: bool,
    pub pages_requested: AtomicUsize,
    pub direct_fetches: AtomicUsize,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            listing: Vec::new(),
            script: Mutex::new(VecDeque::new()),
            scripted: false,
            direct_calls: HashMap::new(),
            transient_ids: Vec::new(),
            agents: Vec::new(),
            agents_fail: false,
            pages_requested: AtomicUsize::new(0),
            direct_fetches: AtomicUsize::new(0),
        }
    }

    /// Every `list_page` call returns this full listing as a single page.
    pub fn with_listing(mut self, calls: Vec<ExternalCall>) -> Self {
        self.listing = calls;
        self
    }

    /// `list_page` calls consume this script in order; an exhausted script
    /// yields empty pages.
    pub fn with_script(self, pages: Vec<Result<CallPage, ProviderError>>) -> Self {
        *self.script.lock().unwrap() = pages.into();
        Self {
            scripted: true,
            ..self
        }
    }

    /// Serve this call from `get_call`.
    pub fn with_direct_call(mut self, call: ExternalCall) -> Self {
        let id = call.external_id().expect("direct call needs an id");
        self.direct_calls.insert(id, call);
        self
    }

    /// `get_call` for this id fails with a 500 instead of a 404.
    pub fn with_transient_call(mut self, id: &str) -> Self {
        self.transient_ids.push(id.to_string());
        self
    }

    pub fn with_agents(mut self, agents: Vec<ActiveAgent>) -> Self {
        self.agents = agents;
        self
    }

    pub fn with_agents_failure(mut self) -> Self {
        self.agents_fail = true;
        self
    }
}

#[async_trait]
impl CallProvider for FakeProvider {
    async fn get_call(&self, external_id: &str) -> Result<ExternalCall, ProviderError> {
        self.direct_fetches.fetch_add(1, Ordering::SeqCst);
        if self.transient_ids.iter().any(|id| id == external_id) {
            return Err(ProviderError::Upstream {
                status: 500,
                message: "flaky".to_string(),
            });
        }
        self.direct_calls
            .get(external_id)
            .cloned()
            .or_else(|| {
                self.listing
                    .iter()
                    .find(|c| c.external_id().as_deref() == Some(external_id))
                    .cloned()
            })
            .ok_or_else(|| ProviderError::NotFound(external_id.to_string()))
    }

    async fn list_page(
        &self,
        _filters: &CallFilters,
        _cursor: Option<&str>,
    ) -> Result<CallPage, ProviderError> {
        self.pages_requested.fetch_add(1, Ordering::SeqCst);
        if self.scripted {
            return self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(CallPage::default()));
        }
        Ok(CallPage {
            items: self.listing.clone(),
            next_cursor: None,
            total: Some(self.listing.len() as u64),
        })
    }

    async fn list_active_agents(&self) -> Result<Vec<ActiveAgent>, ProviderError> {
        if self.agents_fail {
            return Err(ProviderError::Upstream {
                status: 500,
                message: "agent roster unavailable".to_string(),
            });
        }
        Ok(self.agents.clone())
    }
}

/// A reconciler wired to in-memory collaborators.
pub struct TestHarness {
    pub reconciler: Arc<Reconciler>,
    pub store: Arc<MemoryStore>,
    pub directory: Arc<MemoryDirectory>,
}

/// Build a harness with the given provider and usernames.
pub fn harness(provider: FakeProvider, usernames: &[&str]) -> (TestHarness, Vec<User>) {
    harness_with_options(provider, usernames, ReconcileOptions::default())
}

pub fn harness_with_options(
    provider: FakeProvider,
    usernames: &[&str],
    options: ReconcileOptions,
) -> (TestHarness, Vec<User>) {
    let directory = Arc::new(MemoryDirectory::new());
    let users: Vec<User> = usernames
        .iter()
        .map(|name| directory.add_user(name, Role::User))
        .collect();

    let store = Arc::new(MemoryStore::new());
    let reconciler = Arc::new(Reconciler::new(
        Arc::new(provider),
        store.clone(),
        directory.clone(),
        options,
    ));

    (
        TestHarness {
            reconciler,
            store,
            directory,
        },
        users,
    )
}

/// Assert all users in a directory (helper for API tests).
pub async fn user_by_name(directory: &MemoryDirectory, name: &str) -> User {
    directory.find_by_username(name).await.unwrap()
}
