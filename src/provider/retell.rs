//! HTTP implementation of [`CallProvider`] against the Retell-style REST API.

use super::{ActiveAgent, CallFilters, CallPage, CallProvider, ExternalCall, ProviderError};
use crate::config::ProviderConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// HTTP client for the external call provider.
///
/// - Single call fetch via GET /v2/get-call/{id}
/// - Call listing via POST /v2/list-calls (cursor paginated)
/// - Active agent roster via GET /list-agents
pub struct RetellProvider {
    base_url: String,
    api_key: String,
    page_size: u32,
    timeout: Duration,
    /// Shared HTTP client for connection pooling.
    client: Arc<Client>,
}

impl RetellProvider {
    /// Build a provider client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` when the base URL or API key
    /// is missing - missing credentials are fatal, not retried.
    pub fn from_config(config: &ProviderConfig, client: Arc<Client>) -> Result<Self, ProviderError> {
        if config.base_url.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "provider base_url is not set".to_string(),
            ));
        }
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "provider api_key is not set".to_string(),
            ));
        }
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            page_size: config.page_size,
            timeout: Duration::from_secs(config.request_timeout_seconds),
            client,
        })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn map_send_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(self.timeout.as_millis() as u64)
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

/// Pull the item array out of a list response.
///
/// The endpoint has returned three envelope shapes across versions: a bare
/// array, `{"calls": [...]}`, and `{"data": [...]}`.
fn parse_items(body: &Value) -> Result<Vec<ExternalCall>, ProviderError> {
    let items = if let Some(arr) = body.as_array() {
        arr
    } else if let Some(arr) = body.get("calls").and_then(Value::as_array) {
        arr
    } else if let Some(arr) = body.get("data").and_then(Value::as_array) {
        arr
    } else {
        return Err(ProviderError::InvalidResponse(
            "list response is neither an array nor an object with 'calls' or 'data'".to_string(),
        ));
    };
    Ok(items.iter().cloned().map(ExternalCall).collect())
}

/// Parse a full list-calls response into a [`CallPage`].
///
/// Cursor and count key names vary by endpoint version; all known spellings
/// are tried.
pub(crate) fn parse_page(body: &Value) -> Result<CallPage, ProviderError> {
    let items = parse_items(body)?;

    let next_cursor = ["pagination_key", "next_pagination_key", "next_cursor"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let total = ["total_count", "count", "total"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_u64));

    Ok(CallPage {
        items,
        next_cursor,
        total,
    })
}

/// Parse the active-agent roster, tolerating bare-array and wrapped shapes.
fn parse_agents(body: &Value) -> Result<Vec<ActiveAgent>, ProviderError> {
    let items = if let Some(arr) = body.as_array() {
        arr
    } else if let Some(arr) = body.get("agents").and_then(Value::as_array) {
        arr
    } else if let Some(arr) = body.get("data").and_then(Value::as_array) {
        arr
    } else {
        return Err(ProviderError::InvalidResponse(
            "agent list response is neither an array nor an object with 'agents' or 'data'"
                .to_string(),
        ));
    };

    let mut agents = Vec::with_capacity(items.len());
    for item in items {
        let id = ["agent_id", "id"]
            .iter()
            .find_map(|key| item.get(key).and_then(Value::as_str));
        let Some(id) = id else {
            // An agent entry without an id cannot be matched against; skip it.
            tracing::debug!(entry = %item, "Skipping agent entry without an id");
            continue;
        };
        let name = ["agent_name", "name"]
            .iter()
            .find_map(|key| item.get(key).and_then(Value::as_str))
            .map(str::to_string);
        agents.push(ActiveAgent {
            id: id.to_string(),
            name,
        });
    }
    Ok(agents)
}

#[async_trait]
impl CallProvider for RetellProvider {
    async fn get_call(&self, external_id: &str) -> Result<ExternalCall, ProviderError> {
        let url = format!("{}/v2/get-call/{}", self.base_url, external_id);

        let response = self
            .client
            .get(&url)
            .header("authorization", format!("Bearer {}", self.api_key))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(ProviderError::NotFound(external_id.to_string()));
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse call response: {}", e))
        })?;
        Ok(ExternalCall(body))
    }

    async fn list_page(
        &self,
        filters: &CallFilters,
        cursor: Option<&str>,
    ) -> Result<CallPage, ProviderError> {
        let url = format!("{}/v2/list-calls", self.base_url);

        let mut body = json!({
            "limit": filters.limit.unwrap_or(self.page_size),
        });
        if let Some(cursor) = cursor {
            body["pagination_key"] = json!(cursor);
        }
        let mut criteria = serde_json::Map::new();
        if let Some(ref agent_id) = filters.agent_id {
            criteria.insert("agent_id".to_string(), json!([agent_id]));
        }
        if let Some(after) = filters.start_after_ms {
            criteria.insert("start_timestamp_after".to_string(), json!(after));
        }
        if let Some(before) = filters.start_before_ms {
            criteria.insert("start_timestamp_before".to_string(), json!(before));
        }
        if !criteria.is_empty() {
            body["filter_criteria"] = Value::Object(criteria);
        }

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse list response: {}", e))
        })?;
        parse_page(&body)
    }

    async fn list_active_agents(&self) -> Result<Vec<ActiveAgent>, ProviderError> {
        let url = format!("{}/list-agents", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("authorization", format!("Bearer {}", self.api_key))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse agent list: {}", e))
        })?;
        parse_agents(&body)
    }
}
