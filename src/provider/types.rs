//! Provider-side data types.

use crate::extract;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A call as returned by the provider.
///
/// The payload shape is not under our control and varies across endpoint
/// versions, so the raw JSON is kept verbatim and fields are read through
/// the extractors in [`crate::extract`]. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalCall(pub Value);

impl ExternalCall {
    pub fn payload(&self) -> &Value {
        &self.0
    }

    /// The provider's call identifier, when the payload carries one.
    pub fn external_id(&self) -> Option<String> {
        extract::call_id(&self.0)
    }

    /// Best-effort agent identity (link key to a username).
    pub fn agent_name(&self) -> Option<String> {
        extract::agent_name(&self.0)
    }
}

/// One page of a call listing.
#[derive(Debug, Clone, Default)]
pub struct CallPage {
    pub items: Vec<ExternalCall>,
    /// Cursor for the next page; None means the listing is exhausted.
    pub next_cursor: Option<String>,
    /// Total count when the endpoint reports one (key name varies).
    pub total: Option<u64>,
}

/// Filters forwarded to the provider's list endpoint.
///
/// Also used as the query-string shape of the live listing API route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    /// Only calls starting after this epoch-millisecond timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_after_ms: Option<i64>,
    /// Only calls starting before this epoch-millisecond timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_before_ms: Option<i64>,
    /// Requested page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// An agent currently active at the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveAgent {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
