//! API request/response types.

use crate::provider::ExternalCall;
use crate::recon::CallEntry;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Standard error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Response for call listings (user and admin).
#[derive(Debug, Serialize)]
pub struct CallListResponse {
    pub calls: Vec<CallEntry>,
    pub total: usize,
}

/// Response for the live filtered listing.
#[derive(Debug, Serialize)]
pub struct LiveCallsResponse {
    pub calls: Vec<ExternalCall>,
    pub total: usize,
}

/// Response for the relink maintenance endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct RelinkResponse {
    pub updated: usize,
    pub created: usize,
}

/// Response for webhook ingestion.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub record_id: Uuid,
    pub external_call_id: String,
    pub linked: bool,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
}
