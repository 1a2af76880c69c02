//! Call listing, maintenance, and webhook endpoint handlers.

use super::error::ApiError;
use super::types::{
    CallListResponse, HealthResponse, IngestResponse, LiveCallsResponse, RelinkResponse,
};
use super::AppState;
use crate::extract;
use crate::provider::CallFilters;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

/// GET /v1/users/:user_id/calls - calls linked to one user, newest first.
pub async fn list_user_calls(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<CallListResponse>, ApiError> {
    let entries = state.facade.calls_for_user(user_id).await?;
    Ok(Json(CallListResponse {
        total: entries.len(),
        calls: entries.as_ref().clone(),
    }))
}

/// GET /v1/admin/calls - reconcile and list every claimed call.
pub async fn list_admin_calls(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CallListResponse>, ApiError> {
    let entries = state.facade.calls_for_admin().await?;
    Ok(Json(CallListResponse {
        total: entries.len(),
        calls: entries.as_ref().clone(),
    }))
}

/// GET /v1/admin/calls/live - single-page provider listing with
/// active-agent filtering, no reconciliation.
pub async fn list_live_calls(
    State(state): State<Arc<AppState>>,
    Query(filters): Query<CallFilters>,
) -> Result<Json<LiveCallsResponse>, ApiError> {
    let calls = state.facade.live_calls(&filters).await?;
    Ok(Json(LiveCallsResponse {
        total: calls.len(),
        calls,
    }))
}

/// POST /v1/admin/relink - run the relink maintenance pass.
pub async fn relink(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RelinkResponse>, ApiError> {
    let outcome = state.facade.relink().await?;
    Ok(Json(RelinkResponse {
        updated: outcome.updated,
        created: outcome.created,
    }))
}

/// POST /v1/webhooks/call - index a call announced by the provider.
///
/// The payload is the provider's raw event body; the call id is read through
/// the usual extractors. Events without an extractable id are rejected.
pub async fn ingest_webhook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<Json<IngestResponse>, ApiError> {
    // Events may wrap the call under a "call" key or be the call itself.
    let call_body = payload.get("call").unwrap_or(&payload);

    let external_id = extract::call_id(call_body)
        .ok_or_else(|| ApiError::bad_request("event carries no call id".to_string()))?;

    let record = state.facade.ingest(&external_id, call_body).await?;
    Ok(Json(IngestResponse {
        record_id: record.id,
        external_call_id: record.external_call_id,
        linked: record.owner_user_id.is_some(),
    }))
}
