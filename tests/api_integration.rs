//! Integration tests for the HTTP API surface.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use callsync::api::{create_router, AppState};
use callsync::config::CallsyncConfig;
use callsync::directory::{MemoryDirectory, Role};
use callsync::provider::ActiveAgent;
use callsync::query::QueryFacade;
use callsync::recon::{ReconcileOptions, Reconciler};
use callsync::store::MemoryStore;
use common::{call, FakeProvider};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::Service;
use uuid::Uuid;

struct TestApp {
    router: axum::Router,
    directory: Arc<MemoryDirectory>,
}

fn test_app(provider: FakeProvider) -> TestApp {
    let directory = Arc::new(MemoryDirectory::new());
    let reconciler = Arc::new(Reconciler::new(
        Arc::new(provider),
        Arc::new(MemoryStore::new()),
        directory.clone(),
        ReconcileOptions::default(),
    ));
    let facade = Arc::new(QueryFacade::new(reconciler, Duration::from_secs(5)));
    let state = Arc::new(AppState::new(facade, Arc::new(CallsyncConfig::default())));
    TestApp {
        router: create_router(state),
        directory,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_route() {
    let mut app = test_app(FakeProvider::new()).router;

    let response = app
        .call(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn user_calls_unknown_user_is_404() {
    let mut app = test_app(FakeProvider::new()).router;

    let response = app
        .call(
            Request::builder()
                .uri(format!("/v1/users/{}/calls", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["type"], "not_found");
}

#[tokio::test]
async fn admin_calls_lists_claimed_calls_only() {
    let provider = FakeProvider::new().with_listing(vec![
        call("c1", Some("alice"), 1_000),
        call("c2", Some("stranger"), 2_000),
    ]);
    let app = test_app(provider);
    app.directory.add_user("alice", Role::User);
    let mut router = app.router;

    let response = router
        .call(
            Request::builder()
                .uri("/v1/admin/calls")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["calls"][0]["record"]["external_call_id"], "c1");
    assert!(body["calls"][0]["record"]["owner_user_id"].is_string());
}

#[tokio::test]
async fn user_calls_after_sync() {
    let provider = FakeProvider::new().with_listing(vec![call("c1", Some("alice"), 1_000)]);
    let app = test_app(provider);
    let alice = app.directory.add_user("alice", Role::User);
    let mut router = app.router;

    // Sync via the admin route, then read as the user.
    let sync = router
        .call(
            Request::builder()
                .uri("/v1/admin/calls")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(sync.status(), StatusCode::OK);

    let response = router
        .call(
            Request::builder()
                .uri(format!("/v1/users/{}/calls", alice.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["calls"][0]["call"]["agent_name"], "alice");
}

#[tokio::test]
async fn relink_returns_counts() {
    let provider = FakeProvider::new().with_listing(vec![call("c1", Some("alice"), 1_000)]);
    let app = test_app(provider);
    app.directory.add_user("alice", Role::User);
    let mut router = app.router;

    let response = router
        .call(
            Request::builder()
                .method("POST")
                .uri("/v1/admin/relink")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["created"], 1);
    assert_eq!(body["updated"], 0);
}

#[tokio::test]
async fn live_route_filters_by_active_agents() {
    let provider = FakeProvider::new()
        .with_listing(vec![
            call("c1", Some("alice"), 1_000),
            call("c2", Some("mallory"), 2_000),
        ])
        .with_agents(vec![ActiveAgent {
            id: "ag_1".to_string(),
            name: Some("alice".to_string()),
        }]);
    let mut router = test_app(provider).router;

    let response = router
        .call(
            Request::builder()
                .uri("/v1/admin/calls/live?limit=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn webhook_creates_record() {
    let app = test_app(FakeProvider::new());
    app.directory.add_user("alice", Role::User);
    let mut router = app.router;

    let payload = json!({"event": "call_ended", "call": {"call_id": "wh1", "agent_name": "alice"}});
    let response = router
        .call(
            Request::builder()
                .method("POST")
                .uri("/v1/webhooks/call")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["external_call_id"], "wh1");
    assert_eq!(body["linked"], true);
}

#[tokio::test]
async fn webhook_without_call_id_is_400() {
    let mut router = test_app(FakeProvider::new()).router;

    let response = router
        .call(
            Request::builder()
                .method("POST")
                .uri("/v1/webhooks/call")
                .header("content-type", "application/json")
                .body(Body::from(json!({"event": "call_ended"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn provider_outage_surfaces_as_502() {
    let provider = FakeProvider::new().with_script(vec![Err(
        callsync::provider::ProviderError::Upstream {
            status: 503,
            message: "down".to_string(),
        },
    )]);
    let mut router = test_app(provider).router;

    let response = router
        .call(
            Request::builder()
                .uri("/v1/admin/calls")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
