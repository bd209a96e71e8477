use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use kasa_coordination::Dispatcher;
use kasa_ledger::{LedgerStore, MemorySnapshotStore};
use kasa_reporting::{DirectoryEntry, StaticDirectory};
use kasa_server::{AppState, router};
use kasa_types::BonusRule;

fn app(snapshots: Arc<MemorySnapshotStore>) -> axum::Router {
    let ledger = Arc::new(LedgerStore::with_state(
        snapshots,
        BonusRule::default(),
        Default::default(),
    ));
    let directory: StaticDirectory = [
        ("A", DirectoryEntry::new("Alice")),
        ("B", DirectoryEntry::new("Bob")),
        ("C", DirectoryEntry::new("Carol")),
    ]
    .into_iter()
    .collect();
    let dispatcher = Dispatcher::new(ledger, Arc::new(directory));
    router(AppState::new(Arc::new(dispatcher)))
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health() {
    let app = app(Arc::new(MemorySnapshotStore::new()));
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_ranking_scenario() {
    let app = app(Arc::new(MemorySnapshotStore::new()));
    for _ in 0..4 {
        send(&app, "POST", "/api/v1/contractors/A/contracts/tzm", None).await;
    }
    send(&app, "POST", "/api/v1/contractors/B/contracts/MET", None).await;
    for _ in 0..2 {
        send(&app, "POST", "/api/v1/contractors/C/contracts/tzm", None).await;
    }

    let (status, body) = send(&app, "GET", "/api/v1/ranking", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows: serde_json::Value = serde_json::from_str(&body).unwrap();
    let names: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["display_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice", "Carol", "Bob"]);
    assert_eq!(rows[0]["total_bonus"], 60_000);
}

#[tokio::test]
async fn test_unknown_contract_type_is_bad_request() {
    let app = app(Arc::new(MemorySnapshotStore::new()));
    let (status, _) = send(&app, "POST", "/api/v1/contractors/A/contracts/xyz", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reactions_and_personal_view() {
    let app = app(Arc::new(MemorySnapshotStore::new()));
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/reactions",
        Some(r#"{"reactor_id": "A", "marker": "🔴"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"accrued\""));

    let (_, body) = send(
        &app,
        "POST",
        "/api/v1/reactions",
        Some(r#"{"reactor_id": "A", "marker": "👀"}"#),
    )
    .await;
    assert!(body.contains("unknown_marker"));

    let (status, body) = send(&app, "GET", "/api/v1/contractors/A", None).await;
    assert_eq!(status, StatusCode::OK);
    let record: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(record["met_count"], 1);
    assert_eq!(record["tzm_count"], 0);

    let (status, _) = send(&app, "GET", "/api/v1/contractors/Z", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_export_and_summary_asymmetry() {
    let app = app(Arc::new(MemorySnapshotStore::new()));
    send(
        &app,
        "POST",
        "/api/v1/triggers",
        Some(r#"{"kind": "register_contract", "caller_id": "123", "contract": "TZM"}"#),
    )
    .await;

    let (_, summary) = send(&app, "GET", "/api/v1/summary", None).await;
    assert_eq!(summary, "[]");

    let (status, csv) = send(&app, "GET", "/api/v1/export", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(csv, "UserID,Name,TZM,MET,Total\r\n123,123,1,0,15000\r\n");
}

#[tokio::test]
async fn test_write_failure_is_service_unavailable() {
    let snapshots = Arc::new(MemorySnapshotStore::new());
    let app = app(snapshots.clone());
    snapshots.fail_writes(true);

    let (status, _) = send(&app, "POST", "/api/v1/contractors/A/contracts/tzm", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    snapshots.fail_writes(false);
    let (status, _) = send(&app, "POST", "/api/v1/contractors/A/contracts/tzm", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_reset() {
    let snapshots = Arc::new(MemorySnapshotStore::new());
    let app = app(snapshots.clone());
    send(&app, "POST", "/api/v1/contractors/A/contracts/tzm", None).await;

    let (status, body) = send(&app, "POST", "/api/v1/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("reset_done"));

    let (_, summary) = send(&app, "GET", "/api/v1/summary", None).await;
    assert_eq!(summary, "[]");
    assert_eq!(snapshots.raw().as_deref(), Some("{}"));
}
