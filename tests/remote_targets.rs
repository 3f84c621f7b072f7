//! Remote storage targets against a local server imitating both APIs.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use clubhouse_backend::{
    ledger::LedgerDocument,
    store::{GistTarget, JsonBinTarget, LocalFileTarget, PersistenceStore, StorageTarget},
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

const API_KEY: &str = "master-key";
const TOKEN: &str = "gist-token";

#[derive(Clone, Default)]
struct MockState {
    base_url: Arc<Mutex<String>>,
    bin: Arc<Mutex<Option<Value>>>,
    gist_content: Arc<Mutex<Option<String>>>,
    /// Report the gist file as truncated and serve it from `raw_url` instead.
    truncate_gist: Arc<Mutex<bool>>,
}

async fn put_bin(
    State(state): State<MockState>,
    Path(bin): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if headers.get("X-Master-Key").and_then(|v| v.to_str().ok()) != Some(API_KEY) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if bin != "bin-1" {
        return StatusCode::NOT_FOUND.into_response();
    }
    *state.bin.lock() = Some(body);
    Json(json!({ "metadata": { "id": bin } })).into_response()
}

async fn latest_bin(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if headers.get("X-Master-Key").and_then(|v| v.to_str().ok()) != Some(API_KEY) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match state.bin.lock().clone() {
        Some(record) => Json(json!({ "record": record, "metadata": {} })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn bearer_ok(headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {TOKEN}");
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(expected.as_str())
}

async fn patch_gist(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let Some(content) = body["files"]["db.json"]["content"].as_str() else {
        return StatusCode::UNPROCESSABLE_ENTITY.into_response();
    };
    *state.gist_content.lock() = Some(content.to_string());
    Json(json!({ "id": "gist-1" })).into_response()
}

async fn get_gist(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if !bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let Some(content) = state.gist_content.lock().clone() else {
        return Json(json!({ "id": "gist-1", "files": {} })).into_response();
    };

    let file = if *state.truncate_gist.lock() {
        json!({
            "filename": "db.json",
            "content": "{\"members\": [",
            "truncated": true,
            "raw_url": format!("{}/raw/db.json", state.base_url.lock()),
        })
    } else {
        json!({ "filename": "db.json", "content": content, "truncated": false })
    };
    Json(json!({ "id": "gist-1", "files": { "db.json": file } })).into_response()
}

async fn raw_gist(State(state): State<MockState>) -> Response {
    match state.gist_content.lock().clone() {
        Some(content) => content.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_mock() -> (String, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/b/:bin", put(put_bin))
        .route("/b/:bin/latest", get(latest_bin))
        .route("/gists/:id", get(get_gist).patch(patch_gist))
        .route("/raw/db.json", get(raw_gist))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    *state.base_url.lock() = base.clone();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (base, state)
}

fn jsonbin(base: &str, key: &str) -> JsonBinTarget {
    JsonBinTarget::new(
        reqwest::Client::new(),
        base,
        key.to_string(),
        "bin-1".to_string(),
    )
}

fn gist(base: &str, token: &str) -> GistTarget {
    GistTarget::new(
        reqwest::Client::new(),
        base,
        token.to_string(),
        "gist-1".to_string(),
        "db.json".to_string(),
    )
}

fn busy_document() -> LedgerDocument {
    let mut doc = LedgerDocument::seeded();
    doc.add_member("Remote Kim").unwrap();
    doc.record_drink_purchase(3, &[("bier".to_string(), 2)].into_iter().collect())
        .unwrap();
    doc
}

#[tokio::test]
async fn test_jsonbin_round_trip() {
    let (base, state) = spawn_mock().await;
    let target = jsonbin(&base, API_KEY);

    assert_eq!(target.load().await.unwrap(), None);

    let doc = busy_document();
    target.save(&doc).await.unwrap();
    assert!(state.bin.lock().as_ref().unwrap().get("lastUpdated").is_some());

    assert_eq!(target.load().await.unwrap(), Some(doc));
}

#[tokio::test]
async fn test_jsonbin_rejects_wrong_key() {
    let (base, _state) = spawn_mock().await;
    let target = jsonbin(&base, "wrong");

    assert!(target.save(&LedgerDocument::seeded()).await.is_err());
    assert!(target.load().await.is_err());
}

#[tokio::test]
async fn test_gist_round_trip() {
    let (base, _state) = spawn_mock().await;
    let target = gist(&base, TOKEN);

    assert_eq!(target.load().await.unwrap(), None);

    let doc = busy_document();
    target.save(&doc).await.unwrap();
    assert_eq!(target.load().await.unwrap(), Some(doc));
}

#[tokio::test]
async fn test_gist_follows_raw_url_when_truncated() {
    let (base, state) = spawn_mock().await;
    let target = gist(&base, TOKEN);

    let doc = busy_document();
    target.save(&doc).await.unwrap();
    *state.truncate_gist.lock() = true;

    assert_eq!(target.load().await.unwrap(), Some(doc));
}

#[tokio::test]
async fn test_store_falls_through_to_remote_targets() {
    let (base, _state) = spawn_mock().await;
    let dir = TempDir::new().unwrap();
    // a file where the data directory should be makes the local target fail
    let blocked = dir.path().join("blocked");
    std::fs::write(&blocked, "not a directory").unwrap();

    let targets: Vec<Box<dyn StorageTarget>> = vec![
        Box::new(LocalFileTarget::new(&blocked, 5)),
        Box::new(jsonbin(&base, "wrong")),
        Box::new(gist(&base, TOKEN)),
    ];
    let store = PersistenceStore::new(targets);

    let doc = busy_document();
    let report = store.save(&doc).await;
    assert!(report.is_persisted());
    assert_eq!(report.accepted(), vec!["gist"]);

    let loaded = store.load().await;
    assert_eq!(loaded.source, Some("gist"));
    assert_eq!(loaded.document, doc);
}

#[tokio::test]
async fn test_unreachable_remote_is_a_failed_outcome() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let store = PersistenceStore::new(vec![Box::new(jsonbin(&base, API_KEY))]);
    let report = store.save(&LedgerDocument::seeded()).await;
    assert!(!report.is_persisted());
    assert!(report.into_result().is_err());
}
