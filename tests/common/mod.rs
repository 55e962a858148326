//! Mock of the remote file-indexing service, served by axum on an
//! ephemeral port.
//!
//! | Query | Behavior |
//! |-------|----------|
//! | `report` | `300` with two choices |
//! | `none-choices` | `300` with an empty choice list |
//! | `zzz` | `200` with no results |
//! | `boom` | `500` with `{ "error": ... }` |
//! | `slow-*` | sleeps 300 ms, then one result named after the query |
//! | anything else | one result named after the query |

#![allow(dead_code)]

use axum::extract::{Multipart, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct MockState {
    pub status_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub uploaded_listing_calls: AtomicUsize,
    pub search_queries: Mutex<Vec<String>>,
    pub uploaded: Mutex<Vec<(String, usize)>>,
}

impl MockState {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub struct MockService {
    pub base_url: String,
    pub state: Arc<MockState>,
}

pub async fn spawn_mock_service() -> MockService {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route("/status", get(handle_status))
        .route("/files", get(handle_files))
        .route("/uploaded-files", get(handle_uploaded_files))
        .route("/search", get(handle_search))
        .route("/upload", post(handle_upload))
        .route("/download", get(handle_download))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    MockService {
        base_url: format!("http://{}", addr),
        state,
    }
}

fn file_json(name: &str, path: &str, size: u64) -> Value {
    json!({
        "name": name,
        "size": size,
        "path": path,
        "modified": "2024-05-01T10:00:00",
        "full_path": format!("/mnt/drive-x1/{}", path)
    })
}

async fn handle_status(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.status_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "indexing_complete": true,
        "total_files": 3,
        "upload_folder": "/srv/uploads"
    }))
}

async fn handle_files() -> Json<Value> {
    Json(json!({
        "files": [
            file_json("report.pdf", "../docs/a/b/report.pdf", 1536),
            file_json("notes.txt", "notes/notes.txt", 12),
        ],
        "count": 2
    }))
}

async fn handle_uploaded_files(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.uploaded_listing_calls.fetch_add(1, Ordering::SeqCst);
    let files: Vec<Value> = state
        .uploaded
        .lock()
        .unwrap()
        .iter()
        .map(|(name, size)| file_json(name, &format!("/srv/uploads/{}", name), *size as u64))
        .collect();
    let count = files.len();
    Json(json!({ "files": files, "count": count }))
}

async fn handle_search(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.search_calls.fetch_add(1, Ordering::SeqCst);
    let q = params.get("q").cloned().unwrap_or_default();
    state.search_queries.lock().unwrap().push(q.clone());

    match q.as_str() {
        "report" => (
            StatusCode::MULTIPLE_CHOICES,
            Json(json!({
                "error": "Multiple files found",
                "choices": ["a/b.txt", "c/d.txt"]
            })),
        )
            .into_response(),
        "none-choices" => {
            (StatusCode::MULTIPLE_CHOICES, Json(json!({ "choices": [] }))).into_response()
        }
        "zzz" => Json(json!({ "query": q, "results": [], "count": 0 })).into_response(),
        "boom" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "database is locked" })),
        )
            .into_response(),
        _ => {
            if q.starts_with("slow-") {
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            Json(json!({
                "query": q,
                "results": [file_json(&q, &format!("found/{}", q), 10)],
                "count": 1
            }))
            .into_response()
        }
    }
}

async fn handle_upload(State(state): State<Arc<MockState>>, mut multipart: Multipart) -> Response {
    state.upload_calls.fetch_add(1, Ordering::SeqCst);
    let mut received = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.unwrap_or_default();
        if !name.is_empty() {
            received.push((name, data.len()));
        }
    }

    if received.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No files selected" })),
        )
            .into_response();
    }

    let count = received.len();
    let uploaded: Vec<Value> = received
        .iter()
        .map(|(name, size)| json!({ "original_name": name, "saved_name": name, "size": size }))
        .collect();
    state.uploaded.lock().unwrap().extend(received);

    Json(json!({
        "message": format!("Successfully uploaded {} file(s)", count),
        "uploaded": uploaded
    }))
    .into_response()
}

async fn handle_download(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("filepath").map(String::as_str) {
        Some("a/b/report.pdf") => (
            [(header::CONTENT_TYPE, "application/pdf")],
            b"%PDF-1.4 fake".to_vec(),
        )
            .into_response(),
        Some(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "File not found" })),
        )
            .into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing 'filepath' query parameter" })),
        )
            .into_response(),
    }
}
