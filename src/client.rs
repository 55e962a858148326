//! Remote Service Client.
//!
//! [`RemoteService`] is the only seam through which the dashboard talks to
//! the file-indexing service. [`HttpServiceClient`] implements it over
//! HTTP with `reqwest`; tests substitute in-memory fakes.
//!
//! # Endpoints
//!
//! | Method | Path | Params | Success body |
//! |--------|------|--------|--------------|
//! | `GET`  | `/status` | – | status snapshot |
//! | `GET`  | `/files` | – | `{ "files": [...] }` |
//! | `GET`  | `/uploaded-files` | – | `{ "files": [...] }` |
//! | `GET`  | `/search` | `q` | `{ "results": [...] }`, or `300` with `{ "choices": [...] }` |
//! | `POST` | `/upload` | multipart `file` (repeated) | `{ "message": ... }` |
//! | `GET`  | `/download` | `filepath` | raw bytes |
//!
//! # Error Contract
//!
//! Every non-2xx answer becomes [`DashboardError::Remote`] carrying the
//! body's `error` string when present, otherwise the stringified body.
//! The one exception is [`search`](RemoteService::search), which hands the
//! status and body to the caller uninterpreted.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::models::{
    BinaryPayload, FileEntry, FileListing, SearchReply, StatusSnapshot, UploadReceipt,
};
use crate::upload::UploadBatch;

/// Multipart field name the service reads uploaded files from.
pub const UPLOAD_FIELD: &str = "file";

/// Typed operations offered by the remote file-indexing service.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Current service snapshot.
    async fn status(&self) -> Result<StatusSnapshot>;

    /// Files found by the service's indexer. Empty, never absent.
    async fn list_indexed_files(&self) -> Result<Vec<FileEntry>>;

    /// Files previously uploaded to the service. Empty, never absent.
    async fn list_uploaded_files(&self) -> Result<Vec<FileEntry>>;

    /// Run a search and return the raw status and body.
    ///
    /// Only transport and parse failures are errors here; HTTP status
    /// interpretation belongs to [`crate::search`].
    async fn search(&self, query: &str) -> Result<SearchReply>;

    /// Send every file of the batch in one multipart request.
    async fn upload(&self, batch: &UploadBatch) -> Result<UploadReceipt>;

    /// Fetch the raw content of a file by its server path.
    async fn download(&self, path: &str) -> Result<BinaryPayload>;
}

/// [`RemoteService`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpServiceClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.service.base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(path, "remote call");
        let resp = self.http.get(self.url(path)).send().await?;
        read_json(resp).await
    }
}

#[async_trait]
impl RemoteService for HttpServiceClient {
    async fn status(&self) -> Result<StatusSnapshot> {
        self.get_json("/status").await
    }

    async fn list_indexed_files(&self) -> Result<Vec<FileEntry>> {
        let listing: FileListing = self.get_json("/files").await?;
        Ok(listing.files)
    }

    async fn list_uploaded_files(&self) -> Result<Vec<FileEntry>> {
        let listing: FileListing = self.get_json("/uploaded-files").await?;
        Ok(listing.files)
    }

    async fn search(&self, query: &str) -> Result<SearchReply> {
        debug!(path = "/search", query, "remote call");
        let resp = self
            .http
            .get(self.url("/search"))
            .query(&[("q", query)])
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        let body = match serde_json::from_str::<Value>(&text) {
            Ok(body) => body,
            // Error pages are often not JSON; keep the text for the banner.
            Err(_) if !status.is_success() => Value::String(text),
            Err(e) => {
                return Err(DashboardError::Transport(format!(
                    "invalid search response: {}",
                    e
                )))
            }
        };

        Ok(SearchReply {
            http_status: status.as_u16(),
            body,
        })
    }

    async fn upload(&self, batch: &UploadBatch) -> Result<UploadReceipt> {
        debug!(path = "/upload", files = batch.len(), "remote call");
        let mut form = Form::new();
        for file in batch.files() {
            let mut part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
            if let Some(mime) = &file.mime {
                part = part.mime_str(mime)?;
            }
            form = form.part(UPLOAD_FIELD, part);
        }

        let resp = self
            .http
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn download(&self, path: &str) -> Result<BinaryPayload> {
        debug!(path = "/download", filepath = path, "remote call");
        let resp = self
            .http
            .get(self.url("/download"))
            .query(&[("filepath", path)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(remote_error(status, &text));
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = resp.bytes().await?.to_vec();

        Ok(BinaryPayload {
            bytes,
            content_type,
        })
    }
}

/// Decode a JSON body, or turn a non-2xx answer into a remote error.
async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(remote_error(status, &text));
    }

    serde_json::from_str(&text)
        .map_err(|e| DashboardError::Transport(format!("invalid response body: {}", e)))
}

fn remote_error(status: StatusCode, text: &str) -> DashboardError {
    let message = match serde_json::from_str::<Value>(text) {
        Ok(body) => error_message(&body),
        Err(_) if !text.trim().is_empty() => text.trim().to_string(),
        Err(_) => format!("HTTP {}", status),
    };
    DashboardError::remote(status.as_u16(), message)
}

/// Message to display for an error body: its `error` string, else the
/// whole body stringified.
pub fn error_message(body: &Value) -> String {
    match body.get("error") {
        Some(Value::String(msg)) => msg.clone(),
        Some(other) if !other.is_null() => other.to_string(),
        _ => match body {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        },
    }
}
