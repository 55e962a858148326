//! In-memory [`RemoteService`] for unit tests.
//!
//! Replies are configured per operation; every call is counted so tests
//! can assert that validation failures never reach the service. Search
//! replies may carry a delay to reproduce out-of-order completions under
//! a paused tokio clock.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::client::RemoteService;
use crate::error::{DashboardError, Result};
use crate::models::{BinaryPayload, FileEntry, SearchReply, StatusSnapshot, UploadReceipt};
use crate::upload::UploadBatch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub status: usize,
    pub indexed: usize,
    pub uploaded: usize,
    pub search: usize,
    pub upload: usize,
    pub download: usize,
}

struct Inner {
    status: Result<StatusSnapshot>,
    status_delay: Duration,
    status_in_flight: usize,
    status_max_in_flight: usize,
    indexed: Result<Vec<FileEntry>>,
    uploaded: Result<Vec<FileEntry>>,
    search: HashMap<String, (Result<SearchReply>, Duration)>,
    upload: Result<UploadReceipt>,
    downloads: HashMap<String, Result<BinaryPayload>>,
    calls: CallCounts,
    searched: Vec<String>,
    uploaded_batches: Vec<Vec<String>>,
}

pub struct FakeService {
    inner: Mutex<Inner>,
}

impl Default for FakeService {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                status: Ok(StatusSnapshot::default()),
                status_delay: Duration::ZERO,
                status_in_flight: 0,
                status_max_in_flight: 0,
                indexed: Ok(Vec::new()),
                uploaded: Ok(Vec::new()),
                search: HashMap::new(),
                upload: Ok(UploadReceipt::default()),
                downloads: HashMap::new(),
                calls: CallCounts::default(),
                searched: Vec::new(),
                uploaded_batches: Vec::new(),
            }),
        }
    }
}

pub fn entry(name: &str, path: &str) -> FileEntry {
    FileEntry {
        name: name.to_string(),
        size: 1024,
        path: path.to_string(),
        modified: None,
    }
}

impl FakeService {
    pub fn calls(&self) -> CallCounts {
        self.inner.lock().unwrap().calls
    }

    pub fn searched_queries(&self) -> Vec<String> {
        self.inner.lock().unwrap().searched.clone()
    }

    pub fn uploaded_batches(&self) -> Vec<Vec<String>> {
        self.inner.lock().unwrap().uploaded_batches.clone()
    }

    pub fn set_status(&self, status: Result<StatusSnapshot>) {
        self.inner.lock().unwrap().status = status;
    }

    /// Delay applied to status calls that start from now on.
    pub fn set_status_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().status_delay = delay;
    }

    /// Most status calls ever outstanding at the same time.
    pub fn max_concurrent_status(&self) -> usize {
        self.inner.lock().unwrap().status_max_in_flight
    }

    pub fn set_indexed(&self, files: Result<Vec<FileEntry>>) {
        self.inner.lock().unwrap().indexed = files;
    }

    pub fn set_uploaded(&self, files: Result<Vec<FileEntry>>) {
        self.inner.lock().unwrap().uploaded = files;
    }

    pub fn set_search_reply(&self, query: &str, reply: SearchReply) {
        self.set_search_delayed(query, Ok(reply), Duration::ZERO);
    }

    pub fn set_search_delayed(&self, query: &str, reply: Result<SearchReply>, delay: Duration) {
        self.inner
            .lock()
            .unwrap()
            .search
            .insert(query.to_string(), (reply, delay));
    }

    pub fn set_upload(&self, receipt: Result<UploadReceipt>) {
        self.inner.lock().unwrap().upload = receipt;
    }

    pub fn set_download(&self, path: &str, payload: Result<BinaryPayload>) {
        self.inner
            .lock()
            .unwrap()
            .downloads
            .insert(path.to_string(), payload);
    }
}

#[async_trait]
impl RemoteService for FakeService {
    async fn status(&self) -> Result<StatusSnapshot> {
        let (reply, delay) = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.status += 1;
            inner.status_in_flight += 1;
            inner.status_max_in_flight = inner.status_max_in_flight.max(inner.status_in_flight);
            (inner.status.clone(), inner.status_delay)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.inner.lock().unwrap().status_in_flight -= 1;
        reply
    }

    async fn list_indexed_files(&self) -> Result<Vec<FileEntry>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.indexed += 1;
        inner.indexed.clone()
    }

    async fn list_uploaded_files(&self) -> Result<Vec<FileEntry>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.uploaded += 1;
        inner.uploaded.clone()
    }

    async fn search(&self, query: &str) -> Result<SearchReply> {
        let (reply, delay) = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.search += 1;
            inner.searched.push(query.to_string());
            inner.search.get(query).cloned().unwrap_or_else(|| {
                (
                    Ok(SearchReply {
                        http_status: 200,
                        body: json!({ "results": [] }),
                    }),
                    Duration::ZERO,
                )
            })
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }

    async fn upload(&self, batch: &UploadBatch) -> Result<UploadReceipt> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.upload += 1;
        inner
            .uploaded_batches
            .push(batch.names().into_iter().map(str::to_string).collect());
        inner.upload.clone()
    }

    async fn download(&self, path: &str) -> Result<BinaryPayload> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.download += 1;
        inner
            .downloads
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(DashboardError::remote(404, "File not found")))
    }
}
