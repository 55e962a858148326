//! Data types exchanged with the remote file-indexing service.
//!
//! These are immutable snapshots: the dashboard never edits a
//! [`FileEntry`] in place, it only replaces listings with fresh fetches.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A listing record for a file known to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Server-relative path. May contain leading `../` segments; see
    /// [`clean_path`](crate::format::clean_path) for display.
    pub path: String,
    #[serde(default)]
    pub modified: Option<String>,
}

/// Body of `GET /files` and `GET /uploaded-files`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileListing {
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// Service status as reported by `GET /status`.
///
/// Known keys are typed; anything else the service adds is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub indexing_complete: Option<bool>,
    #[serde(default)]
    pub total_files: Option<u64>,
    #[serde(default)]
    pub upload_folder: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Uninterpreted search response: the HTTP status plus the parsed body.
///
/// The client forwards this as-is so the search controller can treat
/// HTTP 300 (ambiguous match) as data rather than as a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReply {
    pub http_status: u16,
    pub body: Value,
}

/// A file the service accepted during an upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedFile {
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub saved_name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Body of a successful `POST /upload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub uploaded: Vec<UploadedFile>,
    /// Per-file problems for a partially successful upload.
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Raw bytes of a downloaded file with the declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPayload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}
