//! Upload selection and the Upload Controller.
//!
//! Files reach an [`UploadBatch`] through one of two adapters:
//!
//! - [`UploadBatch::from_picker`] reads the files a user picked from disk.
//! - [`UploadBatch::from_drop`] takes items dropped onto the view, already
//!   in memory.
//!
//! Both produce the same batch value, and the dashboard replaces (never
//! extends) its selection with whichever batch arrives last.

use std::path::{Path, PathBuf};
use tracing::warn;

use crate::client::RemoteService;
use crate::error::{DashboardError, Result};
use crate::models::UploadReceipt;

/// Label shown while nothing is selected.
pub const SELECTION_PLACEHOLDER: &str = "Drag & drop files here or click to select";

/// Message shown when the service confirms an upload without one.
pub const DEFAULT_UPLOAD_MESSAGE: &str = "Upload successful";

/// One file queued for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Read a local file into a handle named after its final component.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                DashboardError::validation(format!("not a file path: {}", path.display()))
            })?
            .to_string();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            DashboardError::validation(format!("cannot read {}: {}", path.display(), e))
        })?;
        Ok(Self::new(name, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// The set of files selected for the next upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadBatch {
    files: Vec<FileHandle>,
}

impl UploadBatch {
    /// Picker adapter: load every chosen path.
    pub async fn from_picker(paths: &[PathBuf]) -> Result<Self> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            files.push(FileHandle::from_path(path).await?);
        }
        Ok(Self { files })
    }

    /// Drop adapter. Items without a name are not files and are skipped.
    pub fn from_drop(items: impl IntoIterator<Item = FileHandle>) -> Self {
        Self {
            files: items
                .into_iter()
                .filter(|f| !f.name.trim().is_empty())
                .collect(),
        }
    }

    pub fn files(&self) -> &[FileHandle] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    /// Text describing the selection, e.g. `"2 files selected: a.txt, b.txt"`.
    pub fn label(&self) -> String {
        match self.files.as_slice() {
            [] => SELECTION_PLACEHOLDER.to_string(),
            [only] => only.name.clone(),
            files => format!(
                "{} files selected: {}",
                files.len(),
                self.names().join(", ")
            ),
        }
    }
}

/// Submit a batch and return the message to show on success.
///
/// An empty batch is rejected before any request is made.
pub async fn submit_batch(service: &dyn RemoteService, batch: &UploadBatch) -> Result<String> {
    if batch.is_empty() {
        return Err(DashboardError::validation("No files selected for upload"));
    }

    let receipt = service.upload(batch).await?;
    for warning in &receipt.warnings {
        warn!(warning = %warning, "upload completed with warning");
    }
    Ok(success_message(&receipt))
}

fn success_message(receipt: &UploadReceipt) -> String {
    let base = receipt
        .message
        .clone()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_UPLOAD_MESSAGE.to_string());
    match receipt.warnings.len() {
        0 => base,
        1 => format!("{} (1 warning)", base),
        n => format!("{} ({} warnings)", base, n),
    }
}
