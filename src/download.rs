//! Download Controller and save sinks.
//!
//! A download fetches the raw bytes for a server path, derives a filename
//! from the path's final segment, and hands both to a [`SaveSink`], which
//! stands in for the host's "save as" mechanism.
//!
//! Outcomes are reported as [`DownloadNotice`]s. They never touch the
//! session's loading flag or error banner, since several downloads may be
//! running at once and one failure should not disturb the rest.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::client::RemoteService;
use crate::error::{DashboardError, Result};
use crate::format::{file_name_from_path, FALLBACK_FILE_NAME};
use crate::models::BinaryPayload;

/// Destination for downloaded content.
#[async_trait]
pub trait SaveSink: Send + Sync {
    /// Store `payload` under a name derived from `file_name` and return
    /// where it ended up.
    async fn save(&self, file_name: &str, payload: &BinaryPayload) -> Result<PathBuf>;
}

/// Saves downloads into a directory, never overwriting existing files.
///
/// A clash on `report.pdf` is resolved as `report (1).pdf`,
/// `report (2).pdf`, and so on.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

const MAX_NAME_ATTEMPTS: usize = 1000;

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SaveSink for DirectorySink {
    async fn save(&self, file_name: &str, payload: &BinaryPayload) -> Result<PathBuf> {
        let save_err = |path: &Path, e: std::io::Error| DashboardError::Save {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| save_err(&self.dir, e))?;

        let name = sanitize_file_name(file_name);
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let target = self.dir.join(numbered_name(&name, attempt));
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .await;
            let file = match opened {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(save_err(&target, e)),
            };
            write_or_remove(file, &target, &payload.bytes)
                .await
                .map_err(|e| save_err(&target, e))?;
            return Ok(target);
        }

        Err(DashboardError::Save {
            path: self.dir.join(&name).display().to_string(),
            message: "too many files with this name".to_string(),
        })
    }
}

/// Write `bytes` to a freshly created `target`. On failure the partial
/// file is removed.
async fn write_or_remove(
    mut file: tokio::fs::File,
    target: &Path,
    bytes: &[u8],
) -> std::io::Result<()> {
    let written = match file.write_all(bytes).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };
    if written.is_err() {
        drop(file);
        if let Err(e) = tokio::fs::remove_file(target).await {
            warn!(path = %target.display(), error = %e, "could not remove partial download");
        }
    }
    written
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '/' | '\\'))
        .collect();
    match cleaned.trim() {
        "" | "." | ".." => FALLBACK_FILE_NAME.to_string(),
        trimmed => trimmed.to_string(),
    }
}

fn numbered_name(name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{} ({}){}", &name[..dot], attempt, &name[dot..]),
        _ => format!("{} ({})", name, attempt),
    }
}

/// Fetch `path` from the service and save it through `sink`.
pub async fn download_file(
    service: &dyn RemoteService,
    sink: &dyn SaveSink,
    path: &str,
) -> Result<PathBuf> {
    let payload = service.download(path).await?;
    sink.save(file_name_from_path(path), &payload).await
}

/// Transient, per-download notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadNotice {
    /// Server path that was requested.
    pub path: String,
    pub at: DateTime<Utc>,
    pub kind: NoticeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeKind {
    Saved(PathBuf),
    Failed(String),
}

impl DownloadNotice {
    pub fn from_result(path: String, result: Result<PathBuf>) -> Self {
        let kind = match result {
            Ok(saved) => NoticeKind::Saved(saved),
            Err(e) => NoticeKind::Failed(e.to_string()),
        };
        Self {
            path,
            at: Utc::now(),
            kind,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.kind, NoticeKind::Failed(_))
    }
}
