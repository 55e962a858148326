//! Listing Controller.
//!
//! Two idempotent fetches with the same contract. On success the session
//! replaces the matching list wholesale. Failure handling differs on
//! purpose: the indexed listing is the primary view, so its failures reach
//! the error banner, while uploaded-file failures are only logged.

use crate::client::RemoteService;
use crate::error::Result;
use crate::models::FileEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingKind {
    /// Files found by the service's indexer (`GET /files`).
    Indexed,
    /// Files uploaded through the dashboard (`GET /uploaded-files`).
    Uploaded,
}

impl ListingKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Indexed => "indexed files",
            Self::Uploaded => "uploaded files",
        }
    }

    /// Whether a failure of this listing surfaces as a blocking error.
    pub fn is_primary(self) -> bool {
        matches!(self, Self::Indexed)
    }
}

pub async fn fetch_listing(service: &dyn RemoteService, kind: ListingKind) -> Result<Vec<FileEntry>> {
    match kind {
        ListingKind::Indexed => service.list_indexed_files().await,
        ListingKind::Uploaded => service.list_uploaded_files().await,
    }
}
