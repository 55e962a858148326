//! Session state and its transitions.
//!
//! [`SessionState`] is the single aggregate the dashboard renders from.
//! It is only changed through the methods below, each of which applies one
//! controller result. Controllers never touch it directly, which keeps
//! every transition atomic with respect to the others.
//!
//! # Search ordering
//!
//! Every issued search gets a [`SearchTicket`] with a sequence number one
//! higher than the previous. A completion is applied only if its ticket is
//! the latest issued and still pending; anything older was superseded and
//! is dropped, whatever order the responses arrive in.
//!
//! # Loading
//!
//! `loading` is true exactly while a search or an upload is pending.
//! Status polls, listing fetches, and downloads never set it. A search may
//! supersede a pending search, but neither operation can start while the
//! other kind is pending.

use tracing::{debug, warn};

use crate::download::{DownloadNotice, NoticeKind};
use crate::error::{DashboardError, Result};
use crate::listing::ListingKind;
use crate::models::{FileEntry, StatusSnapshot};
use crate::search::{validate_query, SearchOutcome};
use crate::upload::UploadBatch;

/// Identifies one issued search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket {
    seq: u64,
}

impl SearchTicket {
    pub fn seq(self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Search(SearchTicket),
    Upload,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub status: Option<StatusSnapshot>,
    pub indexed_files: Vec<FileEntry>,
    pub uploaded_files: Vec<FileEntry>,
    pub query: String,
    pub search_outcome: Option<SearchOutcome>,
    pub loading: bool,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
    pub selection: UploadBatch,
    pub notices: Vec<DownloadNotice>,
    pending: Option<Pending>,
    last_search_seq: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn selection_label(&self) -> String {
        self.selection.label()
    }

    fn busy_with_upload(&self) -> bool {
        matches!(self.pending, Some(Pending::Upload))
    }

    // ── Search ──────────────────────────────────────────────────────

    /// Start a search for the current query.
    ///
    /// Clears the previous outcome. A too-short query sets the error
    /// banner and returns a validation error without issuing a ticket.
    pub fn begin_search(&mut self) -> Result<SearchTicket> {
        if self.busy_with_upload() {
            return Err(DashboardError::validation(
                "Wait for the current upload to finish before searching",
            ));
        }

        self.search_outcome = None;
        if let Err(e) = validate_query(&self.query) {
            self.error_message = Some(e.to_string());
            return Err(e);
        }

        self.last_search_seq += 1;
        let ticket = SearchTicket {
            seq: self.last_search_seq,
        };
        self.pending = Some(Pending::Search(ticket));
        self.loading = true;
        Ok(ticket)
    }

    /// Apply a search completion. Returns `false` if it was superseded.
    pub fn finish_search(&mut self, ticket: SearchTicket, result: Result<SearchOutcome>) -> bool {
        if self.pending != Some(Pending::Search(ticket)) || ticket.seq != self.last_search_seq {
            debug!(seq = ticket.seq, latest = self.last_search_seq, "discarding stale search result");
            return false;
        }

        self.pending = None;
        self.loading = false;
        match result {
            Ok(outcome) => {
                self.search_outcome = Some(outcome);
                self.error_message = None;
            }
            Err(e) => {
                self.search_outcome = Some(SearchOutcome::Failure(e.to_string()));
                self.error_message = Some(format!("Search error: {}", e));
            }
        }
        true
    }

    /// Reset query, outcome, and banner. A pending search is superseded.
    pub fn clear_search(&mut self) {
        self.query.clear();
        self.search_outcome = None;
        self.error_message = None;
        if let Some(Pending::Search(_)) = self.pending {
            self.last_search_seq += 1;
            self.pending = None;
            self.loading = false;
        }
    }

    // ── Upload ──────────────────────────────────────────────────────

    /// Replace the selection with a picked or dropped batch.
    ///
    /// An empty batch (a cancelled picker, a drop with no files) leaves
    /// the current selection alone and returns `false`.
    pub fn select_files(&mut self, batch: UploadBatch) -> bool {
        if batch.is_empty() {
            return false;
        }
        self.selection = batch;
        self.success_message = None;
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection = UploadBatch::default();
        self.success_message = None;
    }

    /// Start uploading the current selection and return a copy of it.
    pub fn begin_upload(&mut self) -> Result<UploadBatch> {
        if self.pending.is_some() {
            return Err(DashboardError::validation(
                "Another operation is in progress",
            ));
        }
        if self.selection.is_empty() {
            let err = DashboardError::validation("No files selected for upload");
            self.error_message = Some(err.to_string());
            return Err(err);
        }

        self.error_message = None;
        self.pending = Some(Pending::Upload);
        self.loading = true;
        Ok(self.selection.clone())
    }

    /// Apply an upload completion. Returns `true` when the uploaded-files
    /// listing should be fetched again.
    pub fn finish_upload(&mut self, result: Result<String>) -> bool {
        if self.busy_with_upload() {
            self.pending = None;
            self.loading = false;
        }
        match result {
            Ok(message) => {
                self.success_message = Some(message);
                self.selection = UploadBatch::default();
                true
            }
            Err(e) => {
                // Selection is kept so the user can retry.
                self.error_message = Some(format!("Upload failed: {}", e));
                false
            }
        }
    }

    // ── Background refreshes ────────────────────────────────────────

    pub fn apply_status(&mut self, result: Result<StatusSnapshot>) {
        match result {
            Ok(status) => self.status = Some(status),
            Err(e) => warn!(error = %e, "status poll failed"),
        }
    }

    pub fn apply_listing(&mut self, kind: ListingKind, result: Result<Vec<FileEntry>>) {
        match (kind, result) {
            (ListingKind::Indexed, Ok(files)) => self.indexed_files = files,
            (ListingKind::Uploaded, Ok(files)) => self.uploaded_files = files,
            (kind, Err(e)) if kind.is_primary() => {
                self.error_message = Some(format!("Files error: {}", e));
            }
            (kind, Err(e)) => warn!(listing = kind.label(), error = %e, "listing fetch failed"),
        }
    }

    pub fn push_notice(&mut self, notice: DownloadNotice) {
        if let NoticeKind::Failed(message) = &notice.kind {
            warn!(path = %notice.path, error = %message, "download failed");
        }
        self.notices.push(notice);
    }

    /// Remove and return all download notices.
    pub fn take_notices(&mut self) -> Vec<DownloadNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn dismiss_success(&mut self) {
        self.success_message = None;
    }
}
