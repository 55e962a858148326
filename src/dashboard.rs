//! Dashboard Orchestrator.
//!
//! [`Dashboard`] owns the [`SessionState`] for one session and is the only
//! place it changes. User actions start controller work on the tokio
//! runtime; each piece of work reports back as a [`Completion`] on a
//! channel, and the dashboard applies completions one at a time.
//!
//! ```text
//!  action ──▶ SessionState::begin_* ──▶ tokio::spawn(controller)
//!                                              │
//!                                              ▼
//!  SessionState::finish_* / apply_* ◀── Completion channel ◀── poller
//! ```
//!
//! Any number of calls may be outstanding at once (a poll, a search, a few
//! downloads). Nothing is cancelled mid-flight: superseded searches are
//! filtered when their completion is applied.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use file_dashboard::client::HttpServiceClient;
//! use file_dashboard::dashboard::Dashboard;
//! use file_dashboard::download::DirectorySink;
//!
//! # async fn example() -> Result<(), file_dashboard::error::DashboardError> {
//! let client = HttpServiceClient::new("http://localhost:8080", std::time::Duration::from_secs(120))?;
//! let mut dash = Dashboard::new(Arc::new(client), Arc::new(DirectorySink::new("./downloads")));
//! dash.set_query("report");
//! dash.search()?;
//! dash.settle().await;
//! println!("{:?}", dash.state().search_outcome);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::error;

use crate::client::RemoteService;
use crate::download::{download_file, DownloadNotice, SaveSink};
use crate::error::{DashboardError, Result};
use crate::listing::{fetch_listing, ListingKind};
use crate::models::{FileEntry, StatusSnapshot};
use crate::poller::{spawn_poller, PollerHandle};
use crate::search::{run_search, SearchOutcome};
use crate::session::{SearchTicket, SessionState};
use crate::upload::{submit_batch, UploadBatch};

/// Result of one finished piece of controller work.
#[derive(Debug)]
pub enum Completion {
    /// Snapshot delivered by the background poller.
    Polled(Result<StatusSnapshot>),
    /// Snapshot from an explicit refresh.
    Status(Result<StatusSnapshot>),
    Listing {
        kind: ListingKind,
        result: Result<Vec<FileEntry>>,
    },
    Search {
        ticket: SearchTicket,
        result: Result<SearchOutcome>,
    },
    Upload(Result<String>),
    Download {
        path: String,
        result: Result<PathBuf>,
    },
}

pub struct Dashboard {
    state: SessionState,
    service: Arc<dyn RemoteService>,
    sink: Arc<dyn SaveSink>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    poller: Option<PollerHandle>,
    /// Spawned tasks whose completion has not been applied yet. The
    /// poller is not counted.
    in_flight: usize,
}

impl Dashboard {
    pub fn new(service: Arc<dyn RemoteService>, sink: Arc<dyn SaveSink>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: SessionState::new(),
            service,
            sink,
            tx,
            rx,
            poller: None,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(PollerHandle::is_running)
    }

    /// Run `work` on the runtime. If it panics, `on_panic` builds the
    /// completion instead, so every spawn is matched by exactly one
    /// completion.
    fn spawn<F, P>(&mut self, work: F, on_panic: P)
    where
        F: Future<Output = Completion> + Send + 'static,
        P: FnOnce(DashboardError) -> Completion + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.tx.clone();
        let task = tokio::spawn(work);
        tokio::spawn(async move {
            let completion = match task.await {
                Ok(completion) => completion,
                Err(e) => {
                    error!(error = %e, "controller task failed");
                    on_panic(DashboardError::Transport(format!("task failed: {}", e)))
                }
            };
            let _ = tx.send(completion);
        });
    }

    // ── Session lifecycle ───────────────────────────────────────────

    /// Load both listings and the current status, then start polling.
    pub fn start(&mut self, poll_interval: Duration) {
        self.refresh_listing(ListingKind::Indexed);
        self.refresh_listing(ListingKind::Uploaded);
        self.refresh_status();

        let tx = self.tx.clone();
        self.poller = Some(spawn_poller(
            self.service.clone(),
            poll_interval,
            move |result| tx.send(Completion::Polled(result)).is_ok(),
        ));
    }

    /// Stop background polling. Outstanding calls still complete.
    pub fn shutdown(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
    }

    // ── Refreshes ───────────────────────────────────────────────────

    pub fn refresh_status(&mut self) {
        let service = self.service.clone();
        self.spawn(
            async move { Completion::Status(service.status().await) },
            |e| Completion::Status(Err(e)),
        );
    }

    pub fn refresh_listing(&mut self, kind: ListingKind) {
        let service = self.service.clone();
        self.spawn(
            async move {
                Completion::Listing {
                    kind,
                    result: fetch_listing(service.as_ref(), kind).await,
                }
            },
            move |e| Completion::Listing {
                kind,
                result: Err(e),
            },
        );
    }

    // ── Search ──────────────────────────────────────────────────────

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.set_query(query);
    }

    /// Search for the current query, superseding any pending search.
    pub fn search(&mut self) -> Result<SearchTicket> {
        let ticket = self.state.begin_search()?;
        let service = self.service.clone();
        let query = self.state.query.clone();
        self.spawn(
            async move {
                Completion::Search {
                    ticket,
                    result: run_search(service.as_ref(), &query).await,
                }
            },
            move |e| Completion::Search {
                ticket,
                result: Err(e),
            },
        );
        Ok(ticket)
    }

    pub fn clear_search(&mut self) {
        self.state.clear_search();
    }

    // ── Upload ──────────────────────────────────────────────────────

    /// Replace the selection. See [`SessionState::select_files`].
    pub fn select_files(&mut self, batch: UploadBatch) -> bool {
        self.state.select_files(batch)
    }

    pub fn clear_selection(&mut self) {
        self.state.clear_selection();
    }

    pub fn upload(&mut self) -> Result<()> {
        let batch = self.state.begin_upload()?;
        let service = self.service.clone();
        self.spawn(
            async move { Completion::Upload(submit_batch(service.as_ref(), &batch).await) },
            |e| Completion::Upload(Err(e)),
        );
        Ok(())
    }

    // ── Download ────────────────────────────────────────────────────

    pub fn download(&mut self, path: impl Into<String>) {
        let path = path.into();
        let service = self.service.clone();
        let sink = self.sink.clone();
        let failed_path = path.clone();
        self.spawn(
            async move {
                let result = download_file(service.as_ref(), sink.as_ref(), &path).await;
                Completion::Download { path, result }
            },
            move |e| Completion::Download {
                path: failed_path,
                result: Err(e),
            },
        );
    }

    pub fn take_notices(&mut self) -> Vec<DownloadNotice> {
        self.state.take_notices()
    }

    // ── Applying completions ────────────────────────────────────────

    /// Wait for the next completion without applying it.
    ///
    /// Returns `None` only if the channel is closed, which cannot happen
    /// while the dashboard holds its own sender.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }

    pub fn apply(&mut self, completion: Completion) {
        if !matches!(completion, Completion::Polled(_)) {
            self.in_flight = self.in_flight.saturating_sub(1);
        }

        match completion {
            Completion::Polled(result) | Completion::Status(result) => {
                self.state.apply_status(result)
            }
            Completion::Listing { kind, result } => self.state.apply_listing(kind, result),
            Completion::Search { ticket, result } => {
                self.state.finish_search(ticket, result);
            }
            Completion::Upload(result) => {
                // Finalize the upload first; the listing refresh runs on its own.
                if self.state.finish_upload(result) {
                    self.refresh_listing(ListingKind::Uploaded);
                }
            }
            Completion::Download { path, result } => {
                self.state.push_notice(DownloadNotice::from_result(path, result));
            }
        }
    }

    /// Wait for and apply one completion.
    pub async fn step(&mut self) {
        if let Some(completion) = self.next_completion().await {
            self.apply(completion);
        }
    }

    /// Apply completions until no spawned work is outstanding, including
    /// follow-up work started while settling.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            self.step().await;
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.shutdown();
    }
}
