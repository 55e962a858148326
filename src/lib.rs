//! # File Dashboard
//!
//! Client-side controller for a remote file-indexing service: browse the
//! indexed and uploaded file listings, search by filename, upload batches
//! of files, and download files by their server path.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Dashboard                         │
//! │              (owns SessionState, applies results)        │
//! └───┬──────────┬───────────┬───────────┬───────────┬───────┘
//!     ▼          ▼           ▼           ▼           ▼
//! ┌────────┐ ┌────────┐ ┌────────┐ ┌──────────┐ ┌──────────┐
//! │ Poller │ │Listing │ │ Search │ │  Upload  │ │ Download │
//! └───┬────┘ └───┬────┘ └───┬────┘ └────┬─────┘ └────┬─────┘
//!     └──────────┴──────────┴─────┬─────┴────────────┘
//!                                 ▼
//!                        ┌─────────────────┐
//!                        │  RemoteService  │──▶ HTTP service
//!                        └─────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! fdash --base-url http://localhost:8080 files
//! fdash search "report"
//! fdash upload ./a.txt ./b.txt
//! fdash download docs/report.pdf --dir ./downloads
//! fdash watch
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Wire types exchanged with the service |
//! | [`error`] | Error taxonomy |
//! | [`format`] | Path and size display helpers |
//! | [`client`] | Remote service trait and HTTP client |
//! | [`poller`] | Background status polling |
//! | [`listing`] | Indexed and uploaded file listings |
//! | [`search`] | Query validation and response disambiguation |
//! | [`upload`] | Upload selection and submission |
//! | [`download`] | Download and save sinks |
//! | [`session`] | Session state transitions |
//! | [`dashboard`] | Orchestrator tying the above together |

pub mod client;
pub mod config;
pub mod dashboard;
pub mod download;
pub mod error;
pub mod format;
pub mod listing;
pub mod models;
pub mod poller;
pub mod search;
pub mod session;
pub mod upload;

#[cfg(test)]
mod testing;
