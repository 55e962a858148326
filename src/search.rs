//! Search Controller.
//!
//! Validates the query locally, calls the service, and turns the raw
//! `(status, body)` reply into a [`SearchOutcome`]:
//!
//! | Status | Outcome |
//! |--------|---------|
//! | `2xx` | [`SearchOutcome::Results`] (possibly empty) |
//! | `300` | [`SearchOutcome::Disambiguation`] with the candidate paths |
//! | `>= 400` | [`DashboardError::Remote`] with the service's message |
//!
//! A `300` carrying no candidates is reported as `Results([])`: nothing
//! matched, so there is nothing to pick from.
//!
//! The controller holds no state. Ordering between overlapping searches is
//! enforced by the session, which tags each issued search with a sequence
//! number (see [`crate::session`]).

use serde::Deserialize;
use serde_json::Value;

use crate::client::{error_message, RemoteService};
use crate::error::{DashboardError, Result};
use crate::models::{FileEntry, SearchReply};

/// Shortest accepted query, counted in characters after trimming.
pub const MIN_QUERY_CHARS: usize = 2;

/// Status the service uses for "several files matched, pick one".
pub const AMBIGUOUS_STATUS: u16 = 300;

/// Result of one search. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Results(Vec<FileEntry>),
    Disambiguation(Vec<String>),
    Failure(String),
}

impl SearchOutcome {
    /// Matching entries; empty unless this is `Results`.
    pub fn results(&self) -> &[FileEntry] {
        match self {
            Self::Results(entries) => entries,
            _ => &[],
        }
    }

    /// Candidate paths; empty unless this is `Disambiguation`.
    pub fn candidates(&self) -> &[String] {
        match self {
            Self::Disambiguation(paths) => paths,
            _ => &[],
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

#[derive(Deserialize)]
struct ResultsBody {
    #[serde(default)]
    results: Vec<FileEntry>,
}

#[derive(Deserialize)]
struct ChoicesBody {
    #[serde(default)]
    choices: Vec<String>,
}

/// Reject queries shorter than [`MIN_QUERY_CHARS`] once trimmed.
pub fn validate_query(query: &str) -> Result<()> {
    if query.trim().chars().count() < MIN_QUERY_CHARS {
        return Err(DashboardError::validation(format!(
            "Please enter at least {} characters to search",
            MIN_QUERY_CHARS
        )));
    }
    Ok(())
}

/// Validate, send, and interpret one search.
///
/// The query is sent as typed; trimming only applies to the length check.
pub async fn run_search(service: &dyn RemoteService, query: &str) -> Result<SearchOutcome> {
    validate_query(query)?;
    let reply = service.search(query).await?;
    interpret_reply(reply)
}

/// Map a raw search reply to an outcome or an error.
pub fn interpret_reply(reply: SearchReply) -> Result<SearchOutcome> {
    let SearchReply { http_status, body } = reply;

    if http_status == AMBIGUOUS_STATUS {
        let choices = serde_json::from_value::<ChoicesBody>(body)
            .map(|b| b.choices)
            .unwrap_or_default();
        if choices.is_empty() {
            return Ok(SearchOutcome::Results(Vec::new()));
        }
        return Ok(SearchOutcome::Disambiguation(choices));
    }

    if (200..300).contains(&http_status) {
        let parsed: ResultsBody = serde_json::from_value(body).map_err(|e| {
            DashboardError::Transport(format!("invalid search results: {}", e))
        })?;
        return Ok(SearchOutcome::Results(parsed.results));
    }

    Err(DashboardError::remote(
        http_status,
        failure_message(http_status, &body),
    ))
}

fn failure_message(status: u16, body: &Value) -> String {
    let empty = match body {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if empty {
        format!("Search failed (HTTP {})", status)
    } else {
        error_message(body)
    }
}
