//! Error taxonomy for dashboard operations.
//!
//! Every controller reports failures through [`DashboardError`]:
//!
//! | Variant | Raised when |
//! |---------|-------------|
//! | [`Validation`](DashboardError::Validation) | A local precondition failed (short query, empty upload batch). No request is sent. |
//! | [`Remote`](DashboardError::Remote) | The service answered with a non-success status. |
//! | [`Transport`](DashboardError::Transport) | The request failed before a status was known, or the body could not be parsed. |
//! | [`Save`](DashboardError::Save) | Downloaded bytes could not be handed to the save sink. |
//!
//! The `Display` output of each variant is the text shown in the error
//! banner (or in a download notice).

use thiserror::Error;

/// Failure of a dashboard operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("could not save {path}: {message}")]
    Save { path: String, message: String },
}

impl DashboardError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// True when the error was raised locally, before any request.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// HTTP status reported by the service, if the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
