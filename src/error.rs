//! Error taxonomy for fetching and normalizing insight listings.
//!
//! Errors fall into two groups. Recoverable ones ([`ScrapeError::Render`] and
//! [`ScrapeError::Transport`]) end the current listing URL early and keep what
//! was already collected. Everything else is fatal for the source and is
//! returned from [`crate::orchestrator::FetchOrchestrator::execute`]; isolating
//! one failed source from the rest of a run is the caller's job.

use thiserror::Error;

/// Everything that can go wrong while driving a listing to completion.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// A selector or content wait gave up before the element appeared.
    #[error("timed out waiting for `{selector}` after {timeout_ms} ms")]
    Render { selector: String, timeout_ms: u64 },

    /// The remote answered with a non-success HTTP status.
    #[error("{url} answered with HTTP {status}")]
    Transport { url: String, status: u16 },

    /// The request itself failed (DNS, TLS, connection reset, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A date or structural field could not be interpreted.
    #[error("could not parse {field} from {value:?}")]
    Parse { field: &'static str, value: String },

    /// A CSS selector in a source definition is malformed.
    #[error("invalid selector `{0}`")]
    Selector(String),

    #[error("malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// The session cannot perform the requested interaction.
    #[error("session cannot {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ScrapeError {
    /// Whether the orchestrator should stop the current URL and keep its
    /// partial results instead of failing the whole source.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ScrapeError::Render { .. } | ScrapeError::Transport { .. })
    }

    pub(crate) fn parse(field: &'static str, value: impl Into<String>) -> Self {
        ScrapeError::Parse {
            field,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
