//! Error taxonomy for the scraping pipeline.
//!
//! Every fallible operation in the crate returns a [`ScrapeError`] so callers
//! can distinguish the failure classes that matter to the orchestrator:
//! transport problems, unexpected HTTP statuses, malformed payloads, and
//! archive I/O. Nothing here is ever allowed to take down the host process:
//! the pipeline turns listing failures into a graceful end-of-run and
//! article failures into a recorded sentinel.

use chrono::NaiveDate;
use reqwest::StatusCode;

/// Errors that can occur while scraping and archiving articles.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// An HTTP request failed at the transport level.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream returned a non-success status.
    #[error("unexpected status {status} from {url}")]
    HttpStatus { status: StatusCode, url: String },

    /// A response body could not be parsed as the expected JSON shape.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing the CSV archive failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// An archive file operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A URL could not be constructed.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// The caller supplied a date window with `start` after `end`.
    #[error("invalid date window: {start} is after {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
}

impl ScrapeError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Transport failures and throttling/server statuses are transient;
    /// client errors and parse failures are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::HttpStatus { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}
