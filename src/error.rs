use reqwest::StatusCode;
use thiserror::Error;

/// Fatal error for a report run. Any variant aborts the whole run; there is
/// no partial report.
#[derive(Debug, Error)]
pub enum VwapError {
    /// Transport failure talking to the chart endpoint (connect, timeout, TLS).
    #[error("request to data source failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The chart endpoint answered with a non-success status.
    #[error("unexpected response status {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },

    /// The chart endpoint reported an error object inside a 2xx body.
    #[error("data source error {code}: {description}")]
    Api { code: String, description: String },

    /// The response decoded but lacks the timestamp/close/volume arrays.
    #[error("missing required data in chart response: {0}")]
    Schema(String),

    /// The response body was not valid chart JSON.
    #[error("failed to decode chart response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
