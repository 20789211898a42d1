//! Error types for SpringServe API operations.

use thiserror::Error;

/// Errors that can occur during SpringServe API operations.
#[derive(Debug, Error)]
pub enum SpringServeError {
    /// Configuration is missing or incomplete.
    #[error("SpringServe configuration required: {0}")]
    ConfigMissing(String),

    /// A field was read that the wrapped object does not carry.
    #[error("field '{0}' not found")]
    FieldNotFound(String),

    /// A field was written on a wrapper whose body is not a JSON object.
    #[error("cannot set field '{0}': response body is not a JSON object")]
    NotAnObject(String),

    /// `save` was called on an object without an `id` field.
    #[error("cannot save an object without an 'id' field")]
    MissingId,

    /// Index past the end of a fully paginated collection.
    #[error("index {index} out of range: all pages fetched, {len} items available")]
    IndexOutOfRange { index: usize, len: usize },

    /// The response was not the shape the caller asked for.
    #[error("expected a {expected} response")]
    UnexpectedShape { expected: &'static str },

    /// Report interval outside of `hour`, `day`, `cumulative`.
    #[error("invalid report interval '{0}': expected one of hour, day, cumulative")]
    InvalidInterval(String),

    /// A field the protocol depends on was absent from a response.
    #[error("'{field}' field not in response: {body}")]
    MissingField { field: &'static str, body: String },

    /// The report never reached `COMPLETE` within the configured attempts.
    #[error("report {report_id} not complete after {attempts} polls")]
    PollLimitExceeded { report_id: String, attempts: u32 },

    /// API request failed.
    #[error("SpringServe API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

/// Result type alias for SpringServe operations.
pub type Result<T> = core::result::Result<T, SpringServeError>;
