//! Error types for the digest pipeline.
//!
//! Each stage has its own error type because each stage has its own
//! failure policy: fetch errors abort the run, translation errors become
//! placeholders in the digest, and mail errors are logged and dropped.

use thiserror::Error;

/// Configuration could not be loaded from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed
    #[error("environment variable {name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Fetching the update feed failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed answered with a non-success status
    #[error("feed returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Body was not the expected `{ "value": [...] }` shape
    #[error("failed to parse feed response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A single chat-completion call failed.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Transport-level failure
    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status
    #[error("translation API error ({status}): {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },

    /// Body could not be decoded
    #[error("failed to parse translation response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response decoded but carried no text
    #[error("translation response contained no content")]
    EmptyResponse,
}

/// Sending the digest email failed.
#[derive(Debug, Error)]
pub enum MailError {
    /// Mail settings are missing for a real send
    #[error("mail not configured: {0} is not set")]
    NotConfigured(&'static str),

    /// Connection string is not `endpoint=...;accesskey=...`
    #[error("invalid mail connection string: {0}")]
    ConnectionString(String),

    /// Transport-level failure
    #[error("mail request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service rejected the request
    #[error("mail service returned {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Send operation finished in a non-success state
    #[error("send operation {operation_id} ended with status {status}: {detail}")]
    OperationFailed {
        operation_id: String,
        status: String,
        detail: String,
    },

    /// Operation did not finish within the polling budget
    #[error("send operation {operation_id} still running after {polls} polls")]
    PollExhausted { operation_id: String, polls: u32 },

    /// Anything else (signing, malformed headers)
    #[error("{0}")]
    Other(String),
}

/// Fail-fast errors that abort a pipeline invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
