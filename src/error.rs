use std::sync::Arc;

use thiserror::Error;

/// Main error type covering parsing, fetching and endpoint lifecycle failures
#[derive(Error, Debug)]
pub enum OgcError {
    #[error("Malformed document: {details}")]
    MalformedDocument { details: String },

    #[error("XML parsing error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Schema mismatch: {details}")]
    SchemaMismatch { details: String },

    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    #[error("Endpoint is not ready yet: {url}")]
    NotReady { url: String },

    #[error("Invalid URL: {url} - {details}")]
    InvalidUrl { url: String, details: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered {status}: {message}")]
    HttpStatus {
        url: String,
        status: u16,
        message: String,
    },

    #[error("no answer from {url} within {timeout_seconds}s")]
    Timeout { url: String, timeout_seconds: u64 },

    #[error("capabilities cache: {0}")]
    Cache(String),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("invalid setting: {0}")]
    Config(String),
}

impl OgcError {
    pub fn malformed(details: impl Into<String>) -> Self {
        OgcError::MalformedDocument {
            details: details.into(),
        }
    }
}

/// Failure of an endpoint's capabilities fetch-and-parse.
///
/// Every caller awaiting readiness of the same endpoint receives a clone
/// sharing the same underlying cause.
#[derive(Error, Debug, Clone)]
#[error("Endpoint error: {url} - {cause}")]
pub struct EndpointError {
    pub url: String,
    #[source]
    pub cause: Arc<OgcError>,
}

impl EndpointError {
    pub fn new(url: impl Into<String>, cause: Arc<OgcError>) -> Self {
        Self {
            url: url.into(),
            cause,
        }
    }
}

pub type Result<T> = std::result::Result<T, OgcError>;
