//! Error taxonomy for the landing flow
//!
//! - `FetchError`: a JSON document could not be retrieved or decoded
//! - `ValidationError`: a document was retrieved but lacks required fields
//! - `AuthVerificationError`: an identity-client call failed
//! - `ClientError`: the identity client could not be constructed
//!
//! Only `StartupError` (configuration load or client construction) is fatal
//! to the page. Everything else is recovered where it happens.

use std::time::Duration;

use crate::call::Interrupted;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to load {document}: {status} {reason}")]
    Status {
        document: String,
        status: u16,
        reason: String,
    },
    #[error("Failed to load {document}: {message}")]
    Transport { document: String, message: String },
    #[error("Failed to read {document}: {source}")]
    Io {
        document: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {document}: {message}")]
    Decode { document: String, message: String },
    #[error("Request timed out after {0:?}")]
    TimedOut(Duration),
    #[error("Request cancelled")]
    Cancelled,
}

impl From<Interrupted> for FetchError {
    fn from(interrupted: Interrupted) -> Self {
        match interrupted {
            Interrupted::TimedOut(after) => FetchError::TimedOut(after),
            Interrupted::Cancelled => FetchError::Cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid configuration format: {document} is not a JSON object")]
    NotAnObject { document: String },
    #[error("Invalid configuration format: {document} is missing `{field}`")]
    MissingField {
        document: String,
        field: &'static str,
    },
    #[error("Invalid configuration format: `{field}` in {document} must be a string")]
    NotAString {
        document: String,
        field: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum AuthVerificationError {
    /// The identity provider answered with a non-success status
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("Identity provider unreachable: {0}")]
    Transport(String),
    #[error("Unexpected identity provider response: {0}")]
    InvalidResponse(String),
    #[error("Identity provider timed out after {0:?}")]
    TimedOut(Duration),
    #[error("Identity request cancelled")]
    Cancelled,
}

impl From<Interrupted> for AuthVerificationError {
    fn from(interrupted: Interrupted) -> Self {
        match interrupted {
            Interrupted::TimedOut(after) => AuthVerificationError::TimedOut(after),
            Interrupted::Cancelled => AuthVerificationError::Cancelled,
        }
    }
}

impl From<reqwest::Error> for AuthVerificationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AuthVerificationError::InvalidResponse(err.to_string())
        } else {
            AuthVerificationError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid identity endpoint URL `{url}`: {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

/// Failure of a step the rest of the page depends on
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Client(#[from] ClientError),
}
