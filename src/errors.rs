//! # Error Types Module
//!
//! Error types returned by the external collaborators (assistant, ledger) and by
//! configuration loading. Handlers decide per variant what the user gets to see.

use thiserror::Error;

/// Failures of one assistant run
#[derive(Debug, Error)]
pub enum AssistantError {
    /// The run finished but produced no text we can use
    #[error("assistant returned no usable content")]
    EmptyResponse,
    /// The run reached a terminal status other than `completed`
    #[error("assistant run ended with status `{0}`")]
    RunFailed(String),
    /// The API answered with a non-success HTTP status
    #[error("assistant API returned {status}: {body}")]
    Api { status: u16, body: String },
    /// Network or decoding failure
    #[error("assistant request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Failures of one ledger append
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid service account credentials: {0}")]
    Credentials(String),
    #[error("failed to obtain access token: {0}")]
    Auth(String),
    #[error("spreadsheet `{0}` not found")]
    SpreadsheetNotFound(String),
    #[error("ledger API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("ledger request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<jsonwebtoken::errors::Error> for LedgerError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        LedgerError::Credentials(err.to_string())
    }
}

/// Configuration loading errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable `{0}` must be set")]
    Missing(&'static str),
    #[error("environment variable `{key}` is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}
