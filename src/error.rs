//! Error types for every failure domain of the API access layer.
//!
//! Transport and payload failures are kept apart on purpose: a transport
//! failure is raised, while an upstream error object is handed back to the
//! caller as a value by [`crate::spotify::ApiClient::invoke`] and only turns
//! into [`ApiError::Payload`] when a caller asks for it.

use std::{fmt, io};

use reqwest::{StatusCode, header::InvalidHeaderValue};
use thiserror::Error;

/// Failure while obtaining a bearer token from the token endpoint.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token endpoint rejected the request ({status}): {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("malformed token response: {0}")]
    Malformed(String),
}

/// Failure while creating a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Refused connection, unreachable network, timeout. Retried with backoff.
    #[error("connection error: {0}")]
    Connection(String),

    /// Bad credentials or an unusable stored session. Never retried.
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("credential prompt failed: {0}")]
    Prompt(#[from] io::Error),
}

impl SessionError {
    pub fn is_connection(&self) -> bool {
        matches!(self, SessionError::Connection(_))
    }
}

/// Error object returned by the Web API in place of a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadError {
    pub status: String,
    pub message: String,
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}): {}", self.status, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Spotify API error {0}")]
    Payload(PayloadError),

    #[error(transparent)]
    Token(#[from] AuthError),

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    /// Token or language that cannot be sent as a header value.
    #[error("invalid request header: {0}")]
    Header(#[from] InvalidHeaderValue),
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Failure that interrupts an album or artist traversal.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("album {0} has no artists")]
    MissingArtist(String),
}
