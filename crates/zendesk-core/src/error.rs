use std::path::PathBuf;

use thiserror::Error;

use crate::http_client::HttpError;

/// Configuration problems detected before any request is issued.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("remoteUri cannot be empty")]
    MissingRemoteUri,
    #[error("username cannot be empty")]
    MissingUsername,
    #[error("either a password or a token must be configured")]
    MissingCredentials,
    #[error("oauth is enabled but no token is configured")]
    OAuthWithoutToken,
    #[error("throttle limit must be greater than zero")]
    ZeroThrottleLimit,
    #[error("throttle window must be greater than zero")]
    ZeroThrottleWindow,
    #[error("invalid proxy '{value}': {reason}")]
    InvalidProxy { value: String, reason: String },
    #[error("failed to build http client: {0}")]
    ClientBuild(String),
    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

/// Errors produced by a single request or a paginated request run.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Transport(#[from] HttpError),

    #[error("Zendesk returned an empty result")]
    EmptyResult,

    #[error("Zendesk rate limits 200 requests per minute")]
    RateLimited { retry_after: String, result: Vec<u8> },

    #[error("Zendesk Error ({status}): {reason}")]
    Status {
        status: u16,
        reason: &'static str,
        result: Vec<u8>,
    },

    #[error("Bad request? No result to specify next page. (Status code: {status})")]
    MissingPageMetadata {
        status: u16,
        pages: usize,
        records: usize,
    },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("failed to read upload file '{}': {source}", path.display())]
    Upload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize request body: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RequestError {
    /// Status code carried by the error envelope, when one applies.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::EmptyResult => Some(204),
            Self::RateLimited { .. } => Some(429),
            Self::Status { status, .. } | Self::MissingPageMetadata { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Value of the `Retry-After` header for rate-limit errors.
    pub fn retry_after(&self) -> Option<&str> {
        match self {
            Self::RateLimited { retry_after, .. } => Some(retry_after.as_str()),
            _ => None,
        }
    }

    /// Raw response body attached to classified errors.
    pub fn result(&self) -> Option<&[u8]> {
        match self {
            Self::RateLimited { result, .. } | Self::Status { result, .. } => {
                Some(result.as_slice())
            }
            _ => None,
        }
    }

    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// Error surfaced by the [`Zendesk`](crate::Zendesk) façade.
///
/// Wraps the underlying [`RequestError`] once, keeping it reachable through
/// [`std::error::Error::source`].
#[derive(Debug, Error)]
#[error("zendesk error: {source}")]
pub struct ClientError {
    #[from]
    source: RequestError,
}

impl ClientError {
    pub fn inner(&self) -> &RequestError {
        &self.source
    }

    pub fn into_inner(self) -> RequestError {
        self.source
    }
}
