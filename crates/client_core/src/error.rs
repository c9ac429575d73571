use thiserror::Error;

/// Message every gateway failure collapses to.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// The only failure the gateway reports to its callers.
///
/// The underlying cause is logged where it happens and never carried here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Something went wrong. Please try again.")]
pub struct GatewayError;

/// Why a single request attempt failed. Logged, then collapsed into
/// [`GatewayError`].
#[derive(Debug, Error)]
pub(crate) enum RequestFailure {
    #[error("Client-side error: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Server-side error: {status}, {body}")]
    Server {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid api url '{url}': {source}")]
    InvalidApiUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("api url '{url}' cannot be used as a base address")]
    UnsupportedApiUrl { url: String },
    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
