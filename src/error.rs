use thiserror::Error;

/// Failure talking to the encyclopedia API.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid header value: {0:?}")]
    Header(String),

    #[error("base URL cannot carry a path: {0}")]
    BaseUrl(String),

    /// Request never produced a response (DNS, connect, timeout, body read).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Body was not JSON at all.
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Valid JSON missing the fields we need.
    #[error("unexpected response shape from {url}: {detail}")]
    Shape { url: String, detail: String },
}
