use thiserror::Error;

/// Errors returned by the places client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429 from the provider. `attempts` is how many requests were
    /// made before giving up.
    #[error("rate limited during {operation} after {attempts} attempt(s)")]
    RateLimited {
        operation: &'static str,
        attempts: u32,
    },

    /// Any non-2xx status other than 400 and 429.
    #[error("{operation} failed with HTTP {status}: {body}")]
    Upstream {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid endpoint URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
