//! Unified error types for trolley.
//!
//! Transport failures, blocked responses, and cache storage problems share a
//! single enum so the client and cache crates signal through one type.

/// Unified error type for the scraping and cache crates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// URL could not be parsed or constructed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Network-level failure (connect, TLS, read).
    #[error("http error: {0}")]
    Http(String),

    /// Request exceeded the configured timeout.
    #[error("fetch timeout: {0}")]
    Timeout(String),

    /// Non-success HTTP status other than the blocked set.
    #[error("http status {status} for {url}")]
    Status { status: u16, url: String },

    /// Response looks like an anti-bot wall rather than real content.
    #[error("blocked: {0}")]
    Blocked(String),

    /// Cache file could not be read or written.
    #[error("cache io: {0}")]
    CacheIo(#[from] std::io::Error),

    /// Cache JSON could not be encoded or decoded.
    #[error("cache json: {0}")]
    CacheJson(#[from] serde_json::Error),

    /// CSV export failed.
    #[error("csv export: {0}")]
    Csv(#[from] csv::Error),
}
