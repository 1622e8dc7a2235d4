//! Shared error types for the application

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a snapshot source for one fetch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Timeout, dropped connection, throttling. Worth retrying.
    #[error("transient fetch failure for {collection}: {message}")]
    Transient { collection: String, message: String },

    /// The store rejected the query or the data could not be read.
    #[error("fetch failed for {collection}: {message}")]
    Permanent { collection: String, message: String },
}

impl FetchError {
    pub fn transient(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient {
            collection: collection.into(),
            message: message.into(),
        }
    }

    pub fn permanent(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Permanent {
            collection: collection.into(),
            message: message.into(),
        }
    }

    /// Whether the same request may succeed if issued again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Main error type for siteprogress operations
#[derive(Debug, Error)]
pub enum Error {
    /// Snapshot could not be gathered
    #[error("Snapshot unavailable for site {site}: {source}")]
    Fetch {
        site: String,
        #[source]
        source: FetchError,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// File system related errors
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub fn fetch(site: impl Into<String>, source: FetchError) -> Self {
        Self::Fetch {
            site: site.into(),
            source,
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}
