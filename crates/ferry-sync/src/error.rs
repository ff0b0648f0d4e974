//! # Sync Error Types
//!
//! Error types for sync operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Source      │  │       Remote            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Unavailable    │  │  RemoteRequest (non-2xx)│ │
//! │  │  InvalidUrl     │  │  CsvRead        │  │  RemoteTransport        │ │
//! │  │  ConfigLoad     │  │  Core(Empty..)  │  │  UnexpectedResponse     │ │
//! │  │  MissingCreds   │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Source errors end ONE sub-sync. Remote errors end ONE item.           │
//! │  Nothing here ever ends the run.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use ferry_core::CoreError;
use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering all possible sync failures.
///
/// ## Design Principles
/// - Each variant includes enough context for debugging
/// - Errors are categorized for different handling strategies
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configured URL does not parse.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Store hash or access token missing at call time.
    #[error("Missing store credentials: {0} is not set")]
    MissingCredentials(&'static str),

    // =========================================================================
    // Source Errors
    // =========================================================================
    /// A record source could not be read or produced nothing.
    #[error("Source {origin} unavailable: {reason}")]
    SourceUnavailable { origin: String, reason: String },

    /// CSV decoding failed.
    #[error("CSV read failed: {0}")]
    CsvRead(String),

    /// Aggregation or mapping failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// The remote service answered with a non-2xx status.
    #[error("Remote request failed with status {status}: {body}")]
    RemoteRequest { status: u16, body: String },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("Remote transport error: {0}")]
    RemoteTransport(String),

    /// A 2xx response without the expected shape.
    #[error("Unexpected remote response: {0}")]
    UnexpectedResponse(String),

    /// Failed to encode or decode JSON.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => SyncError::RemoteRequest {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None => SyncError::RemoteTransport(err.to_string()),
        }
    }
}

impl From<csv::Error> for SyncError {
    fn from(err: csv::Error) -> Self {
        SyncError::CsvRead(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::SerializationFailed(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Builds a `SourceUnavailable` error.
    pub fn source_unavailable(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        SyncError::SourceUnavailable {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the sub-sync could not get usable input.
    ///
    /// ## Source Errors
    /// - Unreadable file or feed
    /// - Zero records
    /// - Rows that cannot be keyed
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            SyncError::SourceUnavailable { .. }
                | SyncError::CsvRead(_)
                | SyncError::Core(CoreError::EmptySource)
                | SyncError::Core(CoreError::MissingField { .. })
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::InvalidUrl(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::MissingCredentials(_)
        )
    }

    /// Returns true if a single upload failed against the remote.
    pub fn is_remote_error(&self) -> bool {
        matches!(
            self,
            SyncError::RemoteRequest { .. }
                | SyncError::RemoteTransport(_)
                | SyncError::UnexpectedResponse(_)
        )
    }
}
