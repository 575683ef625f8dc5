//! Error types and result handling for dbqueue.
//!
//! This module defines the core error type [`Error`] used throughout the crate, as well as the [`Result`] alias for fallible operations.
//!
//! ## What
//!
//! - [`Error`] enumerates the failure kinds of the broker: the store being unreachable,
//!   a produce transaction rolling back, a consume query or row decode failing, and
//!   configuration or checkpoint problems.
//! - [`Result<T>`] is a convenient alias for `Result<T, Error>`.
//!
//! ## How
//!
//! Every failure is returned to the immediate caller. Nothing in the core retries;
//! a polling driver decides what to do with an error.
//!
//! ### Example
//!
//! ```rust
//! use dbqueue::error::{Error, Result};
//!
//! fn check_limit(limit: usize) -> Result<()> {
//!     if limit == 0 {
//!         return Err(Error::ValidationFailed { reason: "limit must be positive".into() });
//!     }
//!     Ok(())
//! }
//! ```
use thiserror::Error;

/// Result type for dbqueue operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error type for heterogeneous error sources
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error types for dbqueue operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The store is unreachable or the connection was lost
    #[error("Database connection failed: {source}. Context: {context}")]
    ConnectionFailed { source: BoxError, context: String },

    /// Produce insert or commit failed; the whole batch was rolled back
    #[error("Database transaction failed: {source}. Context: {context}")]
    TransactionFailed { source: BoxError, context: String },

    /// SQL query failed
    #[error("Database query failed: {query}. Context: {context}. Source: {source}")]
    QueryFailed {
        source: BoxError,
        query: String,
        context: String,
    },

    /// A returned row could not be decoded
    #[error("Failed to decode row: {source}. Context: {context}")]
    ScanFailed { source: BoxError, context: String },

    /// Database migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(#[from] sqlx::migrate::MigrateError),

    /// JSON serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Required configuration field is missing
    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    /// Configuration field has an invalid value
    #[error("Invalid configuration value for {field}: {message}")]
    InvalidConfig { field: String, message: String },

    /// Caller supplied an argument the broker cannot act on
    #[error("Validation failed: {reason}")]
    ValidationFailed { reason: String },

    /// Cursor text did not match any accepted timestamp layout
    #[error("Failed to parse cursor from '{input}'")]
    InvalidCursor { input: String },

    /// Reading or writing a cursor checkpoint failed
    #[error("Checkpoint error at {path}: {source}")]
    Checkpoint {
        path: String,
        source: std::io::Error,
    },

    /// Installed schema is missing or incomplete
    #[error("Schema validation failed: {message}")]
    SchemaValidation { message: String },
}

impl Error {
    /// Classify a sqlx error raised while running `query`.
    ///
    /// Connectivity problems become [`Error::ConnectionFailed`] and row decode
    /// problems become [`Error::ScanFailed`]; everything else is a query failure.
    pub(crate) fn from_query(e: sqlx::Error, query: &str, context: impl Into<String>) -> Self {
        let context = context.into();
        if is_connection_error(&e) {
            return Error::ConnectionFailed {
                source: Box::new(e),
                context,
            };
        }
        if is_decode_error(&e) {
            return Error::ScanFailed {
                source: Box::new(e),
                context,
            };
        }
        Error::QueryFailed {
            source: Box::new(e),
            query: query.to_string(),
            context,
        }
    }

    /// Classify a sqlx error raised inside a write transaction.
    pub(crate) fn from_transaction(e: sqlx::Error, context: impl Into<String>) -> Self {
        let context = context.into();
        if is_connection_error(&e) {
            return Error::ConnectionFailed {
                source: Box::new(e),
                context,
            };
        }
        Error::TransactionFailed {
            source: Box::new(e),
            context,
        }
    }

    /// True for failures where the store could not be reached at all.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::ConnectionFailed { .. })
    }
}

fn is_connection_error(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

fn is_decode_error(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. }
    )
}
