//! Error types for lsc-inbox.
//!
//! This module defines all error types used throughout the lsc-inbox crate.
//! Missing keys and unknown submission ids are not errors (see
//! [`crate::store`]); everything here is a real failure of a backend, the
//! configuration, or the caller's session.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for lsc-inbox operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Dashboard Errors ===
    /// The admin flag is not set, so the dashboard refuses to open.
    #[error("admin login required; run `lscinbox login` first")]
    LoginRequired,

    /// No submission with the given id is loaded.
    #[error("no submission with id '{id}'")]
    SubmissionNotFound {
        /// The id that was looked up.
        id: String,
    },

    /// A destructive action was declined at the confirmation step.
    #[error("cancelled: {action}")]
    Cancelled {
        /// The action that was not confirmed.
        action: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for lsc-inbox operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a submission-not-found error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::SubmissionNotFound { id: id.into() }
    }

    /// Create a cancelled error for a declined destructive action.
    #[must_use]
    pub fn cancelled(action: impl Into<String>) -> Self {
        Self::Cancelled {
            action: action.into(),
        }
    }

    /// Check if this error means the admin flag is missing.
    #[must_use]
    pub fn is_login_required(&self) -> bool {
        matches!(self, Self::LoginRequired)
    }

    /// Check if this error is a declined confirmation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
