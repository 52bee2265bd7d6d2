//! Error types for bestiary.
//!
//! This module defines all error types used throughout the bestiary crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for bestiary operations.
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

    // === Document Errors ===
    /// A stat-block document could not be parsed.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Path of the document.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// The file extension does not map to a known document format.
    #[error("unsupported document type: {path}")]
    UnsupportedDocument {
        /// Path of the document.
        path: PathBuf,
    },

    /// The document carries no challenge rating and cannot be indexed.
    #[error("no challenge rating in {path}")]
    MissingChallengeRating {
        /// Path of the document.
        path: PathBuf,
    },

    /// A JSON index was not a top-level array of objects.
    #[error("invalid index {path}: {message}")]
    InvalidIndex {
        /// Path of the index file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// One or more stat blocks failed the consistency check.
    #[error("{count} stat block(s) have inconsistent values")]
    Inconsistent {
        /// Number of stat blocks with findings.
        count: usize,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to read a file.
    #[error("failed to read {path}: {source}")]
    FileRead {
        /// Path that couldn't be read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

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

    /// CSV writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for bestiary operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new parse error for the given document.
    #[must_use]
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid index error.
    #[must_use]
    pub fn invalid_index(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidIndex {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error only concerns a single document.
    ///
    /// The scanner logs these and moves on to the next file.
    #[must_use]
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. }
                | Self::UnsupportedDocument { .. }
                | Self::MissingChallengeRating { .. }
                | Self::FileRead { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Inconsistent { count: 2 };
        assert_eq!(err.to_string(), "2 stat block(s) have inconsistent values");

        let err = Error::internal("test error");
        assert_eq!(err.to_string(), "internal error: test error");
    }

    #[test]
    fn test_parse_error_display() {
        let err = Error::parse("monsters_md/goblin.md", "empty document");
        let msg = err.to_string();
        assert!(msg.contains("goblin.md"));
        assert!(msg.contains("empty document"));
    }

    #[test]
    fn test_invalid_index_display() {
        let err = Error::invalid_index("index.json", "JSON must be a top-level array of objects");
        let msg = err.to_string();
        assert!(msg.contains("index.json"));
        assert!(msg.contains("top-level array"));
    }

    #[test]
    fn test_is_skippable() {
        assert!(Error::parse("a.md", "bad").is_skippable());
        assert!(Error::MissingChallengeRating {
            path: PathBuf::from("a.html")
        }
        .is_skippable());
        assert!(Error::UnsupportedDocument {
            path: PathBuf::from("a.txt")
        }
        .is_skippable());
        assert!(!Error::internal("bug").is_skippable());
        assert!(!Error::Inconsistent { count: 1 }.is_skippable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "output_file must not be empty".to_string(),
        };
        assert!(err.to_string().contains("output_file"));
    }

    #[test]
    fn test_file_read_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::FileRead {
            path: PathBuf::from("/root/forbidden.md"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden.md"));
        assert!(err.is_skippable());
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }

    #[test]
    fn test_database_open_error_display() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err = Error::DatabaseOpen {
                path: PathBuf::from("/nonexistent/path/db.sqlite"),
                source: sqlite_err,
            };
            assert!(err.to_string().contains("/nonexistent/path/db.sqlite"));
        }
    }
}
