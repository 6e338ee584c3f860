//! Error types for bibdb-ingest
//!
//! Severity follows how the orchestrator reacts:
//! - `MalformedRecord`: skip the record and count it
//! - `ConstraintViolation`: roll back the record's transaction, count it
//! - everything else: fatal for the batch

use thiserror::Error;

/// SQLite primary result code for constraint failures
const SQLITE_CONSTRAINT: i32 = 19;

/// Ingestion error type
#[derive(Debug, Error)]
pub enum IngestError {
    /// Required field absent or empty after cleaning
    #[error("Malformed record: missing required field '{field}'")]
    MalformedRecord { field: &'static str },

    /// Store rejected a write (unique, foreign key, not null, check, trigger)
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Store could not be opened
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Any other storage failure
    #[error("Storage error: {0}")]
    Storage(sqlx::Error),

    /// Batch input file could not be read or decoded
    #[error("Load error: {0}")]
    Load(String),

    /// bibdb-common error
    #[error("Common error: {0}")]
    Common(bibdb_common::Error),
}

impl IngestError {
    /// Classify a storage error, separating per-record constraint failures
    /// from fatal ones
    pub fn from_storage(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let by_kind = matches!(
                db_err.kind(),
                sqlx::error::ErrorKind::UniqueViolation
                    | sqlx::error::ErrorKind::ForeignKeyViolation
                    | sqlx::error::ErrorKind::NotNullViolation
                    | sqlx::error::ErrorKind::CheckViolation
            );
            // Extended codes keep the primary code in the low byte
            let by_code = db_err
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .map(|code| code & 0xff == SQLITE_CONSTRAINT)
                .unwrap_or(false);

            if by_kind || by_code {
                return IngestError::ConstraintViolation(db_err.message().to_string());
            }
        }
        IngestError::Storage(err)
    }

    /// Whether the batch may continue after this error
    pub fn is_record_local(&self) -> bool {
        matches!(
            self,
            IngestError::MalformedRecord { .. } | IngestError::ConstraintViolation(_)
        )
    }
}

impl From<sqlx::Error> for IngestError {
    fn from(err: sqlx::Error) -> Self {
        IngestError::from_storage(err)
    }
}

impl From<bibdb_common::Error> for IngestError {
    fn from(err: bibdb_common::Error) -> Self {
        match err {
            bibdb_common::Error::StorageUnavailable(msg) => IngestError::StorageUnavailable(msg),
            bibdb_common::Error::Database(e) => IngestError::from_storage(e),
            other => IngestError::Common(other),
        }
    }
}

/// Result type for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;
