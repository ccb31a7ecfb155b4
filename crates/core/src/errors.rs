//! Core error types for the depreciation engine.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use chrono::{NaiveDate, ParseError as ChronoParseError};
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the depreciation engine.
///
/// Database-specific errors are wrapped in string form to keep this type
/// database-agnostic.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Depreciation error: {0}")]
    Depreciation(#[from] DepreciationError),

    #[error("Category error: {0}")]
    Category(#[from] CategoryError),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Configuration and lifecycle failures raised by the run orchestrator.
///
/// These require a data correction and are never retried automatically.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DepreciationError {
    #[error("Asset {0} not found")]
    AssetNotFound(String),

    #[error("Asset {0} has no depreciation category assigned")]
    NoCategory(String),

    #[error("Asset {asset_id} has an invalid useful life of {months} months")]
    InvalidUsefulLife { asset_id: String, months: i32 },

    #[error("Asset {0} has no positive acquisition cost")]
    InvalidAcquisitionCost(String),

    #[error("Asset {0} has a salvage value outside [0, acquisition cost)")]
    InvalidSalvageValue(String),

    #[error("Asset {0} has neither a depreciation start date nor an acquisition date")]
    MissingStartDate(String),

    #[error("Asset {0} is already disposed")]
    AlreadyDisposed(String),

    #[error("Disposal date {disposal_date} precedes depreciation start {start_date}")]
    DisposalBeforeStart {
        disposal_date: NaiveDate,
        start_date: NaiveDate,
    },

    #[error("Disposal date {disposal_date} precedes the last posted period ending {period_end}")]
    DisposalBeforeLastPeriod {
        disposal_date: NaiveDate,
        period_end: NaiveDate,
    },

    #[error("Disposal proceeds cannot be negative")]
    InvalidProceeds,

    #[error("Asset {asset_id} has {record_count} ledger records; reassignment requires confirmation")]
    LedgerHistoryExists {
        asset_id: String,
        record_count: i64,
    },
}

/// Errors raised by the category registry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CategoryError {
    #[error("Depreciation category {0} not found")]
    NotFound(String),

    #[error("A depreciation category with code '{0}' already exists")]
    DuplicateCode(String),

    #[error("Depreciation category is referenced by {asset_count} assets")]
    InUse { asset_count: i64 },

    #[error("Invalid annual depreciation rate: {0}")]
    InvalidRate(String),

    #[error("Invalid useful life: {0}")]
    InvalidUsefulLife(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

impl Error {
    /// True when the error is a write-layer uniqueness violation.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Error::Database(DatabaseError::UniqueViolation(_)))
    }
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
