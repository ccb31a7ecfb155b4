//! SQLite storage implementation for Deprecio.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `deprecio-core` and contains:
//! - Database connection pooling and management
//! - Embedded Diesel migrations
//! - A single writer actor that serialises every write in an immediate transaction
//! - Repository implementations for categories, assets, and the depreciation ledger
//!
//! ```text
//! core (domain, calculators, orchestrator)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod categories;
pub mod db;
pub mod depreciation;
pub mod errors;
pub mod schema;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export repositories
pub use categories::CategoryRepository;
pub use depreciation::DepreciationRepository;

// Re-export from deprecio-core for convenience
pub use deprecio_core::errors::{DatabaseError, Error, Result};
