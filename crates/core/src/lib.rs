//! Deprecio Core - Depreciation domain entities, calculators, services, and traits.
//!
//! This crate contains the straight-line depreciation engine. It is
//! database-agnostic and defines repository traits that are implemented
//! by the `storage-sqlite` crate.

pub mod categories;
pub mod constants;
pub mod depreciation;
pub mod errors;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
