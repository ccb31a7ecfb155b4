//! SQLite storage implementation for depreciable assets and the depreciation ledger.

mod model;
mod repository;

pub use model::{DepreciableAssetDB, DepreciationLedgerDB};
pub use repository::DepreciationRepository;
