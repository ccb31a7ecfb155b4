//! SQLite storage implementation for depreciation categories.

mod model;
mod repository;

pub use model::DepreciationCategoryDB;
pub use repository::CategoryRepository;
