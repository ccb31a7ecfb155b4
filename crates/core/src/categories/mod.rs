//! Depreciation categories - rate tables, domain models, services, and traits.

mod categories_model;
mod categories_service;
mod categories_traits;
mod rates;

pub use categories_model::{
    CategoryUpdate, DepreciationCategory, NewDepreciationCategory, StandardCategory,
};
pub use categories_service::CategoryService;
pub use categories_traits::{CategoryRepositoryTrait, CategoryServiceTrait};
pub use rates::{
    annual_rate_from_useful_life, find_standard_category, useful_life_from_annual_rate,
    STANDARD_CATEGORIES,
};
