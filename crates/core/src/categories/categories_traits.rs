//! Traits for depreciation category repository and service.

use async_trait::async_trait;

use crate::Result;

use super::{CategoryUpdate, DepreciationCategory, NewDepreciationCategory};

/// Repository trait for category persistence operations.
///
/// Every lookup is scoped to a tenant; a category owned by another tenant is
/// indistinguishable from a missing one.
#[async_trait]
pub trait CategoryRepositoryTrait: Send + Sync {
    fn get_categories(&self, tenant_id: &str) -> Result<Vec<DepreciationCategory>>;
    fn get_category(&self, tenant_id: &str, category_id: &str)
        -> Result<Option<DepreciationCategory>>;
    fn get_category_by_code(
        &self,
        tenant_id: &str,
        code: &str,
    ) -> Result<Option<DepreciationCategory>>;
    /// Number of assets currently pointing at the category.
    fn count_assets_using_category(&self, tenant_id: &str, category_id: &str) -> Result<i64>;

    async fn create_category(&self, category: NewDepreciationCategory)
        -> Result<DepreciationCategory>;
    async fn update_category(&self, category: DepreciationCategory)
        -> Result<DepreciationCategory>;
    async fn delete_category(&self, tenant_id: &str, category_id: &str) -> Result<usize>;
}

/// Service trait for the category registry.
#[async_trait]
pub trait CategoryServiceTrait: Send + Sync {
    fn list_categories(&self, tenant_id: &str) -> Result<Vec<DepreciationCategory>>;
    fn get_category(&self, tenant_id: &str, category_id: &str) -> Result<DepreciationCategory>;
    fn get_category_by_code(&self, tenant_id: &str, code: &str) -> Result<DepreciationCategory>;

    async fn create_category(
        &self,
        new_category: NewDepreciationCategory,
    ) -> Result<DepreciationCategory>;
    async fn update_category(&self, update: CategoryUpdate) -> Result<DepreciationCategory>;
    async fn delete_category(&self, tenant_id: &str, category_id: &str) -> Result<()>;
    /// Creates the standard rate table for a tenant, skipping codes it already has.
    async fn seed_standard_categories(&self, tenant_id: &str)
        -> Result<Vec<DepreciationCategory>>;
}
