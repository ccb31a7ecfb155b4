//! Traits for the depreciation repository and service.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::Result;

use super::{
    AssetCategoryReset, AssetDepreciationState, AssetDepreciationUpdate, AssetDisposalUpdate,
    AssetWithCategory, BatchSummary, CategoryAssignment, DepreciationLedgerRecord,
    DepreciationSchedule, DisposalSettlement, RunOutcome, RunRequest,
};

/// Persistence collaborator for depreciation runs.
///
/// Implementations must enforce at most one ledger record per asset, category
/// assignment and period end at the write layer, reporting a duplicate insert
/// as `DatabaseError::UniqueViolation`.
#[async_trait]
pub trait DepreciationRepositoryTrait: Send + Sync {
    /// Loads an asset scoped to the tenant, together with its category.
    fn find_asset_with_category(
        &self,
        asset_id: &str,
        tenant_id: &str,
    ) -> Result<Option<AssetWithCategory>>;

    /// Ledger record for a period under the asset's current category assignment.
    fn find_ledger_record(
        &self,
        asset_id: &str,
        period_end: NaiveDate,
    ) -> Result<Option<DepreciationLedgerRecord>>;

    /// Full ledger history of an asset, oldest first.
    fn list_ledger_records(
        &self,
        asset_id: &str,
        tenant_id: &str,
    ) -> Result<Vec<DepreciationLedgerRecord>>;

    /// Number of records posted under the asset's current category assignment.
    fn count_ledger_records(&self, asset_id: &str) -> Result<i64>;

    /// Ids of non-disposed, category-assigned, not fully depreciated assets.
    fn list_eligible_assets(&self, tenant_id: &str) -> Result<Vec<String>>;

    /// Inserts the record and updates the asset's running totals atomically.
    async fn insert_ledger_record_and_update_asset(
        &self,
        record: DepreciationLedgerRecord,
        update: AssetDepreciationUpdate,
    ) -> Result<DepreciationLedgerRecord>;

    /// Writes the optional final record and the disposal fields atomically.
    async fn record_disposal(
        &self,
        record: Option<DepreciationLedgerRecord>,
        update: AssetDisposalUpdate,
    ) -> Result<()>;

    /// Points the asset at a category and clears its depreciation state.
    async fn reset_asset_category(&self, reset: AssetCategoryReset)
        -> Result<AssetDepreciationState>;
}

/// Operations exposed to the scheduling job and interactive callers.
#[async_trait]
pub trait DepreciationServiceTrait: Send + Sync {
    /// Runs one period for one asset. Never fails: failures are reported in the outcome.
    async fn run_for_asset(&self, request: RunRequest) -> RunOutcome;

    /// Runs every eligible asset of a tenant sequentially.
    async fn run_for_tenant(&self, tenant_id: &str, as_of: Option<NaiveDate>)
        -> Result<BatchSummary>;

    fn get_schedule(&self, asset_id: &str, tenant_id: &str) -> Result<DepreciationSchedule>;

    fn get_ledger(&self, asset_id: &str, tenant_id: &str) -> Result<Vec<DepreciationLedgerRecord>>;

    async fn settle_disposal(
        &self,
        asset_id: &str,
        tenant_id: &str,
        disposal_date: NaiveDate,
        proceeds: Decimal,
        actor_id: Option<String>,
    ) -> Result<DisposalSettlement>;

    async fn assign_category(
        &self,
        asset_id: &str,
        tenant_id: &str,
        category_id: &str,
        assignment: CategoryAssignment,
    ) -> Result<AssetDepreciationState>;
}
