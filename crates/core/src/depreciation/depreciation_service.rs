use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::categories::CategoryRepositoryTrait;
use crate::constants::FULL_DEPRECIATION_EPSILON;
use crate::errors::{CategoryError, DatabaseError, DepreciationError};
use crate::utils::{month_bounds, round_money};
use crate::{Error, Result};

use super::calculator::compute_period;
use super::disposal::{compute_disposal, settle_without_depreciation};
use super::schedule::project_schedule;
use super::{
    AssetCategoryReset, AssetDepreciationState, AssetDepreciationUpdate, AssetDisposalUpdate,
    AssetWithCategory, BatchSummary, CalculationType, CategoryAssignment,
    DepreciationLedgerRecord, DepreciationRepositoryTrait, DepreciationSchedule,
    DepreciationServiceTrait, DisposalSettlement, FailureKind, ResolvedDepreciationConfig,
    RunOutcome, RunRequest, ScheduleSummary, SkipReason,
};

/// Stateful run orchestrator.
///
/// Decides whether a period is due, invokes the pure calculators, and hands
/// the resulting ledger record and asset update to the repository as one
/// atomic write. The category registry is injected read-only.
pub struct DepreciationService {
    repository: Arc<dyn DepreciationRepositoryTrait>,
    category_repository: Arc<dyn CategoryRepositoryTrait>,
}

impl DepreciationService {
    pub fn new(
        repository: Arc<dyn DepreciationRepositoryTrait>,
        category_repository: Arc<dyn CategoryRepositoryTrait>,
    ) -> Self {
        DepreciationService {
            repository,
            category_repository,
        }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn load_asset(&self, asset_id: &str, tenant_id: &str) -> Result<AssetWithCategory> {
        self.repository
            .find_asset_with_category(asset_id, tenant_id)?
            .ok_or_else(|| DepreciationError::AssetNotFound(asset_id.to_string()).into())
    }

    fn skipped(asset_id: &str, reason: SkipReason) -> RunOutcome {
        debug!("Skipping depreciation for asset {}: {}", asset_id, reason);
        RunOutcome::Skipped {
            asset_id: asset_id.to_string(),
            reason,
        }
    }

    /// Maps an error onto the failure taxonomy reported to callers.
    fn classify_failure(err: &Error) -> FailureKind {
        match err {
            Error::Depreciation(DepreciationError::AssetNotFound(_))
            | Error::Category(CategoryError::NotFound(_))
            | Error::Database(DatabaseError::NotFound(_)) => FailureKind::NotFound,
            Error::Depreciation(_) | Error::Category(_) | Error::Validation(_) => {
                FailureKind::Configuration
            }
            Error::Database(_) | Error::Repository(_) | Error::ConstraintViolation(_) => {
                FailureKind::Persistence
            }
            Error::Unexpected(_) => FailureKind::Unexpected,
        }
    }

    async fn try_run_for_asset(&self, request: &RunRequest) -> Result<RunOutcome> {
        let asset_id = request.asset_id.as_str();
        let AssetWithCategory { asset, category } =
            self.load_asset(asset_id, &request.tenant_id)?;

        if asset.is_disposed() {
            return Ok(Self::skipped(asset_id, SkipReason::Disposed));
        }
        let category =
            category.ok_or_else(|| DepreciationError::NoCategory(asset_id.to_string()))?;

        let as_of = request.as_of.unwrap_or_else(Self::today);
        let (_, period_end) = month_bounds(as_of);
        let already_recorded = asset
            .last_depreciation_period_end
            .is_some_and(|last| last >= period_end);

        if asset.is_fully_depreciated {
            let reason = if already_recorded {
                SkipReason::AlreadyRecorded
            } else {
                SkipReason::FullyDepreciated
            };
            return Ok(Self::skipped(asset_id, reason));
        }

        let config = ResolvedDepreciationConfig::resolve(&asset, &category)?;

        if already_recorded {
            return Ok(Self::skipped(asset_id, SkipReason::AlreadyRecorded));
        }

        let basis = config.with_accumulated(asset.accumulated_depreciation);
        let Some(period) = compute_period(&basis, as_of) else {
            let reason = if config.depreciation_start_date > period_end {
                SkipReason::NotStarted
            } else if basis.remaining_depreciable() <= Decimal::ZERO {
                SkipReason::FullyDepreciated
            } else {
                SkipReason::NothingToDepreciate
            };
            return Ok(Self::skipped(asset_id, reason));
        };

        if self
            .repository
            .find_ledger_record(asset_id, period.period_end)?
            .is_some()
        {
            return Ok(Self::skipped(asset_id, SkipReason::AlreadyRecorded));
        }

        let record = DepreciationLedgerRecord {
            id: Uuid::new_v4().to_string(),
            tenant_id: asset.tenant_id.clone(),
            asset_id: asset.asset_id.clone(),
            assignment_seq: asset.assignment_seq,
            period_start: period.period_start,
            period_end: period.period_end,
            depreciation_amount: period.depreciation_amount,
            accumulated_amount_after: period.accumulated_depreciation,
            net_book_value_after: period.net_book_value,
            calculation_type: request.calculation_type,
            calculated_at: Utc::now().naive_utc(),
            actor_id: request.actor_id.clone(),
        };
        let update = AssetDepreciationUpdate {
            asset_id: asset.asset_id.clone(),
            tenant_id: asset.tenant_id.clone(),
            expected: asset.version(),
            accumulated_depreciation: period.accumulated_depreciation,
            net_book_value: period.net_book_value,
            last_depreciation_period_end: period.period_end,
            is_fully_depreciated: period.is_fully_depreciated,
        };

        match self
            .repository
            .insert_ledger_record_and_update_asset(record, update)
            .await
        {
            Ok(record) => {
                debug!(
                    "Posted {} depreciation of {} for asset {} period ending {}",
                    record.calculation_type,
                    record.depreciation_amount,
                    record.asset_id,
                    record.period_end
                );
                Ok(RunOutcome::Posted { record })
            }
            // A concurrent run posted the same period between the check and the write.
            Err(e) if e.is_unique_violation() => {
                Ok(Self::skipped(asset_id, SkipReason::AlreadyRecorded))
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl DepreciationServiceTrait for DepreciationService {
    async fn run_for_asset(&self, request: RunRequest) -> RunOutcome {
        match self.try_run_for_asset(&request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let kind = Self::classify_failure(&e);
                let period_end = month_bounds(request.as_of.unwrap_or_else(Self::today)).1;
                warn!(
                    "Depreciation run failed ({:?}) for tenant {} asset {} period ending {}: {}",
                    kind, request.tenant_id, request.asset_id, period_end, e
                );
                RunOutcome::Failed {
                    asset_id: request.asset_id,
                    kind,
                    message: e.to_string(),
                }
            }
        }
    }

    async fn run_for_tenant(
        &self,
        tenant_id: &str,
        as_of: Option<NaiveDate>,
    ) -> Result<BatchSummary> {
        let as_of = as_of.unwrap_or_else(Self::today);
        let asset_ids = self.repository.list_eligible_assets(tenant_id)?;
        info!(
            "Starting depreciation run for tenant {} as of {} ({} eligible assets)",
            tenant_id,
            as_of,
            asset_ids.len()
        );

        let mut summary = BatchSummary::new(tenant_id, as_of);
        for asset_id in asset_ids {
            let outcome = self
                .run_for_asset(RunRequest::scheduled(&asset_id, tenant_id, Some(as_of)))
                .await;
            summary.record(outcome);
        }

        info!(
            "Depreciation run for tenant {} finished: {} total, {} posted, {} skipped, {} failed",
            tenant_id, summary.total, summary.processed, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    fn get_schedule(&self, asset_id: &str, tenant_id: &str) -> Result<DepreciationSchedule> {
        let AssetWithCategory { asset, category } = self.load_asset(asset_id, tenant_id)?;
        let category =
            category.ok_or_else(|| DepreciationError::NoCategory(asset_id.to_string()))?;
        let config = ResolvedDepreciationConfig::resolve(&asset, &category)?;

        let periods = project_schedule(&config);
        let total_projected: Decimal = periods.iter().map(|p| p.depreciation_amount).sum();

        let summary = ScheduleSummary {
            asset_id: asset.asset_id.clone(),
            category_code: category.code.clone(),
            acquisition_cost: config.acquisition_cost,
            salvage_value: config.salvage_value,
            depreciable_amount: config.depreciable_amount(),
            useful_life_months: config.useful_life_months,
            monthly_amount: round_money(config.monthly_amount()),
            depreciation_start_date: config.depreciation_start_date,
            projected_end_date: periods.last().map(|p| p.period_end),
            total_projected,
            period_count: periods.len(),
            accumulated_depreciation: asset.accumulated_depreciation,
            net_book_value: asset
                .net_book_value
                .unwrap_or(config.acquisition_cost - asset.accumulated_depreciation),
            status: asset.status(Self::today()),
        };

        Ok(DepreciationSchedule {
            summary,
            projected_periods: periods,
        })
    }

    fn get_ledger(&self, asset_id: &str, tenant_id: &str) -> Result<Vec<DepreciationLedgerRecord>> {
        self.load_asset(asset_id, tenant_id)?;
        self.repository.list_ledger_records(asset_id, tenant_id)
    }

    async fn settle_disposal(
        &self,
        asset_id: &str,
        tenant_id: &str,
        disposal_date: NaiveDate,
        proceeds: Decimal,
        actor_id: Option<String>,
    ) -> Result<DisposalSettlement> {
        if proceeds < Decimal::ZERO {
            return Err(DepreciationError::InvalidProceeds.into());
        }

        let AssetWithCategory { asset, category } = self.load_asset(asset_id, tenant_id)?;
        if asset.is_disposed() {
            return Err(DepreciationError::AlreadyDisposed(asset_id.to_string()).into());
        }
        let category =
            category.ok_or_else(|| DepreciationError::NoCategory(asset_id.to_string()))?;
        let config = ResolvedDepreciationConfig::resolve(&asset, &category)?;

        if disposal_date < config.depreciation_start_date {
            return Err(DepreciationError::DisposalBeforeStart {
                disposal_date,
                start_date: config.depreciation_start_date,
            }
            .into());
        }
        if let Some(period_end) = asset.last_depreciation_period_end {
            if disposal_date < period_end {
                return Err(DepreciationError::DisposalBeforeLastPeriod {
                    disposal_date,
                    period_end,
                }
                .into());
            }
        }

        let from_date = match asset.last_depreciation_period_end {
            Some(period_end) => period_end.succ_opt().unwrap_or(period_end),
            None => config.depreciation_start_date,
        };
        let basis = config.with_accumulated(asset.accumulated_depreciation);
        let settlement = compute_disposal(asset_id, &basis, from_date, disposal_date, proceeds)
            .unwrap_or_else(|| {
                settle_without_depreciation(asset_id, &basis, disposal_date, proceeds)
            });

        let record = (settlement.final_depreciation_amount > Decimal::ZERO).then(|| {
            DepreciationLedgerRecord {
                id: Uuid::new_v4().to_string(),
                tenant_id: asset.tenant_id.clone(),
                asset_id: asset.asset_id.clone(),
                assignment_seq: asset.assignment_seq,
                period_start: settlement.from_date,
                period_end: settlement.disposal_date,
                depreciation_amount: settlement.final_depreciation_amount,
                accumulated_amount_after: settlement.accumulated_depreciation,
                net_book_value_after: settlement.final_net_book_value,
                calculation_type: CalculationType::Disposal,
                calculated_at: Utc::now().naive_utc(),
                actor_id,
            }
        });

        let update = AssetDisposalUpdate {
            asset_id: asset.asset_id.clone(),
            tenant_id: asset.tenant_id.clone(),
            expected: asset.version(),
            accumulated_depreciation: settlement.accumulated_depreciation,
            net_book_value: settlement.final_net_book_value,
            last_depreciation_period_end: record
                .as_ref()
                .map(|r| r.period_end)
                .or(asset.last_depreciation_period_end),
            is_fully_depreciated: asset.is_fully_depreciated
                || settlement.accumulated_depreciation
                    >= config.depreciable_amount() - FULL_DEPRECIATION_EPSILON,
            disposal_date,
            disposal_proceeds: proceeds,
            disposal_gain_loss: settlement.gain_or_loss,
        };

        self.repository.record_disposal(record, update).await?;
        info!(
            "Disposed asset {} for tenant {} on {}: proceeds {}, net book value {}, gain/loss {}",
            asset_id,
            tenant_id,
            disposal_date,
            proceeds,
            settlement.final_net_book_value,
            settlement.gain_or_loss
        );
        Ok(settlement)
    }

    async fn assign_category(
        &self,
        asset_id: &str,
        tenant_id: &str,
        category_id: &str,
        assignment: CategoryAssignment,
    ) -> Result<AssetDepreciationState> {
        let AssetWithCategory { asset, .. } = self.load_asset(asset_id, tenant_id)?;
        if asset.is_disposed() {
            return Err(DepreciationError::AlreadyDisposed(asset_id.to_string()).into());
        }

        let category = self
            .category_repository
            .get_category(tenant_id, category_id)?
            .ok_or_else(|| CategoryError::NotFound(category_id.to_string()))?;

        if let Some(months) = assignment.custom_useful_life_months {
            if months <= 0 {
                return Err(DepreciationError::InvalidUsefulLife {
                    asset_id: asset_id.to_string(),
                    months,
                }
                .into());
            }
        }
        let salvage_value = assignment.salvage_value.or(asset.salvage_value);
        if let Some(salvage) = salvage_value {
            let exceeds_cost = asset.acquisition_cost.is_some_and(|cost| salvage >= cost);
            if salvage < Decimal::ZERO || exceeds_cost {
                return Err(DepreciationError::InvalidSalvageValue(asset_id.to_string()).into());
            }
        }

        let record_count = self.repository.count_ledger_records(asset_id)?;
        if record_count > 0 {
            if !assignment.confirm_reset {
                return Err(DepreciationError::LedgerHistoryExists {
                    asset_id: asset_id.to_string(),
                    record_count,
                }
                .into());
            }
            warn!(
                "Resetting depreciation of asset {} (tenant {}) with {} posted records on reassignment to {}",
                asset_id, tenant_id, record_count, category.code
            );
        }

        let reset = AssetCategoryReset {
            asset_id: asset.asset_id.clone(),
            tenant_id: asset.tenant_id.clone(),
            category_id: category.id.clone(),
            custom_useful_life_months: assignment.custom_useful_life_months,
            salvage_value,
            depreciation_start_date: assignment
                .depreciation_start_date
                .or(asset.depreciation_start_date),
            net_book_value: asset.acquisition_cost,
            assignment_seq: asset.assignment_seq + 1,
        };
        let updated = self.repository.reset_asset_category(reset).await?;
        info!(
            "Assigned depreciation category {} to asset {} (tenant {})",
            category.code, asset_id, tenant_id
        );
        Ok(updated)
    }
}
