//! Depreciation domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::categories::DepreciationCategory;
use crate::errors::{DepreciationError, ValidationError};
use crate::{Error, Result};

/// The subset of an asset record the engine reads and writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetDepreciationState {
    pub asset_id: String,
    pub tenant_id: String,
    pub category_id: Option<String>,
    pub acquisition_cost: Option<Decimal>,
    pub acquisition_date: Option<NaiveDate>,
    /// Residual value override; zero when absent
    pub salvage_value: Option<Decimal>,
    /// Useful life override; the category default applies when absent
    pub custom_useful_life_months: Option<i32>,
    pub depreciation_start_date: Option<NaiveDate>,
    pub accumulated_depreciation: Decimal,
    pub net_book_value: Option<Decimal>,
    pub last_depreciation_period_end: Option<NaiveDate>,
    pub is_fully_depreciated: bool,
    /// Incremented on every category assignment; scopes ledger uniqueness
    pub assignment_seq: i32,
    pub disposal_date: Option<NaiveDate>,
    pub disposal_proceeds: Option<Decimal>,
    pub disposal_gain_loss: Option<Decimal>,
    pub updated_at: NaiveDateTime,
}

impl AssetDepreciationState {
    pub fn is_disposed(&self) -> bool {
        self.disposal_date.is_some()
    }

    /// The running-total stamp a write is computed from.
    pub fn version(&self) -> AssetVersion {
        AssetVersion {
            assignment_seq: self.assignment_seq,
            accumulated_depreciation: self.accumulated_depreciation,
            last_depreciation_period_end: self.last_depreciation_period_end,
        }
    }

    /// Lifecycle status as of a date. `None` for assets without a category,
    /// which never enter the depreciation lifecycle.
    pub fn status(&self, as_of: NaiveDate) -> Option<DepreciationStatus> {
        self.category_id.as_ref()?;
        if self.is_disposed() {
            return Some(DepreciationStatus::Disposed);
        }
        if self.is_fully_depreciated {
            return Some(DepreciationStatus::FullyDepreciated);
        }
        let start = self.depreciation_start_date.or(self.acquisition_date);
        match (self.last_depreciation_period_end, start) {
            (None, Some(start)) if start > as_of => Some(DepreciationStatus::NotStarted),
            _ => Some(DepreciationStatus::Active),
        }
    }
}

/// Running totals an asset had when a run read it. Writes carry it so that
/// an asset changed by another writer in the meantime is left untouched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetVersion {
    pub assignment_seq: i32,
    pub accumulated_depreciation: Decimal,
    pub last_depreciation_period_end: Option<NaiveDate>,
}

impl AssetVersion {
    pub fn matches(&self, asset: &AssetDepreciationState) -> bool {
        asset.version() == *self
    }
}

/// Asset lifecycle inside the depreciation engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepreciationStatus {
    NotStarted,
    Active,
    FullyDepreciated,
    Disposed,
}

/// An asset together with its assigned category, as loaded for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetWithCategory {
    pub asset: AssetDepreciationState,
    pub category: Option<DepreciationCategory>,
}

/// Per-asset configuration with overrides already layered over category defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDepreciationConfig {
    pub acquisition_cost: Decimal,
    pub salvage_value: Decimal,
    pub useful_life_months: i32,
    pub depreciation_start_date: NaiveDate,
}

impl ResolvedDepreciationConfig {
    /// Builds the resolved configuration for an asset and its category.
    ///
    /// Overrides take precedence; the category supplies the useful life
    /// otherwise. Any invalid value is reported as a configuration error.
    pub fn resolve(
        asset: &AssetDepreciationState,
        category: &DepreciationCategory,
    ) -> std::result::Result<Self, DepreciationError> {
        let useful_life_months = asset
            .custom_useful_life_months
            .unwrap_or_else(|| category.useful_life_months());
        if useful_life_months <= 0 {
            return Err(DepreciationError::InvalidUsefulLife {
                asset_id: asset.asset_id.clone(),
                months: useful_life_months,
            });
        }

        let acquisition_cost = match asset.acquisition_cost {
            Some(cost) if cost > Decimal::ZERO => cost,
            _ => {
                return Err(DepreciationError::InvalidAcquisitionCost(
                    asset.asset_id.clone(),
                ))
            }
        };

        let salvage_value = asset.salvage_value.unwrap_or(Decimal::ZERO);
        if salvage_value < Decimal::ZERO || salvage_value >= acquisition_cost {
            return Err(DepreciationError::InvalidSalvageValue(
                asset.asset_id.clone(),
            ));
        }

        let depreciation_start_date = asset
            .depreciation_start_date
            .or(asset.acquisition_date)
            .ok_or_else(|| DepreciationError::MissingStartDate(asset.asset_id.clone()))?;

        Ok(Self {
            acquisition_cost,
            salvage_value,
            useful_life_months,
            depreciation_start_date,
        })
    }

    pub fn depreciable_amount(&self) -> Decimal {
        self.acquisition_cost - self.salvage_value
    }

    /// Flat straight-line amount for one full month.
    pub fn monthly_amount(&self) -> Decimal {
        if self.useful_life_months <= 0 {
            return Decimal::ZERO;
        }
        self.depreciable_amount() / Decimal::from(self.useful_life_months)
    }

    /// Combines the configuration with a running accumulated total.
    pub fn with_accumulated(&self, accumulated_depreciation: Decimal) -> DepreciationBasis {
        DepreciationBasis {
            acquisition_cost: self.acquisition_cost,
            salvage_value: self.salvage_value,
            useful_life_months: self.useful_life_months,
            depreciation_start_date: self.depreciation_start_date,
            accumulated_depreciation,
        }
    }
}

/// Everything the pure calculators need for one asset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepreciationBasis {
    pub acquisition_cost: Decimal,
    pub salvage_value: Decimal,
    pub useful_life_months: i32,
    pub depreciation_start_date: NaiveDate,
    pub accumulated_depreciation: Decimal,
}

impl DepreciationBasis {
    pub fn depreciable_amount(&self) -> Decimal {
        self.acquisition_cost - self.salvage_value
    }

    pub fn remaining_depreciable(&self) -> Decimal {
        self.depreciable_amount() - self.accumulated_depreciation
    }
}

/// Result of depreciating one monthly period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodResult {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub monthly_amount: Decimal,
    pub pro_rata_factor: Decimal,
    pub depreciation_amount: Decimal,
    pub accumulated_depreciation: Decimal,
    pub net_book_value: Decimal,
    pub is_fully_depreciated: bool,
}

/// How a ledger record came to be posted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationType {
    Scheduled,
    Manual,
    /// Final partial period posted when the asset is disposed
    Disposal,
}

impl CalculationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationType::Scheduled => "SCHEDULED",
            CalculationType::Manual => "MANUAL",
            CalculationType::Disposal => "DISPOSAL",
        }
    }
}

impl fmt::Display for CalculationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SCHEDULED" => Ok(CalculationType::Scheduled),
            "MANUAL" => Ok(CalculationType::Manual),
            "DISPOSAL" => Ok(CalculationType::Disposal),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown calculation type '{}'",
                other
            )))),
        }
    }
}

/// Immutable, append-only depreciation ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepreciationLedgerRecord {
    pub id: String,
    pub tenant_id: String,
    pub asset_id: String,
    pub assignment_seq: i32,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub depreciation_amount: Decimal,
    pub accumulated_amount_after: Decimal,
    pub net_book_value_after: Decimal,
    pub calculation_type: CalculationType,
    pub calculated_at: NaiveDateTime,
    pub actor_id: Option<String>,
}

/// Running totals written to the asset together with a ledger record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetDepreciationUpdate {
    pub asset_id: String,
    pub tenant_id: String,
    pub expected: AssetVersion,
    pub accumulated_depreciation: Decimal,
    pub net_book_value: Decimal,
    pub last_depreciation_period_end: NaiveDate,
    pub is_fully_depreciated: bool,
}

/// Disposal fields written to the asset when it is settled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetDisposalUpdate {
    pub asset_id: String,
    pub tenant_id: String,
    pub expected: AssetVersion,
    pub accumulated_depreciation: Decimal,
    pub net_book_value: Decimal,
    pub last_depreciation_period_end: Option<NaiveDate>,
    pub is_fully_depreciated: bool,
    pub disposal_date: NaiveDate,
    pub disposal_proceeds: Decimal,
    pub disposal_gain_loss: Decimal,
}

/// Reset applied to an asset when a category is (re)assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetCategoryReset {
    pub asset_id: String,
    pub tenant_id: String,
    pub category_id: String,
    pub custom_useful_life_months: Option<i32>,
    pub salvage_value: Option<Decimal>,
    pub depreciation_start_date: Option<NaiveDate>,
    pub net_book_value: Option<Decimal>,
    pub assignment_seq: i32,
}

/// Optional overrides supplied with a category assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAssignment {
    pub custom_useful_life_months: Option<i32>,
    pub salvage_value: Option<Decimal>,
    pub depreciation_start_date: Option<NaiveDate>,
    /// Operator confirmation required when the asset already has ledger history
    #[serde(default)]
    pub confirm_reset: bool,
}

/// Final settlement computed when an asset is disposed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisposalSettlement {
    pub asset_id: String,
    /// First day of the final partial period
    pub from_date: NaiveDate,
    pub disposal_date: NaiveDate,
    pub days: i64,
    pub proceeds: Decimal,
    pub final_depreciation_amount: Decimal,
    pub accumulated_depreciation: Decimal,
    pub final_net_book_value: Decimal,
    /// Positive is a gain on disposal, negative a loss
    pub gain_or_loss: Decimal,
}

/// Why a run did not post anything.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    FullyDepreciated,
    AlreadyRecorded,
    NotStarted,
    NothingToDepreciate,
    Disposed,
}

impl SkipReason {
    pub fn message(&self) -> &'static str {
        match self {
            SkipReason::FullyDepreciated => "asset is already fully depreciated",
            SkipReason::AlreadyRecorded => "already recorded for this period",
            SkipReason::NotStarted => "depreciation has not started yet",
            SkipReason::NothingToDepreciate => "no depreciation due for this period",
            SkipReason::Disposed => "asset has been disposed",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Classification of a failed run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Asset or category data needs correcting; never retried automatically
    Configuration,
    /// Missing or owned by another tenant
    NotFound,
    /// Write conflict or connectivity; safe to replay
    Persistence,
    Unexpected,
}

/// Outcome of a single-asset run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    Posted {
        record: DepreciationLedgerRecord,
    },
    #[serde(rename_all = "camelCase")]
    Skipped {
        asset_id: String,
        reason: SkipReason,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        asset_id: String,
        kind: FailureKind,
        message: String,
    },
}

impl RunOutcome {
    pub fn asset_id(&self) -> &str {
        match self {
            RunOutcome::Posted { record } => &record.asset_id,
            RunOutcome::Skipped { asset_id, .. } | RunOutcome::Failed { asset_id, .. } => asset_id,
        }
    }

    pub fn is_posted(&self) -> bool {
        matches!(self, RunOutcome::Posted { .. })
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            RunOutcome::Skipped { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// Options for a single-asset run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub asset_id: String,
    pub tenant_id: String,
    pub calculation_type: CalculationType,
    pub actor_id: Option<String>,
    /// Defaults to today when absent
    pub as_of: Option<NaiveDate>,
}

impl RunRequest {
    pub fn scheduled(asset_id: &str, tenant_id: &str, as_of: Option<NaiveDate>) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            tenant_id: tenant_id.to_string(),
            calculation_type: CalculationType::Scheduled,
            actor_id: None,
            as_of,
        }
    }
}

/// Aggregated result of a tenant-wide run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub tenant_id: String,
    pub as_of: Option<NaiveDate>,
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub results: Vec<RunOutcome>,
}

impl BatchSummary {
    pub fn new(tenant_id: &str, as_of: NaiveDate) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            as_of: Some(as_of),
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: RunOutcome) {
        self.total += 1;
        match &outcome {
            RunOutcome::Posted { .. } => self.processed += 1,
            RunOutcome::Skipped { .. } => self.skipped += 1,
            RunOutcome::Failed { .. } => self.failed += 1,
        }
        self.results.push(outcome);
    }
}

/// Header of a projected schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub asset_id: String,
    pub category_code: String,
    pub acquisition_cost: Decimal,
    pub salvage_value: Decimal,
    pub depreciable_amount: Decimal,
    pub useful_life_months: i32,
    pub monthly_amount: Decimal,
    pub depreciation_start_date: NaiveDate,
    pub projected_end_date: Option<NaiveDate>,
    pub total_projected: Decimal,
    pub period_count: usize,
    pub accumulated_depreciation: Decimal,
    pub net_book_value: Decimal,
    pub status: Option<DepreciationStatus>,
}

/// Read-only projection of an asset's full depreciation schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepreciationSchedule {
    pub summary: ScheduleSummary,
    pub projected_periods: Vec<PeriodResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn asset() -> AssetDepreciationState {
        AssetDepreciationState {
            asset_id: "a1".to_string(),
            tenant_id: "tenant-a".to_string(),
            category_id: Some("it".to_string()),
            acquisition_cost: Some(dec!(12000)),
            acquisition_date: Some(d(2025, 3, 1)),
            salvage_value: None,
            custom_useful_life_months: None,
            depreciation_start_date: None,
            accumulated_depreciation: Decimal::ZERO,
            net_book_value: Some(dec!(12000)),
            last_depreciation_period_end: None,
            is_fully_depreciated: false,
            assignment_seq: 1,
            disposal_date: None,
            disposal_proceeds: None,
            disposal_gain_loss: None,
            updated_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_status_follows_lifecycle() {
        let mut a = asset();
        assert_eq!(a.status(d(2025, 2, 28)), Some(DepreciationStatus::NotStarted));
        assert_eq!(a.status(d(2025, 3, 1)), Some(DepreciationStatus::Active));

        a.is_fully_depreciated = true;
        assert_eq!(
            a.status(d(2026, 3, 1)),
            Some(DepreciationStatus::FullyDepreciated)
        );

        a.disposal_date = Some(d(2026, 4, 1));
        assert_eq!(a.status(d(2026, 4, 1)), Some(DepreciationStatus::Disposed));

        a.category_id = None;
        assert_eq!(a.status(d(2026, 4, 1)), None);
    }

    #[test]
    fn test_version_ignores_decimal_scale() {
        let mut a = asset();
        a.accumulated_depreciation = dec!(1000);
        let version = a.version();

        a.accumulated_depreciation = dec!(1000.00);
        assert!(version.matches(&a));

        a.last_depreciation_period_end = Some(d(2025, 3, 31));
        assert!(!version.matches(&a));

        let mut reassigned = asset();
        reassigned.accumulated_depreciation = dec!(1000);
        reassigned.assignment_seq = 2;
        assert!(!version.matches(&reassigned));
    }

    #[test]
    fn test_batch_summary_counts_outcomes() {
        let mut summary = BatchSummary::new("tenant-a", d(2025, 3, 31));
        summary.record(RunOutcome::Skipped {
            asset_id: "a1".to_string(),
            reason: SkipReason::NotStarted,
        });
        summary.record(RunOutcome::Failed {
            asset_id: "a2".to_string(),
            kind: FailureKind::Configuration,
            message: "missing cost".to_string(),
        });

        assert_eq!(summary.total, 2);
        assert_eq!(summary.processed, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.results[1].asset_id(), "a2");
    }

    #[test]
    fn test_calculation_type_parsing() {
        for kind in [
            CalculationType::Scheduled,
            CalculationType::Manual,
            CalculationType::Disposal,
        ] {
            assert_eq!(kind.as_str().parse::<CalculationType>().unwrap(), kind);
        }
        assert!(matches!(
            "scheduled".parse::<CalculationType>(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_run_outcome_is_tagged_by_status() {
        let skipped = serde_json::to_value(RunOutcome::Skipped {
            asset_id: "a1".to_string(),
            reason: SkipReason::AlreadyRecorded,
        })
        .unwrap();
        assert_eq!(
            skipped,
            serde_json::json!({
                "status": "SKIPPED",
                "assetId": "a1",
                "reason": "ALREADY_RECORDED"
            })
        );

        let failed = serde_json::to_value(RunOutcome::Failed {
            asset_id: "a2".to_string(),
            kind: FailureKind::Persistence,
            message: "database is locked".to_string(),
        })
        .unwrap();
        assert_eq!(failed["status"], "FAILED");
        assert_eq!(failed["kind"], "PERSISTENCE");
    }
}
