//! Depreciation module - calculators, schedule projection, disposal settlement,
//! and the run orchestrator.

mod calculator;
mod depreciation_model;
mod depreciation_service;
mod depreciation_traits;
mod disposal;
mod schedule;


pub use calculator::{compute_period, pro_rata_factor};
pub use depreciation_model::{
    AssetCategoryReset, AssetDepreciationState, AssetDepreciationUpdate, AssetDisposalUpdate,
    AssetVersion, AssetWithCategory, BatchSummary, CalculationType, CategoryAssignment,
    DepreciationBasis, DepreciationLedgerRecord, DepreciationSchedule, DepreciationStatus,
    DisposalSettlement, FailureKind, PeriodResult, ResolvedDepreciationConfig, RunOutcome,
    RunRequest, ScheduleSummary, SkipReason,
};
pub use depreciation_service::DepreciationService;
pub use depreciation_traits::{DepreciationRepositoryTrait, DepreciationServiceTrait};
pub use disposal::{compute_disposal, settle_without_depreciation};
pub use schedule::project_schedule;
