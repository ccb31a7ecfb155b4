//! Forward projection of an asset's depreciation schedule.

use rust_decimal::Decimal;

use super::calculator::compute_period;
use super::{PeriodResult, ResolvedDepreciationConfig};
use crate::constants::MAX_SCHEDULE_PERIODS;
use crate::utils::{add_months, month_bounds};

/// Projects every monthly period from the depreciation start date until the
/// asset is fully depreciated.
///
/// Pure function of its input: the projection always starts from zero
/// accumulated depreciation and never reads persisted state. Running totals
/// carry the rounded per-period amounts, matching what a run would post.
/// Stops after `MAX_SCHEDULE_PERIODS` periods regardless of input.
pub fn project_schedule(config: &ResolvedDepreciationConfig) -> Vec<PeriodResult> {
    let mut periods = Vec::new();
    let mut accumulated = Decimal::ZERO;
    let (mut month_start, _) = month_bounds(config.depreciation_start_date);

    while periods.len() < MAX_SCHEDULE_PERIODS {
        let basis = config.with_accumulated(accumulated);
        let Some(period) = compute_period(&basis, month_start) else {
            break;
        };

        accumulated += period.depreciation_amount;
        let done = period.is_fully_depreciated;
        periods.push(period);
        if done {
            break;
        }

        match add_months(month_start, 1) {
            Some(next) => month_start = next,
            None => break,
        }
    }

    periods
}
