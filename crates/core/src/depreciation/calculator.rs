//! Monthly straight-line depreciation for a single asset and period.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{DepreciationBasis, PeriodResult};
use crate::constants::FULL_DEPRECIATION_EPSILON;
use crate::utils::{days_in_month, month_bounds, round_money};

/// Computes the depreciation for the calendar month containing `as_of`.
///
/// Returns `None` when nothing can be posted: invalid inputs, the asset has
/// not started depreciating by the end of the month, or nothing remains to
/// depreciate. Currency outputs are rounded only here, at the boundary.
pub fn compute_period(basis: &DepreciationBasis, as_of: NaiveDate) -> Option<PeriodResult> {
    let depreciable_amount = basis.depreciable_amount();
    if basis.acquisition_cost <= Decimal::ZERO
        || basis.useful_life_months <= 0
        || depreciable_amount <= Decimal::ZERO
    {
        return None;
    }

    let monthly_amount = depreciable_amount / Decimal::from(basis.useful_life_months);
    let (period_start, period_end) = month_bounds(as_of);

    let start = basis.depreciation_start_date;
    if start > period_end {
        return None;
    }
    let pro_rata_factor = pro_rata_factor(start, period_start, period_end);

    let remaining = basis.remaining_depreciable();
    if remaining <= Decimal::ZERO {
        return None;
    }

    let amount = (monthly_amount * pro_rata_factor).min(remaining);
    let accumulated = basis.accumulated_depreciation + amount;

    Some(PeriodResult {
        period_start,
        period_end,
        monthly_amount: round_money(monthly_amount),
        pro_rata_factor,
        depreciation_amount: round_money(amount),
        accumulated_depreciation: round_money(accumulated),
        net_book_value: round_money(basis.acquisition_cost - accumulated),
        is_fully_depreciated: accumulated >= depreciable_amount - FULL_DEPRECIATION_EPSILON,
    })
}

/// Fraction of the period the asset was in service.
///
/// An asset that starts strictly inside the period is charged for the days
/// from its start date through month end, inclusive.
pub fn pro_rata_factor(start: NaiveDate, period_start: NaiveDate, period_end: NaiveDate) -> Decimal {
    if start > period_start && start <= period_end {
        let days_in_service = (period_end - start).num_days() + 1;
        Decimal::from(days_in_service) / Decimal::from(days_in_month(period_start))
    } else {
        Decimal::ONE
    }
}
