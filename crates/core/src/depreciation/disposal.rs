//! Partial-period depreciation and gain/loss settlement on disposal.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{DepreciationBasis, DisposalSettlement};
use crate::constants::{AVERAGE_DAYS_PER_MONTH, FULL_DEPRECIATION_EPSILON};
use crate::utils::round_money;

/// Depreciates the span `from_date..=to_date` at a daily rate and settles the
/// disposal against `proceeds`.
///
/// The daily rate divides the monthly straight-line amount by a fixed 30.44
/// average days per month rather than the calendar length of the months
/// spanned. Returns `None` when the asset is already fully depreciated, the
/// span is empty, or the basis is unusable.
pub fn compute_disposal(
    asset_id: &str,
    basis: &DepreciationBasis,
    from_date: NaiveDate,
    to_date: NaiveDate,
    proceeds: Decimal,
) -> Option<DisposalSettlement> {
    if basis.useful_life_months <= 0 || basis.depreciable_amount() <= Decimal::ZERO {
        return None;
    }
    let remaining = basis.remaining_depreciable();
    if remaining <= FULL_DEPRECIATION_EPSILON || from_date > to_date {
        return None;
    }

    let days = (to_date - from_date).num_days() + 1;
    let daily_rate = basis.depreciable_amount()
        / Decimal::from(basis.useful_life_months)
        / AVERAGE_DAYS_PER_MONTH;
    let amount = (daily_rate * Decimal::from(days)).min(remaining);
    let accumulated = basis.accumulated_depreciation + amount;

    Some(settle(
        asset_id,
        basis,
        from_date,
        to_date,
        days,
        proceeds,
        amount,
        accumulated,
    ))
}

/// Settlement when no further depreciation is due before disposal.
pub fn settle_without_depreciation(
    asset_id: &str,
    basis: &DepreciationBasis,
    disposal_date: NaiveDate,
    proceeds: Decimal,
) -> DisposalSettlement {
    settle(
        asset_id,
        basis,
        disposal_date,
        disposal_date,
        0,
        proceeds,
        Decimal::ZERO,
        basis.accumulated_depreciation,
    )
}

#[allow(clippy::too_many_arguments)]
fn settle(
    asset_id: &str,
    basis: &DepreciationBasis,
    from_date: NaiveDate,
    disposal_date: NaiveDate,
    days: i64,
    proceeds: Decimal,
    amount: Decimal,
    accumulated: Decimal,
) -> DisposalSettlement {
    let final_net_book_value = round_money(basis.acquisition_cost - accumulated);
    DisposalSettlement {
        asset_id: asset_id.to_string(),
        from_date,
        disposal_date,
        days,
        proceeds,
        final_depreciation_amount: round_money(amount),
        accumulated_depreciation: round_money(accumulated),
        final_net_book_value,
        gain_or_loss: round_money(proceeds - final_net_book_value),
    }
}
