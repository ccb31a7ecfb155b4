//! Property-based integration tests for the depreciation calculators.
//!
//! These tests check invariants that must hold for every valid asset
//! configuration, using `proptest` for random case generation.

use chrono::NaiveDate;
use deprecio_core::constants::{FULL_DEPRECIATION_EPSILON, MAX_SCHEDULE_PERIODS};
use deprecio_core::depreciation::{
    compute_disposal, compute_period, pro_rata_factor, project_schedule,
    ResolvedDepreciationConfig,
};
use deprecio_core::utils::month_bounds;
use proptest::prelude::*;
use rust_decimal::Decimal;

// =============================================================================
// Generators
// =============================================================================

/// Amount in cents between 1.00 and 1,000,000.00.
fn arb_cost() -> impl Strategy<Value = Decimal> {
    (100i64..100_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2040, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// A valid configuration with salvage strictly below cost.
fn arb_config() -> impl Strategy<Value = ResolvedDepreciationConfig> {
    (arb_cost(), 0u32..95, 1i32..=240, arb_date()).prop_map(
        |(cost, salvage_pct, months, start)| ResolvedDepreciationConfig {
            acquisition_cost: cost,
            salvage_value: (cost * Decimal::from(salvage_pct) / Decimal::ONE_HUNDRED).round_dp(2),
            useful_life_months: months,
            depreciation_start_date: start,
        },
    )
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Accumulated depreciation never decreases and book value never drops below salvage.
    #[test]
    fn schedule_is_monotonic_and_respects_salvage(config in arb_config()) {
        let periods = project_schedule(&config);
        let mut previous = Decimal::ZERO;
        for period in &periods {
            prop_assert!(period.depreciation_amount >= Decimal::ZERO);
            prop_assert!(period.accumulated_depreciation >= previous);
            prop_assert!(period.accumulated_depreciation <= config.depreciable_amount());
            prop_assert!(period.net_book_value >= config.salvage_value);
            previous = period.accumulated_depreciation;
        }
    }

    /// A completed schedule depreciates the full depreciable amount within one cent.
    #[test]
    fn schedule_total_matches_depreciable_amount(config in arb_config()) {
        let periods = project_schedule(&config);
        prop_assert!(!periods.is_empty());
        prop_assert!(periods.len() <= MAX_SCHEDULE_PERIODS);

        let last = periods.last().unwrap();
        if last.is_fully_depreciated {
            let total: Decimal = periods.iter().map(|p| p.depreciation_amount).sum();
            prop_assert!((config.depreciable_amount() - total).abs() <= FULL_DEPRECIATION_EPSILON);
        } else {
            prop_assert_eq!(periods.len(), MAX_SCHEDULE_PERIODS);
        }
    }

    /// Periods are contiguous calendar months.
    #[test]
    fn schedule_periods_are_contiguous(config in arb_config()) {
        let periods = project_schedule(&config);
        for pair in periods.windows(2) {
            prop_assert_eq!(pair[0].period_end.succ_opt().unwrap(), pair[1].period_start);
        }
    }

    /// The pro-rata factor stays within (0, 1] for any start inside or before the period.
    #[test]
    fn pro_rata_factor_is_bounded(start in arb_date(), as_of in arb_date()) {
        let (period_start, period_end) = month_bounds(as_of);
        prop_assume!(start <= period_end);

        let factor = pro_rata_factor(start, period_start, period_end);
        prop_assert!(factor > Decimal::ZERO);
        prop_assert!(factor <= Decimal::ONE);
    }

    /// A single period never posts more than one monthly amount.
    #[test]
    fn period_amount_never_exceeds_monthly(config in arb_config(), offset in 0u32..300) {
        let basis = config.with_accumulated(Decimal::ZERO);
        let as_of = deprecio_core::utils::add_months(config.depreciation_start_date, offset).unwrap();
        let period = compute_period(&basis, as_of).unwrap();

        prop_assert!(period.depreciation_amount <= period.monthly_amount + Decimal::new(1, 2));
    }

    /// Gain or loss is always proceeds minus the final book value.
    #[test]
    fn disposal_gain_is_proceeds_minus_book_value(
        config in arb_config(),
        days in 1i64..400,
        proceeds in 0i64..10_000_000,
    ) {
        let basis = config.with_accumulated(Decimal::ZERO);
        let from = config.depreciation_start_date;
        let to = from + chrono::Duration::days(days - 1);
        let proceeds = Decimal::new(proceeds, 2);

        let settlement = compute_disposal("asset", &basis, from, to, proceeds).unwrap();
        prop_assert_eq!(settlement.days, days);
        prop_assert_eq!(settlement.gain_or_loss, proceeds - settlement.final_net_book_value);
        prop_assert!(settlement.final_net_book_value >= config.salvage_value);
    }
}
