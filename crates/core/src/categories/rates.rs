//! Annual rate and useful life conversions, plus the standard rate table.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::StandardCategory;
use crate::utils::round_money;

/// Built-in straight-line categories.
pub const STANDARD_CATEGORIES: &[StandardCategory] = &[
    StandardCategory {
        code: "COMPUTER_EQUIPMENT",
        name: "Computer Equipment",
        useful_life_years: 3,
        asset_class: "IT_HARDWARE",
    },
    StandardCategory {
        code: "SOFTWARE",
        name: "Software Licenses",
        useful_life_years: 3,
        asset_class: "SOFTWARE",
    },
    StandardCategory {
        code: "OFFICE_EQUIPMENT",
        name: "Office Equipment",
        useful_life_years: 5,
        asset_class: "OFFICE_EQUIPMENT",
    },
    StandardCategory {
        code: "VEHICLES",
        name: "Motor Vehicles",
        useful_life_years: 5,
        asset_class: "VEHICLE",
    },
    StandardCategory {
        code: "FURNITURE_FIXTURES",
        name: "Furniture & Fixtures",
        useful_life_years: 7,
        asset_class: "FURNITURE",
    },
    StandardCategory {
        code: "MACHINERY",
        name: "Plant & Machinery",
        useful_life_years: 10,
        asset_class: "MACHINERY",
    },
    StandardCategory {
        code: "LEASEHOLD_IMPROVEMENTS",
        name: "Leasehold Improvements",
        useful_life_years: 10,
        asset_class: "LEASEHOLD",
    },
    StandardCategory {
        code: "BUILDINGS",
        name: "Buildings",
        useful_life_years: 25,
        asset_class: "REAL_ESTATE",
    },
];

/// Looks up a built-in category by code (case-insensitive).
pub fn find_standard_category(code: &str) -> Option<&'static StandardCategory> {
    STANDARD_CATEGORIES
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Annual straight-line rate for a useful life: `round2(100 / years)`.
///
/// Returns zero for a non-positive life; callers must check before dividing.
pub fn annual_rate_from_useful_life(years: i32) -> Decimal {
    if years <= 0 {
        return Decimal::ZERO;
    }
    round_money(Decimal::ONE_HUNDRED / Decimal::from(years))
}

/// Useful life in whole years for an annual rate: `round(100 / rate)`.
///
/// Returns zero for a non-positive rate; callers must check before dividing.
pub fn useful_life_from_annual_rate(rate_percent: Decimal) -> i32 {
    if rate_percent <= Decimal::ZERO {
        return 0;
    }
    (Decimal::ONE_HUNDRED / rate_percent)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i32()
        .unwrap_or(0)
}
