use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Decimal places for persisted and reported currency amounts
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Tolerance used when deciding an asset is fully depreciated
pub const FULL_DEPRECIATION_EPSILON: Decimal = dec!(0.01);

/// Average days per month used for disposal daily proration
pub const AVERAGE_DAYS_PER_MONTH: Decimal = dec!(30.44);

/// Hard ceiling on projected periods (50 years)
pub const MAX_SCHEDULE_PERIODS: usize = 600;

/// Months per year, used when deriving useful life from a category
pub const MONTHS_PER_YEAR: i32 = 12;

/// Date format for dates stored and exchanged as text
pub const DATE_FORMAT: &str = "%Y-%m-%d";
