pub mod money;
pub mod time_utils;

pub use money::round_money;
pub use time_utils::{add_months, days_in_month, month_bounds};
