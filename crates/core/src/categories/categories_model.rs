//! Depreciation category domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::MONTHS_PER_YEAR;

/// A named straight-line depreciation policy owned by a tenant.
///
/// Assets reference a category by id. Editing a category only affects periods
/// calculated after the change; posted ledger records keep their amounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepreciationCategory {
    pub id: String,
    pub tenant_id: String,
    pub code: String,
    pub name: String,
    pub annual_rate_percent: Decimal,
    pub useful_life_years: i32,
    /// Asset classification this category is the default for, if any
    pub asset_class: Option<String>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl DepreciationCategory {
    /// Default useful life in months for assets without an override.
    pub fn useful_life_months(&self) -> i32 {
        self.useful_life_years.saturating_mul(MONTHS_PER_YEAR)
    }
}

/// Input model for creating a category.
///
/// At least one of `annual_rate_percent` or `useful_life_years` is required;
/// the other is derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDepreciationCategory {
    pub id: Option<String>,
    pub tenant_id: String,
    pub code: String,
    pub name: String,
    pub annual_rate_percent: Option<Decimal>,
    pub useful_life_years: Option<i32>,
    pub asset_class: Option<String>,
    pub description: Option<String>,
}

/// Input model for updating a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub annual_rate_percent: Option<Decimal>,
    pub useful_life_years: Option<i32>,
    pub asset_class: Option<String>,
    pub description: Option<String>,
}

/// Entry of the built-in rate table tenants can seed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardCategory {
    pub code: &'static str,
    pub name: &'static str,
    pub useful_life_years: i32,
    pub asset_class: &'static str,
}
