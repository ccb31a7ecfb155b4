//! Database models for depreciable assets and ledger records.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use deprecio_core::constants::DATE_FORMAT;
use deprecio_core::depreciation::{
    AssetDepreciationState, CalculationType, DepreciationLedgerRecord,
};

fn parse_decimal(value: &str, field_name: &str) -> Decimal {
    Decimal::from_str(value).unwrap_or_else(|e| {
        log::error!(
            "Failed to parse {} '{}' as Decimal: {}. Falling back to ZERO.",
            field_name,
            value,
            e
        );
        Decimal::ZERO
    })
}

fn parse_optional_decimal(value: Option<&str>, field_name: &str) -> Option<Decimal> {
    value.map(|v| parse_decimal(v, field_name))
}

fn parse_date(value: &str, field_name: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            log::error!("Failed to parse {} '{}': {}", field_name, value, e);
            None
        }
    }
}

fn parse_optional_date(value: Option<&str>, field_name: &str) -> Option<NaiveDate> {
    value.and_then(|v| parse_date(v, field_name))
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Database model for depreciable assets.
///
/// Asset rows are owned by the host system; the engine only reads the
/// acquisition fields and writes the depreciation and disposal columns.
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::depreciable_assets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct DepreciableAssetDB {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub category_id: Option<String>,
    pub acquisition_cost: Option<String>,
    pub acquisition_date: Option<String>,
    pub salvage_value: Option<String>,
    pub custom_useful_life_months: Option<i32>,
    pub depreciation_start_date: Option<String>,
    pub accumulated_depreciation: String,
    pub net_book_value: Option<String>,
    pub last_depreciation_period_end: Option<String>,
    pub is_fully_depreciated: bool,
    pub assignment_seq: i32,
    pub disposal_date: Option<String>,
    pub disposal_proceeds: Option<String>,
    pub disposal_gain_loss: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<DepreciableAssetDB> for AssetDepreciationState {
    fn from(db: DepreciableAssetDB) -> Self {
        Self {
            acquisition_cost: parse_optional_decimal(
                db.acquisition_cost.as_deref(),
                "acquisition_cost",
            ),
            acquisition_date: parse_optional_date(
                db.acquisition_date.as_deref(),
                "acquisition_date",
            ),
            salvage_value: parse_optional_decimal(db.salvage_value.as_deref(), "salvage_value"),
            depreciation_start_date: parse_optional_date(
                db.depreciation_start_date.as_deref(),
                "depreciation_start_date",
            ),
            accumulated_depreciation: parse_decimal(
                &db.accumulated_depreciation,
                "accumulated_depreciation",
            ),
            net_book_value: parse_optional_decimal(db.net_book_value.as_deref(), "net_book_value"),
            last_depreciation_period_end: parse_optional_date(
                db.last_depreciation_period_end.as_deref(),
                "last_depreciation_period_end",
            ),
            disposal_date: parse_optional_date(db.disposal_date.as_deref(), "disposal_date"),
            disposal_proceeds: parse_optional_decimal(
                db.disposal_proceeds.as_deref(),
                "disposal_proceeds",
            ),
            disposal_gain_loss: parse_optional_decimal(
                db.disposal_gain_loss.as_deref(),
                "disposal_gain_loss",
            ),
            asset_id: db.id,
            tenant_id: db.tenant_id,
            category_id: db.category_id,
            custom_useful_life_months: db.custom_useful_life_months,
            is_fully_depreciated: db.is_fully_depreciated,
            assignment_seq: db.assignment_seq,
            updated_at: db.updated_at,
        }
    }
}

/// Database model for ledger records. Rows are never updated or deleted.
#[derive(
    Queryable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::depreciation_ledger)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct DepreciationLedgerDB {
    pub id: String,
    pub tenant_id: String,
    pub asset_id: String,
    pub assignment_seq: i32,
    pub period_start: String,
    pub period_end: String,
    pub depreciation_amount: String,
    pub accumulated_amount_after: String,
    pub net_book_value_after: String,
    pub calculation_type: String,
    pub calculated_at: NaiveDateTime,
    pub actor_id: Option<String>,
}

impl From<DepreciationLedgerDB> for DepreciationLedgerRecord {
    fn from(db: DepreciationLedgerDB) -> Self {
        let calculation_type =
            CalculationType::from_str(&db.calculation_type).unwrap_or_else(|e| {
                log::error!("Ledger record {}: {}", db.id, e);
                CalculationType::Scheduled
            });
        Self {
            period_start: parse_date(&db.period_start, "period_start").unwrap_or_default(),
            period_end: parse_date(&db.period_end, "period_end").unwrap_or_default(),
            depreciation_amount: parse_decimal(&db.depreciation_amount, "depreciation_amount"),
            accumulated_amount_after: parse_decimal(
                &db.accumulated_amount_after,
                "accumulated_amount_after",
            ),
            net_book_value_after: parse_decimal(&db.net_book_value_after, "net_book_value_after"),
            calculation_type,
            id: db.id,
            tenant_id: db.tenant_id,
            asset_id: db.asset_id,
            assignment_seq: db.assignment_seq,
            calculated_at: db.calculated_at,
            actor_id: db.actor_id,
        }
    }
}

impl From<DepreciationLedgerRecord> for DepreciationLedgerDB {
    fn from(domain: DepreciationLedgerRecord) -> Self {
        Self {
            id: domain.id,
            tenant_id: domain.tenant_id,
            asset_id: domain.asset_id,
            assignment_seq: domain.assignment_seq,
            period_start: format_date(domain.period_start),
            period_end: format_date(domain.period_end),
            depreciation_amount: domain.depreciation_amount.to_string(),
            accumulated_amount_after: domain.accumulated_amount_after.to_string(),
            net_book_value_after: domain.net_book_value_after.to_string(),
            calculation_type: domain.calculation_type.as_str().to_string(),
            calculated_at: domain.calculated_at,
            actor_id: domain.actor_id,
        }
    }
}
