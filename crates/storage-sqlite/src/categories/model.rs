//! Database models for depreciation categories.

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use deprecio_core::categories::{DepreciationCategory, NewDepreciationCategory};

/// Database model for depreciation categories
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::depreciation_categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct DepreciationCategoryDB {
    pub id: String,
    pub tenant_id: String,
    pub code: String,
    pub name: String,
    pub annual_rate_percent: String,
    pub useful_life_years: i32,
    pub asset_class: Option<String>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<DepreciationCategoryDB> for DepreciationCategory {
    fn from(db: DepreciationCategoryDB) -> Self {
        let annual_rate_percent = Decimal::from_str(&db.annual_rate_percent).unwrap_or_else(|e| {
            log::error!(
                "Invalid annual rate '{}' on category {}: {}",
                db.annual_rate_percent,
                db.id,
                e
            );
            Decimal::ZERO
        });
        Self {
            id: db.id,
            tenant_id: db.tenant_id,
            code: db.code,
            name: db.name,
            annual_rate_percent,
            useful_life_years: db.useful_life_years,
            asset_class: db.asset_class,
            description: db.description,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<DepreciationCategory> for DepreciationCategoryDB {
    fn from(domain: DepreciationCategory) -> Self {
        Self {
            id: domain.id,
            tenant_id: domain.tenant_id,
            code: domain.code,
            name: domain.name,
            annual_rate_percent: domain.annual_rate_percent.to_string(),
            useful_life_years: domain.useful_life_years,
            asset_class: domain.asset_class,
            description: domain.description,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

impl From<NewDepreciationCategory> for DepreciationCategoryDB {
    fn from(domain: NewDepreciationCategory) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            tenant_id: domain.tenant_id,
            code: domain.code,
            name: domain.name,
            annual_rate_percent: domain
                .annual_rate_percent
                .unwrap_or_default()
                .to_string(),
            useful_life_years: domain.useful_life_years.unwrap_or_default(),
            asset_class: domain.asset_class,
            description: domain.description,
            created_at: now,
            updated_at: now,
        }
    }
}
