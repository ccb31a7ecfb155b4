//! Category registry service implementation.

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::errors::{CategoryError, ValidationError};
use crate::{Error, Result};

use super::{
    annual_rate_from_useful_life, useful_life_from_annual_rate, CategoryRepositoryTrait,
    CategoryServiceTrait, CategoryUpdate, DepreciationCategory, NewDepreciationCategory,
    STANDARD_CATEGORIES,
};

pub struct CategoryService {
    repository: Arc<dyn CategoryRepositoryTrait>,
}

impl CategoryService {
    pub fn new(repository: Arc<dyn CategoryRepositoryTrait>) -> Self {
        Self { repository }
    }

    fn normalize_code(code: &str) -> Result<String> {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "code".to_string(),
            )));
        }
        Ok(code)
    }

    /// Resolves the (rate, life) pair, deriving whichever side is missing.
    ///
    /// When both are given the useful life wins, since it is the divisor the
    /// calculator actually uses.
    fn resolve_rate_and_life(
        annual_rate_percent: Option<Decimal>,
        useful_life_years: Option<i32>,
    ) -> Result<(Decimal, i32)> {
        match (annual_rate_percent, useful_life_years) {
            (_, Some(years)) => {
                if years <= 0 {
                    return Err(CategoryError::InvalidUsefulLife(format!(
                        "{} years",
                        years
                    ))
                    .into());
                }
                let rate = match annual_rate_percent {
                    Some(rate) if rate > Decimal::ZERO => rate,
                    _ => annual_rate_from_useful_life(years),
                };
                Ok((rate, years))
            }
            (Some(rate), None) => {
                let years = useful_life_from_annual_rate(rate);
                if years == 0 {
                    return Err(CategoryError::InvalidRate(format!("{}%", rate)).into());
                }
                Ok((rate, years))
            }
            (None, None) => Err(Error::Validation(ValidationError::MissingField(
                "annualRatePercent or usefulLifeYears".to_string(),
            ))),
        }
    }
}

#[async_trait]
impl CategoryServiceTrait for CategoryService {
    fn list_categories(&self, tenant_id: &str) -> Result<Vec<DepreciationCategory>> {
        self.repository.get_categories(tenant_id)
    }

    fn get_category(&self, tenant_id: &str, category_id: &str) -> Result<DepreciationCategory> {
        self.repository
            .get_category(tenant_id, category_id)?
            .ok_or_else(|| CategoryError::NotFound(category_id.to_string()).into())
    }

    fn get_category_by_code(&self, tenant_id: &str, code: &str) -> Result<DepreciationCategory> {
        let code = Self::normalize_code(code)?;
        self.repository
            .get_category_by_code(tenant_id, &code)?
            .ok_or_else(|| CategoryError::NotFound(code).into())
    }

    async fn create_category(
        &self,
        new_category: NewDepreciationCategory,
    ) -> Result<DepreciationCategory> {
        let code = Self::normalize_code(&new_category.code)?;
        let (rate, years) = Self::resolve_rate_and_life(
            new_category.annual_rate_percent,
            new_category.useful_life_years,
        )?;

        if self
            .repository
            .get_category_by_code(&new_category.tenant_id, &code)?
            .is_some()
        {
            return Err(CategoryError::DuplicateCode(code).into());
        }

        debug!(
            "Creating depreciation category {} for tenant {} ({} years, {}%)",
            code, new_category.tenant_id, years, rate
        );

        self.repository
            .create_category(NewDepreciationCategory {
                code,
                annual_rate_percent: Some(rate),
                useful_life_years: Some(years),
                ..new_category
            })
            .await
    }

    async fn update_category(&self, update: CategoryUpdate) -> Result<DepreciationCategory> {
        let existing = self.get_category(&update.tenant_id, &update.id)?;
        let (rate, years) =
            Self::resolve_rate_and_life(update.annual_rate_percent, update.useful_life_years)?;

        let updated = DepreciationCategory {
            name: update.name,
            annual_rate_percent: rate,
            useful_life_years: years,
            asset_class: update.asset_class,
            description: update.description,
            updated_at: Utc::now().naive_utc(),
            ..existing
        };
        self.repository.update_category(updated).await
    }

    async fn delete_category(&self, tenant_id: &str, category_id: &str) -> Result<()> {
        self.get_category(tenant_id, category_id)?;

        let asset_count = self
            .repository
            .count_assets_using_category(tenant_id, category_id)?;
        if asset_count > 0 {
            return Err(CategoryError::InUse { asset_count }.into());
        }

        self.repository
            .delete_category(tenant_id, category_id)
            .await?;
        Ok(())
    }

    async fn seed_standard_categories(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<DepreciationCategory>> {
        let mut created = Vec::new();
        for standard in STANDARD_CATEGORIES {
            if self
                .repository
                .get_category_by_code(tenant_id, standard.code)?
                .is_some()
            {
                continue;
            }
            let category = self
                .create_category(NewDepreciationCategory {
                    id: None,
                    tenant_id: tenant_id.to_string(),
                    code: standard.code.to_string(),
                    name: standard.name.to_string(),
                    annual_rate_percent: None,
                    useful_life_years: Some(standard.useful_life_years),
                    asset_class: Some(standard.asset_class.to_string()),
                    description: None,
                })
                .await?;
            created.push(category);
        }
        info!(
            "Seeded {} standard depreciation categories for tenant {}",
            created.len(),
            tenant_id
        );
        Ok(created)
    }
}
