use chrono::NaiveDate;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use deprecio_core::constants::DATE_FORMAT;
use deprecio_core::depreciation::{CalculationType, CategoryAssignment, RunRequest};

use crate::main_lib::AppState;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scheduled depreciation batch for every eligible asset of a tenant
    RunTenant(RunTenantArgs),
    /// Run depreciation for a single asset
    RunAsset(RunAssetArgs),
    /// Project the full depreciation schedule of an asset without posting anything
    Schedule(AssetArgs),
    /// List the posted ledger records of an asset
    Ledger(AssetArgs),
    /// Dispose of an asset and settle the gain or loss
    Dispose(DisposeArgs),
    /// Assign a depreciation category to an asset, resetting its depreciation state
    AssignCategory(AssignCategoryArgs),
    /// List a tenant's depreciation categories
    Categories(TenantArgs),
    /// Create the standard category rate table for a tenant
    SeedCategories(TenantArgs),
}

#[derive(Args, Debug)]
pub struct TenantArgs {
    #[arg(long)]
    pub tenant: String,
}

#[derive(Args, Debug)]
pub struct AssetArgs {
    #[arg(long)]
    pub tenant: String,
    #[arg(long)]
    pub asset: String,
}

#[derive(Args, Debug)]
pub struct RunTenantArgs {
    #[arg(long)]
    pub tenant: String,
    /// Any date inside the period to run (YYYY-MM-DD); defaults to today
    #[arg(long, value_parser = parse_date)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct RunAssetArgs {
    #[arg(long)]
    pub tenant: String,
    #[arg(long)]
    pub asset: String,
    #[arg(long, value_parser = parse_date)]
    pub as_of: Option<NaiveDate>,
    /// Record the run as a manual calculation
    #[arg(long)]
    pub manual: bool,
    /// User that triggered the run
    #[arg(long)]
    pub actor: Option<String>,
}

#[derive(Args, Debug)]
pub struct DisposeArgs {
    #[arg(long)]
    pub tenant: String,
    #[arg(long)]
    pub asset: String,
    #[arg(long, value_parser = parse_date)]
    pub date: NaiveDate,
    #[arg(long, value_parser = parse_decimal)]
    pub proceeds: Decimal,
    #[arg(long)]
    pub actor: Option<String>,
}

#[derive(Args, Debug)]
pub struct AssignCategoryArgs {
    #[arg(long)]
    pub tenant: String,
    #[arg(long)]
    pub asset: String,
    /// Category code, e.g. VEHICLES
    #[arg(long)]
    pub category: String,
    #[arg(long)]
    pub useful_life_months: Option<i32>,
    #[arg(long, value_parser = parse_decimal)]
    pub salvage: Option<Decimal>,
    #[arg(long, value_parser = parse_date)]
    pub start_date: Option<NaiveDate>,
    /// Required when the asset already has posted ledger records
    #[arg(long)]
    pub confirm_reset: bool,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| format!("expected a date like 2025-01-31: {}", e))
}

fn parse_decimal(value: &str) -> Result<Decimal, String> {
    value
        .parse::<Decimal>()
        .map_err(|e| format!("expected a decimal amount: {}", e))
}

pub async fn execute(state: &AppState, command: Commands) -> anyhow::Result<Value> {
    let value = match command {
        Commands::RunTenant(args) => {
            let summary = state
                .depreciation_service
                .run_for_tenant(&args.tenant, args.as_of)
                .await?;
            serde_json::to_value(summary)?
        }
        Commands::RunAsset(args) => {
            let calculation_type = if args.manual {
                CalculationType::Manual
            } else {
                CalculationType::Scheduled
            };
            let outcome = state
                .depreciation_service
                .run_for_asset(RunRequest {
                    asset_id: args.asset,
                    tenant_id: args.tenant,
                    calculation_type,
                    actor_id: args.actor,
                    as_of: args.as_of,
                })
                .await;
            serde_json::to_value(outcome)?
        }
        Commands::Schedule(args) => {
            let schedule = state
                .depreciation_service
                .get_schedule(&args.asset, &args.tenant)?;
            serde_json::to_value(schedule)?
        }
        Commands::Ledger(args) => {
            let records = state
                .depreciation_service
                .get_ledger(&args.asset, &args.tenant)?;
            serde_json::to_value(records)?
        }
        Commands::Dispose(args) => {
            let settlement = state
                .depreciation_service
                .settle_disposal(&args.asset, &args.tenant, args.date, args.proceeds, args.actor)
                .await?;
            serde_json::to_value(settlement)?
        }
        Commands::AssignCategory(args) => {
            let category = state
                .category_service
                .get_category_by_code(&args.tenant, &args.category.trim().to_uppercase())?;
            let asset = state
                .depreciation_service
                .assign_category(
                    &args.asset,
                    &args.tenant,
                    &category.id,
                    CategoryAssignment {
                        custom_useful_life_months: args.useful_life_months,
                        salvage_value: args.salvage,
                        depreciation_start_date: args.start_date,
                        confirm_reset: args.confirm_reset,
                    },
                )
                .await?;
            serde_json::to_value(asset)?
        }
        Commands::Categories(args) => {
            let categories = state.category_service.list_categories(&args.tenant)?;
            serde_json::to_value(categories)?
        }
        Commands::SeedCategories(args) => {
            let created = state
                .category_service
                .seed_standard_categories(&args.tenant)
                .await?;
            json!({ "tenantId": args.tenant, "created": created })
        }
    };
    Ok(value)
}
