use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::expression_methods::SqliteExpressionMethods;
use diesel::SqliteConnection;
use std::sync::Arc;

use deprecio_core::categories::DepreciationCategory;
use deprecio_core::depreciation::{
    AssetCategoryReset, AssetDepreciationState, AssetDepreciationUpdate, AssetDisposalUpdate,
    AssetVersion, AssetWithCategory, DepreciationLedgerRecord, DepreciationRepositoryTrait,
};
use deprecio_core::errors::{DatabaseError, Error};
use deprecio_core::Result;

use super::model::{format_date, DepreciableAssetDB, DepreciationLedgerDB};
use crate::categories::DepreciationCategoryDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{depreciable_assets, depreciation_categories, depreciation_ledger};

pub struct DepreciationRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl DepreciationRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        DepreciationRepository { pool, writer }
    }

    fn ledger_record_exists(
        conn: &mut SqliteConnection,
        asset_id: &str,
        assignment_seq: i32,
        period_end: &str,
    ) -> Result<bool> {
        let count = depreciation_ledger::table
            .filter(depreciation_ledger::asset_id.eq(asset_id))
            .filter(depreciation_ledger::assignment_seq.eq(assignment_seq))
            .filter(depreciation_ledger::period_end.eq(period_end))
            .count()
            .get_result::<i64>(conn)
            .map_err(StorageError::from)?;
        Ok(count > 0)
    }

    fn insert_ledger_record(
        conn: &mut SqliteConnection,
        record: DepreciationLedgerRecord,
    ) -> Result<DepreciationLedgerRecord> {
        let row: DepreciationLedgerDB = record.into();
        if Self::ledger_record_exists(conn, &row.asset_id, row.assignment_seq, &row.period_end)? {
            return Err(DatabaseError::UniqueViolation(format!(
                "ledger record for asset {} period ending {} already exists",
                row.asset_id, row.period_end
            ))
            .into());
        }
        let inserted = diesel::insert_into(depreciation_ledger::table)
            .values(&row)
            .returning(DepreciationLedgerDB::as_returning())
            .get_result(conn)
            .map_err(StorageError::from)?;
        Ok(inserted.into())
    }

    fn load_asset(conn: &mut SqliteConnection, asset_id: &str) -> Result<AssetDepreciationState> {
        let row = depreciable_assets::table
            .find(asset_id)
            .select(DepreciableAssetDB::as_select())
            .first::<DepreciableAssetDB>(conn)
            .map_err(StorageError::from)?;
        Ok(row.into())
    }

    /// Rejects a write computed from running totals the asset no longer has.
    fn ensure_unchanged(
        conn: &mut SqliteConnection,
        asset_id: &str,
        expected: &AssetVersion,
        what: &str,
    ) -> Result<()> {
        let current = Self::load_asset(conn, asset_id)?;
        if !expected.matches(&current) {
            return Err(Error::ConstraintViolation(format!(
                "asset {} changed before {} could be written: expected {:?}, found {:?}",
                asset_id,
                what,
                expected,
                current.version()
            )));
        }
        Ok(())
    }
}

/// A guarded update that matched no row means the asset changed underneath the run.
fn ensure_updated(affected: usize, asset_id: &str, what: &str) -> Result<()> {
    if affected == 0 {
        return Err(Error::ConstraintViolation(format!(
            "asset {} changed before {} could be written",
            asset_id, what
        )));
    }
    Ok(())
}

#[async_trait]
impl DepreciationRepositoryTrait for DepreciationRepository {
    fn find_asset_with_category(
        &self,
        asset_id: &str,
        tenant_id: &str,
    ) -> Result<Option<AssetWithCategory>> {
        let mut conn = get_connection(&self.pool)?;
        let row = depreciable_assets::table
            .left_join(
                depreciation_categories::table.on(depreciable_assets::category_id
                    .assume_not_null()
                    .eq(depreciation_categories::id)
                    .and(depreciation_categories::tenant_id.eq(depreciable_assets::tenant_id))),
            )
            .filter(depreciable_assets::id.eq(asset_id))
            .filter(depreciable_assets::tenant_id.eq(tenant_id))
            .select((
                DepreciableAssetDB::as_select(),
                Option::<DepreciationCategoryDB>::as_select(),
            ))
            .first::<(DepreciableAssetDB, Option<DepreciationCategoryDB>)>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        Ok(row.map(|(asset, category)| AssetWithCategory {
            asset: asset.into(),
            category: category.map(DepreciationCategory::from),
        }))
    }

    fn find_ledger_record(
        &self,
        asset_id: &str,
        period_end: NaiveDate,
    ) -> Result<Option<DepreciationLedgerRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let row = depreciation_ledger::table
            .inner_join(
                depreciable_assets::table.on(depreciable_assets::id
                    .eq(depreciation_ledger::asset_id)
                    .and(depreciable_assets::assignment_seq.eq(depreciation_ledger::assignment_seq))),
            )
            .filter(depreciation_ledger::asset_id.eq(asset_id))
            .filter(depreciation_ledger::period_end.eq(format_date(period_end)))
            .select(DepreciationLedgerDB::as_select())
            .first::<DepreciationLedgerDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(DepreciationLedgerRecord::from))
    }

    fn list_ledger_records(
        &self,
        asset_id: &str,
        tenant_id: &str,
    ) -> Result<Vec<DepreciationLedgerRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = depreciation_ledger::table
            .filter(depreciation_ledger::asset_id.eq(asset_id))
            .filter(depreciation_ledger::tenant_id.eq(tenant_id))
            .order((
                depreciation_ledger::assignment_seq.asc(),
                depreciation_ledger::period_end.asc(),
            ))
            .select(DepreciationLedgerDB::as_select())
            .load::<DepreciationLedgerDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(DepreciationLedgerRecord::from).collect())
    }

    fn count_ledger_records(&self, asset_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let count = depreciation_ledger::table
            .inner_join(
                depreciable_assets::table.on(depreciable_assets::id
                    .eq(depreciation_ledger::asset_id)
                    .and(depreciable_assets::assignment_seq.eq(depreciation_ledger::assignment_seq))),
            )
            .filter(depreciation_ledger::asset_id.eq(asset_id))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }

    fn list_eligible_assets(&self, tenant_id: &str) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        let ids = depreciable_assets::table
            .filter(depreciable_assets::tenant_id.eq(tenant_id))
            .filter(depreciable_assets::category_id.is_not_null())
            .filter(depreciable_assets::disposal_date.is_null())
            .filter(depreciable_assets::is_fully_depreciated.eq(false))
            .order(depreciable_assets::id.asc())
            .select(depreciable_assets::id)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(ids)
    }

    async fn insert_ledger_record_and_update_asset(
        &self,
        record: DepreciationLedgerRecord,
        update: AssetDepreciationUpdate,
    ) -> Result<DepreciationLedgerRecord> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<DepreciationLedgerRecord> {
                let inserted = Self::insert_ledger_record(conn, record)?;
                Self::ensure_unchanged(
                    conn,
                    &update.asset_id,
                    &update.expected,
                    "the depreciation period",
                )?;

                let expected_end = update.expected.last_depreciation_period_end.map(format_date);
                let affected = diesel::update(
                    depreciable_assets::table
                        .filter(depreciable_assets::id.eq(&update.asset_id))
                        .filter(depreciable_assets::tenant_id.eq(&update.tenant_id))
                        .filter(depreciable_assets::assignment_seq.eq(update.expected.assignment_seq))
                        .filter(depreciable_assets::last_depreciation_period_end.is(expected_end))
                        .filter(depreciable_assets::disposal_date.is_null()),
                )
                .set((
                    depreciable_assets::accumulated_depreciation
                        .eq(update.accumulated_depreciation.to_string()),
                    depreciable_assets::net_book_value.eq(Some(update.net_book_value.to_string())),
                    depreciable_assets::last_depreciation_period_end
                        .eq(Some(format_date(update.last_depreciation_period_end))),
                    depreciable_assets::is_fully_depreciated.eq(update.is_fully_depreciated),
                    depreciable_assets::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
                ensure_updated(affected, &update.asset_id, "the depreciation period")?;

                Ok(inserted)
            })
            .await
    }

    async fn record_disposal(
        &self,
        record: Option<DepreciationLedgerRecord>,
        update: AssetDisposalUpdate,
    ) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                if let Some(record) = record {
                    Self::insert_ledger_record(conn, record)?;
                }
                Self::ensure_unchanged(conn, &update.asset_id, &update.expected, "the disposal")?;

                let expected_end = update.expected.last_depreciation_period_end.map(format_date);
                let affected = diesel::update(
                    depreciable_assets::table
                        .filter(depreciable_assets::id.eq(&update.asset_id))
                        .filter(depreciable_assets::tenant_id.eq(&update.tenant_id))
                        .filter(depreciable_assets::assignment_seq.eq(update.expected.assignment_seq))
                        .filter(depreciable_assets::last_depreciation_period_end.is(expected_end))
                        .filter(depreciable_assets::disposal_date.is_null()),
                )
                .set((
                    depreciable_assets::accumulated_depreciation
                        .eq(update.accumulated_depreciation.to_string()),
                    depreciable_assets::net_book_value.eq(Some(update.net_book_value.to_string())),
                    depreciable_assets::last_depreciation_period_end
                        .eq(update.last_depreciation_period_end.map(format_date)),
                    depreciable_assets::is_fully_depreciated.eq(update.is_fully_depreciated),
                    depreciable_assets::disposal_date.eq(Some(format_date(update.disposal_date))),
                    depreciable_assets::disposal_proceeds
                        .eq(Some(update.disposal_proceeds.to_string())),
                    depreciable_assets::disposal_gain_loss
                        .eq(Some(update.disposal_gain_loss.to_string())),
                    depreciable_assets::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
                ensure_updated(affected, &update.asset_id, "the disposal")
            })
            .await
    }

    async fn reset_asset_category(
        &self,
        reset: AssetCategoryReset,
    ) -> Result<AssetDepreciationState> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<AssetDepreciationState> {
                let affected = diesel::update(
                    depreciable_assets::table
                        .filter(depreciable_assets::id.eq(&reset.asset_id))
                        .filter(depreciable_assets::tenant_id.eq(&reset.tenant_id))
                        .filter(depreciable_assets::assignment_seq.eq(reset.assignment_seq - 1))
                        .filter(depreciable_assets::disposal_date.is_null()),
                )
                .set((
                    depreciable_assets::category_id.eq(Some(reset.category_id.clone())),
                    depreciable_assets::custom_useful_life_months
                        .eq(reset.custom_useful_life_months),
                    depreciable_assets::salvage_value.eq(reset.salvage_value.map(|v| v.to_string())),
                    depreciable_assets::depreciation_start_date
                        .eq(reset.depreciation_start_date.map(format_date)),
                    depreciable_assets::accumulated_depreciation.eq("0"),
                    depreciable_assets::net_book_value.eq(reset.net_book_value.map(|v| v.to_string())),
                    depreciable_assets::last_depreciation_period_end.eq(None::<String>),
                    depreciable_assets::is_fully_depreciated.eq(false),
                    depreciable_assets::assignment_seq.eq(reset.assignment_seq),
                    depreciable_assets::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
                ensure_updated(affected, &reset.asset_id, "the category assignment")?;

                Self::load_asset(conn, &reset.asset_id)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::CategoryRepository;
    use crate::db::{create_pool, run_migrations, spawn_writer, DbPool};
    use chrono::NaiveDateTime;
    use deprecio_core::categories::{CategoryRepositoryTrait, NewDepreciationCategory};
    use deprecio_core::depreciation::{
        CalculationType, CategoryAssignment, DepreciationService, DepreciationServiceTrait,
        RunOutcome, RunRequest, SkipReason,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    const TENANT: &str = "tenant-a";

    struct TestContext {
        pool: Arc<DbPool>,
        repository: Arc<DepreciationRepository>,
        categories: Arc<CategoryRepository>,
        service: DepreciationService,
        _dir: tempfile::TempDir,
    }

    async fn setup() -> TestContext {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let pool = create_pool(&db_path.to_string_lossy()).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());

        let repository = Arc::new(DepreciationRepository::new(pool.clone(), writer.clone()));
        let categories = Arc::new(CategoryRepository::new(pool.clone(), writer));
        let service = DepreciationService::new(repository.clone(), categories.clone());
        TestContext {
            pool,
            repository,
            categories,
            service,
            _dir: temp_dir,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    async fn create_category(ctx: &TestContext, code: &str, years: i32) -> String {
        ctx.categories
            .create_category(NewDepreciationCategory {
                id: None,
                tenant_id: TENANT.to_string(),
                code: code.to_string(),
                name: code.to_string(),
                annual_rate_percent: Some(Decimal::ONE_HUNDRED / Decimal::from(years)),
                useful_life_years: Some(years),
                asset_class: None,
                description: None,
            })
            .await
            .expect("Failed to create category")
            .id
    }

    /// Inserts an asset row the way the host system would.
    fn create_test_asset(
        ctx: &TestContext,
        asset_id: &str,
        category_id: Option<&str>,
        cost: &str,
        start: NaiveDate,
    ) {
        let now: NaiveDateTime = Utc::now().naive_utc();
        let row = DepreciableAssetDB {
            id: asset_id.to_string(),
            tenant_id: TENANT.to_string(),
            name: format!("Asset {}", asset_id),
            category_id: category_id.map(str::to_string),
            acquisition_cost: Some(cost.to_string()),
            acquisition_date: Some(format_date(start)),
            salvage_value: None,
            custom_useful_life_months: None,
            depreciation_start_date: None,
            accumulated_depreciation: "0".to_string(),
            net_book_value: Some(cost.to_string()),
            last_depreciation_period_end: None,
            is_fully_depreciated: false,
            assignment_seq: 1,
            disposal_date: None,
            disposal_proceeds: None,
            disposal_gain_loss: None,
            created_at: now,
            updated_at: now,
        };
        let mut conn = get_connection(&ctx.pool).expect("Failed to get connection");
        diesel::insert_into(depreciable_assets::table)
            .values(&row)
            .execute(&mut conn)
            .expect("Failed to create test asset");
    }

    fn manual(asset_id: &str, as_of: NaiveDate) -> RunRequest {
        RunRequest {
            asset_id: asset_id.to_string(),
            tenant_id: TENANT.to_string(),
            calculation_type: CalculationType::Manual,
            actor_id: Some("user-1".to_string()),
            as_of: Some(as_of),
        }
    }

    #[tokio::test]
    async fn test_loads_asset_with_tenant_scoped_category() {
        let ctx = setup().await;
        let category_id = create_category(&ctx, "IT", 3).await;
        create_test_asset(&ctx, "a1", Some(&category_id), "3600", d(2025, 1, 1));
        create_test_asset(&ctx, "a2", None, "1000", d(2025, 1, 1));

        let loaded = ctx
            .repository
            .find_asset_with_category("a1", TENANT)
            .unwrap()
            .unwrap();
        assert_eq!(loaded.asset.acquisition_cost, Some(dec!(3600)));
        assert_eq!(loaded.asset.acquisition_date, Some(d(2025, 1, 1)));
        assert_eq!(loaded.category.unwrap().useful_life_months(), 36);

        let unassigned = ctx
            .repository
            .find_asset_with_category("a2", TENANT)
            .unwrap()
            .unwrap();
        assert!(unassigned.category.is_none());

        assert!(ctx
            .repository
            .find_asset_with_category("a1", "tenant-b")
            .unwrap()
            .is_none());
        assert_eq!(ctx.repository.list_eligible_assets(TENANT).unwrap(), vec!["a1"]);
    }

    #[tokio::test]
    async fn test_run_posts_record_and_updates_asset() {
        let ctx = setup().await;
        let category_id = create_category(&ctx, "IT", 1).await;
        create_test_asset(&ctx, "a1", Some(&category_id), "12000", d(2025, 6, 16));

        let outcome = ctx.service.run_for_asset(manual("a1", d(2025, 6, 20))).await;
        let record = match outcome {
            RunOutcome::Posted { record } => record,
            other => panic!("expected posted record, got {:?}", other),
        };
        assert_eq!(record.depreciation_amount, dec!(500.00));

        let stored = ctx
            .repository
            .find_ledger_record("a1", d(2025, 6, 30))
            .unwrap()
            .unwrap();
        assert_eq!(stored, record);

        let asset = ctx
            .repository
            .find_asset_with_category("a1", TENANT)
            .unwrap()
            .unwrap()
            .asset;
        assert_eq!(asset.accumulated_depreciation, dec!(500.00));
        assert_eq!(asset.net_book_value, Some(dec!(11500.00)));
        assert_eq!(asset.last_depreciation_period_end, Some(d(2025, 6, 30)));

        let again = ctx.service.run_for_asset(manual("a1", d(2025, 6, 1))).await;
        assert_eq!(again.skip_reason(), Some(SkipReason::AlreadyRecorded));
        assert_eq!(ctx.repository.count_ledger_records("a1").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_period_is_rejected_by_write_layer() {
        let ctx = setup().await;
        let category_id = create_category(&ctx, "IT", 1).await;
        create_test_asset(&ctx, "a1", Some(&category_id), "12000", d(2025, 1, 1));

        let record = DepreciationLedgerRecord {
            id: "r1".to_string(),
            tenant_id: TENANT.to_string(),
            asset_id: "a1".to_string(),
            assignment_seq: 1,
            period_start: d(2025, 1, 1),
            period_end: d(2025, 1, 31),
            depreciation_amount: dec!(1000),
            accumulated_amount_after: dec!(1000),
            net_book_value_after: dec!(11000),
            calculation_type: CalculationType::Scheduled,
            calculated_at: Utc::now().naive_utc(),
            actor_id: None,
        };
        let update = AssetDepreciationUpdate {
            asset_id: "a1".to_string(),
            tenant_id: TENANT.to_string(),
            expected: AssetVersion {
                assignment_seq: 1,
                accumulated_depreciation: Decimal::ZERO,
                last_depreciation_period_end: None,
            },
            accumulated_depreciation: dec!(1000),
            net_book_value: dec!(11000),
            last_depreciation_period_end: d(2025, 1, 31),
            is_fully_depreciated: false,
        };

        ctx.repository
            .insert_ledger_record_and_update_asset(record.clone(), update.clone())
            .await
            .unwrap();
        let err = ctx
            .repository
            .insert_ledger_record_and_update_asset(
                DepreciationLedgerRecord {
                    id: "r2".to_string(),
                    ..record
                },
                update,
            )
            .await
            .unwrap_err();

        assert!(err.is_unique_violation());
        assert_eq!(ctx.repository.list_ledger_records("a1", TENANT).unwrap().len(), 1);
    }

    fn load_state(ctx: &TestContext, asset_id: &str) -> AssetDepreciationState {
        ctx.repository
            .find_asset_with_category(asset_id, TENANT)
            .unwrap()
            .unwrap()
            .asset
    }

    #[tokio::test]
    async fn test_write_from_stale_totals_is_rolled_back() {
        let ctx = setup().await;
        let category_id = create_category(&ctx, "IT", 1).await;
        create_test_asset(&ctx, "a1", Some(&category_id), "12000", d(2025, 1, 1));

        // Read before January lands, then let January commit.
        let stale = load_state(&ctx, "a1");
        assert!(ctx
            .service
            .run_for_asset(manual("a1", d(2025, 1, 31)))
            .await
            .is_posted());

        let err = ctx
            .repository
            .insert_ledger_record_and_update_asset(
                DepreciationLedgerRecord {
                    id: "feb".to_string(),
                    tenant_id: TENANT.to_string(),
                    asset_id: "a1".to_string(),
                    assignment_seq: stale.assignment_seq,
                    period_start: d(2025, 2, 1),
                    period_end: d(2025, 2, 28),
                    depreciation_amount: dec!(1000),
                    accumulated_amount_after: dec!(1000),
                    net_book_value_after: dec!(11000),
                    calculation_type: CalculationType::Scheduled,
                    calculated_at: Utc::now().naive_utc(),
                    actor_id: None,
                },
                AssetDepreciationUpdate {
                    asset_id: "a1".to_string(),
                    tenant_id: TENANT.to_string(),
                    expected: stale.version(),
                    accumulated_depreciation: dec!(1000),
                    net_book_value: dec!(11000),
                    last_depreciation_period_end: d(2025, 2, 28),
                    is_fully_depreciated: false,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        let ledger = ctx.repository.list_ledger_records("a1", TENANT).unwrap();
        assert_eq!(ledger.len(), 1);
        let asset = load_state(&ctx, "a1");
        assert_eq!(asset.accumulated_depreciation, dec!(1000.00));
        assert_eq!(asset.last_depreciation_period_end, Some(d(2025, 1, 31)));

        // Replaying from fresh state posts February on top of January.
        let outcome = ctx.service.run_for_asset(manual("a1", d(2025, 2, 28))).await;
        assert!(outcome.is_posted());
        let asset = load_state(&ctx, "a1");
        let ledger_total: Decimal = ctx
            .repository
            .list_ledger_records("a1", TENANT)
            .unwrap()
            .iter()
            .map(|r| r.depreciation_amount)
            .sum();
        assert_eq!(asset.accumulated_depreciation, dec!(2000.00));
        assert_eq!(ledger_total, asset.accumulated_depreciation);
    }

    #[tokio::test]
    async fn test_disposal_after_reassignment_is_rolled_back() {
        let ctx = setup().await;
        let one_year = create_category(&ctx, "IT", 1).await;
        let five_years = create_category(&ctx, "FURNITURE", 5).await;
        create_test_asset(&ctx, "a1", Some(&one_year), "12000", d(2025, 1, 1));
        assert!(ctx
            .service
            .run_for_asset(manual("a1", d(2025, 1, 1)))
            .await
            .is_posted());

        // Disposal computed under the first assignment, reassignment commits first.
        let stale = load_state(&ctx, "a1");
        ctx.service
            .assign_category(
                "a1",
                TENANT,
                &five_years,
                CategoryAssignment {
                    confirm_reset: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = ctx
            .repository
            .record_disposal(
                Some(DepreciationLedgerRecord {
                    id: "disposal".to_string(),
                    tenant_id: TENANT.to_string(),
                    asset_id: "a1".to_string(),
                    assignment_seq: stale.assignment_seq,
                    period_start: d(2025, 2, 1),
                    period_end: d(2025, 2, 10),
                    depreciation_amount: dec!(361.37),
                    accumulated_amount_after: dec!(1361.37),
                    net_book_value_after: dec!(10638.63),
                    calculation_type: CalculationType::Disposal,
                    calculated_at: Utc::now().naive_utc(),
                    actor_id: None,
                }),
                AssetDisposalUpdate {
                    asset_id: "a1".to_string(),
                    tenant_id: TENANT.to_string(),
                    expected: stale.version(),
                    accumulated_depreciation: dec!(1361.37),
                    net_book_value: dec!(10638.63),
                    last_depreciation_period_end: Some(d(2025, 2, 10)),
                    is_fully_depreciated: false,
                    disposal_date: d(2025, 2, 10),
                    disposal_proceeds: dec!(9000),
                    disposal_gain_loss: dec!(-1638.63),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        let asset = load_state(&ctx, "a1");
        assert_eq!(asset.assignment_seq, 2);
        assert!(asset.disposal_date.is_none());
        assert_eq!(asset.accumulated_depreciation, Decimal::ZERO);
        assert_eq!(ctx.repository.list_ledger_records("a1", TENANT).unwrap().len(), 1);

        let outcome = ctx.service.run_for_asset(manual("a1", d(2025, 1, 1))).await;
        assert!(outcome.is_posted());
    }

    #[tokio::test]
    async fn test_batch_over_tenant() {
        let ctx = setup().await;
        let category_id = create_category(&ctx, "FURNITURE", 5).await;
        create_test_asset(&ctx, "a1", Some(&category_id), "6000", d(2025, 1, 1));
        create_test_asset(&ctx, "a2", Some(&category_id), "0", d(2025, 1, 1));
        create_test_asset(&ctx, "a3", Some(&category_id), "6000", d(2025, 12, 1));

        let summary = ctx
            .service
            .run_for_tenant(TENANT, Some(d(2025, 3, 31)))
            .await
            .unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[tokio::test]
    async fn test_disposal_is_persisted() {
        let ctx = setup().await;
        let category_id = create_category(&ctx, "IT", 1).await;
        create_test_asset(&ctx, "a1", Some(&category_id), "12000", d(2025, 1, 1));
        for month in 1..=3 {
            let outcome = ctx.service.run_for_asset(manual("a1", d(2025, month, 1))).await;
            assert!(outcome.is_posted());
        }

        let settlement = ctx
            .service
            .settle_disposal("a1", TENANT, d(2025, 5, 15), dec!(500), Some("user-1".into()))
            .await
            .unwrap();
        assert_eq!(settlement.final_net_book_value, dec!(7521.68));

        let asset = ctx
            .repository
            .find_asset_with_category("a1", TENANT)
            .unwrap()
            .unwrap()
            .asset;
        assert_eq!(asset.disposal_date, Some(d(2025, 5, 15)));
        assert_eq!(asset.disposal_proceeds, Some(dec!(500)));
        assert_eq!(asset.disposal_gain_loss, Some(dec!(-7021.68)));
        assert!(ctx.repository.list_eligible_assets(TENANT).unwrap().is_empty());

        let ledger = ctx.service.get_ledger("a1", TENANT).unwrap();
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger[3].calculation_type, CalculationType::Disposal);
        assert_eq!(ledger[3].actor_id.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn test_reassignment_keeps_history() {
        let ctx = setup().await;
        let one_year = create_category(&ctx, "IT", 1).await;
        let five_years = create_category(&ctx, "FURNITURE", 5).await;
        create_test_asset(&ctx, "a1", Some(&one_year), "12000", d(2025, 1, 1));
        assert!(ctx
            .service
            .run_for_asset(manual("a1", d(2025, 1, 1)))
            .await
            .is_posted());

        let state = ctx
            .service
            .assign_category(
                "a1",
                TENANT,
                &five_years,
                CategoryAssignment {
                    confirm_reset: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(state.assignment_seq, 2);
        assert_eq!(state.accumulated_depreciation, Decimal::ZERO);
        assert_eq!(state.last_depreciation_period_end, None);
        assert_eq!(ctx.repository.count_ledger_records("a1").unwrap(), 0);

        let outcome = ctx.service.run_for_asset(manual("a1", d(2025, 1, 1))).await;
        assert!(outcome.is_posted());
        assert_eq!(ctx.repository.list_ledger_records("a1", TENANT).unwrap().len(), 2);
    }
}
