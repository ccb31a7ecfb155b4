use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use deprecio_core::categories::{
    CategoryRepositoryTrait, DepreciationCategory, NewDepreciationCategory,
};
use deprecio_core::Result;

use super::model::DepreciationCategoryDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{depreciable_assets, depreciation_categories};

pub struct CategoryRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl CategoryRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        CategoryRepository { pool, writer }
    }
}

#[async_trait]
impl CategoryRepositoryTrait for CategoryRepository {
    fn get_categories(&self, tenant_id: &str) -> Result<Vec<DepreciationCategory>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = depreciation_categories::table
            .filter(depreciation_categories::tenant_id.eq(tenant_id))
            .order(depreciation_categories::code.asc())
            .select(DepreciationCategoryDB::as_select())
            .load::<DepreciationCategoryDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(DepreciationCategory::from).collect())
    }

    fn get_category(
        &self,
        tenant_id: &str,
        category_id: &str,
    ) -> Result<Option<DepreciationCategory>> {
        let mut conn = get_connection(&self.pool)?;
        let row = depreciation_categories::table
            .filter(depreciation_categories::tenant_id.eq(tenant_id))
            .filter(depreciation_categories::id.eq(category_id))
            .select(DepreciationCategoryDB::as_select())
            .first::<DepreciationCategoryDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(DepreciationCategory::from))
    }

    fn get_category_by_code(
        &self,
        tenant_id: &str,
        code: &str,
    ) -> Result<Option<DepreciationCategory>> {
        let mut conn = get_connection(&self.pool)?;
        let row = depreciation_categories::table
            .filter(depreciation_categories::tenant_id.eq(tenant_id))
            .filter(depreciation_categories::code.eq(code))
            .select(DepreciationCategoryDB::as_select())
            .first::<DepreciationCategoryDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(DepreciationCategory::from))
    }

    fn count_assets_using_category(&self, tenant_id: &str, category_id: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        let count = depreciable_assets::table
            .filter(depreciable_assets::tenant_id.eq(tenant_id))
            .filter(depreciable_assets::category_id.eq(category_id))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(count)
    }

    async fn create_category(
        &self,
        category: NewDepreciationCategory,
    ) -> Result<DepreciationCategory> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<DepreciationCategory> {
                let row: DepreciationCategoryDB = category.into();
                let created = diesel::insert_into(depreciation_categories::table)
                    .values(&row)
                    .returning(DepreciationCategoryDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(created.into())
            })
            .await
    }

    async fn update_category(&self, category: DepreciationCategory) -> Result<DepreciationCategory> {
        let row: DepreciationCategoryDB = category.into();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<DepreciationCategory> {
                let updated = diesel::update(
                    depreciation_categories::table
                        .filter(depreciation_categories::id.eq(&row.id))
                        .filter(depreciation_categories::tenant_id.eq(&row.tenant_id)),
                )
                .set(&row)
                .returning(DepreciationCategoryDB::as_returning())
                .get_result(conn)
                .map_err(StorageError::from)?;
                Ok(updated.into())
            })
            .await
    }

    async fn delete_category(&self, tenant_id: &str, category_id: &str) -> Result<usize> {
        let tenant_id = tenant_id.to_string();
        let category_id = category_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(
                    depreciation_categories::table
                        .filter(depreciation_categories::id.eq(category_id))
                        .filter(depreciation_categories::tenant_id.eq(tenant_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use deprecio_core::categories::{CategoryService, CategoryServiceTrait};
    use deprecio_core::errors::{CategoryError, Error};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    async fn create_test_repository() -> (Arc<CategoryRepository>, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let pool = create_pool(&db_path.to_string_lossy()).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());
        (Arc::new(CategoryRepository::new(pool, writer)), temp_dir)
    }

    fn new_category(tenant_id: &str, code: &str) -> NewDepreciationCategory {
        NewDepreciationCategory {
            id: None,
            tenant_id: tenant_id.to_string(),
            code: code.to_string(),
            name: code.to_string(),
            annual_rate_percent: Some(dec!(20)),
            useful_life_years: Some(5),
            asset_class: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_load() {
        let (repo, _dir) = create_test_repository().await;

        let created = repo
            .create_category(new_category("t1", "VEHICLES"))
            .await
            .unwrap();
        assert_eq!(created.annual_rate_percent, dec!(20));
        assert_eq!(created.useful_life_months(), 60);

        let by_code = repo.get_category_by_code("t1", "VEHICLES").unwrap().unwrap();
        assert_eq!(by_code.id, created.id);
        assert!(repo.get_category("t2", &created.id).unwrap().is_none());
        assert_eq!(repo.get_categories("t1").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_code_is_unique_per_tenant() {
        let (repo, _dir) = create_test_repository().await;

        repo.create_category(new_category("t1", "SOFTWARE"))
            .await
            .unwrap();
        let err = repo
            .create_category(new_category("t1", "SOFTWARE"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());

        // Another tenant may use the same code.
        repo.create_category(new_category("t2", "SOFTWARE"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (repo, _dir) = create_test_repository().await;
        let mut category = repo
            .create_category(new_category("t1", "MACHINERY"))
            .await
            .unwrap();

        category.useful_life_years = 10;
        category.annual_rate_percent = dec!(10);
        let updated = repo.update_category(category.clone()).await.unwrap();
        assert_eq!(updated.useful_life_years, 10);

        assert_eq!(repo.delete_category("t2", &category.id).await.unwrap(), 0);
        assert_eq!(repo.delete_category("t1", &category.id).await.unwrap(), 1);
        assert!(repo.get_categories("t1").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let (repo, _dir) = create_test_repository().await;
        let service = CategoryService::new(repo.clone());

        let first = service.seed_standard_categories("t1").await.unwrap();
        let second = service.seed_standard_categories("t1").await.unwrap();

        assert_eq!(first.len(), 8);
        assert!(second.is_empty());
        let err = service.get_category_by_code("t1", "UNKNOWN").unwrap_err();
        assert!(matches!(err, Error::Category(CategoryError::NotFound(_))));
    }
}
