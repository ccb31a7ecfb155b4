use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use deprecio_core::categories::{CategoryService, CategoryServiceTrait};
use deprecio_core::depreciation::{DepreciationService, DepreciationServiceTrait};
use deprecio_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, CategoryRepository, DepreciationRepository,
};

use crate::config::{Config, LogFormat};

pub struct AppState {
    pub category_service: Arc<dyn CategoryServiceTrait>,
    pub depreciation_service: Arc<dyn DepreciationServiceTrait>,
}

/// Logs go to stderr so stdout carries only command output.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let db_path = init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());

    let category_repository = Arc::new(CategoryRepository::new(pool.clone(), writer.clone()));
    let depreciation_repository = Arc::new(DepreciationRepository::new(pool, writer));

    let category_service = Arc::new(CategoryService::new(category_repository.clone()));
    let depreciation_service = Arc::new(DepreciationService::new(
        depreciation_repository,
        category_repository,
    ));

    Ok(AppState {
        category_service,
        depreciation_service,
    })
}
