// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Context;
use pricesync::application::use_cases::sync_prices::PriceSyncPipeline;
use pricesync::config::settings::Settings;
use pricesync::domain::repositories::catalog_repository::CatalogRepository;
use pricesync::domain::services::rule_registry::RuleRegistry;
use pricesync::engines::browser_engine::BrowserEngine;
use pricesync::engines::reqwest_engine::ReqwestEngine;
use pricesync::engines::router::EngineRouter;
use pricesync::engines::traits::ScraperEngine;
use pricesync::infrastructure::database::{connection, schema};
use pricesync::infrastructure::repositories::catalog_repo_impl::CatalogRepositoryImpl;
use pricesync::infrastructure::storage::JsonArrayFileSink;
use pricesync::utils::retry_policy::RetryPolicy;
use pricesync::utils::telemetry;
use pricesync::workers::manager::WorkerPool;
use pricesync::workers::scrape_worker::ScrapeWorker;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use validator::Validate;

/// 主函数
///
/// 加载配置、初始化各组件并执行一次完整的价格同步
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate().context("invalid configuration")?;

    // 2. Initialize logging and metrics
    telemetry::init_telemetry(&settings.telemetry);
    info!("Starting pricesync...");
    pricesync::infrastructure::metrics::init_metrics(&settings.metrics);

    // 3. Connect to database
    let db = connection::create_pool(&settings.database)
        .await
        .context("failed to connect to catalog database")?;
    let db = Arc::new(db);
    info!("Database connection established");

    if settings.database.ensure_schema {
        schema::ensure_schema(db.as_ref()).await?;
    }

    // 4. Load extraction rules
    let registry = Arc::new(
        RuleRegistry::from_path(&settings.scraper.rules_path)
            .context("failed to load domain rules")?,
    );

    // 5. Initialize engines
    let scraper = &settings.scraper;
    let static_engine = Arc::new(ReqwestEngine::new(
        &scraper.user_agent,
        scraper.blocking_markers.clone(),
    )?);
    let browser_engine = Arc::new(BrowserEngine::new(
        scraper.user_agent.clone(),
        scraper.navigation_timeout(),
        scraper.browser_executable.clone(),
    ));
    let engines: Vec<Arc<dyn ScraperEngine>> = vec![static_engine, browser_engine];
    let retry_policy = RetryPolicy::new(
        scraper.max_attempts,
        Duration::from_secs(scraper.backoff_base_secs),
        Duration::from_millis(scraper.max_jitter_ms),
    );
    let router = Arc::new(EngineRouter::new(engines, retry_policy));

    // 6. Build the pipeline
    let worker = Arc::new(ScrapeWorker::new(
        registry,
        router,
        scraper.request_timeout(),
    ));
    let pool = WorkerPool::new(worker, settings.pipeline.workers);
    let repository: Arc<dyn CatalogRepository> = Arc::new(CatalogRepositoryImpl::new(db.clone()));
    let pipeline = PriceSyncPipeline::new(repository, pool, settings.pipeline.page_size);

    // 7. Run
    let mut sink = JsonArrayFileSink::create(&settings.pipeline.output_path)
        .await
        .context("failed to open output file")?;
    let report = pipeline.run(&mut sink).await?;

    info!(
        run_id = %report.run_id,
        output = %sink.path().display(),
        records = report.emitted,
        "Price sync complete"
    );

    Ok(())
}
