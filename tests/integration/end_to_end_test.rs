// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use pricesync::application::use_cases::sync_prices::PriceSyncPipeline;
use pricesync::config::settings::DatabaseSettings;
use pricesync::domain::services::rule_registry::RuleRegistry;
use pricesync::engines::reqwest_engine::{ReqwestEngine, DEFAULT_USER_AGENT};
use pricesync::engines::router::EngineRouter;
use pricesync::engines::traits::ScraperEngine;
use pricesync::engines::validators::default_blocking_markers;
use pricesync::infrastructure::database::connection::create_pool;
use pricesync::infrastructure::database::entities::{country, product};
use pricesync::infrastructure::database::schema::ensure_schema;
use pricesync::infrastructure::repositories::catalog_repo_impl::CatalogRepositoryImpl;
use pricesync::infrastructure::storage::JsonArrayFileSink;
use pricesync::utils::retry_policy::RetryPolicy;
use pricesync::workers::manager::WorkerPool;
use pricesync::workers::scrape_worker::ScrapeWorker;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RULES: &str = r#"{
  "127.0.0.1": {
    "site_name": "Local Shop",
    "product_page_validator": "div.product",
    "product_id": "response.url",
    "product_name": "h1.title::text",
    "product_description": "div.desc::text",
    "product_price": "span.price::text",
    "product_images": "img.gallery::attr(src)",
    "product_country": "Germany"
  }
}"#;

fn product_page(name: &str, price: &str) -> String {
    format!(
        r#"<html><head><link rel="icon" href="/favicon.ico"></head><body>
        <div class="product">
          <h1 class="title">{}</h1>
          <div class="desc">Warm and <b>dry</b></div>
          <span class="price">{}</span>
          <img class="gallery" src="https://cdn.test/1.jpg?w=200">
          <img class="gallery" src="https://cdn.test/1.jpg?w=800">
        </div></body></html>"#,
        name, price
    )
}

#[tokio::test]
async fn test_sync_against_live_http_and_sqlite() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/boots"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(product_page("Boots", "€ 1.234,56")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/free"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(product_page("Freebie", "€ 0,00")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/blog"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>Just a blog</body></html>"),
        )
        .mount(&server)
        .await;

    let db = create_pool(&DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: None,
        min_connections: None,
        connect_timeout: Some(5),
        idle_timeout: None,
        ensure_schema: true,
    })
    .await
    .unwrap();
    ensure_schema(&db).await.unwrap();
    country::ActiveModel {
        id: Set(1),
        name: Set("Germany".to_string()),
        code: Set("DE".to_string()),
        currency: Set("EUR".to_string()),
        currency_symbol: Set("€".to_string()),
        mobile_code: Set("+49".to_string()),
    }
    .insert(&db)
    .await
    .unwrap();
    for (id, slug) in [(1, "boots"), (2, "free"), (3, "gone"), (4, "blog")] {
        product::ActiveModel {
            id: Set(id),
            url: Set(format!("{}/p/{}", server.uri(), slug)),
            name: Set(format!("Catalog {}", slug)),
            description: Set("Catalog description".to_string()),
            price: Set(1.0),
            sku: Set(None),
            images: Set(json!([])),
            country_id: Set(1),
            brand_id: Set(None),
            category_id: Set(None),
            updated_at: Set(None),
        }
        .insert(&db)
        .await
        .unwrap();
    }
    let db = Arc::new(db);

    let registry = Arc::new(RuleRegistry::from_json_str(RULES).unwrap());
    let engine = ReqwestEngine::new(DEFAULT_USER_AGENT, default_blocking_markers()).unwrap();
    let router = Arc::new(EngineRouter::new(
        vec![Arc::new(engine) as Arc<dyn ScraperEngine>],
        RetryPolicy::new(3, Duration::from_millis(10), Duration::ZERO),
    ));
    let worker = Arc::new(ScrapeWorker::new(registry, router, Duration::from_secs(5)));
    let pool = WorkerPool::new(worker, Some(2));
    let repo = Arc::new(CatalogRepositoryImpl::new(db.clone()));
    let pipeline = PriceSyncPipeline::new(repo, pool, 2);

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out").join("products.json");
    let mut sink = JsonArrayFileSink::create(&output).await.unwrap();
    let report = pipeline.run(&mut sink).await.unwrap();

    assert_eq!(report.processed, 4);
    assert_eq!(report.emitted, 1);
    assert_eq!(report.deleted, 3);
    assert_eq!(report.failures_by_reason["not_found"], 1);
    assert_eq!(report.failures_by_reason["invalid_product_page"], 1);
    assert_eq!(report.failures_by_reason["missing_price"], 1);

    let remaining = product::Entity::find().all(db.as_ref()).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, 1);
    assert!((remaining[0].price - 1234.56).abs() < 1e-9);

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let records = written.as_array().unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["site_name"], "Local Shop");
    assert_eq!(record["product_id"], "boots");
    assert_eq!(record["product_name"], "Boots");
    assert_eq!(record["product_description"], "Warm and dry");
    assert_eq!(record["product_images"], json!(["https://cdn.test/1.jpg"]));
    assert_eq!(record["product_country"]["currency_symbol"], "€");
    assert_eq!(record["website_logo"], format!("{}/favicon.ico", server.uri()));
}
