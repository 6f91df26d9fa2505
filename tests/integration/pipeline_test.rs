// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{entries, ScriptedScraper};
use async_trait::async_trait;
use pricesync::application::use_cases::sync_prices::{PriceSyncPipeline, SyncError};
use pricesync::domain::models::catalog_entry::CatalogEntry;
use pricesync::domain::models::product_record::ProductRecord;
use pricesync::domain::models::scrape_outcome::{ExtractionFailure, ScrapeFailure};
use pricesync::domain::repositories::catalog_repository::{CatalogRepository, RepositoryError};
use pricesync::domain::repositories::record_sink::{RecordSink, StorageError};
use pricesync::engines::traits::FetchFailure;
use pricesync::infrastructure::repositories::in_memory_catalog_repo::InMemoryCatalogRepository;
use pricesync::infrastructure::storage::{InMemorySink, JsonArrayFileSink};
use pricesync::workers::manager::WorkerPool;
use std::sync::Arc;

fn pipeline(
    repo: Arc<InMemoryCatalogRepository>,
    scraper: ScriptedScraper,
    page_size: u64,
) -> (
    PriceSyncPipeline<InMemoryCatalogRepository, ScriptedScraper>,
    Arc<ScriptedScraper>,
) {
    let scraper = Arc::new(scraper);
    let pool = WorkerPool::new(scraper.clone(), Some(4));
    (PriceSyncPipeline::new(repo, pool, page_size), scraper)
}

#[tokio::test]
async fn test_batch_with_three_invalid_pages() {
    let repo = Arc::new(InMemoryCatalogRepository::new(entries(1..=100)));
    let scraper = ScriptedScraper::new()
        .fail(10, ExtractionFailure::InvalidProductPage("p10".into()))
        .fail(50, ExtractionFailure::InvalidProductPage("p50".into()))
        .fail(90, ExtractionFailure::InvalidProductPage("p90".into()));
    let (pipeline, _) = pipeline(repo.clone(), scraper, 100);

    let mut sink = InMemorySink::new();
    let report = pipeline.run(&mut sink).await.unwrap();

    assert_eq!(sink.records.len(), 97);
    assert!(sink.finished);
    assert_eq!(repo.deleted_ids(), vec![10, 50, 90]);
    assert_eq!(report.processed, 100);
    assert_eq!(report.succeeded, 97);
    assert_eq!(report.failed, 3);
    assert_eq!(report.emitted, 97);
    assert_eq!(report.deleted, 3);
    assert_eq!(report.failures_by_reason["invalid_product_page"], 3);
    assert!(report.finished_at.is_some());

    // Prices were written back
    assert_eq!(repo.len(), 97);
    assert_eq!(repo.get(7).unwrap().price, 70.0);
}

#[tokio::test]
async fn test_paging_visits_every_entry_once_despite_deletions() {
    let repo = Arc::new(InMemoryCatalogRepository::new(entries(1..=25)));
    let mut scraper = ScriptedScraper::new();
    for id in (4..=24).step_by(4) {
        scraper = scraper.fail(
            id,
            FetchFailure::NotFound {
                url: format!("p{}", id),
            },
        );
    }
    let (pipeline, scraper) = pipeline(repo.clone(), scraper, 10);

    let mut sink = InMemorySink::new();
    let report = pipeline.run(&mut sink).await.unwrap();

    assert_eq!(scraper.seen(), (1..=25).collect::<Vec<_>>());
    assert_eq!(report.batches, 3);
    assert_eq!(report.processed, 25);
    assert_eq!(report.deleted, 6);
    assert_eq!(sink.records.len(), 19);
    assert_eq!(repo.len(), 19);
}

#[tokio::test]
async fn test_failed_price_update_deletes_entry() {
    let repo = Arc::new(InMemoryCatalogRepository::new(entries(1..=5)));
    repo.fail_updates_for(3);
    let (pipeline, _) = pipeline(repo.clone(), ScriptedScraper::new(), 100);

    let mut sink = InMemorySink::new();
    let report = pipeline.run(&mut sink).await.unwrap();

    // The record is appended before the update is attempted
    assert_eq!(sink.records.len(), 5);
    assert_eq!(report.emitted, 5);
    assert_eq!(report.updated, 4);
    assert_eq!(report.succeeded, 4);
    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded + report.failed, report.processed);
    assert_eq!(repo.deleted_ids(), vec![3]);
    assert_eq!(report.failures_by_reason["persistence_failure"], 1);
}

#[tokio::test]
async fn test_non_positive_price_is_never_persisted() {
    let repo = Arc::new(InMemoryCatalogRepository::new(entries(1..=3)));
    let scraper = ScriptedScraper::new().price(2, 0.0).price(3, -5.0);
    let (pipeline, _) = pipeline(repo.clone(), scraper, 100);

    let mut sink = InMemorySink::new();
    let report = pipeline.run(&mut sink).await.unwrap();

    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].product_id, "1");
    assert_eq!(repo.deleted_ids(), vec![2, 3]);
    assert_eq!(report.failures_by_reason["non_positive_price"], 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 2);
}

#[tokio::test]
async fn test_lost_worker_keeps_entry() {
    let repo = Arc::new(InMemoryCatalogRepository::new(entries(1..=8)));
    let (pipeline, _) = pipeline(repo.clone(), ScriptedScraper::new().panic_on(4), 100);

    let mut sink = InMemorySink::new();
    let report = pipeline.run(&mut sink).await.unwrap();

    assert!(report.failures_by_reason["worker_lost"] >= 1);
    assert!(repo.deleted_ids().is_empty());
    assert!(repo.get(4).is_some());
    assert_eq!(report.processed, 8);
    assert_eq!(report.succeeded + report.failed, 8);
}

#[tokio::test]
async fn test_empty_catalog() {
    let repo = Arc::new(InMemoryCatalogRepository::new(vec![]));
    let (pipeline, scraper) = pipeline(repo, ScriptedScraper::new(), 100);

    let mut sink = InMemorySink::new();
    let report = pipeline.run(&mut sink).await.unwrap();

    assert_eq!(report.batches, 0);
    assert!(scraper.seen().is_empty());
    assert!(sink.finished);
}

#[tokio::test]
async fn test_entries_without_url_are_skipped() {
    let mut list = entries(1..=3);
    list[1].url = String::new();
    let repo = Arc::new(InMemoryCatalogRepository::new(list));
    let (pipeline, scraper) = pipeline(repo.clone(), ScriptedScraper::new(), 100);

    pipeline.run(&mut InMemorySink::new()).await.unwrap();

    assert_eq!(scraper.seen(), vec![1, 3]);
    assert!(repo.get(2).is_some());
}

/// 写入总是失败的输出
struct BrokenSink;

#[async_trait]
impl RecordSink for BrokenSink {
    async fn append(&mut self, _record: &ProductRecord) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::other("disk full")))
    }

    async fn finish(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    fn records_written(&self) -> u64 {
        0
    }
}

#[tokio::test]
async fn test_output_failure_aborts_run() {
    let repo = Arc::new(InMemoryCatalogRepository::new(entries(1..=3)));
    let (pipeline, _) = pipeline(repo.clone(), ScriptedScraper::new(), 100);

    let result = pipeline.run(&mut BrokenSink).await;
    assert!(matches!(result, Err(SyncError::Storage(_))));
    assert!(repo.deleted_ids().is_empty());
}

#[test]
fn test_worker_lost_is_not_a_deletion_trigger() {
    assert!(!ScrapeFailure::WorkerLost.deletes_entry());
}

/// 第一页之后读取失败的目录
struct FailingAfterFirstPage {
    inner: InMemoryCatalogRepository,
}

#[async_trait]
impl CatalogRepository for FailingAfterFirstPage {
    async fn list_page(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<CatalogEntry>, RepositoryError> {
        if offset > 0 {
            return Err(RepositoryError::Backend("connection dropped".to_string()));
        }
        self.inner.list_page(offset, limit).await
    }

    async fn update_price(&self, id: i64, price: f64) -> Result<(), RepositoryError> {
        self.inner.update_price(id, price).await
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn test_aborted_run_keeps_emitted_records_on_disk() {
    let repo = Arc::new(FailingAfterFirstPage {
        inner: InMemoryCatalogRepository::new(entries(1..=10)),
    });
    let pool = WorkerPool::new(Arc::new(ScriptedScraper::new()), Some(2));
    let pipeline = PriceSyncPipeline::new(repo.clone(), pool, 5);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("products.json");
    let mut sink = JsonArrayFileSink::create(&path).await.unwrap();

    let result = pipeline.run(&mut sink).await;
    assert!(matches!(result, Err(SyncError::Repository(_))));

    let content = std::fs::read_to_string(&path).unwrap();
    let written: Vec<ProductRecord> = serde_json::from_str(&content).unwrap();
    let ids: Vec<&str> = written.iter().map(|r| r.product_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    assert_eq!(repo.inner.get(3).unwrap().price, 30.0);
}
