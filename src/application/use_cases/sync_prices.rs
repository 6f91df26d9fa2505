// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::catalog_entry::CatalogEntry;
use crate::domain::models::scrape_outcome::ScrapeOutcome;
use crate::domain::repositories::catalog_repository::{CatalogRepository, RepositoryError};
use crate::domain::repositories::record_sink::{RecordSink, StorageError};
use crate::workers::manager::WorkerPool;
use crate::workers::worker::ProductScraper;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 价格同步错误
///
/// 只有整次运行无法继续时才返回；单个条目的失败不会出现在这里
#[derive(Error, Debug)]
pub enum SyncError {
    /// 读取目录分页失败
    #[error("Catalog read failed: {0}")]
    Repository(#[from] RepositoryError),
    /// 输出文件写入失败
    #[error("Output write failed: {0}")]
    Storage(#[from] StorageError),
}

/// 数据库更新失败后删除条目时记录的原因
const PERSISTENCE_FAILURE: &str = "persistence_failure";

/// 流水线状态
#[derive(Debug)]
enum PipelineState {
    Init,
    FetchPage,
    Dispatch(Vec<CatalogEntry>),
    Collect {
        page_len: usize,
        outcomes: Vec<ScrapeOutcome>,
    },
    Reconcile {
        page_len: usize,
        outcomes: Vec<ScrapeOutcome>,
    },
    AdvanceOffset {
        page_len: usize,
        deleted: usize,
    },
    Done,
}

/// 单个批次的统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub batch: u64,
    pub processed: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub emitted: u64,
    pub updated: u64,
    pub deleted: u64,
}

/// 一次运行的汇总
///
/// `succeeded` 只统计记录已写出且价格已更新的条目，其余条目都计入 `failed`，
/// 两者之和等于 `processed`。价格更新失败的条目已写出记录，因此同时计入
/// `emitted` 和 `failed`。
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub batches: u64,
    pub processed: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub emitted: u64,
    pub updated: u64,
    pub deleted: u64,
    /// 按失败类型统计的失败次数
    pub failures_by_reason: BTreeMap<String, u64>,
}

impl RunReport {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            batches: 0,
            processed: 0,
            succeeded: 0,
            failed: 0,
            emitted: 0,
            updated: 0,
            deleted: 0,
            failures_by_reason: BTreeMap::new(),
        }
    }

    fn absorb(&mut self, stats: &BatchStats) {
        self.batches += 1;
        self.processed += stats.processed;
        self.succeeded += stats.succeeded;
        self.failed += stats.failed;
        self.emitted += stats.emitted;
        self.updated += stats.updated;
        self.deleted += stats.deleted;
    }
}

/// 价格同步流水线
///
/// 按固定页大小遍历目录，每页交给工作池抓取，收齐全部结果后再统一对账：
/// 成功的写入输出并更新价格，不可恢复的失败删除条目。
/// 控制器是目录存储和输出文件的唯一写入方。
pub struct PriceSyncPipeline<R, S>
where
    R: CatalogRepository + ?Sized,
    S: ProductScraper,
{
    repository: Arc<R>,
    pool: WorkerPool<S>,
    page_size: u64,
}

impl<R, S> PriceSyncPipeline<R, S>
where
    R: CatalogRepository + ?Sized,
    S: ProductScraper,
{
    /// 创建流水线
    ///
    /// # 参数
    ///
    /// * `repository` - 目录仓库
    /// * `pool` - 工作池
    /// * `page_size` - 每批条目数
    pub fn new(repository: Arc<R>, pool: WorkerPool<S>, page_size: u64) -> Self {
        Self {
            repository,
            pool,
            page_size: page_size.max(1),
        }
    }

    /// 执行一次完整的价格同步
    ///
    /// # 参数
    ///
    /// * `sink` - 成功记录的输出
    ///
    /// # 返回值
    ///
    /// * `Ok(RunReport)` - 运行汇总
    /// * `Err(SyncError)` - 目录读取或输出写入失败，运行中止；已写出的记录仍会被收尾保存
    pub async fn run(&self, sink: &mut dyn RecordSink) -> Result<RunReport, SyncError> {
        let mut report = RunReport::new();
        let driven = self.drive(sink, &mut report).await;
        let finished = sink.finish().await;

        if let Err(e) = driven {
            if let Err(finish_err) = finished {
                warn!("Failed to close output after abort: {}", finish_err);
            }
            error!(
                run_id = %report.run_id,
                batches = report.batches,
                emitted = report.emitted,
                "Price sync aborted: {}",
                e
            );
            return Err(e);
        }
        finished?;
        report.finished_at = Some(Utc::now());

        info!(
            run_id = %report.run_id,
            batches = report.batches,
            processed = report.processed,
            succeeded = report.succeeded,
            failed = report.failed,
            emitted = report.emitted,
            updated = report.updated,
            deleted = report.deleted,
            "Price sync finished"
        );
        for (reason, count) in &report.failures_by_reason {
            info!(reason = %reason, count, "Failures by reason");
        }

        Ok(report)
    }

    /// 逐页推进状态机直到目录遍历完毕
    async fn drive(
        &self,
        sink: &mut dyn RecordSink,
        report: &mut RunReport,
    ) -> Result<(), SyncError> {
        let mut offset: u64 = 0;
        let mut stats = BatchStats::default();
        let mut state = PipelineState::Init;

        loop {
            state = match state {
                PipelineState::Init => {
                    info!(
                        run_id = %report.run_id,
                        page_size = self.page_size,
                        workers = self.pool.size(),
                        "Starting price sync"
                    );
                    PipelineState::FetchPage
                }
                PipelineState::FetchPage => {
                    let page = self.repository.list_page(offset, self.page_size).await?;
                    if page.is_empty() {
                        PipelineState::Done
                    } else {
                        stats = BatchStats {
                            batch: report.batches + 1,
                            ..BatchStats::default()
                        };
                        debug!(batch = stats.batch, offset, entries = page.len(), "Fetched page");
                        PipelineState::Dispatch(page)
                    }
                }
                PipelineState::Dispatch(page) => {
                    let outcomes = self.pool.process_batch(&page).await;
                    PipelineState::Collect {
                        page_len: page.len(),
                        outcomes,
                    }
                }
                PipelineState::Collect { page_len, outcomes } => {
                    stats.processed += outcomes.len() as u64;
                    counter!("pricesync_entries_processed_total")
                        .increment(outcomes.len() as u64);
                    PipelineState::Reconcile { page_len, outcomes }
                }
                PipelineState::Reconcile { page_len, outcomes } => {
                    let deleted = self.reconcile(outcomes, sink, &mut stats, report).await?;
                    PipelineState::AdvanceOffset { page_len, deleted }
                }
                PipelineState::AdvanceOffset { page_len, deleted } => {
                    // Deleted entries shift later rows down into this window
                    offset += (page_len - deleted) as u64;
                    report.absorb(&stats);
                    info!(
                        batch = stats.batch,
                        processed = stats.processed,
                        succeeded = stats.succeeded,
                        failed = stats.failed,
                        emitted = stats.emitted,
                        deleted = stats.deleted,
                        total_processed = report.processed,
                        total_succeeded = report.succeeded,
                        total_failed = report.failed,
                        "Batch complete"
                    );
                    PipelineState::FetchPage
                }
                PipelineState::Done => break,
            };
        }

        Ok(())
    }

    /// 对一个批次的结果对账，返回成功删除的条目数
    #[instrument(skip_all, fields(batch = stats.batch))]
    async fn reconcile(
        &self,
        outcomes: Vec<ScrapeOutcome>,
        sink: &mut dyn RecordSink,
        stats: &mut BatchStats,
        report: &mut RunReport,
    ) -> Result<usize, SyncError> {
        let mut deleted = 0;

        for outcome in outcomes {
            let id = outcome.product_id;

            if outcome.is_persistable() {
                let (Some(record), Some(price)) = (outcome.data.as_ref(), outcome.numeric_price)
                else {
                    continue;
                };
                sink.append(record).await?;
                stats.emitted += 1;
                counter!("pricesync_records_emitted_total").increment(1);

                match self.repository.update_price(id, price).await {
                    Ok(()) => {
                        stats.updated += 1;
                        stats.succeeded += 1;
                        counter!("pricesync_entries_succeeded_total").increment(1);
                    }
                    Err(e) => {
                        warn!(entry_id = id, "Price update failed, removing entry: {}", e);
                        stats.failed += 1;
                        Self::count_failure(report, PERSISTENCE_FAILURE);
                        if self.delete_entry(id, PERSISTENCE_FAILURE, stats).await {
                            deleted += 1;
                        }
                    }
                }
                continue;
            }

            let reason = outcome
                .error
                .as_ref()
                .map(|e| e.kind())
                .unwrap_or("non_positive_price");
            stats.failed += 1;
            Self::count_failure(report, reason);

            if outcome.error.as_ref().is_some_and(|e| !e.deletes_entry()) {
                warn!(entry_id = id, reason, "Entry kept after failure");
                continue;
            }
            if self.delete_entry(id, reason, stats).await {
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    fn count_failure(report: &mut RunReport, reason: &str) {
        *report
            .failures_by_reason
            .entry(reason.to_string())
            .or_insert(0) += 1;
        counter!("pricesync_entries_failed_total", "reason" => reason.to_string()).increment(1);
    }

    async fn delete_entry(&self, id: i64, reason: &str, stats: &mut BatchStats) -> bool {
        match self.repository.delete(id).await {
            Ok(()) => {
                warn!(entry_id = id, reason, "Deleted catalog entry");
                stats.deleted += 1;
                counter!("pricesync_entries_deleted_total").increment(1);
                true
            }
            Err(e) => {
                warn!(entry_id = id, reason, "Failed to delete catalog entry: {}", e);
                false
            }
        }
    }
}
