// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::catalog_entry::CatalogEntry;
use crate::domain::models::scrape_outcome::{ScrapeFailure, ScrapeOutcome};
use crate::workers::worker::ProductScraper;
use futures::future::join_all;
use metrics::gauge;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// 发给工作器的请求：一个条目和一次性应答通道
type Job = (CatalogEntry, oneshot::Sender<ScrapeOutcome>);

/// 默认工作器数量：可用并行度减一，至少为一
pub fn default_pool_size() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// 存活工作器计数，工作器任务退出（包括panic）时自动减一
struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        let live = counter.fetch_add(1, Ordering::SeqCst) + 1;
        gauge!("pricesync_live_workers").set(live as f64);
        Self(counter)
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        let live = self.0.fetch_sub(1, Ordering::SeqCst) - 1;
        gauge!("pricesync_live_workers").set(live as f64);
    }
}

/// 工作池
///
/// 每个批次启动 N 个工作器任务，把批次切成 N 个连续分片，分片 i 交给工作器 i mod N。
/// 每个工作器同一时间只处理一个条目：派发方等到上一个条目的应答后才发送下一个。
/// 批次结束后无论成功与否都会关闭并回收全部工作器。
pub struct WorkerPool<S: ProductScraper> {
    scraper: Arc<S>,
    size: usize,
    live_workers: Arc<AtomicUsize>,
}

impl<S: ProductScraper> WorkerPool<S> {
    /// 创建工作池
    ///
    /// # 参数
    ///
    /// * `scraper` - 每个工作器共享的抓取器
    /// * `size` - 工作器数量，None 时使用 [`default_pool_size`]
    pub fn new(scraper: Arc<S>, size: Option<usize>) -> Self {
        Self {
            scraper,
            size: size.unwrap_or_else(default_pool_size).max(1),
            live_workers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 工作器数量
    pub fn size(&self) -> usize {
        self.size
    }

    /// 当前存活的工作器数量
    pub fn live_workers(&self) -> usize {
        self.live_workers.load(Ordering::SeqCst)
    }

    fn spawn_worker(&self, index: usize) -> (mpsc::Sender<Job>, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Job>(1);
        let scraper = self.scraper.clone();
        let guard = LiveGuard::new(self.live_workers.clone());

        let handle = tokio::spawn(async move {
            let _guard = guard;
            while let Some((entry, reply)) = rx.recv().await {
                let outcome = scraper.scrape(&entry).await;
                if reply.send(outcome).is_err() {
                    debug!(worker = index, "Dispatcher dropped before reply");
                }
            }
        });

        (tx, handle)
    }

    /// 把条目逐个派发给同一个工作器，等待每个应答后再发送下一个
    async fn dispatch_chunk(
        sender: mpsc::Sender<Job>,
        chunk: Vec<CatalogEntry>,
    ) -> Vec<ScrapeOutcome> {
        let mut outcomes = Vec::with_capacity(chunk.len());
        for entry in chunk {
            let id = entry.id;
            let (reply_tx, reply_rx) = oneshot::channel();
            if sender.send((entry, reply_tx)).await.is_err() {
                outcomes.push(ScrapeOutcome::failed(id, ScrapeFailure::WorkerLost));
                continue;
            }
            match reply_rx.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(_) => outcomes.push(ScrapeOutcome::failed(id, ScrapeFailure::WorkerLost)),
            }
        }
        outcomes
    }

    /// 处理一个批次
    ///
    /// # 参数
    ///
    /// * `entries` - 批次条目
    ///
    /// # 返回值
    ///
    /// 与输入顺序一致的抓取结果，每个条目恰好一个
    pub async fn process_batch(&self, entries: &[CatalogEntry]) -> Vec<ScrapeOutcome> {
        if entries.is_empty() {
            return Vec::new();
        }

        let (senders, handles): (Vec<_>, Vec<_>) =
            (0..self.size).map(|i| self.spawn_worker(i)).unzip();
        debug!(workers = self.size, entries = entries.len(), "Workers started for batch");

        let chunk_size = entries.len().div_ceil(self.size);
        let dispatchers = entries
            .chunks(chunk_size)
            .enumerate()
            .map(|(i, chunk)| Self::dispatch_chunk(senders[i % self.size].clone(), chunk.to_vec()));
        let outcomes: Vec<ScrapeOutcome> = join_all(dispatchers)
            .await
            .into_iter()
            .flatten()
            .collect();

        // Closing the channels ends every worker loop
        drop(senders);
        for (i, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                error!(worker = i, "Worker terminated abnormally: {}", e);
            }
        }
        info!(
            outcomes = outcomes.len(),
            live_workers = self.live_workers(),
            "Batch workers terminated"
        );

        outcomes
    }
}
