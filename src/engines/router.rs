// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{FetchFailure, FetchRequest, FetchResponse, ScraperEngine};
use crate::utils::retry_policy::RetryPolicy;
use metrics::counter;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// 引擎性能统计
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    /// 尝试次数
    pub attempts: u64,
    /// 成功次数
    pub successes: u64,
    /// 平均响应时间
    pub avg_response_time: Duration,
}

impl EngineStats {
    /// 成功率 (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 1.0;
        }
        self.successes as f64 / self.attempts as f64
    }
}

/// 引擎路由器
///
/// 按支持分数为请求选择引擎（静态或渲染），并在该引擎上执行有界重试。
/// 只有 [`FetchFailure::is_retryable`] 为真的失败才会重试，其余失败立即返回。
pub struct EngineRouter {
    /// 引擎列表
    engines: Vec<Arc<dyn ScraperEngine>>,
    /// 重试策略
    retry_policy: RetryPolicy,
    /// 引擎性能统计
    engine_stats: RwLock<HashMap<&'static str, EngineStats>>,
}

impl EngineRouter {
    /// 创建新的引擎路由器
    ///
    /// # 参数
    ///
    /// * `engines` - 引擎列表
    /// * `retry_policy` - 重试策略
    ///
    /// # 返回值
    ///
    /// 返回新的引擎路由器实例
    pub fn new(engines: Vec<Arc<dyn ScraperEngine>>, retry_policy: RetryPolicy) -> Self {
        let engine_stats = engines
            .iter()
            .map(|e| (e.name(), EngineStats::default()))
            .collect();

        Self {
            engines,
            retry_policy,
            engine_stats: RwLock::new(engine_stats),
        }
    }

    /// 选择支持分数最高的引擎，分数相同时取先注册的
    fn select_engine(&self, request: &FetchRequest) -> Option<Arc<dyn ScraperEngine>> {
        let mut best: Option<(u8, &Arc<dyn ScraperEngine>)> = None;
        for engine in &self.engines {
            let score = engine.support_score(request);
            if score == 0 {
                continue;
            }
            match best {
                Some((current, _)) if current >= score => {}
                _ => best = Some((score, engine)),
            }
        }
        best.map(|(_, engine)| engine.clone())
    }

    fn update_engine_stats(&self, engine_name: &'static str, success: bool, elapsed: Duration) {
        let mut stats = self.engine_stats.write();
        let stat = stats.entry(engine_name).or_default();
        stat.attempts += 1;
        if success {
            stat.successes += 1;
        }
        // Running mean over all attempts
        let n = stat.attempts as u32;
        stat.avg_response_time = (stat.avg_response_time * (n - 1) + elapsed) / n;
    }

    /// 获取引擎统计快照
    pub fn stats(&self) -> HashMap<&'static str, EngineStats> {
        self.engine_stats.read().clone()
    }

    /// 获取页面
    ///
    /// # 参数
    ///
    /// * `request` - 获取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 获取成功
    /// * `Err(FetchFailure)` - 终止性失败，或重试次数耗尽后的最后一次失败
    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchFailure> {
        let engine = self
            .select_engine(request)
            .ok_or_else(|| FetchFailure::NetworkError {
                url: request.url.clone(),
                message: "no engine available for request".to_string(),
            })?;
        let engine_name = engine.name();

        let mut attempt = 1;
        loop {
            counter!("pricesync_fetch_attempts_total", "engine" => engine_name).increment(1);
            debug!(url = %request.url, engine = engine_name, attempt, "Fetching page");

            let started = Instant::now();
            let result = engine.fetch(request).await;
            self.update_engine_stats(engine_name, result.is_ok(), started.elapsed());

            match result {
                Ok(response) => return Ok(response),
                Err(failure)
                    if failure.is_retryable() && self.retry_policy.should_retry(attempt) =>
                {
                    let delay = self.retry_policy.calculate_backoff(attempt);
                    warn!(
                        url = %request.url,
                        engine = engine_name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Fetch attempt failed, retrying: {}",
                        failure
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(failure) => {
                    warn!(
                        url = %request.url,
                        engine = engine_name,
                        attempt,
                        "Fetch failed: {}",
                        failure
                    );
                    return Err(failure);
                }
            }
        }
    }
}
