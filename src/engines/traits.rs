// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// 获取失败
///
/// 一次页面获取可能出现的全部失败类型。只有网络错误和超时可以重试，
/// 其余失败说明页面本身已不可用。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// HTTP 404
    #[error("Product page not found: {url}")]
    NotFound { url: String },
    /// HTTP 403
    #[error("Access forbidden: {url}")]
    Forbidden { url: String },
    /// HTTP 429
    #[error("Rate limited: {url}")]
    RateLimited { url: String },
    /// HTTP 500
    #[error("Server error: {url}")]
    ServerError { url: String },
    /// 200 响应但内容是拦截页
    #[error("Blocked content ({marker}) at {url}")]
    BlockedContent { url: String, marker: String },
    /// 其他非 200 状态码
    #[error("HTTP error {status} at {url}")]
    HttpError { url: String, status: u16 },
    /// 传输层错误，包括浏览器启动或导航失败
    #[error("Network error at {url}: {message}")]
    NetworkError { url: String, message: String },
    /// 请求或导航超时
    #[error("Timed out fetching {url}")]
    Timeout { url: String },
}

impl FetchFailure {
    /// 判断错误是否可重试
    ///
    /// # 返回值
    ///
    /// 仅网络错误和超时返回true
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchFailure::NetworkError { .. } | FetchFailure::Timeout { .. }
        )
    }

    /// 失败类型的稳定名称
    pub fn kind(&self) -> &'static str {
        match self {
            FetchFailure::NotFound { .. } => "not_found",
            FetchFailure::Forbidden { .. } => "forbidden",
            FetchFailure::RateLimited { .. } => "rate_limited",
            FetchFailure::ServerError { .. } => "server_error",
            FetchFailure::BlockedContent { .. } => "blocked_content",
            FetchFailure::HttpError { .. } => "http_error",
            FetchFailure::NetworkError { .. } => "network_error",
            FetchFailure::Timeout { .. } => "timeout",
        }
    }

    /// 将非 200 状态码映射为失败类型
    ///
    /// 200 不属于失败，返回None
    pub fn from_status(url: &str, status: u16) -> Option<Self> {
        let url = url.to_string();
        match status {
            200 => None,
            404 => Some(FetchFailure::NotFound { url }),
            403 => Some(FetchFailure::Forbidden { url }),
            429 => Some(FetchFailure::RateLimited { url }),
            500 => Some(FetchFailure::ServerError { url }),
            status => Some(FetchFailure::HttpError { url, status }),
        }
    }
}

/// 获取请求
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// 目标URL
    pub url: String,
    /// 额外请求头
    pub headers: HashMap<String, String>,
    /// 超时时间
    pub timeout: Duration,
    /// 是否需要JavaScript渲染
    pub needs_js: bool,
}

impl FetchRequest {
    /// 创建获取请求
    pub fn new(url: impl Into<String>, needs_js: bool, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            timeout,
            needs_js,
        }
    }
}

/// 获取响应
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// 最终URL
    pub url: String,
    /// HTTP状态码
    pub status_code: u16,
    /// 页面HTML
    pub content: String,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}

/// 抓取引擎特质
#[async_trait]
pub trait ScraperEngine: Send + Sync {
    /// 获取页面，返回成功的 200 响应或失败类型
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchFailure>;

    /// 计算对请求的支持分数（0-100）
    fn support_score(&self, request: &FetchRequest) -> u8;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
