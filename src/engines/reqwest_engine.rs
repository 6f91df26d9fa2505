// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{FetchFailure, FetchRequest, FetchResponse, ScraperEngine};
use crate::engines::validators;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION};
use std::time::Instant;
use tracing::debug;

/// 默认的浏览器用户代理
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 静态抓取引擎
///
/// 基于reqwest实现的HTTP抓取引擎，使用浏览器风格的请求头。
/// 所有请求共享同一个客户端连接池。
pub struct ReqwestEngine {
    client: reqwest::Client,
    blocking_markers: Vec<String>,
}

impl ReqwestEngine {
    /// 创建静态抓取引擎
    ///
    /// # 参数
    ///
    /// * `user_agent` - 用户代理
    /// * `blocking_markers` - 拦截页标记
    ///
    /// # 返回值
    ///
    /// * `Ok(ReqwestEngine)` - 引擎实例
    /// * `Err(reqwest::Error)` - 客户端构建失败
    pub fn new(user_agent: &str, blocking_markers: Vec<String>) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            blocking_markers,
        })
    }

    fn map_transport_error(url: &str, error: reqwest::Error) -> FetchFailure {
        if error.is_timeout() {
            FetchFailure::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchFailure::NetworkError {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl ScraperEngine for ReqwestEngine {
    /// 执行HTTP抓取
    ///
    /// # 参数
    ///
    /// * `request` - 获取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 200 响应且不是拦截页
    /// * `Err(FetchFailure)` - 状态码、拦截页或传输层失败
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchFailure> {
        let mut headers = HeaderMap::new();
        for (k, v) in &request.headers {
            if let (Ok(k), Ok(v)) = (
                HeaderName::from_bytes(k.as_bytes()),
                HeaderValue::from_str(v),
            ) {
                headers.insert(k, v);
            }
        }

        let start = Instant::now();
        let response = self
            .client
            .get(&request.url)
            .headers(headers)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| Self::map_transport_error(&request.url, e))?;

        let status_code = response.status().as_u16();
        if let Some(failure) = FetchFailure::from_status(&request.url, status_code) {
            return Err(failure);
        }

        let final_url = response.url().to_string();
        let content = response
            .text()
            .await
            .map_err(|e| Self::map_transport_error(&request.url, e))?;

        if let Some(marker) = validators::detect_blocking(&content, &self.blocking_markers) {
            return Err(FetchFailure::BlockedContent {
                url: request.url.clone(),
                marker: marker.to_string(),
            });
        }

        debug!(url = %request.url, bytes = content.len(), "Static fetch succeeded");

        Ok(FetchResponse {
            url: final_url,
            status_code,
            content,
            response_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// 计算对请求的支持分数
    ///
    /// 不需要JS渲染的请求返回100分
    fn support_score(&self, request: &FetchRequest) -> u8 {
        if request.needs_js {
            return 10;
        }
        100
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
