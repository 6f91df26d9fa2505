// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{FetchFailure, FetchRequest, FetchResponse, ScraperEngine};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{
    EventLifecycleEvent, SetLifecycleEventsEnabledParams,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// 生命周期事件名
const LIFECYCLE_INIT: &str = "init";
const LIFECYCLE_NETWORK_IDLE: &str = "networkIdle";

/// 跟踪主框架一次导航的生命周期
///
/// 主框架的 `init` 事件确定本次导航的 loader，同一 loader 的 `networkIdle`
/// 表示页面加载完成且网络空闲。其它框架和旧 loader 的事件被忽略。
struct IdleTracker<F, L> {
    main_frame: Option<F>,
    loader: Option<L>,
}

impl<F: PartialEq, L: PartialEq + Clone> IdleTracker<F, L> {
    fn new(main_frame: Option<F>) -> Self {
        Self {
            main_frame,
            loader: None,
        }
    }

    /// 处理一个事件，返回本次导航是否已经网络空闲
    fn observe(&mut self, frame: &F, loader: &L, name: &str) -> bool {
        if self.main_frame.as_ref().is_some_and(|id| id != frame) {
            return false;
        }
        match name {
            LIFECYCLE_INIT => {
                self.loader = Some(loader.clone());
                false
            }
            LIFECYCLE_NETWORK_IDLE => self.loader.as_ref() == Some(loader),
            _ => false,
        }
    }
}

/// 浏览器会话
///
/// 一次渲染独占的无头浏览器实例及其临时用户目录。
/// 必须通过 [`BrowserSession::close`] 释放；如果会话在未关闭的情况下被丢弃，
/// Drop 会中止事件循环并同步清理用户目录。
struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    profile_dir: PathBuf,
    closed: bool,
}

impl BrowserSession {
    async fn launch(
        url: &str,
        executable: Option<&str>,
        request_timeout: Duration,
    ) -> Result<Self, FetchFailure> {
        let profile_dir =
            std::env::temp_dir().join(format!("pricesync-browser-{}", Uuid::new_v4()));

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(request_timeout)
            .user_data_dir(&profile_dir)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        if let Some(path) = executable {
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(|message| FetchFailure::NetworkError {
            url: url.to_string(),
            message,
        })?;

        let (browser, mut handler) = match Browser::launch(config).await {
            Ok(pair) => pair,
            Err(e) => {
                let _ = tokio::fs::remove_dir_all(&profile_dir).await;
                return Err(FetchFailure::NetworkError {
                    url: url.to_string(),
                    message: format!("browser launch failed: {}", e),
                });
            }
        };

        // Drive CDP events until the connection closes
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            profile_dir,
            closed: false,
        })
    }

    async fn render(
        &self,
        url: &str,
        user_agent: &str,
    ) -> Result<String, chromiumoxide::error::CdpError> {
        let page: Page = self.browser.new_page("about:blank").await?;
        page.set_user_agent(user_agent).await?;
        page.execute(SetLifecycleEventsEnabledParams::new(true)).await?;

        // Subscribe before navigating so no lifecycle event is missed
        let mut lifecycle = page.event_listener::<EventLifecycleEvent>().await?;
        let main_frame = page.mainframe().await?;

        page.goto(url).await?;

        let mut tracker = IdleTracker::new(main_frame);
        while let Some(event) = lifecycle.next().await {
            if tracker.observe(&event.frame_id, &event.loader_id, &event.name) {
                debug!(url, "Network idle");
                break;
            }
        }

        page.content().await
    }

    async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            debug!("Browser close command failed: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Waiting for browser exit failed: {}", e);
        }
        self.handler.abort();
        if let Err(e) = tokio::fs::remove_dir_all(&self.profile_dir).await {
            debug!(dir = %self.profile_dir.display(), "Profile cleanup failed: {}", e);
        }
        self.closed = true;
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if !self.closed {
            self.handler.abort();
            let _ = std::fs::remove_dir_all(&self.profile_dir);
        }
    }
}

/// 渲染抓取引擎
///
/// 基于chromiumoxide实现。每次获取都会启动一个隔离的无头浏览器，
/// 设置用户代理后导航到目标页面并等待网络空闲，再获取渲染后的HTML。
/// 浏览器在任何退出路径上都会被关闭。
pub struct BrowserEngine {
    user_agent: String,
    navigation_timeout: Duration,
    executable: Option<String>,
}

impl BrowserEngine {
    /// 创建渲染抓取引擎
    ///
    /// # 参数
    ///
    /// * `user_agent` - 用户代理
    /// * `navigation_timeout` - 导航超时
    /// * `executable` - 可选的 Chromium 可执行文件路径，缺省时自动探测
    pub fn new(
        user_agent: impl Into<String>,
        navigation_timeout: Duration,
        executable: Option<String>,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            navigation_timeout,
            executable,
        }
    }
}

#[async_trait]
impl ScraperEngine for BrowserEngine {
    /// 执行浏览器渲染抓取
    ///
    /// # 参数
    ///
    /// * `request` - 获取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 渲染后的页面
    /// * `Err(FetchFailure)` - 启动失败、导航失败或超时
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchFailure> {
        let start = Instant::now();
        let timeout = request.timeout.min(self.navigation_timeout);

        let session =
            BrowserSession::launch(&request.url, self.executable.as_deref(), timeout).await?;

        let rendered =
            tokio::time::timeout(timeout, session.render(&request.url, &self.user_agent)).await;

        session.close().await;

        let content = match rendered {
            Ok(Ok(content)) => content,
            Ok(Err(e)) => {
                warn!(url = %request.url, "Navigation failed: {}", e);
                return Err(FetchFailure::NetworkError {
                    url: request.url.clone(),
                    message: e.to_string(),
                });
            }
            Err(_) => {
                return Err(FetchFailure::Timeout {
                    url: request.url.clone(),
                })
            }
        };

        debug!(url = %request.url, bytes = content.len(), "Rendered fetch succeeded");

        Ok(FetchResponse {
            url: request.url.clone(),
            status_code: 200,
            content,
            response_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// 计算对请求的支持分数
    ///
    /// 需要JS渲染的请求返回100分
    fn support_score(&self, request: &FetchRequest) -> u8 {
        if request.needs_js {
            return 100;
        }
        10
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}
