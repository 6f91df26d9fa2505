// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::reqwest_engine::DEFAULT_USER_AGENT;
use crate::engines::validators::default_blocking_markers;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;
use validator::Validate;

/// 应用程序配置设置
///
/// 包含数据库、抓取、流水线、指标和日志配置
#[derive(Debug, Deserialize, Validate)]
pub struct Settings {
    /// 数据库配置
    #[validate(nested)]
    pub database: DatabaseSettings,
    /// 抓取配置
    #[validate(nested)]
    pub scraper: ScraperSettings,
    /// 流水线配置
    #[validate(nested)]
    pub pipeline: PipelineSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
    /// 日志配置
    pub telemetry: TelemetrySettings,
}

/// 数据库配置设置
#[derive(Debug, Deserialize, Validate)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    #[validate(length(min = 1, message = "database.url cannot be empty"))]
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
    /// 启动时创建缺失的目录表
    #[serde(default)]
    pub ensure_schema: bool,
}

/// 抓取配置设置
#[derive(Debug, Deserialize, Validate)]
pub struct ScraperSettings {
    /// 站点规则文件路径
    pub rules_path: String,
    /// 浏览器用户代理
    pub user_agent: String,
    /// 静态请求超时（秒）
    #[validate(range(min = 1, max = 600))]
    pub request_timeout_secs: u64,
    /// 最大尝试次数
    #[validate(range(min = 1, max = 10))]
    pub max_attempts: u32,
    /// 退避基数（秒）
    pub backoff_base_secs: u64,
    /// 最大抖动（毫秒）
    pub max_jitter_ms: u64,
    /// 浏览器导航超时（秒）
    #[validate(range(min = 1, max = 600))]
    pub navigation_timeout_secs: u64,
    /// Chromium 可执行文件路径
    pub browser_executable: Option<String>,
    /// 拦截页标记
    #[serde(default = "default_blocking_markers")]
    pub blocking_markers: Vec<String>,
}

impl ScraperSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

/// 流水线配置设置
#[derive(Debug, Deserialize, Validate)]
pub struct PipelineSettings {
    /// 每批条目数
    #[validate(range(min = 1, max = 1000))]
    pub page_size: u64,
    /// 工作器数量，缺省为可用并行度减一
    #[validate(range(min = 1, max = 256))]
    pub workers: Option<usize>,
    /// 输出文件路径
    #[validate(length(min = 1))]
    pub output_path: String,
}

/// 指标配置设置
#[derive(Debug, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出监听地址
    pub listen_addr: String,
}

/// 日志配置设置
#[derive(Debug, Deserialize)]
pub struct TelemetrySettings {
    /// 是否输出JSON格式日志
    pub json: bool,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和 `PRICESYNC__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("PRICESYNC").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 只包含默认值的配置构建器
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            // Default DB pool settings
            .set_default("database.url", "sqlite://pricesync.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            .set_default("database.ensure_schema", false)?
            // Default scraper settings
            .set_default("scraper.rules_path", "config/product_identifiers.json")?
            .set_default("scraper.user_agent", DEFAULT_USER_AGENT)?
            .set_default("scraper.request_timeout_secs", 30)?
            .set_default("scraper.max_attempts", 3)?
            .set_default("scraper.backoff_base_secs", 1)?
            .set_default("scraper.max_jitter_ms", 1000)?
            .set_default("scraper.navigation_timeout_secs", 30)?
            // Default pipeline settings
            .set_default("pipeline.page_size", 100)?
            .set_default("pipeline.output_path", "data.json")?
            // Default observability settings
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")?
            .set_default("telemetry.json", false)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
