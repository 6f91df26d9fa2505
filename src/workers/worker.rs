// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::catalog_entry::CatalogEntry;
use crate::domain::models::scrape_outcome::ScrapeOutcome;
use async_trait::async_trait;

/// 商品抓取器特质
///
/// 工作池中的每个工作器都通过此trait处理单个目录条目。
/// 实现不得访问目录存储，所有失败都体现在返回的结果中。
#[async_trait]
pub trait ProductScraper: Send + Sync + 'static {
    /// 抓取一个目录条目
    async fn scrape(&self, entry: &CatalogEntry) -> ScrapeOutcome;

    /// 获取抓取器名称
    fn name(&self) -> &str;
}
