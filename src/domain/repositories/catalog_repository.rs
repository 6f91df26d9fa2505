// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::catalog_entry::CatalogEntry;
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Catalog entry {0} not found")]
    NotFound(i64),
    /// 存储后端错误
    #[error("Store error: {0}")]
    Backend(String),
}

/// 目录仓库特质
///
/// 定义目录存储访问接口。只有流水线控制器会调用写操作。
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// 分页列出URL非空的条目，按ID升序，包含国家、品牌和分类
    async fn list_page(&self, offset: u64, limit: u64)
        -> Result<Vec<CatalogEntry>, RepositoryError>;
    /// 更新条目价格
    async fn update_price(&self, id: i64, price: f64) -> Result<(), RepositoryError>;
    /// 删除条目
    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;
}
