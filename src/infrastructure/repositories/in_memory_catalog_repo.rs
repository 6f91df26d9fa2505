// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::catalog_entry::CatalogEntry;
use crate::domain::repositories::catalog_repository::{CatalogRepository, RepositoryError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};

/// 内存目录仓库
///
/// 按ID有序保存条目，可以为指定条目注入价格更新失败，便于测试对账逻辑
#[derive(Default)]
pub struct InMemoryCatalogRepository {
    entries: RwLock<BTreeMap<i64, CatalogEntry>>,
    failing_updates: RwLock<HashSet<i64>>,
    deleted: RwLock<Vec<i64>>,
}

impl InMemoryCatalogRepository {
    /// 用初始条目创建仓库
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let repo = Self::default();
        {
            let mut map = repo.entries.write();
            for entry in entries {
                map.insert(entry.id, entry);
            }
        }
        repo
    }

    /// 让指定条目的价格更新失败
    pub fn fail_updates_for(&self, id: i64) {
        self.failing_updates.write().insert(id);
    }

    /// 按ID查找条目
    pub fn get(&self, id: i64) -> Option<CatalogEntry> {
        self.entries.read().get(&id).cloned()
    }

    /// 当前条目数
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// 按调用顺序记录的已删除条目ID
    pub fn deleted_ids(&self) -> Vec<i64> {
        self.deleted.read().clone()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn list_page(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<CatalogEntry>, RepositoryError> {
        Ok(self
            .entries
            .read()
            .values()
            .filter(|e| !e.url.is_empty())
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn update_price(&self, id: i64, price: f64) -> Result<(), RepositoryError> {
        if self.failing_updates.read().contains(&id) {
            return Err(RepositoryError::Backend(format!(
                "update rejected for entry {}",
                id
            )));
        }
        let mut entries = self.entries.write();
        let entry = entries.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        entry.price = price;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        self.entries
            .write()
            .remove(&id)
            .ok_or(RepositoryError::NotFound(id))?;
        self.deleted.write().push(id);
        Ok(())
    }
}
