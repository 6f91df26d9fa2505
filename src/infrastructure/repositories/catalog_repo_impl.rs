// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::catalog_entry::{Brand, CatalogEntry, Category, Country};
use crate::domain::repositories::catalog_repository::{CatalogRepository, RepositoryError};
use crate::infrastructure::database::entities::{brand, category, country, product};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::*;
use std::collections::HashMap;
use std::sync::Arc;

/// 目录仓库实现
pub struct CatalogRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl CatalogRepositoryImpl {
    /// 创建新的目录仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn load_countries(&self, ids: Vec<i64>) -> Result<HashMap<i64, Country>, DbErr> {
        let rows = country::Entity::find()
            .filter(country::Column::Id.is_in(ids))
            .all(self.db.as_ref())
            .await?;
        Ok(rows
            .into_iter()
            .map(|c| {
                (
                    c.id,
                    Country {
                        id: c.id,
                        name: c.name,
                        code: c.code,
                        currency: c.currency,
                        currency_symbol: c.currency_symbol,
                        mobile_code: c.mobile_code,
                    },
                )
            })
            .collect())
    }

    async fn load_brands(&self, ids: Vec<i64>) -> Result<HashMap<i64, Brand>, DbErr> {
        let rows = brand::Entity::find()
            .filter(brand::Column::Id.is_in(ids))
            .all(self.db.as_ref())
            .await?;
        Ok(rows
            .into_iter()
            .map(|b| (b.id, Brand { id: b.id, name: b.name }))
            .collect())
    }

    async fn load_categories(&self, ids: Vec<i64>) -> Result<HashMap<i64, Category>, DbErr> {
        let rows = category::Entity::find()
            .filter(category::Column::Id.is_in(ids))
            .all(self.db.as_ref())
            .await?;
        Ok(rows
            .into_iter()
            .map(|c| (c.id, Category { id: c.id, name: c.name }))
            .collect())
    }
}

#[async_trait]
impl CatalogRepository for CatalogRepositoryImpl {
    async fn list_page(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<CatalogEntry>, RepositoryError> {
        // Rows without a country cannot be priced, so they are excluded in SQL
        // to keep offsets stable between pages
        let products = product::Entity::find()
            .filter(product::Column::Url.ne(""))
            .filter(
                product::Column::CountryId.in_subquery(
                    Query::select()
                        .column(country::Column::Id)
                        .from(country::Entity)
                        .to_owned(),
                ),
            )
            .order_by_asc(product::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        if products.is_empty() {
            return Ok(Vec::new());
        }

        let countries = self
            .load_countries(products.iter().map(|p| p.country_id).collect())
            .await?;
        let brands = self
            .load_brands(products.iter().filter_map(|p| p.brand_id).collect())
            .await?;
        let categories = self
            .load_categories(products.iter().filter_map(|p| p.category_id).collect())
            .await?;

        let mut entries = Vec::with_capacity(products.len());
        for p in products {
            let country = countries.get(&p.country_id).cloned().ok_or_else(|| {
                RepositoryError::Backend(format!(
                    "country {} vanished for product {}",
                    p.country_id, p.id
                ))
            })?;
            entries.push(CatalogEntry {
                id: p.id,
                url: p.url,
                name: p.name,
                description: p.description,
                price: p.price,
                sku: p.sku,
                images: serde_json::from_value(p.images).unwrap_or_default(),
                country,
                brand: p.brand_id.and_then(|id| brands.get(&id).cloned()),
                category: p.category_id.and_then(|id| categories.get(&id).cloned()),
            });
        }

        Ok(entries)
    }

    async fn update_price(&self, id: i64, price: f64) -> Result<(), RepositoryError> {
        let result = product::Entity::update_many()
            .col_expr(product::Column::Price, Expr::value(price))
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let result = product::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }
}
