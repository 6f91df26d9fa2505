// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 国家信息
///
/// 每个目录条目都属于一个国家，国家决定了价格缺少货币符号时使用的默认符号
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    pub name: String,
    /// ISO 国家代码
    pub code: String,
    /// 货币代码，例如 EUR
    pub currency: String,
    /// 货币符号，例如 €
    pub currency_symbol: String,
    pub mobile_code: String,
}

/// 品牌
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: i64,
    pub name: String,
}

/// 分类
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// 目录条目
///
/// 目录中的一个商品，引用一个第三方商品页面。条目由目录存储独占拥有，
/// 价格同步流水线只读取条目并发出更新价格或删除的命令。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    /// 来源商品页面
    pub url: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// 跨国家匹配同一商品的稳定标识
    pub sku: Option<String>,
    pub images: Vec<String>,
    pub country: Country,
    pub brand: Option<Brand>,
    pub category: Option<Category>,
}

impl CatalogEntry {
    /// 品牌名称，没有品牌时返回空字符串
    pub fn brand_name(&self) -> &str {
        self.brand.as_ref().map(|b| b.name.as_str()).unwrap_or("")
    }

    /// 分类名称，没有分类时返回空字符串
    pub fn category_name(&self) -> &str {
        self.category.as_ref().map(|c| c.name.as_str()).unwrap_or("")
    }
}
