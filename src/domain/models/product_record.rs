// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::catalog_entry::Country;
use serde::{Deserialize, Serialize};

/// 输出记录中的国家信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCountry {
    pub country_id: String,
    pub country_name: String,
    pub country_code: String,
    pub currency: String,
    pub currency_symbol: String,
    pub mobile_code: String,
}

impl From<&Country> for ProductCountry {
    fn from(country: &Country) -> Self {
        Self {
            country_id: country.id.to_string(),
            country_name: country.name.clone(),
            country_code: country.code.clone(),
            currency: country.currency.clone(),
            currency_symbol: country.currency_symbol.clone(),
            mobile_code: country.mobile_code.clone(),
        }
    }
}

/// 商品记录
///
/// 一次成功抓取产生的结构化商品数据，按顺序写入输出文件。
/// `product_price` 的格式为 `"<货币符号> <数值文本>"`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub site_name: String,
    pub product_url: String,
    pub product_id: String,
    pub product_name: String,
    pub product_unique_id: String,
    pub product_description: String,
    pub product_country: ProductCountry,
    pub product_price: String,
    pub product_images: Vec<String>,
    pub product_brand_name: String,
    pub product_category: String,
    pub product_subcategory: String,
    pub website_logo: String,
}
