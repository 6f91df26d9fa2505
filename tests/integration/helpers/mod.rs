// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use parking_lot::Mutex;
use pricesync::domain::models::catalog_entry::{CatalogEntry, Country};
use pricesync::domain::models::product_record::{ProductCountry, ProductRecord};
use pricesync::domain::models::scrape_outcome::{ScrapeFailure, ScrapeOutcome};
use pricesync::workers::worker::ProductScraper;
use std::collections::HashMap;

pub fn india() -> Country {
    Country {
        id: 1,
        name: "India".to_string(),
        code: "IN".to_string(),
        currency: "INR".to_string(),
        currency_symbol: "₹".to_string(),
        mobile_code: "+91".to_string(),
    }
}

pub fn entry(id: i64) -> CatalogEntry {
    CatalogEntry {
        id,
        url: format!("https://shop.test/p/{}", id),
        name: format!("Product {}", id),
        description: format!("Description {}", id),
        price: 100.0,
        sku: Some(format!("SKU-{}", id)),
        images: vec![],
        country: india(),
        brand: None,
        category: None,
    }
}

pub fn entries(range: std::ops::RangeInclusive<i64>) -> Vec<CatalogEntry> {
    range.map(entry).collect()
}

pub fn record_for(entry: &CatalogEntry, price: f64) -> ProductRecord {
    ProductRecord {
        site_name: "Shop".to_string(),
        product_url: entry.url.clone(),
        product_id: entry.id.to_string(),
        product_name: entry.name.clone(),
        product_unique_id: String::new(),
        product_description: entry.description.clone(),
        product_country: ProductCountry::from(&entry.country),
        product_price: format!("₹ {}", price),
        product_images: vec![],
        product_brand_name: String::new(),
        product_category: String::new(),
        product_subcategory: String::new(),
        website_logo: String::new(),
    }
}

/// 预设结果的抓取器
///
/// 未配置的条目以 `id * 10` 的价格成功
#[derive(Default)]
pub struct ScriptedScraper {
    failures: HashMap<i64, ScrapeFailure>,
    prices: HashMap<i64, f64>,
    panics: Vec<i64>,
    pub seen: Mutex<Vec<i64>>,
}

impl ScriptedScraper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(mut self, id: i64, failure: impl Into<ScrapeFailure>) -> Self {
        self.failures.insert(id, failure.into());
        self
    }

    pub fn price(mut self, id: i64, price: f64) -> Self {
        self.prices.insert(id, price);
        self
    }

    pub fn panic_on(mut self, id: i64) -> Self {
        self.panics.push(id);
        self
    }

    pub fn seen(&self) -> Vec<i64> {
        let mut seen = self.seen.lock().clone();
        seen.sort_unstable();
        seen
    }
}

#[async_trait]
impl ProductScraper for ScriptedScraper {
    async fn scrape(&self, entry: &CatalogEntry) -> ScrapeOutcome {
        self.seen.lock().push(entry.id);
        if self.panics.contains(&entry.id) {
            panic!("scraper crashed on entry {}", entry.id);
        }
        if let Some(failure) = self.failures.get(&entry.id) {
            return ScrapeOutcome::failed(entry.id, failure.clone());
        }
        let price = self
            .prices
            .get(&entry.id)
            .copied()
            .unwrap_or(entry.id as f64 * 10.0);
        ScrapeOutcome::succeeded(entry.id, record_for(entry, price), price)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
