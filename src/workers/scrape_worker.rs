// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::catalog_entry::CatalogEntry;
use crate::domain::models::product_record::{ProductCountry, ProductRecord};
use crate::domain::models::scrape_outcome::{
    ExtractionFailure, ScrapeOutcome, ValidationFailure,
};
use crate::domain::services::extraction_service::{ExtractedProduct, ExtractionService};
use crate::domain::services::price_service::{parse_price, PriceParseResult};
use crate::domain::services::rule_registry::{DomainRuleSet, RuleRegistry};
use crate::engines::router::EngineRouter;
use crate::engines::traits::FetchRequest;
use crate::utils::url_utils::hostname;
use crate::workers::worker::ProductScraper;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// 抓取工作器
///
/// 对单个目录条目执行：查找站点规则、获取页面、校验并提取字段、解析价格、组装记录。
/// 不做任何目录存储读写。
pub struct ScrapeWorker {
    registry: Arc<RuleRegistry>,
    router: Arc<EngineRouter>,
    request_timeout: Duration,
}

impl ScrapeWorker {
    /// 创建抓取工作器
    ///
    /// # 参数
    ///
    /// * `registry` - 站点规则注册表
    /// * `router` - 引擎路由器
    /// * `request_timeout` - 单次请求超时
    pub fn new(
        registry: Arc<RuleRegistry>,
        router: Arc<EngineRouter>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            router,
            request_timeout,
        }
    }
}

/// 组装输出记录，缺失的字段回退到目录中的值
fn assemble_record(
    entry: &CatalogEntry,
    rules: &DomainRuleSet,
    extracted: ExtractedProduct,
    price: &PriceParseResult,
) -> ProductRecord {
    let or_else = |value: String, fallback: &str| {
        if value.is_empty() {
            fallback.to_string()
        } else {
            value
        }
    };

    let product_images = if extracted.product_images.is_empty() {
        entry.images.clone()
    } else {
        extracted.product_images
    };

    ProductRecord {
        site_name: rules.site_name.clone(),
        product_url: entry.url.clone(),
        product_id: or_else(extracted.product_id, &entry.id.to_string()),
        product_name: or_else(extracted.product_name, &entry.name),
        product_unique_id: extracted.product_unique_id,
        product_description: or_else(extracted.product_description, &entry.description),
        product_country: ProductCountry::from(&entry.country),
        product_price: price.display(),
        product_images,
        product_brand_name: or_else(extracted.product_brand_name, entry.brand_name()),
        product_category: or_else(extracted.product_category, entry.category_name()),
        product_subcategory: extracted.product_subcategory,
        website_logo: extracted.website_logo,
    }
}

/// 校验记录的必填字段
fn validate(record: &ProductRecord, numeric_price: f64) -> Result<(), ValidationFailure> {
    if record.product_price.is_empty() {
        return Err(ValidationFailure::MissingPrice);
    }
    if numeric_price <= 0.0 {
        return Err(ValidationFailure::NonPositivePrice);
    }
    if record.product_name.is_empty() {
        return Err(ValidationFailure::MissingName);
    }
    if record.product_description.is_empty() {
        return Err(ValidationFailure::MissingDescription);
    }
    if record.product_url.is_empty() {
        return Err(ValidationFailure::MissingUrl);
    }
    Ok(())
}

#[async_trait]
impl ProductScraper for ScrapeWorker {
    #[instrument(skip(self, entry), fields(entry_id = entry.id, url = %entry.url))]
    async fn scrape(&self, entry: &CatalogEntry) -> ScrapeOutcome {
        let host = hostname(&entry.url).unwrap_or_default();
        let Some(rules) = self.registry.rules_for(&host) else {
            return ScrapeOutcome::failed(entry.id, ExtractionFailure::NoRuleForDomain(host));
        };

        let request = FetchRequest::new(&entry.url, rules.loads_with_js, self.request_timeout);
        let response = match self.router.fetch(&request).await {
            Ok(response) => response,
            Err(failure) => return ScrapeOutcome::failed(entry.id, failure),
        };

        let extracted = match ExtractionService::extract(&response.content, rules, &entry.url) {
            Ok(extracted) => extracted,
            Err(failure) => return ScrapeOutcome::failed(entry.id, failure),
        };

        let price = parse_price(&extracted.product_price, &entry.country.currency_symbol);
        let record = assemble_record(entry, rules, extracted, &price);

        if let Err(failure) = validate(&record, price.numeric_value) {
            return ScrapeOutcome::failed(entry.id, failure);
        }

        debug!(price = %record.product_price, "Scraped product");
        ScrapeOutcome::succeeded(entry.id, record, price.numeric_value)
    }

    fn name(&self) -> &str {
        "scrape_worker"
    }
}
