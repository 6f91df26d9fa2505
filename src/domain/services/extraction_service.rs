// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scrape_outcome::ExtractionFailure;
use crate::domain::services::rule_registry::DomainRuleSet;
use crate::utils::text_processing::clean_text;
use crate::utils::url_utils::resolve_url;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

static FAVICON_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"link[rel="icon"], link[rel="shortcut icon"]"#)
        .expect("favicon selector is valid")
});

/// 选择器后缀
#[derive(Debug, Clone, PartialEq, Eq)]
enum Discriminator {
    /// `::text` 或没有后缀
    Text,
    /// `::attr(name)`
    Attr(String),
}

/// 拆分 `css::text` / `css::attr(name)` 形式的选择器
fn split_selector(raw: &str) -> (&str, Discriminator) {
    let Some((css, suffix)) = raw.split_once("::") else {
        return (raw.trim(), Discriminator::Text);
    };
    let discriminator = suffix
        .strip_prefix("attr(")
        .and_then(|rest| rest.strip_suffix(')'))
        .map(|name| Discriminator::Attr(name.trim().to_string()))
        .unwrap_or(Discriminator::Text);
    (css.trim(), discriminator)
}

/// 提取结果
///
/// 没有找到的字段为空字符串或空列表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedProduct {
    pub product_id: String,
    pub product_url: String,
    pub product_name: String,
    pub product_description: String,
    pub product_price: String,
    pub product_images: Vec<String>,
    pub product_country: Value,
    pub product_brand_name: String,
    pub product_category: String,
    pub product_subcategory: String,
    pub product_unique_id: String,
    /// 站点图标的绝对地址
    pub website_logo: String,
}

/// 提取服务
///
/// 负责按站点规则从 HTML 内容中提取商品字段
pub struct ExtractionService;

impl ExtractionService {
    /// 校验页面并提取商品字段
    ///
    /// # 参数
    ///
    /// * `markup` - 页面HTML
    /// * `rules` - 站点规则
    /// * `url` - 页面URL
    ///
    /// # 返回值
    ///
    /// * `Ok(ExtractedProduct)` - 提取结果
    /// * `Err(ExtractionFailure::InvalidProductPage)` - 校验选择器没有命中
    pub fn extract(
        markup: &str,
        rules: &DomainRuleSet,
        url: &str,
    ) -> Result<ExtractedProduct, ExtractionFailure> {
        let document = Html::parse_document(markup);

        // An unparseable validator matches nothing
        let is_product_page = Selector::parse(&rules.product_page_validator)
            .map(|selector| document.select(&selector).next().is_some())
            .unwrap_or(false);
        if !is_product_page {
            return Err(ExtractionFailure::InvalidProductPage(url.to_string()));
        }

        Ok(Self::extract_fields(&document, rules, url))
    }

    /// 提取全部字段，不会失败
    pub fn extract_fields(document: &Html, rules: &DomainRuleSet, url: &str) -> ExtractedProduct {
        let text = |selector: &Option<String>| {
            selector
                .as_deref()
                .map(|s| select_text(document, s))
                .unwrap_or_default()
        };

        let product_id = if rules.product_id_from_url() {
            url.rsplit('/').next().unwrap_or_default().to_string()
        } else {
            text(&rules.product_id)
        };

        ExtractedProduct {
            product_id,
            product_url: url.to_string(),
            product_name: text(&rules.product_name),
            product_description: text(&rules.product_description),
            product_price: text(&rules.product_price),
            product_images: rules
                .product_images
                .as_deref()
                .map(|s| select_images(document, s))
                .unwrap_or_default(),
            product_country: rules.product_country.clone(),
            product_brand_name: text(&rules.product_brand_name),
            product_category: text(&rules.product_category),
            product_subcategory: text(&rules.product_subcategory),
            product_unique_id: text(&rules.product_unique_id),
            website_logo: website_logo(document, url),
        }
    }
}

fn parse_selector(css: &str) -> Option<Selector> {
    if css.is_empty() {
        return None;
    }
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::debug!(selector = css, "Invalid selector: {}", e);
            None
        }
    }
}

fn element_value(element: ElementRef<'_>, discriminator: &Discriminator) -> String {
    match discriminator {
        Discriminator::Text => element.text().collect::<String>().trim().to_string(),
        Discriminator::Attr(name) => element
            .value()
            .attr(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default(),
    }
}

/// 拼接所有命中元素的文本并清理
fn select_text(document: &Html, raw: &str) -> String {
    let (css, discriminator) = split_selector(raw);
    let Some(selector) = parse_selector(css) else {
        return String::new();
    };
    let joined = document
        .select(&selector)
        .map(|el| element_value(el, &discriminator))
        .collect::<Vec<_>>()
        .join(" ");
    clean_text(&joined)
}

/// 收集图片地址，去掉查询串并按首次出现顺序去重
fn select_images(document: &Html, raw: &str) -> Vec<String> {
    let (css, discriminator) = split_selector(raw);
    let attr = match discriminator {
        Discriminator::Attr(name) => name,
        Discriminator::Text => "src".to_string(),
    };
    let Some(selector) = parse_selector(css) else {
        return Vec::new();
    };

    let mut images: Vec<String> = Vec::new();
    for element in document.select(&selector) {
        let Some(value) = element.value().attr(&attr) else {
            continue;
        };
        let stripped = value.split('?').next().unwrap_or_default().trim();
        if !stripped.is_empty() && !images.iter().any(|i| i == stripped) {
            images.push(stripped.to_string());
        }
    }
    images
}

/// 站点图标解析为绝对地址，找不到时为空
fn website_logo(document: &Html, url: &str) -> String {
    let Some(href) = document
        .select(&FAVICON_SELECTOR)
        .find_map(|el| el.value().attr("href"))
    else {
        return String::new();
    };
    Url::parse(url)
        .and_then(|base| resolve_url(&base, href))
        .map(|resolved| resolved.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "extraction_service_test.rs"]
mod tests;
