// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::product_record::ProductRecord;
use crate::engines::traits::FetchFailure;
use thiserror::Error;

/// 提取失败
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionFailure {
    /// 域名没有对应的提取规则
    #[error("No extraction rules for domain: {0}")]
    NoRuleForDomain(String),
    /// 校验选择器未命中，页面不是商品页
    #[error("Not a valid product page: {0}")]
    InvalidProductPage(String),
}

/// 校验失败
///
/// 组装出的商品记录缺少必填字段
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("missing price")]
    MissingPrice,
    #[error("missing name")]
    MissingName,
    #[error("missing description")]
    MissingDescription,
    #[error("missing url")]
    MissingUrl,
    #[error("price is not positive")]
    NonPositivePrice,
}

/// 单个条目的抓取失败
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScrapeFailure {
    #[error(transparent)]
    Fetch(#[from] FetchFailure),
    #[error(transparent)]
    Extraction(#[from] ExtractionFailure),
    #[error("Missing required fields: {0}")]
    Validation(#[from] ValidationFailure),
    /// 工作器在回复之前退出
    #[error("Worker stopped before answering")]
    WorkerLost,
}

impl ScrapeFailure {
    /// 失败类型的稳定名称，用于统计和指标标签
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeFailure::Fetch(f) => f.kind(),
            ScrapeFailure::Extraction(ExtractionFailure::NoRuleForDomain(_)) => {
                "no_rule_for_domain"
            }
            ScrapeFailure::Extraction(ExtractionFailure::InvalidProductPage(_)) => {
                "invalid_product_page"
            }
            ScrapeFailure::Validation(ValidationFailure::MissingPrice) => "missing_price",
            ScrapeFailure::Validation(ValidationFailure::MissingName) => "missing_name",
            ScrapeFailure::Validation(ValidationFailure::MissingDescription) => {
                "missing_description"
            }
            ScrapeFailure::Validation(ValidationFailure::MissingUrl) => "missing_url",
            ScrapeFailure::Validation(ValidationFailure::NonPositivePrice) => "non_positive_price",
            ScrapeFailure::WorkerLost => "worker_lost",
        }
    }

    /// 该失败是否说明条目已不可恢复，需要从目录中删除
    ///
    /// 工作器丢失与商品本身无关，不触发删除
    pub fn deletes_entry(&self) -> bool {
        !matches!(self, ScrapeFailure::WorkerLost)
    }
}

/// 单个条目的抓取结果
///
/// 字段与工作器应答消息一致：`{success, data | error, numeric_price, product_id}`。
/// 成功的结果由 [`ScrapeOutcome::succeeded`] 构造，能否持久化由
/// [`ScrapeOutcome::is_persistable`] 判定。
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeOutcome {
    /// 目录条目ID
    pub product_id: i64,
    pub success: bool,
    pub data: Option<ProductRecord>,
    pub numeric_price: Option<f64>,
    pub error: Option<ScrapeFailure>,
}

impl ScrapeOutcome {
    /// 创建成功结果
    pub fn succeeded(product_id: i64, data: ProductRecord, numeric_price: f64) -> Self {
        Self {
            product_id,
            success: true,
            data: Some(data),
            numeric_price: Some(numeric_price),
            error: None,
        }
    }

    /// 创建失败结果
    pub fn failed(product_id: i64, error: impl Into<ScrapeFailure>) -> Self {
        Self {
            product_id,
            success: false,
            data: None,
            numeric_price: None,
            error: Some(error.into()),
        }
    }

    /// 结果是否可以写入输出文件并更新价格
    ///
    /// 要求抓取成功、数值价格为正且价格文本非空
    pub fn is_persistable(&self) -> bool {
        self.success
            && self.numeric_price.is_some_and(|p| p > 0.0)
            && self
                .data
                .as_ref()
                .is_some_and(|d| !d.product_price.is_empty())
    }
}
