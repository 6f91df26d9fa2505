// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// 规则注册表错误
#[derive(Error, Debug)]
pub enum RuleRegistryError {
    #[error("Failed to read rules file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid rules document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// 单个站点的提取规则
///
/// 字段对应规则文件中每个主机名下的键。选择器可以带有 `::text` 或
/// `::attr(name)` 后缀，`::` 之前的部分是 CSS 选择器。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRuleSet {
    /// 是否需要浏览器渲染
    #[serde(default)]
    pub loads_with_js: bool,
    #[serde(default)]
    pub site_name: String,
    /// 校验选择器，命中至少一个元素才视为商品页
    pub product_page_validator: String,
    /// 商品ID选择器，包含 `response.url` 时从URL最后一段取值
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_description: Option<String>,
    #[serde(default)]
    pub product_price: Option<String>,
    #[serde(default)]
    pub product_images: Option<String>,
    /// 原样透传的国家字面量
    #[serde(default)]
    pub product_country: serde_json::Value,
    #[serde(default)]
    pub product_brand_name: Option<String>,
    #[serde(default)]
    pub product_category: Option<String>,
    #[serde(default)]
    pub product_subcategory: Option<String>,
    #[serde(default)]
    pub product_unique_id: Option<String>,
}

impl DomainRuleSet {
    /// 商品ID是否取自URL
    pub fn product_id_from_url(&self) -> bool {
        self.product_id
            .as_deref()
            .is_some_and(|s| s.contains("response.url"))
    }
}

/// 域名规则注册表
///
/// 进程生命周期内不可变，按主机名精确查找
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, DomainRuleSet>,
}

impl RuleRegistry {
    /// 从规则集合创建注册表
    pub fn new(rules: HashMap<String, DomainRuleSet>) -> Self {
        Self { rules }
    }

    /// 从JSON文本解析注册表
    pub fn from_json_str(json: &str) -> Result<Self, RuleRegistryError> {
        let rules: HashMap<String, DomainRuleSet> = serde_json::from_str(json)?;
        Ok(Self::new(rules))
    }

    /// 从JSON文件加载注册表
    ///
    /// # 参数
    ///
    /// * `path` - 规则文件路径
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuleRegistryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RuleRegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_json_str(&content)?;
        info!(
            path = %path.display(),
            domains = registry.len(),
            "Loaded domain extraction rules"
        );
        Ok(registry)
    }

    /// 查找主机名对应的规则
    pub fn rules_for(&self, hostname: &str) -> Option<&DomainRuleSet> {
        self.rules.get(hostname)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
