// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;

/// 可识别的货币符号
pub const CURRENCY_GLYPHS: &[&str] = &[
    "₹", "$", "€", "£", "¥", "₩", "₴", "₦", "₱", "₲", "₸", "₺", "₼", "₽", "₾", "₿",
];

/// 北欧克朗的地区标记，既不是单一货币符号也不在符号表中
pub const KRONA_MARKER: &str = "kr";

static PRICE_REGEX: Lazy<Regex> = Lazy::new(|| {
    let glyphs = "[₹$€£¥₩₴₦₱₲₸₺₼₽₾₿]";
    Regex::new(&format!(
        r"(?i)(?P<lead>{g}|\bkr)?\s*(?P<num>\d(?:[\d\s.,]*\d)?)\s*(?P<trail>{g}|kr\b)?",
        g = glyphs
    ))
    .expect("price regex is valid")
});

/// 小数点与千位分隔符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeparatorStyle {
    pub decimal: char,
    pub group: char,
}

impl SeparatorStyle {
    /// `1,234.56`
    pub const DOT_DECIMAL: SeparatorStyle = SeparatorStyle {
        decimal: '.',
        group: ',',
    };
    /// `1.234,56`
    pub const COMMA_DECIMAL: SeparatorStyle = SeparatorStyle {
        decimal: ',',
        group: '.',
    };
}

/// 货币符号到分隔符风格的映射表
///
/// `kr` 被当作逗号小数处理；它是否应该和欧元一样处理尚待产品确认。
const SEPARATOR_TABLE: &[(&str, SeparatorStyle)] = &[
    ("€", SeparatorStyle::COMMA_DECIMAL),
    (KRONA_MARKER, SeparatorStyle::COMMA_DECIMAL),
];

/// 查找货币符号的分隔符风格，未列出的符号使用点小数
pub fn separator_style(symbol: &str) -> SeparatorStyle {
    let symbol = symbol.trim().to_lowercase();
    SEPARATOR_TABLE
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, style)| *style)
        .unwrap_or(SeparatorStyle::DOT_DECIMAL)
}

/// 价格解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct PriceParseResult {
    /// 解析出的货币符号，未找到时为国家默认符号
    pub currency_symbol: String,
    /// 数值，0 表示无法解析
    pub numeric_value: f64,
    /// 规范化后的数值文本，例如 `1234.56`；没有匹配时为空
    pub normalized: String,
}

impl PriceParseResult {
    fn unparsed(currency_symbol: &str) -> Self {
        Self {
            currency_symbol: currency_symbol.to_string(),
            numeric_value: 0.0,
            normalized: String::new(),
        }
    }

    /// 展示用价格文本 `"<符号> <数值文本>"`
    ///
    /// 数值为 0（无法解析）时为空，展示文本与数值总是一致
    pub fn display(&self) -> String {
        if self.normalized.is_empty() || self.numeric_value == 0.0 {
            return String::new();
        }
        if self.currency_symbol.is_empty() {
            return self.normalized.clone();
        }
        format!("{} {}", self.currency_symbol, self.normalized)
    }
}

/// 按分隔符风格规范化数值文本
fn normalize_number(raw: &str, style: SeparatorStyle) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    if style == SeparatorStyle::COMMA_DECIMAL {
        return compact
            .replace(style.group, "")
            .replace(style.decimal, ".");
    }

    // Keep only the last dot as the decimal point
    let collapsed = match compact.rfind('.') {
        Some(idx) if compact[..idx].contains('.') => {
            let (head, tail) = compact.split_at(idx);
            format!("{}{}", head.replace('.', ""), tail)
        }
        _ => compact,
    };
    collapsed.replace(style.group, "")
}

/// 解析价格文本
///
/// # 参数
///
/// * `text` - 页面上提取出的价格文本
/// * `country_symbol` - 国家默认货币符号，文本中没有符号时使用
///
/// # 返回值
///
/// 解析结果；无法解析时数值为 0，不会返回错误
pub fn parse_price(text: &str, country_symbol: &str) -> PriceParseResult {
    let Some(caps) = PRICE_REGEX.captures(text) else {
        return PriceParseResult::unparsed(country_symbol);
    };

    let symbol = caps
        .name("lead")
        .or_else(|| caps.name("trail"))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| country_symbol.to_string());

    let raw = caps.name("num").map(|m| m.as_str()).unwrap_or_default();
    let normalized = normalize_number(raw, separator_style(&symbol));
    let numeric_value = normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0);

    PriceParseResult {
        currency_symbol: symbol,
        numeric_value,
        normalized,
    }
}
