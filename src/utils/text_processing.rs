// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 文本清理工具

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag regex is valid"));
static WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// 清理提取出的文本
///
/// 去除嵌入的标签和花括号，合并连续空白并去除首尾空白
pub fn clean_text(text: &str) -> String {
    let without_tags = TAG_REGEX.replace_all(text, "");
    let without_braces: String = without_tags
        .chars()
        .filter(|c| *c != '{' && *c != '}')
        .collect();
    WHITESPACE_REGEX
        .replace_all(&without_braces, " ")
        .trim()
        .to_string()
}
