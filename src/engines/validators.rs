// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 默认的拦截页标记
///
/// 反爬挑战页、验证码页和拒绝访问页中常见的短语，比较时忽略大小写
pub const DEFAULT_BLOCKING_MARKERS: &[&str] = &[
    "access denied",
    "captcha",
    "are you a robot",
    "robot check",
    "verify you are human",
    "unusual traffic",
    "request blocked",
];

/// 检测 200 响应是否实际上是拦截页
///
/// # 参数
///
/// * `body` - 响应内容
/// * `markers` - 拦截标记列表
///
/// # 返回值
///
/// 命中的第一个标记，未命中返回None
pub fn detect_blocking<'a, S: AsRef<str>>(body: &str, markers: &'a [S]) -> Option<&'a str> {
    let lowered = body.to_lowercase();
    markers
        .iter()
        .map(AsRef::as_ref)
        .filter(|m| !m.is_empty())
        .find(|m| lowered.contains(&m.to_lowercase()))
}

/// 默认标记的自有副本，用作配置默认值
pub fn default_blocking_markers() -> Vec<String> {
    DEFAULT_BLOCKING_MARKERS
        .iter()
        .map(|m| m.to_string())
        .collect()
}
