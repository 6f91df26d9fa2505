// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 规则注册表（rule_registry）：按主机名查找站点提取规则
/// - 提取服务（extraction_service）：校验商品页并提取字段
/// - 价格服务（price_service）：把带货币格式的价格文本规范化为数值
pub mod extraction_service;
pub mod price_service;
pub mod rule_registry;
