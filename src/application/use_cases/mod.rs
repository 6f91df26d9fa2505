// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 用例模块
///
/// - 价格同步（sync_prices）：分批抓取目录条目并对账回目录存储
pub mod sync_prices;
