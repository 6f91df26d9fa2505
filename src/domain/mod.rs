// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含价格同步的核心业务逻辑，包括：
/// - 领域模型（models）：目录条目、商品记录、抓取结果
/// - 仓库接口（repositories）：目录存储与记录输出的抽象接口
/// - 服务（services）：规则查找、字段提取和价格解析
///
/// 领域层不依赖任何具体的存储或网络实现。
pub mod models;
pub mod repositories;
pub mod services;
