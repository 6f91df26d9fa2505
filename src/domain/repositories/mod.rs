// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 定义领域层依赖的持久化抽象：
/// - 目录仓库（catalog_repository）：读取分页条目、更新价格、删除条目
/// - 记录输出（record_sink）：顺序写出成功的商品记录
pub mod catalog_repository;
pub mod record_sink;
