// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含的子模块：
/// - 数据库（database）：连接池、目录表实体与表结构初始化
/// - 指标（metrics）：Prometheus 指标导出
/// - 仓库实现（repositories）：目录仓库接口的具体实现
/// - 存储（storage）：商品记录输出文件
///
/// 基础设施层依赖领域层的抽象接口，领域层不依赖这里的任何实现。
pub mod database;
pub mod metrics;
pub mod repositories;
pub mod storage;
