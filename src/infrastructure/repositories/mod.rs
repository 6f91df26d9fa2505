// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 提供目录仓库接口的具体实现：
/// - SeaORM 数据库实现（catalog_repo_impl）
/// - 内存实现（in_memory_catalog_repo）
pub mod catalog_repo_impl;
pub mod in_memory_catalog_repo;
