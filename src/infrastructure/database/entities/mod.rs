// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据库实体模块
///
/// 目录存储的表结构，使用SeaORM进行对象关系映射
pub mod brand;
pub mod category;
pub mod country;
pub mod product;
