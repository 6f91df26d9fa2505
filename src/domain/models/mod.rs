// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了价格同步的核心数据结构，包括：
/// - 目录条目（catalog_entry）：目录中待同步的商品及其国家、品牌、分类
/// - 商品记录（product_record）：成功抓取后写入输出文件的结构化记录
/// - 抓取结果（scrape_outcome）：每个条目每次运行产生的结果及失败分类
pub mod catalog_entry;
pub mod product_record;
pub mod scrape_outcome;
