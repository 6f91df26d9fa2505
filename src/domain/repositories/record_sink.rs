// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::product_record::ProductRecord;
use async_trait::async_trait;
use thiserror::Error;

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// 输出已关闭
    #[error("Output already finished")]
    Finished,
}

/// 记录输出特质
///
/// 一次运行中按顺序接收成功的商品记录
#[async_trait]
pub trait RecordSink: Send {
    /// 追加一条记录
    async fn append(&mut self, record: &ProductRecord) -> Result<(), StorageError>;

    /// 结束输出并刷新，之后不能再追加
    async fn finish(&mut self) -> Result<(), StorageError>;

    /// 已写入的记录数
    fn records_written(&self) -> u64;
}
