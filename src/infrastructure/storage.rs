// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::product_record::ProductRecord;
use crate::domain::repositories::record_sink::{RecordSink, StorageError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::info;

/// JSON 数组文件输出
///
/// 创建时写入 `[`，记录之间以 `,` 分隔，结束时写入 `]`。
/// 每条记录都是缩进两格的 JSON 对象。
pub struct JsonArrayFileSink {
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
    finished: bool,
}

impl JsonArrayFileSink {
    /// 创建输出文件并写入数组开头
    ///
    /// # 参数
    ///
    /// * `path` - 输出文件路径，父目录不存在时会被创建
    pub async fn create(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let file = File::create(&path).await?;
        let mut writer = BufWriter::new(file);
        writer.write_all(b"[\n").await?;

        Ok(Self {
            path,
            writer,
            written: 0,
            finished: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSink for JsonArrayFileSink {
    async fn append(&mut self, record: &ProductRecord) -> Result<(), StorageError> {
        if self.finished {
            return Err(StorageError::Finished);
        }
        let json = serde_json::to_string_pretty(record)?;
        if self.written > 0 {
            self.writer.write_all(b",\n").await?;
        }
        self.writer.write_all(json.as_bytes()).await?;
        self.written += 1;
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), StorageError> {
        if self.finished {
            return Ok(());
        }
        self.writer.write_all(b"\n]").await?;
        self.writer.flush().await?;
        self.finished = true;
        info!(path = %self.path.display(), records = self.written, "Output saved");
        Ok(())
    }

    fn records_written(&self) -> u64 {
        self.written
    }
}

/// 内存输出
#[derive(Debug, Default)]
pub struct InMemorySink {
    pub records: Vec<ProductRecord>,
    pub finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordSink for InMemorySink {
    async fn append(&mut self, record: &ProductRecord) -> Result<(), StorageError> {
        if self.finished {
            return Err(StorageError::Finished);
        }
        self.records.push(record.clone());
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), StorageError> {
        self.finished = true;
        Ok(())
    }

    fn records_written(&self) -> u64 {
        self.records.len() as u64
    }
}
