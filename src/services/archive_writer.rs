//! ZIP 导出 - 业务能力层
//!
//! 每条记录对应 ZIP 中的一个条目，不论状态如何都不会丢弃。

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::PathBuf;

use tokio::fs;
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::AppResult;
use crate::models::ImageRecord;
use crate::services::naming;

/// ZIP 导出服务
pub struct ArchiveWriter {
    output_folder: PathBuf,
}

impl ArchiveWriter {
    pub fn new(output_folder: impl Into<PathBuf>) -> Self {
        Self {
            output_folder: output_folder.into(),
        }
    }

    /// 打包并写入 `<output_folder>/<base>.zip`
    pub async fn write(&self, records: &[ImageRecord], base_name: &str) -> AppResult<PathBuf> {
        let bytes = build_archive(records)?;
        let path = self.output_folder.join(naming::archive_file_name(base_name));

        fs::create_dir_all(&self.output_folder).await?;
        fs::write(&path, &bytes).await?;

        info!(
            "📦 ZIP 已导出: {} ({} 个文件, {} 字节)",
            path.display(),
            records.len(),
            bytes.len()
        );
        Ok(path)
    }
}

/// 计算每条记录在 ZIP 中的条目名称
///
/// 名称冲突时，后出现的记录在扩展名前追加 ` (n)`。
pub fn archive_entry_names(records: &[ImageRecord]) -> Vec<String> {
    let mut used = HashSet::new();
    let mut names = Vec::with_capacity(records.len());

    for record in records {
        let name = naming::entry_name(record);
        let mut unique = name.clone();
        let mut n = 1;
        while !used.insert(unique.clone()) {
            unique = with_counter(&name, n);
            n += 1;
        }
        if unique != name {
            warn!("ZIP 条目名称重复: {}，改为 {}", name, unique);
        }
        names.push(unique);
    }

    names
}

/// 在内存中生成 ZIP
pub fn build_archive(records: &[ImageRecord]) -> AppResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (record, name) in records.iter().zip(archive_entry_names(records)) {
        zip.start_file(name, options)?;
        zip.write_all(&record.file.bytes)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn with_counter(name: &str, n: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{} ({}).{}", stem, n, ext),
        None => format!("{} ({})", name, n),
    }
}
