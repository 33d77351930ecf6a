//! 会话文件
//!
//! 把当前顺序、名称和状态保存为 TOML，下次运行时恢复。
//! 用户可以直接编辑这个文件来调整顺序或修改名称。API Key 不会写入。

use crate::error::{AppResult, LabelerError};
use crate::infrastructure::RowStore;
use crate::models::record::{ImageRecord, RecordStatus};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// 会话文件中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRow {
    pub id: String,
    pub original_name: String,
    #[serde(default)]
    pub derived_name: String,
    #[serde(default)]
    pub status: RecordStatus,
}

/// 会话文件内容
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionManifest {
    #[serde(default)]
    pub rows: Vec<SessionRow>,
}

impl SessionManifest {
    /// 从当前存储生成会话内容
    pub fn from_store(store: &RowStore) -> Self {
        Self {
            rows: store
                .records()
                .iter()
                .map(|r| SessionRow {
                    id: r.id.clone(),
                    original_name: r.original_name.clone(),
                    derived_name: r.derived_name.clone(),
                    status: r.status,
                })
                .collect(),
        }
    }
}

/// 读取会话文件，文件不存在时返回 `None`
pub async fn load_session(session_path: &Path) -> AppResult<Option<SessionManifest>> {
    if !fs::try_exists(session_path).await? {
        return Ok(None);
    }

    let content = fs::read_to_string(session_path).await?;
    let manifest: SessionManifest =
        toml::from_str(&content).map_err(|source| LabelerError::SessionParse {
            path: session_path.display().to_string(),
            source,
        })?;

    tracing::info!(
        "已读取会话文件 {}，共 {} 条记录",
        session_path.display(),
        manifest.rows.len()
    );

    Ok(Some(manifest))
}

/// 保存会话文件
pub async fn save_session(store: &RowStore, session_path: &Path) -> AppResult<()> {
    let manifest = SessionManifest::from_store(store);
    let content = toml::to_string_pretty(&manifest)?;

    if let Some(parent) = session_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(session_path, content).await?;

    tracing::debug!("会话已保存: {}", session_path.display());
    Ok(())
}

/// 用会话内容恢复存储
///
/// - 会话中的行按原顺序排在前面，文件已不存在的行被丢弃
/// - 新出现的图片按加载顺序追加在后面
/// - 只有 completed / error 状态的行才恢复名称
/// - 中断时仍为 processing 的行恢复为 pending
pub fn restore_store(uploads: Vec<ImageRecord>, manifest: Option<SessionManifest>) -> RowStore {
    let Some(manifest) = manifest else {
        return RowStore::from_records(uploads);
    };

    let mut remaining: Vec<Option<ImageRecord>> = uploads.into_iter().map(Some).collect();
    let mut restored = Vec::with_capacity(remaining.len());

    for row in manifest.rows {
        let slot = remaining.iter_mut().find(|slot| {
            slot.as_ref()
                .map(|r| r.original_name == row.original_name)
                .unwrap_or(false)
        });

        let Some(record) = slot.and_then(Option::take) else {
            tracing::warn!("会话中的图片已不存在，跳过: {}", row.original_name);
            continue;
        };

        let mut record = record.with_id(row.id);
        match row.status {
            RecordStatus::Completed | RecordStatus::Error => {
                record.derived_name = row.derived_name;
                record.status = row.status;
            }
            RecordStatus::Processing | RecordStatus::Pending => {
                if !row.derived_name.is_empty() {
                    tracing::warn!(
                        "{} 尚未完成识别，忽略手动填写的名称: {}",
                        row.original_name,
                        row.derived_name
                    );
                }
            }
        }
        restored.push(record);
    }

    let appended: Vec<ImageRecord> = remaining.into_iter().flatten().collect();
    if !appended.is_empty() {
        tracing::info!("新增 {} 张图片，追加到末尾", appended.len());
    }
    restored.extend(appended);

    RowStore::from_records(restored)
}
