use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::error::LabelerError;
use crate::models::media_type;

/// 记录状态
///
/// `pending → processing → completed | error`，再次运行识别时
/// `completed` 的分组会被跳过，其余状态可以重新进入 `processing`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Error,
}

impl RecordStatus {
    /// 获取状态名称
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Processing => "processing",
            RecordStatus::Completed => "completed",
            RecordStatus::Error => "error",
        }
    }

    /// 识别结束（成功或失败）后，名称才允许手动编辑
    pub fn is_editable(self) -> bool {
        matches!(self, RecordStatus::Completed | RecordStatus::Error)
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 分组大小
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum GroupSize {
    /// 两张一组
    Pair = 2,
    /// 三张一组
    Triplet = 3,
}

impl GroupSize {
    pub fn get(self) -> usize {
        self as usize
    }

    /// 显示名称
    pub fn name(self) -> &'static str {
        match self {
            GroupSize::Pair => "Pair",
            GroupSize::Triplet => "Triplet",
        }
    }
}

impl TryFrom<usize> for GroupSize {
    type Error = LabelerError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(GroupSize::Pair),
            3 => Ok(GroupSize::Triplet),
            other => Err(LabelerError::InvalidGroupSize(other)),
        }
    }
}

impl From<GroupSize> for usize {
    fn from(size: GroupSize) -> Self {
        size.get()
    }
}

/// 图片二进制内容及其媒体类型，创建后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
        }
    }
}

/// 单张图片的记录
#[derive(Debug, Clone)]
pub struct ImageRecord {
    /// 唯一标识，用于重排和删除
    pub id: String,
    /// 原始图片内容
    pub file: ImagePayload,
    /// 图片在本地的路径（预览用）
    pub preview: PathBuf,
    /// 原始文件名
    pub original_name: String,
    /// 识别或手动编辑得到的新名称
    pub derived_name: String,
    /// 处理状态
    pub status: RecordStatus,
}

impl ImageRecord {
    /// 创建新的记录，生成唯一 id
    pub fn new(original_name: impl Into<String>, preview: impl Into<PathBuf>, file: ImagePayload) -> Self {
        let original_name = original_name.into();
        let suffix = Uuid::new_v4().simple().to_string();
        Self {
            id: format!("{}-{}", original_name, &suffix[..9]),
            file,
            preview: preview.into(),
            original_name,
            derived_name: String::new(),
            status: RecordStatus::Pending,
        }
    }

    /// 从内存中的字节创建记录，媒体类型由扩展名推断
    pub fn from_bytes(original_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let original_name = original_name.into();
        let media_type = media_type::from_file_name(&original_name).unwrap_or(media_type::FALLBACK);
        let preview = PathBuf::from(&original_name);
        Self::new(original_name, preview, ImagePayload::new(bytes, media_type))
    }

    /// 使用指定 id 创建记录（恢复会话时保持 id 稳定）
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}
