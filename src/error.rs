use thiserror::Error;

/// 应用程序错误类型
///
/// 每一种错误都只影响一个分组或一个导出条目，不会让整个进程退出。
#[derive(Debug, Error)]
pub enum LabelerError {
    /// 未配置 API Key（阻止识别流程启动，不发起任何网络请求）
    #[error("未配置 OCR API Key，请先设置 OCR_API_KEY")]
    MissingCredential,

    /// OCR 服务调用失败（网络 / HTTP / 响应解析）
    #[error("OCR 服务调用失败 (模型: {model}): {message}")]
    ServiceCallFailure { model: String, message: String },

    /// 报表中嵌入缩略图失败（只记录日志，导出继续）
    #[error("缩略图嵌入失败 ({file}): {message}")]
    ThumbnailEmbedFailure { file: String, message: String },

    /// 记录不存在
    #[error("记录不存在: {id}")]
    RecordNotFound { id: String },

    /// 记录正在识别中
    #[error("记录正在处理中，暂时无法删除: {id}")]
    RecordBusy { id: String },

    /// 当前状态下名称不可编辑
    #[error("记录 {id} 当前状态为 {status}，名称不可编辑")]
    NotEditable { id: String, status: String },

    /// 重排后的 id 列表与现有记录不一致
    #[error("重排失败: 新顺序必须恰好包含现有的 {expected} 条记录 (实际 {actual} 条)")]
    ReorderMismatch { expected: usize, actual: usize },

    /// 分组大小只能是 2 或 3
    #[error("不支持的分组大小: {0}，只能是 2 或 3")]
    InvalidGroupSize(usize),

    /// ZIP 打包失败
    #[error("ZIP 打包失败: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Excel 报表生成失败
    #[error("Excel 报表生成失败: {0}")]
    Report(#[from] rust_xlsxwriter::XlsxError),

    /// 文件读写失败
    #[error("文件操作失败: {0}")]
    Io(#[from] std::io::Error),

    /// 会话文件解析失败
    #[error("会话文件解析失败 ({path}): {source}")]
    SessionParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// 会话文件序列化失败
    #[error("会话文件写入失败: {0}")]
    SessionWrite(#[from] toml::ser::Error),
}

// ========== 便捷构造函数 ==========

impl LabelerError {
    /// 创建 OCR 服务调用错误
    pub fn service_call_failed(model: impl Into<String>, message: impl std::fmt::Display) -> Self {
        LabelerError::ServiceCallFailure {
            model: model.into(),
            message: message.to_string(),
        }
    }

    /// 创建缩略图嵌入错误
    pub fn thumbnail_embed_failed(file: impl Into<String>, message: impl std::fmt::Display) -> Self {
        LabelerError::ThumbnailEmbedFailure {
            file: file.into(),
            message: message.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, LabelerError>;
