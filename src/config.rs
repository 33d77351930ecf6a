use crate::models::GroupSize;

/// 程序配置
///
/// API Key 只保存在内存中，不会写入会话文件或日志。
#[derive(Clone)]
pub struct Config {
    /// 待处理图片所在目录
    pub input_folder: String,
    /// 导出文件目录
    pub output_folder: String,
    /// 导出文件基础名（空白会被替换为下划线）
    pub export_base_name: String,
    /// 分组大小（2 = 成对，3 = 三张一组）
    pub group_size: GroupSize,
    /// 会话文件路径（保存顺序与识别结果）
    pub session_file: String,
    /// 是否执行 OCR 识别
    pub run_ocr: bool,
    /// 是否导出 ZIP 和 Excel
    pub run_export: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- OCR 配置 ---
    pub ocr_api_key: String,
    pub ocr_api_base_url: String,
    pub ocr_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_folder: "input_images".to_string(),
            output_folder: "output".to_string(),
            export_base_name: "labeled_images".to_string(),
            group_size: GroupSize::Pair,
            session_file: "labels.toml".to_string(),
            run_ocr: true,
            run_export: true,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            ocr_api_key: String::new(),
            ocr_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            ocr_model_name: "gemini-2.5-flash".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(default.input_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            export_base_name: std::env::var("EXPORT_BASE_NAME").unwrap_or(default.export_base_name),
            group_size: std::env::var("GROUP_SIZE").ok().and_then(|v| v.parse::<usize>().ok()).and_then(|v| GroupSize::try_from(v).ok()).unwrap_or(default.group_size),
            session_file: std::env::var("SESSION_FILE").unwrap_or(default.session_file),
            run_ocr: std::env::var("RUN_OCR").ok().and_then(|v| v.parse().ok()).unwrap_or(default.run_ocr),
            run_export: std::env::var("RUN_EXPORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.run_export),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            ocr_api_key: std::env::var("OCR_API_KEY").unwrap_or(default.ocr_api_key),
            ocr_api_base_url: std::env::var("OCR_API_BASE_URL").unwrap_or(default.ocr_api_base_url),
            ocr_model_name: std::env::var("OCR_MODEL_NAME").unwrap_or(default.ocr_model_name),
        }
    }

    /// 是否已配置 API Key
    pub fn has_credential(&self) -> bool {
        !self.ocr_api_key.trim().is_empty()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("input_folder", &self.input_folder)
            .field("output_folder", &self.output_folder)
            .field("export_base_name", &self.export_base_name)
            .field("group_size", &self.group_size)
            .field("session_file", &self.session_file)
            .field("run_ocr", &self.run_ocr)
            .field("run_export", &self.run_export)
            .field("verbose_logging", &self.verbose_logging)
            .field("output_log_file", &self.output_log_file)
            .field("ocr_api_key", &if self.has_credential() { "***" } else { "<empty>" })
            .field("ocr_api_base_url", &self.ocr_api_base_url)
            .field("ocr_model_name", &self.ocr_model_name)
            .finish()
    }
}
