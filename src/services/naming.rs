//! 命名规则
//!
//! 标签清洗、同组图片的派生名称，以及导出文件名。

use regex::Regex;
use std::sync::LazyLock;

use crate::models::ImageRecord;

/// OCR 没有返回任何文字时使用的标签
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

/// 报表中分组没有名称时的占位文字
pub const PLACEHOLDER_LABEL: &str = "N/A";

/// 文件路径中不安全的字符
static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[/\\?%*:|"<>]"#).expect("unsafe-char pattern is valid"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// 从 OCR 的原始回复中取出标签文字
///
/// 只使用第一行非空内容；全部为空白时返回 `UNKNOWN`。
pub fn normalize_ocr_text(raw: &str) -> String {
    raw.trim()
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or(UNKNOWN_LABEL)
        .to_string()
}

/// 把 `/ \ ? % * : | " < >` 替换为 `-`
pub fn sanitize_label(label: &str) -> String {
    UNSAFE_CHARS.replace_all(label, "-").into_owned()
}

/// OCR 回复 → 最终写入记录的标签
pub fn derive_label(raw: &str) -> String {
    sanitize_label(&normalize_ocr_text(raw))
}

/// 组内第 `slot` 张（从 0 开始）的名称；第 0 张就是标签本身
pub fn sibling_label(label: &str, slot: usize) -> String {
    if slot == 0 {
        label.to_string()
    } else {
        format!("{}-{}", label, slot + 1)
    }
}

/// 原始文件名最后一个 `.` 之后的部分；没有 `.` 时返回整个文件名
pub fn file_extension(original_name: &str) -> &str {
    original_name.rsplit('.').next().unwrap_or(original_name)
}

/// ZIP 中的条目名称
pub fn entry_name(record: &ImageRecord) -> String {
    if record.derived_name.is_empty() {
        record.original_name.clone()
    } else {
        format!(
            "{}.{}",
            record.derived_name,
            file_extension(&record.original_name)
        )
    }
}

/// 导出文件基础名：连续空白替换为 `_`
pub fn normalize_base_name(base_name: &str) -> String {
    WHITESPACE_RUN.replace_all(base_name, "_").into_owned()
}

pub fn archive_file_name(base_name: &str) -> String {
    format!("{}.zip", normalize_base_name(base_name))
}

pub fn report_file_name(base_name: &str) -> String {
    format!("{}-report.xlsx", normalize_base_name(base_name))
}
