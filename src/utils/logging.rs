use anyhow::Result;
/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use std::fs;
use std::io::Write;
use tracing::info;

use crate::models::GroupSize;
use crate::orchestrator::recognition::RecognitionReport;

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n图片标注日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 向日志文件追加一行
pub fn append_log_line(log_file_path: &str, line: &str) -> Result<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%H:%M:%S"),
        line
    )?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(input_folder: &str, group_size: GroupSize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 图片标注模式");
    info!("📁 图片目录: {}", input_folder);
    info!("📊 分组大小: {} ({})", group_size.get(), group_size.name());
    info!("{}", "=".repeat(60));
}

/// 记录图片加载信息
pub fn log_images_loaded(total: usize, group_count: usize) {
    info!("✓ 找到 {} 张图片", total);
    info!("📋 共 {} 组，每组只识别第一张\n", group_count);
}

/// 记录识别开始信息
pub fn log_recognition_start(total_images: usize, total_groups: usize, group_size: GroupSize) {
    info!("\n{}", "=".repeat(60));
    info!("🔍 开始识别: {} 张图片 / {} 组 ({})", total_images, total_groups, group_size.name());
    info!("💡 逐组处理，上一组完成后再开始下一组");
    info!("{}", "=".repeat(60));
}

/// 记录识别完成信息
pub fn log_recognition_complete(report: &RecognitionReport) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 识别完成: 成功 {} / 跳过 {} / 失败 {} (共 {} 组)",
        report.labeled,
        report.skipped,
        report.failed(),
        report.total_groups
    );
    for failure in &report.failures {
        info!(
            "  ❌ 第 {} 组 ({}): {}",
            failure.group_index + 1,
            failure.original_name,
            truncate_text(&failure.message, 120)
        );
    }
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(report: Option<&RecognitionReport>, exported: &[String], log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    match report {
        Some(report) => {
            info!("✅ 识别成功: {}/{}", report.labeled, report.total_groups);
            info!("⏭️ 跳过: {}", report.skipped);
            info!("❌ 失败: {}", report.failed());
        }
        None => info!("⏭️ 本次未执行识别"),
    }
    for path in exported {
        info!("📦 已导出: {}", path);
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("ACC-5", 10), "ACC-5");
        assert_eq!(truncate_text("识别失败原因很长", 4), "识别失败...");
    }
}
