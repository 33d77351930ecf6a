//! 批量图片处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次完整运行的资源管理和调度。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：日志文件、启动信息、创建 OCR 引擎
//! 2. **加载**：扫描图片目录，并用会话文件恢复顺序和已有结果
//! 3. **识别**：委托 `RecognitionPipeline` 逐组串行识别
//! 4. **保存会话**：写回顺序、名称和状态，供下次运行或手动编辑
//! 5. **导出**：ZIP + Excel 报表
//! 6. **全局统计**：汇总本次运行的结果
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 `RowStore` 的模块
//! - **向下委托**：不处理单组的细节

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::LabelerError;
use crate::infrastructure::{RowStore, StoreEvent};
use crate::models;
use crate::orchestrator::recognition::{RecognitionPipeline, RecognitionReport};
use crate::services::{ArchiveWriter, OcrEngine, OcrService, ReportWriter};
use crate::utils::logging::{
    append_log_line, init_log_file, log_images_loaded, log_startup, print_final_stats,
};

/// 一次运行的结果
#[derive(Debug, Default)]
pub struct RunSummary {
    /// 加载的图片数量
    pub images: usize,
    /// 识别统计（未执行识别时为 `None`）
    pub recognition: Option<RecognitionReport>,
    pub archive_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
    /// 报表中嵌入失败的缩略图数量
    pub thumbnail_failures: usize,
}

/// 应用主结构
pub struct App {
    config: Config,
    engine: Arc<dyn OcrEngine>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let engine: Arc<dyn OcrEngine> = Arc::new(OcrService::new(&config));
        Self::with_engine(config, engine)
    }

    /// 使用指定的 OCR 引擎初始化
    pub fn with_engine(config: Config, engine: Arc<dyn OcrEngine>) -> Result<Self> {
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法创建日志文件: {}", config.output_log_file))?;

        log_startup(&config.input_folder, config.group_size);
        debug!("配置: {:?}", config);

        Ok(Self { config, engine })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunSummary> {
        let mut store = self.load_store().await?;
        let mut summary = RunSummary {
            images: store.len(),
            ..Default::default()
        };

        if store.is_empty() {
            warn!("⚠️ 没有找到待处理的图片，程序结束");
            return Ok(summary);
        }

        log_images_loaded(store.len(), store.group_count(self.config.group_size));

        let watcher = tokio::spawn(log_store_events(store.subscribe()));

        if self.config.run_ocr {
            summary.recognition = self.recognize(&mut store).await?;
        }

        models::save_session(&store, &self.session_path())
            .await
            .context("保存会话文件失败")?;

        if self.config.run_export {
            self.export(&store, &mut summary).await?;
        }

        // 存储释放后通知通道关闭，监听任务随之结束
        drop(store);
        if let Err(e) = watcher.await {
            warn!("事件监听任务异常结束: {}", e);
        }

        let exported: Vec<String> = summary
            .archive_path
            .iter()
            .chain(summary.report_path.iter())
            .map(|p| p.display().to_string())
            .collect();
        print_final_stats(
            summary.recognition.as_ref(),
            &exported,
            &self.config.output_log_file,
        );

        Ok(summary)
    }

    /// 加载图片并恢复会话
    async fn load_store(&self) -> Result<RowStore> {
        info!("\n📁 正在扫描图片...");
        let uploads = models::load_images_from_folder(&self.config.input_folder).await?;
        let manifest = models::load_session(&self.session_path())
            .await
            .context("读取会话文件失败")?;
        Ok(models::restore_store(uploads, manifest))
    }

    /// 执行识别；未配置 API Key 时只记录错误并继续
    async fn recognize(&self, store: &mut RowStore) -> Result<Option<RecognitionReport>> {
        let pipeline = RecognitionPipeline::new(
            self.engine.clone(),
            self.config.group_size,
            self.config.ocr_api_key.clone(),
        );

        match pipeline.run(store).await {
            Ok(report) => {
                for failure in &report.failures {
                    self.write_log(&format!(
                        "识别失败 第 {} 组 ({}): {}",
                        failure.group_index + 1,
                        failure.original_name,
                        failure.message
                    ));
                }
                Ok(Some(report))
            }
            Err(LabelerError::MissingCredential) => {
                self.write_log(&LabelerError::MissingCredential.to_string());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 导出 ZIP 和 Excel 报表
    async fn export(&self, store: &RowStore, summary: &mut RunSummary) -> Result<()> {
        let records = store.records();
        let base_name = &self.config.export_base_name;

        let archive_path = ArchiveWriter::new(&self.config.output_folder)
            .write(records, base_name)
            .await
            .context("导出 ZIP 失败")?;
        summary.archive_path = Some(archive_path);

        let (report_path, output) = ReportWriter::new(&self.config.output_folder, self.config.group_size)
            .write(records, base_name)
            .await
            .context("导出 Excel 失败")?;
        for failure in &output.failures {
            self.write_log(&failure.to_string());
        }
        summary.thumbnail_failures = output.failures.len();
        summary.report_path = Some(report_path);

        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        PathBuf::from(&self.config.input_folder).join(&self.config.session_file)
    }

    fn write_log(&self, line: &str) {
        if let Err(e) = append_log_line(&self.config.output_log_file, line) {
            error!("写入日志文件失败: {}", e);
        }
    }
}

/// 把存储变更输出为 debug 日志
async fn log_store_events(mut events: broadcast::Receiver<StoreEvent>) {
    loop {
        match events.recv().await {
            Ok(StoreEvent::Updated { id, status }) => debug!("记录 {} → {}", id, status),
            Ok(event) => debug!("存储变更: {:?}", event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!("事件过多，跳过 {} 条", skipped)
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
