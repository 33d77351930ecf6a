//! # Photo Labeler
//!
//! 一个用于批量识别设备贴纸标签并重命名照片的 Rust 应用程序
//!
//! 照片按固定大小分组（两张或三张一组），每组只把第一张发送给 OCR 模型，
//! 识别出的标签（如 `ACC-5`、`R-12`）派生给组内其他图片，最后导出
//! 重命名后的 ZIP 和带缩略图的 Excel 报表。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有唯一数据源
//! - `RowStore` - 有序的图片记录列表，提供追加 / 更新 / 删除 / 重排
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `OcrService` - 识别单张图片上的标签
//! - `naming` - 标签清洗与派生命名
//! - `ArchiveWriter` / `ReportWriter` - ZIP 与 Excel 导出
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一组图片"的完整处理流程
//! - `GroupCtx` - 上下文封装（分组索引 + 组内记录）
//! - `GroupFlow` - 流程编排（跳过判断 → OCR → 派生命名）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/recognition` - 逐组串行识别
//! - `orchestrator/batch_processor` - 加载、识别、保存会话、导出
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppResult, LabelerError};
pub use infrastructure::{RecordUpdate, RowStore, StoreEvent};
pub use models::{GroupSize, ImagePayload, ImageRecord, RecordStatus};
pub use orchestrator::{App, RecognitionPipeline, RecognitionReport, RunSummary};
pub use services::{ArchiveWriter, OcrEngine, OcrService, ReportWriter};
pub use workflow::{GroupCtx, GroupFlow, GroupOutcome};
