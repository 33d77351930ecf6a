//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整体流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量图片处理器
//! - 管理应用生命周期（初始化、运行）
//! - 加载图片并恢复会话（RowStore）
//! - 调用识别流程、保存会话、导出
//! - 输出全局统计信息
//!
//! ### `recognition` - 识别流程
//! - 按分组遍历 RowStore
//! - 检查 API Key，逐组串行调用 GroupFlow
//! - 汇总成功 / 跳过 / 失败
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理整个图片目录)
//!     ↓
//! recognition (遍历所有分组)
//!     ↓
//! workflow::GroupFlow (处理单个分组)
//!     ↓
//! services (能力层：ocr / naming / archive / report)
//!     ↓
//! infrastructure (基础设施：RowStore)
//! ```

pub mod batch_processor;
pub mod recognition;

// 重新导出主要类型
pub use batch_processor::{App, RunSummary};
pub use recognition::{GroupFailure, RecognitionPipeline, RecognitionReport};
