//! 识别流程编排 - 编排层
//!
//! ## 职责
//!
//! 按分组大小遍历存储，每组交给 `GroupFlow` 处理，汇总统计。
//!
//! ## 设计特点
//!
//! - **严格串行**：上一组的请求结束（成功或失败）后才开始下一组，同一时刻最多一个请求
//! - **幂等**：head 已完成的分组直接跳过，重复运行不会重复请求
//! - **失败隔离**：某一组失败只影响这一组，后续分组继续处理
//! - **无凭证即拒绝**：未配置 API Key 时不发起任何请求

use std::sync::Arc;

use tracing::error;

use crate::error::{AppResult, LabelerError};
use crate::infrastructure::RowStore;
use crate::models::GroupSize;
use crate::services::OcrEngine;
use crate::utils::logging;
use crate::workflow::{GroupCtx, GroupFlow, GroupOutcome};

/// 单组失败的提示信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFailure {
    pub group_index: usize,
    pub original_name: String,
    pub message: String,
}

/// 一次识别运行的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecognitionReport {
    pub total_groups: usize,
    pub labeled: usize,
    pub skipped: usize,
    pub failures: Vec<GroupFailure>,
}

impl RecognitionReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// 识别流程
pub struct RecognitionPipeline {
    flow: GroupFlow,
    group_size: GroupSize,
    credential: String,
}

impl RecognitionPipeline {
    pub fn new(engine: Arc<dyn OcrEngine>, group_size: GroupSize, credential: impl Into<String>) -> Self {
        Self {
            flow: GroupFlow::new(engine, group_size),
            group_size,
            credential: credential.into(),
        }
    }

    /// 处理整个存储
    pub async fn run(&self, store: &mut RowStore) -> AppResult<RecognitionReport> {
        if self.credential.trim().is_empty() {
            error!("❌ {}", LabelerError::MissingCredential);
            return Err(LabelerError::MissingCredential);
        }

        let total_groups = store.group_count(self.group_size);
        let mut report = RecognitionReport {
            total_groups,
            ..Default::default()
        };

        logging::log_recognition_start(store.len(), total_groups, self.group_size);

        for group_index in 0..total_groups {
            let Some(ctx) = GroupCtx::from_store(store, self.group_size, group_index) else {
                report.skipped += 1;
                continue;
            };

            match self.flow.run(store, &ctx, &self.credential).await? {
                GroupOutcome::Skipped => report.skipped += 1,
                GroupOutcome::Labeled { .. } => report.labeled += 1,
                GroupOutcome::Failed { message } => {
                    let original_name = ctx
                        .head_id()
                        .and_then(|id| store.get(id))
                        .map(|r| r.original_name.clone())
                        .unwrap_or_default();
                    report.failures.push(GroupFailure {
                        group_index,
                        original_name,
                        message,
                    });
                }
            }
        }

        logging::log_recognition_complete(&report);

        Ok(report)
    }
}
