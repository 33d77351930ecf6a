//! 分组处理流程 - 流程层
//!
//! 核心职责：定义"一组图片"的完整处理流程
//!
//! 流程顺序：
//! 1. head 已完成 → 跳过整组
//! 2. head 标记为 processing → OCR
//! 3. 成功：head 写入标签，其余图片写入 `标签-2` / `标签-3`
//! 4. 失败：只有 head 标记为 error，其余保持不变

use std::sync::Arc;

use tracing::{error, info};

use crate::error::AppResult;
use crate::infrastructure::{RecordUpdate, RowStore};
use crate::models::{GroupSize, RecordStatus};
use crate::services::naming;
use crate::services::OcrEngine;
use crate::workflow::group_ctx::GroupCtx;

/// 分组处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOutcome {
    /// head 已完成（或不存在），整组跳过
    Skipped,
    /// 识别成功
    Labeled { label: String },
    /// 识别失败
    Failed { message: String },
}

/// 分组处理流程
///
/// - 每组只发起一次 OCR 请求（只针对 head）
/// - 不持有存储，只在处理期间借用
pub struct GroupFlow {
    engine: Arc<dyn OcrEngine>,
    group_size: GroupSize,
}

impl GroupFlow {
    pub fn new(engine: Arc<dyn OcrEngine>, group_size: GroupSize) -> Self {
        Self { engine, group_size }
    }

    pub async fn run(
        &self,
        store: &mut RowStore,
        ctx: &GroupCtx,
        credential: &str,
    ) -> AppResult<GroupOutcome> {
        let Some(head_id) = ctx.head_id() else {
            return Ok(GroupOutcome::Skipped);
        };

        match store.get(head_id) {
            None => return Ok(GroupOutcome::Skipped),
            Some(head) if head.status == RecordStatus::Completed => {
                info!("{} ⏭️ 已完成，跳过: {}", ctx, head.derived_name);
                return Ok(GroupOutcome::Skipped);
            }
            Some(_) => {}
        }

        store.update(head_id, RecordUpdate::status(RecordStatus::Processing))?;

        let result = match store.get(head_id) {
            Some(head) => {
                info!("{} 🔍 正在识别: {}", ctx, head.original_name);
                self.engine.recognize(credential, &head.file).await
            }
            None => return Ok(GroupOutcome::Skipped),
        };

        match result {
            Ok(raw) => {
                let label = naming::derive_label(&raw);
                store.update(head_id, RecordUpdate::labeled(label.clone()))?;

                for (slot, id) in ctx.siblings().take(self.group_size.get() - 1) {
                    store.update(id, RecordUpdate::labeled(naming::sibling_label(&label, slot)))?;
                }

                info!("{} ✓ 识别结果: {}", ctx, label);
                Ok(GroupOutcome::Labeled { label })
            }
            Err(e) => {
                store.update(head_id, RecordUpdate::status(RecordStatus::Error))?;
                error!("{} ❌ 识别失败: {}", ctx, e);
                Ok(GroupOutcome::Failed {
                    message: e.to_string(),
                })
            }
        }
    }
}
