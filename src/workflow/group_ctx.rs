//! 分组处理上下文
//!
//! 封装"我正在处理第几组、由哪几条记录组成"这一信息

use std::fmt::Display;

use crate::infrastructure::RowStore;
use crate::models::GroupSize;

/// 分组处理上下文
#[derive(Debug, Clone)]
pub struct GroupCtx {
    /// 分组索引（从 0 开始）
    pub group_index: usize,

    /// 分组总数（仅用于日志显示）
    pub total_groups: usize,

    /// 组内记录 id，第一个为 head
    pub member_ids: Vec<String>,
}

impl GroupCtx {
    /// 根据当前顺序取出第 `group_index` 组
    pub fn from_store(store: &RowStore, group_size: GroupSize, group_index: usize) -> Option<Self> {
        let group = store.groups(group_size).nth(group_index)?;
        Some(Self {
            group_index,
            total_groups: store.group_count(group_size),
            member_ids: group.iter().map(|r| r.id.clone()).collect(),
        })
    }

    pub fn head_id(&self) -> Option<&str> {
        self.member_ids.first().map(String::as_str)
    }

    /// head 之后的记录，附带组内位置
    pub fn siblings(&self) -> impl Iterator<Item = (usize, &str)> {
        self.member_ids
            .iter()
            .enumerate()
            .skip(1)
            .map(|(slot, id)| (slot, id.as_str()))
    }
}

impl Display for GroupCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[分组 {}/{} 图片数#{}]",
            self.group_index + 1,
            self.total_groups,
            self.member_ids.len()
        )
    }
}
