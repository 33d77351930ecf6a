//! 行存储 - 基础设施层
//!
//! 有序的 `ImageRecord` 列表，是识别流程和导出的唯一数据源。
//! 记录的位置决定分组：`[k*g, k*g+g)` 为第 k 组。

use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{AppResult, LabelerError};
use crate::models::{GroupSize, ImageRecord, RecordStatus};

const EVENT_CAPACITY: usize = 256;

/// 存储变更通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// 追加了一批记录
    Appended { count: usize },
    /// 某条记录的名称或状态发生变化
    Updated { id: String, status: RecordStatus },
    /// 删除了一条记录
    Removed { id: String },
    /// 整体顺序被替换
    Reordered,
    /// 全部清空
    Cleared,
}

/// 对单条记录的修改
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    pub derived_name: Option<String>,
    pub status: Option<RecordStatus>,
}

impl RecordUpdate {
    pub fn status(status: RecordStatus) -> Self {
        Self {
            derived_name: None,
            status: Some(status),
        }
    }

    pub fn labeled(derived_name: impl Into<String>) -> Self {
        Self {
            derived_name: Some(derived_name.into()),
            status: Some(RecordStatus::Completed),
        }
    }
}

/// 行存储
///
/// 所有修改都通过 `&mut self` 进行，同一时刻只有一个修改者。
pub struct RowStore {
    records: Vec<ImageRecord>,
    events: broadcast::Sender<StoreEvent>,
}

impl RowStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            records: Vec::new(),
            events,
        }
    }

    /// 从已有记录创建
    pub fn from_records(records: Vec<ImageRecord>) -> Self {
        let mut store = Self::new();
        store.records = records;
        store
    }

    /// 订阅变更通知
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ImageRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    /// 追加一批记录（保持顺序）
    pub fn append(&mut self, batch: Vec<ImageRecord>) {
        let count = batch.len();
        if count == 0 {
            return;
        }
        self.records.extend(batch);
        debug!("追加 {} 条记录，当前共 {} 条", count, self.records.len());
        self.notify(StoreEvent::Appended { count });
    }

    /// 更新某条记录的名称和/或状态
    pub fn update(&mut self, id: &str, update: RecordUpdate) -> AppResult<()> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| LabelerError::RecordNotFound { id: id.to_string() })?;

        if let Some(name) = update.derived_name {
            record.derived_name = name;
        }
        if let Some(status) = update.status {
            record.status = status;
        }

        let event = StoreEvent::Updated {
            id: record.id.clone(),
            status: record.status,
        };
        self.notify(event);
        Ok(())
    }

    /// 用户手动修改名称，只在识别结束（completed / error）后允许
    pub fn rename(&mut self, id: &str, derived_name: impl Into<String>) -> AppResult<()> {
        let record = self
            .get(id)
            .ok_or_else(|| LabelerError::RecordNotFound { id: id.to_string() })?;

        if !record.status.is_editable() {
            return Err(LabelerError::NotEditable {
                id: id.to_string(),
                status: record.status.to_string(),
            });
        }

        self.update(
            id,
            RecordUpdate {
                derived_name: Some(derived_name.into()),
                status: None,
            },
        )
    }

    /// 删除一条记录，正在识别中的记录不能删除
    pub fn remove(&mut self, id: &str) -> AppResult<ImageRecord> {
        let index = self
            .position(id)
            .ok_or_else(|| LabelerError::RecordNotFound { id: id.to_string() })?;

        if self.records[index].status == RecordStatus::Processing {
            return Err(LabelerError::RecordBusy { id: id.to_string() });
        }

        let removed = self.records.remove(index);
        self.notify(StoreEvent::Removed { id: removed.id.clone() });
        Ok(removed)
    }

    /// 用新的 id 顺序替换整个列表
    ///
    /// `ids` 必须恰好是现有记录 id 的一个排列。
    pub fn reorder(&mut self, ids: &[String]) -> AppResult<()> {
        let mismatch = || LabelerError::ReorderMismatch {
            expected: self.records.len(),
            actual: ids.len(),
        };

        if ids.len() != self.records.len() {
            return Err(mismatch());
        }

        let mut remaining: Vec<Option<ImageRecord>> = self.records.iter().cloned().map(Some).collect();
        let mut reordered = Vec::with_capacity(ids.len());
        for id in ids {
            let slot = remaining
                .iter_mut()
                .find(|slot| slot.as_ref().map(|r| &r.id == id).unwrap_or(false))
                .ok_or_else(mismatch)?;
            if let Some(record) = slot.take() {
                reordered.push(record);
            }
        }

        self.records = reordered;
        self.notify(StoreEvent::Reordered);
        Ok(())
    }

    /// 把 `from` 位置的记录移动到 `to`（拖拽排序）
    pub fn move_record(&mut self, from: usize, to: usize) -> AppResult<()> {
        let len = self.records.len();
        if from >= len || to >= len {
            return Err(LabelerError::ReorderMismatch {
                expected: len,
                actual: from.max(to) + 1,
            });
        }
        if from == to {
            return Ok(());
        }

        let record = self.records.remove(from);
        self.records.insert(to, record);
        self.notify(StoreEvent::Reordered);
        Ok(())
    }

    /// 清空所有记录
    pub fn clear(&mut self) {
        self.records.clear();
        self.notify(StoreEvent::Cleared);
    }

    /// 按分组大小切分，最后一组可能不满
    pub fn groups(&self, group_size: GroupSize) -> std::slice::Chunks<'_, ImageRecord> {
        self.records.chunks(group_size.get())
    }

    /// 分组数量 = ⌈N / g⌉
    pub fn group_count(&self, group_size: GroupSize) -> usize {
        self.records.len().div_ceil(group_size.get())
    }

    fn notify(&self, event: StoreEvent) {
        // 没有订阅者时发送会失败，忽略即可
        let _ = self.events.send(event);
    }
}

impl Default for RowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_of(names: &[&str]) -> RowStore {
        RowStore::from_records(
            names
                .iter()
                .map(|n| ImageRecord::from_bytes(*n, n.as_bytes().to_vec()))
                .collect(),
        )
    }

    fn names(store: &RowStore) -> Vec<&str> {
        store.records().iter().map(|r| r.original_name.as_str()).collect()
    }

    fn ids(store: &RowStore) -> Vec<String> {
        store.records().iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_groups_partition_store() {
        for n in 0..8 {
            let store = store_of(&["a.jpg"; 8][..n]);
            for size in [GroupSize::Pair, GroupSize::Triplet] {
                let g = size.get();
                let groups: Vec<_> = store.groups(size).collect();
                assert_eq!(groups.len(), (n + g - 1) / g);
                assert_eq!(store.group_count(size), groups.len());
                assert_eq!(groups.iter().map(|c| c.len()).sum::<usize>(), n);
                if let Some((last, full)) = groups.split_last() {
                    assert!(full.iter().all(|c| c.len() == g));
                    assert!(!last.is_empty() && last.len() <= g);
                }
            }
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let mut store = store_of(&["a.jpg", "b.jpg"]);
        store.append(vec![
            ImageRecord::from_bytes("c.jpg", vec![]),
            ImageRecord::from_bytes("d.jpg", vec![]),
        ]);
        assert_eq!(names(&store), vec!["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);
    }

    #[test]
    fn test_update_sets_name_and_status() {
        let mut store = store_of(&["a.jpg"]);
        let id = store.records()[0].id.clone();

        store.update(&id, RecordUpdate::labeled("R-1")).unwrap();

        let record = store.get(&id).unwrap();
        assert_eq!(record.derived_name, "R-1");
        assert_eq!(record.status, RecordStatus::Completed);

        let missing = store.update("nope", RecordUpdate::status(RecordStatus::Error));
        assert!(matches!(missing, Err(LabelerError::RecordNotFound { .. })));
    }

    #[test]
    fn test_rename_only_after_recognition_finished() {
        let mut store = store_of(&["a.jpg", "b.jpg"]);
        let first = store.records()[0].id.clone();
        let second = store.records()[1].id.clone();

        assert!(matches!(
            store.rename(&first, "ACC-1"),
            Err(LabelerError::NotEditable { .. })
        ));

        store.update(&first, RecordUpdate::labeled("ACC-1")).unwrap();
        store.rename(&first, "ACC-10").unwrap();
        assert_eq!(store.get(&first).unwrap().derived_name, "ACC-10");
        assert_eq!(store.get(&first).unwrap().status, RecordStatus::Completed);

        store.update(&second, RecordUpdate::status(RecordStatus::Error)).unwrap();
        store.rename(&second, "R-4").unwrap();
        assert_eq!(store.get(&second).unwrap().derived_name, "R-4");
    }

    #[test]
    fn test_remove_refuses_processing_record() {
        let mut store = store_of(&["a.jpg", "b.jpg"]);
        let first = store.records()[0].id.clone();

        store.update(&first, RecordUpdate::status(RecordStatus::Processing)).unwrap();
        assert!(matches!(store.remove(&first), Err(LabelerError::RecordBusy { .. })));

        store.update(&first, RecordUpdate::status(RecordStatus::Error)).unwrap();
        let removed = store.remove(&first).unwrap();
        assert_eq!(removed.original_name, "a.jpg");
        assert_eq!(names(&store), vec!["b.jpg"]);
    }

    #[test]
    fn test_reorder_changes_group_membership() {
        let mut store = store_of(&["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);
        let mut order = ids(&store);
        order.swap(1, 2);

        store.reorder(&order).unwrap();

        let groups: Vec<Vec<&str>> = store
            .groups(GroupSize::Pair)
            .map(|g| g.iter().map(|r| r.original_name.as_str()).collect())
            .collect();
        assert_eq!(groups, vec![vec!["a.jpg", "c.jpg"], vec!["b.jpg", "d.jpg"]]);
    }

    #[test]
    fn test_reorder_rejects_non_permutation() {
        let mut store = store_of(&["a.jpg", "b.jpg"]);
        let first = store.records()[0].id.clone();

        let duplicated = vec![first.clone(), first.clone()];
        assert!(store.reorder(&duplicated).is_err());
        assert!(store.reorder(&[first]).is_err());
        assert_eq!(names(&store), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_move_record() {
        let mut store = store_of(&["a.jpg", "b.jpg", "c.jpg"]);
        store.move_record(2, 0).unwrap();
        assert_eq!(names(&store), vec!["c.jpg", "a.jpg", "b.jpg"]);
        store.move_record(0, 2).unwrap();
        assert_eq!(names(&store), vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert!(store.move_record(0, 3).is_err());
    }

    #[test]
    fn test_subscribers_receive_events() {
        let mut store = store_of(&["a.jpg"]);
        let mut rx = store.subscribe();
        let id = store.records()[0].id.clone();

        store.append(vec![ImageRecord::from_bytes("b.jpg", vec![])]);
        store.update(&id, RecordUpdate::status(RecordStatus::Processing)).unwrap();
        store.clear();

        assert_eq!(rx.try_recv().unwrap(), StoreEvent::Appended { count: 1 });
        assert_eq!(
            rx.try_recv().unwrap(),
            StoreEvent::Updated {
                id,
                status: RecordStatus::Processing
            }
        );
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::Cleared);
        assert!(store.is_empty());
    }
}
