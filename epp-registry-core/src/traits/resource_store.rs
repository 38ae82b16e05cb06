//! 资源存储抽象 Trait
//!
//! 存储是唯一的共享可变资源与持久化边界：流程引擎自身不持有锁，
//! 所有协调都委托给存储的原子提交（乐观并发 + 版本校验）。

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::CoreResult;
use crate::types::{BillingEvent, EppResource, HistoryEntry, ResourceKind};

/// 一次流程事务要原子落盘的全部写入
///
/// 资源变更、历史记录与计费事件要么全部成功要么全部失败，
/// 不存在独立的历史提交路径。
#[derive(Debug, Clone, Default)]
pub struct CommitSet {
    /// 待写入的资源新版本（`revision` 为提交前读到的版本）
    pub writes: Vec<EppResource>,
    /// 追加的历史记录
    pub history: Vec<HistoryEntry>,
    /// 追加的计费事件
    pub billing: Vec<BillingEvent>,
}

impl CommitSet {
    /// 构建空提交集
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// 资源存储 Trait
///
/// 平台实现:
/// - 测试: `MockResourceStore` (`test_utils`)
/// - 生产: 事务型对象存储的适配层（外部）
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// 按仓库 ID 读取资源快照
    async fn load(&self, repo_id: &str) -> CoreResult<Option<EppResource>>;

    /// 按标识查找最近一个该标识的资源（含 tombstone，活跃性由调用方判定）
    async fn find_by_label(&self, kind: ResourceKind, label: &str)
        -> CoreResult<Option<EppResource>>;

    /// 查找把指定主机用作 nameserver 的域名仓库 ID
    ///
    /// 活跃性以调用方传入的 `now` 判定（流程事务单一时钟）：
    /// 赎回期内的域名仍然活跃，其委派仍然阻止主机删除。
    async fn domains_referencing_host(
        &self,
        host_name: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<Vec<String>>;

    /// 资源最近一条历史记录（幂等重放检测用）
    async fn latest_history(&self, repo_id: &str) -> CoreResult<Option<HistoryEntry>>;

    /// 原子提交
    ///
    /// # Errors
    /// * `FlowError::Contention` - 任一写入的 `revision` 与当前存储版本不符
    /// * `FlowError::StorageError` - 存储层故障
    async fn commit(&self, commit_set: CommitSet) -> CoreResult<()>;
}
