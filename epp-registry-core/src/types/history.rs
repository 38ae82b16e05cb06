//! 历史记录与计费事件类型定义
//!
//! 历史记录只追加、永不修改；每次成功的流程事务恰好写入一条，
//! 与资源变更在同一次原子提交中落盘。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resource::EppResource;
use super::response::EppResponse;

/// 历史记录类别（资源类型 × 流程）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum HistoryType {
    DomainCreate,
    DomainUpdate,
    DomainRenew,
    DomainDelete,
    DomainTransferRequest,
    DomainTransferApprove,
    DomainTransferReject,
    DomainTransferCancel,
    ContactCreate,
    ContactUpdate,
    ContactDelete,
    ContactTransferRequest,
    ContactTransferApprove,
    ContactTransferReject,
    ContactTransferCancel,
    HostCreate,
    HostUpdate,
    HostDelete,
    HostTransferRequest,
    HostTransferApprove,
    HostTransferReject,
    HostTransferCancel,
}

/// 历史记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// 记录 ID (UUID)
    pub id: String,
    /// 所属资源的仓库 ID
    pub resource_repo_id: String,
    /// 记录类别
    pub entry_type: HistoryType,
    /// 变更时间（流程事务的 "now"）
    pub modification_time: DateTime<Utc>,
    /// 发起操作的注册商
    pub client_id: String,
    /// 客户端事务 ID（幂等重放检测的键）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_trid: Option<String>,
    /// 服务端事务 ID
    pub server_trid: String,
    /// 变更后的资源快照
    pub resource_snapshot: EppResource,
    /// 本次流程计算出的响应（重放时原样返回）
    pub response: EppResponse,
}

/// 计费事件类别
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum BillingEventKind {
    /// 创建计费
    Create { years: u32 },
    /// 显式续费计费
    Renew { years: u32 },
    /// 转移请求登记的待定计费
    TransferRequest,
    /// 转移批准（显式或隐式服务端批准）计费
    TransferApprove,
    /// 撤销此前登记的计费事件（宽限期内的反向操作）
    Cancellation { cancelled_event_id: String },
}

/// 计费事件
///
/// 流程引擎只负责随资源变更事务性地落盘事件记录，结算管线在外部。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillingEvent {
    /// 事件 ID (UUID)
    pub id: String,
    /// 所属资源的仓库 ID
    pub resource_repo_id: String,
    /// 计费对象注册商
    pub client_id: String,
    /// 事件时间
    pub event_time: DateTime<Utc>,
    /// 事件类别
    pub kind: BillingEventKind,
}

impl BillingEvent {
    /// 构建新的计费事件
    #[must_use]
    pub fn new(
        resource_repo_id: String,
        client_id: String,
        event_time: DateTime<Utc>,
        kind: BillingEventKind,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            resource_repo_id,
            client_id,
            event_time,
            kind,
        }
    }
}
