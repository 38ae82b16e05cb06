//! 转移记录类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 转移状态
///
/// `Pending` 之外的状态均为终态；终态允许发起新的转移请求。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TransferStatus {
    Pending,
    ClientApproved,
    ClientRejected,
    ClientCancelled,
    ServerApproved,
    ServerCancelled,
}

impl TransferStatus {
    /// 是否为终态
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// 内嵌于资源的转移记录
///
/// 不变量：任一时刻至多一个 Pending 转移；gaining 与 losing 注册商必须不同；
/// 到期时间是请求时间与按资源类型配置的自动批准时长的确定函数。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferData {
    /// 当前转移状态
    pub status: TransferStatus,
    /// 受让注册商
    pub gaining_client_id: String,
    /// 出让注册商
    pub losing_client_id: String,
    /// 转移请求时间
    pub request_time: DateTime<Utc>,
    /// 自动批准时间 = 请求时间 + 配置时长
    pub expiration_time: DateTime<Utc>,
    /// 请求时登记的待定计费事件 ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_event_id: Option<String>,
}

impl TransferData {
    /// Pending 转移在 `now` 时刻是否已越过自动批准边界。
    ///
    /// 边界取闭区间：`now == expiration_time` 视为已到期（倾向于解决）。
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == TransferStatus::Pending && now >= self.expiration_time
    }
}
