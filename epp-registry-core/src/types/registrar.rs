//! 注册商类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 注册商状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RegistrarStatus {
    /// 活跃，可执行流程
    Active,
    /// 停用，所有命令拒绝
    Suspended,
}

/// 注册商档案
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Registrar {
    /// EPP 客户端 ID
    pub client_id: String,
    /// 展示名称（WHOIS 输出用）
    pub display_name: String,
    /// 状态
    pub status: RegistrarStatus,
    /// 接入时间
    #[serde(with = "crate::utils::datetime")]
    pub created_at: DateTime<Utc>,
}

impl Registrar {
    /// 是否允许执行流程
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == RegistrarStatus::Active
    }
}
