//! WHOIS 结构化查询结果类型
//!
//! 只输出公开数据：auth info、计费事件、内部版本号一概不出现。
//! 文本渲染（RFC 3912 报文排版）由外部负责。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use epp_registry_core::types::{StatusValue, TransferStatus};

/// 域名查询结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WhoisDomainRecord {
    /// 域名
    pub domain: String,
    /// sponsoring registrar 展示名称
    pub registrar: String,
    /// 协议状态
    pub statuses: Vec<StatusValue>,
    /// 创建时间
    pub created: DateTime<Utc>,
    /// 最后更新时间
    pub updated: DateTime<Utc>,
    /// 注册到期时间
    pub expiration: DateTime<Utc>,
    /// 委派 nameserver
    pub name_servers: Vec<String>,
    /// 是否启用 DNSSEC（存在 DS 记录）
    pub dnssec_signed: bool,
    /// 当前转移状态（发生过转移时）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_status: Option<TransferStatus>,
}

/// 主机查询结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WhoisHostRecord {
    /// 主机名
    pub host: String,
    /// sponsoring registrar 展示名称
    pub registrar: String,
    /// 协议状态
    pub statuses: Vec<StatusValue>,
    /// 粘连地址
    pub addresses: Vec<String>,
    /// 创建时间
    pub created: DateTime<Utc>,
}

/// 注册商查询结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WhoisRegistrarRecord {
    /// EPP 客户端 ID
    pub client_id: String,
    /// 展示名称
    pub display_name: String,
    /// 是否活跃
    pub active: bool,
    /// 接入时间
    pub created: DateTime<Utc>,
}
