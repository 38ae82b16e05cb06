//! EPP 资源类型定义
//!
//! Domain / Contact / Host 共享同一条公共基底记录，类型差异通过
//! `ResourceData` 标签变体表达，mutator 按变体显式分派。

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::transfer::TransferData;

/// 资源类型标签
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Domain,
    Contact,
    Host,
}

impl ResourceKind {
    /// 协议对象名（日志/错误信息用）
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Contact => "contact",
            Self::Host => "host",
        }
    }
}

/// 协议状态值
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum StatusValue {
    Ok,
    PendingDelete,
    PendingTransfer,
    ClientDeleteProhibited,
    ClientRenewProhibited,
    ClientTransferProhibited,
    ClientUpdateProhibited,
    ServerDeleteProhibited,
    ServerRenewProhibited,
    ServerTransferProhibited,
    ServerUpdateProhibited,
}

impl StatusValue {
    /// 是否为仅服务端可设置的状态
    #[must_use]
    pub fn is_server_settable_only(self) -> bool {
        matches!(
            self,
            Self::PendingDelete
                | Self::PendingTransfer
                | Self::ServerDeleteProhibited
                | Self::ServerRenewProhibited
                | Self::ServerTransferProhibited
                | Self::ServerUpdateProhibited
        )
    }
}

/// 宽限期类别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum GracePeriodKind {
    /// 创建后的 add 宽限期
    Add,
    /// 显式续费宽限期
    Renew,
    /// 自动续费宽限期
    AutoRenew,
    /// 转移完成宽限期
    Transfer,
    /// 删除后的赎回期
    Redemption,
}

/// 域名上的活动宽限期
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GracePeriod {
    /// 类别
    pub kind: GracePeriodKind,
    /// 失效时间
    pub expires_at: DateTime<Utc>,
    /// 关联的计费事件 ID（宽限期内撤销操作时需要对账）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_event_id: Option<String>,
}

impl GracePeriod {
    /// 宽限期在 `now` 时刻是否仍然有效
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// DNSSEC DS 记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DsRecord {
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    pub digest: String,
}

/// 域名专有数据
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomainData {
    /// 注册人联系人 ID
    pub registrant: String,
    /// 注册到期时间
    pub expiration_time: DateTime<Utc>,
    /// 委派的 nameserver 主机名
    #[serde(default)]
    pub nameservers: Vec<String>,
    /// DNSSEC DS 记录
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ds_records: Vec<DsRecord>,
    /// 转移授权密钥
    pub auth_info: String,
    /// 当前活动的宽限期
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grace_periods: Vec<GracePeriod>,
}

/// 联系人专有数据
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactData {
    /// 姓名
    pub name: String,
    /// 邮箱
    pub email: String,
    /// 转移授权密钥
    pub auth_info: String,
}

/// 主机专有数据
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HostData {
    /// 粘连地址（仅 in-bailiwick 主机需要）
    #[serde(default)]
    pub addresses: Vec<String>,
}

/// 资源类型差异数据
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResourceData {
    Domain(DomainData),
    Contact(ContactData),
    Host(HostData),
}

/// EPP 资源
///
/// 资源是事务一致性的单位：`TransferData`、状态集合与宽限期均由其独占持有。
/// 删除通过设置 `deletion_time` 实现（tombstone），物理清理由外部任务负责。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EppResource {
    /// 仓库 ID（不可变、全局唯一）
    pub repo_id: String,
    /// 标识：域名 FQDN / 联系人 ID / 主机 FQDN
    pub label: String,
    /// 当前 sponsoring registrar
    pub sponsor_client_id: String,
    /// 创建此资源的注册商
    pub creating_client_id: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 最后更新时间
    pub updated_at: DateTime<Utc>,
    /// 删除时间；`now < deletion_time` 期间资源仍然活跃（赎回期）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_time: Option<DateTime<Utc>>,
    /// 协议状态集合
    pub statuses: BTreeSet<StatusValue>,
    /// 转移记录（从未发生过转移时为 None）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer: Option<TransferData>,
    /// 乐观并发版本号，由存储层在提交时校验并递增
    pub revision: u64,
    /// 类型差异数据
    pub data: ResourceData,
}

impl EppResource {
    /// 资源类型标签
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self.data {
            ResourceData::Domain(_) => ResourceKind::Domain,
            ResourceData::Contact(_) => ResourceKind::Contact,
            ResourceData::Host(_) => ResourceKind::Host,
        }
    }

    /// 资源在 `now` 时刻是否活跃（未被 tombstone）
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        match self.deletion_time {
            None => true,
            Some(t) => now < t,
        }
    }

    /// 域名数据视图
    #[must_use]
    pub fn domain(&self) -> Option<&DomainData> {
        match &self.data {
            ResourceData::Domain(d) => Some(d),
            _ => None,
        }
    }

    /// 域名数据可变视图
    pub fn domain_mut(&mut self) -> Option<&mut DomainData> {
        match &mut self.data {
            ResourceData::Domain(d) => Some(d),
            _ => None,
        }
    }

    /// 资源携带的 auth info（主机没有）
    #[must_use]
    pub fn auth_info(&self) -> Option<&str> {
        match &self.data {
            ResourceData::Domain(d) => Some(&d.auth_info),
            ResourceData::Contact(c) => Some(&c.auth_info),
            ResourceData::Host(_) => None,
        }
    }

    /// 是否存在待处理的转移
    #[must_use]
    pub fn has_pending_transfer(&self) -> bool {
        self.transfer
            .as_ref()
            .is_some_and(|t| t.status == super::transfer::TransferStatus::Pending)
    }

    /// 刷新最后更新时间
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    fn host(deletion_time: Option<DateTime<Utc>>) -> EppResource {
        EppResource {
            repo_id: "repo-1".to_string(),
            label: "ns1.example.tld".to_string(),
            sponsor_client_id: "RegistrarA".to_string(),
            creating_client_id: "RegistrarA".to_string(),
            created_at: t(0),
            updated_at: t(0),
            deletion_time,
            statuses: BTreeSet::from([StatusValue::Ok]),
            transfer: None,
            revision: 0,
            data: ResourceData::Host(HostData { addresses: vec![] }),
        }
    }

    #[test]
    fn live_without_deletion_time() {
        assert!(host(None).is_live(t(1000)));
    }

    #[test]
    fn live_during_redemption_window() {
        let r = host(Some(t(2000)));
        assert!(r.is_live(t(1999)));
    }

    #[test]
    fn tombstoned_at_and_after_deletion_time() {
        let r = host(Some(t(2000)));
        assert!(!r.is_live(t(2000)));
        assert!(!r.is_live(t(3000)));
    }

    #[test]
    fn host_has_no_auth_info() {
        assert!(host(None).auth_info().is_none());
    }

    #[test]
    fn server_only_statuses() {
        assert!(StatusValue::ServerUpdateProhibited.is_server_settable_only());
        assert!(StatusValue::PendingDelete.is_server_settable_only());
        assert!(!StatusValue::ClientUpdateProhibited.is_server_settable_only());
    }
}
