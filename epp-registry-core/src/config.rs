//! 注册局策略配置
//!
//! 所有时长以天/毫秒整数存储，便于从平台层的 JSON 配置直接反序列化；
//! 流程代码通过帮助方法取得 `chrono::Duration`。

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::ResourceKind;

/// 注册局策略常量
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistryConfig {
    /// 域名转移自动批准等待期（天）
    pub domain_automatic_transfer_days: i64,
    /// 联系人转移自动批准等待期（天）
    pub contact_automatic_transfer_days: i64,
    /// 主机转移自动批准等待期（天）
    pub host_automatic_transfer_days: i64,
    /// 创建后 add 宽限期（天）
    pub add_grace_days: i64,
    /// 显式续费宽限期（天）
    pub renew_grace_days: i64,
    /// 自动续费宽限期（天）
    pub auto_renew_grace_days: i64,
    /// 转移完成宽限期（天）
    pub transfer_grace_days: i64,
    /// 删除后的赎回期（天）
    pub redemption_days: i64,
    /// 单域名 nameserver 上限
    pub max_nameservers: usize,
    /// 单域名 DS 记录上限
    pub max_ds_records: usize,
    /// 注册/续费年限上限
    pub max_registration_years: u32,
    /// 存储争用重试上限（不含首次尝试）
    pub store_retry_attempts: u32,
    /// 重试退避基准（毫秒），按尝试次数翻倍
    pub store_retry_base_delay_ms: u64,
    /// 允许的 EPP 扩展 URI
    pub supported_extensions: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            domain_automatic_transfer_days: 5,
            contact_automatic_transfer_days: 5,
            host_automatic_transfer_days: 5,
            add_grace_days: 5,
            renew_grace_days: 5,
            auto_renew_grace_days: 45,
            transfer_grace_days: 5,
            redemption_days: 30,
            max_nameservers: 13,
            max_ds_records: 8,
            max_registration_years: 10,
            store_retry_attempts: 3,
            store_retry_base_delay_ms: 20,
            supported_extensions: vec!["urn:ietf:params:xml:ns:secDNS-1.1".to_string()],
        }
    }
}

impl RegistryConfig {
    /// 按资源类型取转移自动批准等待期
    #[must_use]
    pub fn automatic_transfer_length(&self, kind: ResourceKind) -> Duration {
        let days = match kind {
            ResourceKind::Domain => self.domain_automatic_transfer_days,
            ResourceKind::Contact => self.contact_automatic_transfer_days,
            ResourceKind::Host => self.host_automatic_transfer_days,
        };
        Duration::days(days)
    }

    /// add 宽限期
    #[must_use]
    pub fn add_grace_length(&self) -> Duration {
        Duration::days(self.add_grace_days)
    }

    /// 续费宽限期
    #[must_use]
    pub fn renew_grace_length(&self) -> Duration {
        Duration::days(self.renew_grace_days)
    }

    /// 自动续费宽限期
    #[must_use]
    pub fn auto_renew_grace_length(&self) -> Duration {
        Duration::days(self.auto_renew_grace_days)
    }

    /// 转移宽限期
    #[must_use]
    pub fn transfer_grace_length(&self) -> Duration {
        Duration::days(self.transfer_grace_days)
    }

    /// 赎回期
    #[must_use]
    pub fn redemption_length(&self) -> Duration {
        Duration::days(self.redemption_days)
    }

    /// 扩展 URI 是否受支持
    #[must_use]
    pub fn supports_extension(&self, uri: &str) -> bool {
        self.supported_extensions.iter().any(|e| e == uri)
    }
}
