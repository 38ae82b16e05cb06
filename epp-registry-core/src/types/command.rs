//! EPP 命令类型定义
//!
//! 命令由外部传输层完成 XML 反序列化后以类型化对象进入流程引擎，
//! 引擎本身不解析原始字节。

use serde::{Deserialize, Serialize};

use super::resource::{DsRecord, ResourceKind, StatusValue};

/// 会话特权级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrivilegeLevel {
    Normal,
    Superuser,
}

/// 会话上下文（由传输/会话层建立）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    /// 已登录的注册商
    pub client_id: String,
    /// 特权级别
    pub privilege: PrivilegeLevel,
}

impl SessionContext {
    /// 普通注册商会话
    #[must_use]
    pub fn normal(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            privilege: PrivilegeLevel::Normal,
        }
    }

    /// 是否为超级用户
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.privilege == PrivilegeLevel::Superuser
    }
}

/// 创建命令载荷（按资源类型区分）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CreateArgs {
    Domain {
        /// 注册年限（缺省 1 年）
        #[serde(default)]
        period_years: Option<u32>,
        /// 注册人联系人 ID
        registrant: String,
        /// 委派 nameserver
        #[serde(default)]
        nameservers: Vec<String>,
        /// DNSSEC DS 记录
        #[serde(default)]
        ds_records: Vec<DsRecord>,
        /// 转移授权密钥
        auth_info: String,
    },
    Contact {
        name: String,
        email: String,
        auth_info: String,
    },
    Host {
        #[serde(default)]
        addresses: Vec<String>,
    },
}

/// 更新命令载荷
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArgs {
    /// 新增状态
    #[serde(default)]
    pub add_statuses: Vec<StatusValue>,
    /// 移除状态
    #[serde(default)]
    pub remove_statuses: Vec<StatusValue>,
    /// 新增 nameserver（仅域名）
    #[serde(default)]
    pub add_nameservers: Vec<String>,
    /// 移除 nameserver（仅域名）
    #[serde(default)]
    pub remove_nameservers: Vec<String>,
    /// 新增 DS 记录（仅域名）
    #[serde(default)]
    pub add_ds_records: Vec<DsRecord>,
    /// 移除 DS 记录（仅域名）
    #[serde(default)]
    pub remove_ds_records: Vec<DsRecord>,
    /// 替换 auth info
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_auth_info: Option<String>,
    /// 新增粘连地址（仅主机）
    #[serde(default)]
    pub add_addresses: Vec<String>,
    /// 移除粘连地址（仅主机）
    #[serde(default)]
    pub remove_addresses: Vec<String>,
    /// 替换邮箱（仅联系人）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_email: Option<String>,
}

/// 转移子命令
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransferOp {
    Request,
    Approve,
    Reject,
    Cancel,
}

/// 命令操作
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum CommandOp {
    Create(CreateArgs),
    Update(UpdateArgs),
    Delete,
    Renew {
        /// 客户端认为的当前到期时间（防止盲目重复续费）
        current_expiration: chrono::DateTime<chrono::Utc>,
        /// 续费年限
        years: u32,
    },
    Transfer(TransferOp),
}

impl CommandOp {
    /// 操作名（日志用）
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update(_) => "update",
            Self::Delete => "delete",
            Self::Renew { .. } => "renew",
            Self::Transfer(TransferOp::Request) => "transfer-request",
            Self::Transfer(TransferOp::Approve) => "transfer-approve",
            Self::Transfer(TransferOp::Reject) => "transfer-reject",
            Self::Transfer(TransferOp::Cancel) => "transfer-cancel",
        }
    }
}

/// 类型化 EPP 命令
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EppCommand {
    /// 客户端事务 ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_trid: Option<String>,
    /// 命令声明的扩展 URI
    #[serde(default)]
    pub extensions: Vec<String>,
    /// 命令携带的 auth info（转移请求必需）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_info: Option<String>,
    /// 目标资源类型
    pub kind: ResourceKind,
    /// 目标资源标识
    pub target: String,
    /// 操作
    pub op: CommandOp,
}

impl EppCommand {
    /// 构建不带扩展与 auth info 的命令
    #[must_use]
    pub fn new(kind: ResourceKind, target: impl Into<String>, op: CommandOp) -> Self {
        Self {
            client_trid: None,
            extensions: Vec::new(),
            auth_info: None,
            kind,
            target: target.into(),
            op,
        }
    }

    /// 附加客户端事务 ID
    #[must_use]
    pub fn with_client_trid(mut self, trid: impl Into<String>) -> Self {
        self.client_trid = Some(trid.into());
        self
    }

    /// 附加 auth info
    #[must_use]
    pub fn with_auth_info(mut self, auth_info: impl Into<String>) -> Self {
        self.auth_info = Some(auth_info.into());
        self
    }
}
