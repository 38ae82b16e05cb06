//! EPP 响应类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resource::{EppResource, ResourceKind, StatusValue};
use super::transfer::TransferStatus;

/// RFC 5730 结果码
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ResultCode {
    /// 1000 命令成功
    Success,
    /// 1001 命令成功，动作待处理
    SuccessWithActionPending,
    /// 2001 命令语法错误
    CommandSyntaxError,
    /// 2002 命令使用错误
    CommandUseError,
    /// 2003 必需参数缺失
    RequiredParameterMissing,
    /// 2004 参数取值超出范围
    ParameterValueRangeError,
    /// 2102 未实现的选项
    UnimplementedOption,
    /// 2103 未实现的扩展
    UnimplementedExtension,
    /// 2201 授权错误
    AuthorizationError,
    /// 2202 授权信息无效
    InvalidAuthorizationInformation,
    /// 2300 对象存在待处理转移
    ObjectPendingTransfer,
    /// 2301 对象没有待处理转移
    ObjectNotPendingTransfer,
    /// 2302 对象已存在
    ObjectExists,
    /// 2303 对象不存在
    ObjectDoesNotExist,
    /// 2304 对象状态禁止操作
    StatusProhibitsOperation,
    /// 2305 对象关联禁止操作
    AssociationProhibitsOperation,
    /// 2306 参数取值违反策略
    ParameterValuePolicyError,
    /// 2400 命令执行失败
    CommandFailed,
}

impl ResultCode {
    /// 协议数字码
    #[must_use]
    pub fn numeric(self) -> u16 {
        match self {
            Self::Success => 1000,
            Self::SuccessWithActionPending => 1001,
            Self::CommandSyntaxError => 2001,
            Self::CommandUseError => 2002,
            Self::RequiredParameterMissing => 2003,
            Self::ParameterValueRangeError => 2004,
            Self::UnimplementedOption => 2102,
            Self::UnimplementedExtension => 2103,
            Self::AuthorizationError => 2201,
            Self::InvalidAuthorizationInformation => 2202,
            Self::ObjectPendingTransfer => 2300,
            Self::ObjectNotPendingTransfer => 2301,
            Self::ObjectExists => 2302,
            Self::ObjectDoesNotExist => 2303,
            Self::StatusProhibitsOperation => 2304,
            Self::AssociationProhibitsOperation => 2305,
            Self::ParameterValuePolicyError => 2306,
            Self::CommandFailed => 2400,
        }
    }

    /// 是否为成功类结果码（1xxx）
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::SuccessWithActionPending)
    }
}

/// 响应中携带的资源数据摘要
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSummary {
    /// 仓库 ID
    pub repo_id: String,
    /// 资源类型
    pub kind: ResourceKind,
    /// 标识（域名 / 联系人 ID / 主机名）
    pub label: String,
    /// 当前 sponsoring registrar
    pub sponsor_client_id: String,
    /// 协议状态集合
    pub statuses: Vec<StatusValue>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 最后更新时间
    pub updated_at: DateTime<Utc>,
    /// 注册到期时间（仅域名）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<DateTime<Utc>>,
    /// 删除时间（tombstone / 赎回期）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_time: Option<DateTime<Utc>>,
    /// 转移状态（存在转移记录时）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_status: Option<TransferStatus>,
    /// 转移自动批准时间（转移 Pending 时）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_expiration_time: Option<DateTime<Utc>>,
}

impl ResourceSummary {
    /// 从资源当前状态构建摘要
    #[must_use]
    pub fn from_resource(resource: &EppResource) -> Self {
        Self {
            repo_id: resource.repo_id.clone(),
            kind: resource.kind(),
            label: resource.label.clone(),
            sponsor_client_id: resource.sponsor_client_id.clone(),
            statuses: resource.statuses.iter().copied().collect(),
            created_at: resource.created_at,
            updated_at: resource.updated_at,
            expiration_time: resource.domain().map(|d| d.expiration_time),
            deletion_time: resource.deletion_time,
            transfer_status: resource.transfer.as_ref().map(|t| t.status),
            transfer_expiration_time: resource
                .transfer
                .as_ref()
                .filter(|t| t.status == TransferStatus::Pending)
                .map(|t| t.expiration_time),
        }
    }
}

/// EPP 响应
///
/// 每个请求（无论成功失败）都必须得到一个结构完整的响应；
/// 基础设施故障的细节只进日志，不进客户端可见载荷。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EppResponse {
    /// 结果码
    pub code: ResultCode,
    /// 结果描述
    pub message: String,
    /// 资源数据（成功时）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResourceSummary>,
    /// 客户端事务 ID（请求携带时回显）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_trid: Option<String>,
    /// 服务端事务 ID
    pub server_trid: String,
}

impl EppResponse {
    /// 构建成功响应
    #[must_use]
    pub fn success(
        code: ResultCode,
        data: Option<ResourceSummary>,
        client_trid: Option<String>,
        server_trid: String,
    ) -> Self {
        debug_assert!(code.is_success());
        Self {
            code,
            message: match code {
                ResultCode::SuccessWithActionPending => {
                    "Command completed successfully; action pending".to_string()
                }
                _ => "Command completed successfully".to_string(),
            },
            data,
            client_trid,
            server_trid,
        }
    }

    /// 构建失败响应
    #[must_use]
    pub fn failure(
        code: ResultCode,
        message: String,
        client_trid: Option<String>,
        server_trid: String,
    ) -> Self {
        Self {
            code,
            message,
            data: None,
            client_trid,
            server_trid,
        }
    }
}
