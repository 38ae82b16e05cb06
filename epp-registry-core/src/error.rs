//! 统一错误类型定义
//!
//! 业务/协议错误在流程内部被转换为 EPP 结果码，绝不跨越 orchestrator 向外抛出；
//! 基础设施错误（存储争用、未预期故障）是唯一按运维级别处理的类别。

use serde::Serialize;
use thiserror::Error;

use crate::types::ResultCode;

/// 流程层错误类型
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum FlowError {
    /// 命令语法/结构错误
    #[error("Command syntax error: {0}")]
    SyntaxError(String),

    /// 必需参数缺失
    #[error("Required parameter missing: {0}")]
    RequiredParameterMissing(String),

    /// 参数取值超出协议允许范围
    #[error("Parameter value range error: {0}")]
    ParameterRange(String),

    /// 参数取值违反注册局策略
    #[error("Parameter value policy error: {0}")]
    ParameterPolicy(String),

    /// 不支持的 EPP 扩展
    #[error("Unimplemented extension: {0}")]
    UnimplementedExtension(String),

    /// 目标资源不存在（或已成为 tombstone）
    #[error("Object does not exist: {0}")]
    ObjectDoesNotExist(String),

    /// 创建时标识已被占用
    #[error("Object exists: {0}")]
    ObjectExists(String),

    /// 当前注册商不是资源的 sponsoring registrar
    #[error("Resource not owned by registrar: {0}")]
    ResourceNotOwned(String),

    /// 注册商不存在或已被停用
    #[error("Registrar not active: {0}")]
    RegistrarNotActive(String),

    /// auth info 不匹配
    #[error("Bad auth info for resource: {0}")]
    BadAuthInfo(String),

    /// 转移请求缺少必需的 auth info
    #[error("Missing transfer request auth info for: {0}")]
    MissingTransferRequestAuthInfo(String),

    /// 资源已存在待处理转移
    #[error("Transfer already pending for: {0}")]
    AlreadyPendingTransfer(String),

    /// 请求方已经是资源的 sponsoring registrar
    #[error("Object already sponsored by requesting registrar: {0}")]
    ObjectAlreadySponsored(String),

    /// 资源没有待处理的转移
    #[error("Transfer not pending for: {0}")]
    NotPendingTransfer(String),

    /// 资源状态禁止此操作
    #[error("Status prohibits operation: {0}")]
    StatusProhibitsOperation(String),

    /// 主机仍被活跃域名引用，禁止删除
    #[error("Host is still linked to a domain: {0}")]
    HostLinked(String),

    /// 存储层乐观并发冲突（可重试）
    #[error("Store contention: {0}")]
    Contention(String),

    /// 存储层故障
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 未预期的内部故障
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl FlowError {
    /// 是否属于预期内的业务失败（用于日志分级）。
    ///
    /// 返回 `true` 时使用 `warn` 级别，返回 `false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        !matches!(
            self,
            Self::Contention(_)
                | Self::StorageError(_)
                | Self::SerializationError(_)
                | Self::InternalError(_)
        )
    }

    /// 是否为可重试的瞬时故障（仅存储争用）。
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Contention(_))
    }

    /// 映射到 RFC 5730 结果码。
    #[must_use]
    pub fn result_code(&self) -> ResultCode {
        match self {
            Self::SyntaxError(_) => ResultCode::CommandSyntaxError,
            Self::RequiredParameterMissing(_) => ResultCode::RequiredParameterMissing,
            Self::ParameterRange(_) => ResultCode::ParameterValueRangeError,
            Self::ParameterPolicy(_) => ResultCode::ParameterValuePolicyError,
            Self::UnimplementedExtension(_) => ResultCode::UnimplementedExtension,
            Self::ObjectDoesNotExist(_) => ResultCode::ObjectDoesNotExist,
            Self::ObjectExists(_) => ResultCode::ObjectExists,
            Self::ResourceNotOwned(_)
            | Self::RegistrarNotActive(_)
            | Self::MissingTransferRequestAuthInfo(_) => ResultCode::AuthorizationError,
            Self::BadAuthInfo(_) => ResultCode::InvalidAuthorizationInformation,
            Self::AlreadyPendingTransfer(_) => ResultCode::ObjectPendingTransfer,
            Self::ObjectAlreadySponsored(_) => ResultCode::CommandUseError,
            Self::NotPendingTransfer(_) => ResultCode::ObjectNotPendingTransfer,
            Self::StatusProhibitsOperation(_) => ResultCode::StatusProhibitsOperation,
            Self::HostLinked(_) => ResultCode::AssociationProhibitsOperation,
            Self::Contention(_)
            | Self::StorageError(_)
            | Self::SerializationError(_)
            | Self::InternalError(_) => ResultCode::CommandFailed,
        }
    }
}

/// 流程层 Result 类型别名
pub type CoreResult<T> = std::result::Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_are_expected() {
        assert!(FlowError::ObjectDoesNotExist("x".into()).is_expected());
        assert!(FlowError::AlreadyPendingTransfer("x".into()).is_expected());
        assert!(FlowError::BadAuthInfo("x".into()).is_expected());
    }

    #[test]
    fn infrastructure_errors_are_not_expected() {
        assert!(!FlowError::Contention("rev mismatch".into()).is_expected());
        assert!(!FlowError::StorageError("io".into()).is_expected());
        assert!(!FlowError::InternalError("boom".into()).is_expected());
    }

    #[test]
    fn only_contention_is_retryable() {
        assert!(FlowError::Contention("x".into()).is_retryable());
        assert!(!FlowError::StorageError("x".into()).is_retryable());
        assert!(!FlowError::ObjectDoesNotExist("x".into()).is_retryable());
    }

    #[test]
    fn result_code_mapping() {
        assert_eq!(
            FlowError::SyntaxError("x".into()).result_code().numeric(),
            2001
        );
        assert_eq!(
            FlowError::ObjectAlreadySponsored("x".into())
                .result_code()
                .numeric(),
            2002
        );
        assert_eq!(
            FlowError::ResourceNotOwned("x".into()).result_code().numeric(),
            2201
        );
        assert_eq!(
            FlowError::BadAuthInfo("x".into()).result_code().numeric(),
            2202
        );
        assert_eq!(
            FlowError::AlreadyPendingTransfer("x".into())
                .result_code()
                .numeric(),
            2300
        );
        assert_eq!(
            FlowError::NotPendingTransfer("x".into())
                .result_code()
                .numeric(),
            2301
        );
        assert_eq!(
            FlowError::HostLinked("x".into()).result_code().numeric(),
            2305
        );
        assert_eq!(
            FlowError::Contention("x".into()).result_code().numeric(),
            2400
        );
    }
}
