//! 统一错误类型定义

use serde::Serialize;
use thiserror::Error;

use epp_registry_core::FlowError;

/// WHOIS 响应器错误类型
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum WhoisError {
    /// 查询输入无效
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 对象不存在（或已成为 tombstone）
    #[error("Not found: {0}")]
    NotFound(String),

    /// 底层存储故障
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<FlowError> for WhoisError {
    fn from(e: FlowError) -> Self {
        Self::StorageError(e.to_string())
    }
}

/// WHOIS Result 类型别名
pub type WhoisResult<T> = std::result::Result<T, WhoisError>;
