//! 注册商档案持久化抽象 Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::Registrar;

/// 注册商仓库 Trait
///
/// 读多写少，流程侧通过 `RegistrarCache` 以 read-through 方式访问。
#[async_trait]
pub trait RegistrarRepository: Send + Sync {
    /// 按 EPP 客户端 ID 查找注册商
    async fn find_by_id(&self, client_id: &str) -> CoreResult<Option<Registrar>>;
}
