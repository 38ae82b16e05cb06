//! 业务逻辑服务层

mod contact_flows;
mod domain_flows;
mod flow_runner;
mod history;
mod host_flows;
mod registrar_cache;
pub mod transfer;
pub mod validation;

pub use flow_runner::FlowRunner;
pub use history::history_type;
pub use registrar_cache::RegistrarCache;

use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::error::{CoreResult, FlowError};
use crate::traits::{RegistrarRepository, ResourceStore};
use crate::types::{BillingEvent, EppResource, ResultCode, SessionContext, StatusValue, UpdateArgs};
use crate::utils::Clock;

/// 单次变更的产物：资源新版本、随提交落盘的计费事件、成功结果码
pub(crate) struct MutationOutcome {
    pub resource: EppResource,
    pub billing: Vec<BillingEvent>,
    pub code: ResultCode,
}

impl MutationOutcome {
    pub(crate) fn ok(resource: EppResource) -> Self {
        Self {
            resource,
            billing: Vec::new(),
            code: ResultCode::Success,
        }
    }
}

/// 应用状态增删（各类型 update 流程共用）
///
/// `Ok` 状态由服务端维护：存在其他状态时自动摘除，集合为空时自动补上。
pub(crate) fn apply_status_changes(
    resource: &mut EppResource,
    args: &UpdateArgs,
    session: &SessionContext,
) -> CoreResult<()> {
    for status in args.add_statuses.iter().chain(&args.remove_statuses) {
        if status.is_server_settable_only() && !session.is_superuser() {
            return Err(FlowError::ParameterPolicy(format!(
                "status not client-settable: {status:?}"
            )));
        }
    }
    for status in &args.remove_statuses {
        resource.statuses.remove(status);
    }
    for status in &args.add_statuses {
        if *status != StatusValue::Ok {
            resource.statuses.insert(*status);
        }
    }
    if resource.statuses.len() > 1 {
        resource.statuses.remove(&StatusValue::Ok);
    }
    if resource.statuses.is_empty() {
        resource.statuses.insert(StatusValue::Ok);
    }
    Ok(())
}

/// 流程上下文 - 持有所有依赖
///
/// 平台层需要创建此上下文，并注入平台特定的存储实现与时钟。
pub struct FlowContext {
    /// 资源存储
    pub store: Arc<dyn ResourceStore>,
    /// 注册商档案（read-through 缓存）
    pub registrars: RegistrarCache,
    /// 注册局策略
    pub config: RegistryConfig,
    /// 注入时钟（每次流程尝试只读取一次）
    pub clock: Arc<dyn Clock>,
}

impl FlowContext {
    /// 创建流程上下文
    #[must_use]
    pub fn new(
        store: Arc<dyn ResourceStore>,
        registrar_repository: Arc<dyn RegistrarRepository>,
        config: RegistryConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            registrars: RegistrarCache::new(registrar_repository),
            config,
            clock,
        }
    }
}
