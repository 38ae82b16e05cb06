//! 转移状态机
//!
//! `NONE → PENDING → {CLIENT_APPROVED, CLIENT_REJECTED, CLIENT_CANCELLED,
//! SERVER_APPROVED, SERVER_CANCELLED}`，全部终态等价于允许新请求的隐式 NONE。
//!
//! 所有转换都是 `(资源状态, now)` 的纯函数。到期的隐式服务端批准通过
//! `resolve_expiry` 在每次加载后立即应用——不依赖后台清扫任务，因此并发
//! 读取同一资源的流程各自独立解析也必然收敛到同一逻辑结果。

use chrono::{DateTime, Duration, Months, Utc};
use uuid::Uuid;

use crate::config::RegistryConfig;
use crate::error::{CoreResult, FlowError};
use crate::types::{
    BillingEvent, BillingEventKind, EppResource, GracePeriod, GracePeriodKind, StatusValue,
    TransferData, TransferOp, TransferStatus,
};

/// 状态机单步的产物：新资源版本 + 随提交落盘的计费事件
pub type TransferStep = (EppResource, Vec<BillingEvent>);

/// 加载后立即应用的懒解析：Pending 且已越过自动批准边界的转移
/// 视为服务端批准。
///
/// 生效时刻取 `expiration_time` 而非 `now`，保证任意时刻读到的解析结果
/// 逐字段一致。未到期或无转移时原样返回、不产生事件。
#[must_use]
pub fn resolve_expiry(
    resource: EppResource,
    now: DateTime<Utc>,
    config: &RegistryConfig,
) -> TransferStep {
    let expired = resource
        .transfer
        .as_ref()
        .is_some_and(|t| t.is_expired(now));
    if !expired {
        return (resource, Vec::new());
    }
    let effective = resource
        .transfer
        .as_ref()
        .map_or(now, |t| t.expiration_time);
    apply_approval(resource, effective, TransferStatus::ServerApproved, config)
}

/// 转移请求
///
/// 授权（auth info）已由校验层完成；这里执行状态机自身的前置条件。
pub fn request(
    resource: EppResource,
    gaining_client_id: &str,
    now: DateTime<Utc>,
    config: &RegistryConfig,
) -> CoreResult<TransferStep> {
    if resource.has_pending_transfer() {
        return Err(FlowError::AlreadyPendingTransfer(resource.label.clone()));
    }
    if resource.sponsor_client_id == gaining_client_id {
        return Err(FlowError::ObjectAlreadySponsored(resource.label.clone()));
    }

    let mut resource = resource;
    let billing = BillingEvent::new(
        resource.repo_id.clone(),
        gaining_client_id.to_string(),
        now,
        BillingEventKind::TransferRequest,
    );
    resource.transfer = Some(TransferData {
        status: TransferStatus::Pending,
        gaining_client_id: gaining_client_id.to_string(),
        losing_client_id: resource.sponsor_client_id.clone(),
        request_time: now,
        expiration_time: now + config.automatic_transfer_length(resource.kind()),
        billing_event_id: Some(billing.id.clone()),
    });
    resource.statuses.insert(StatusValue::PendingTransfer);
    resource.touch(now);
    Ok((resource, vec![billing]))
}

/// 出让注册商显式批准
pub fn approve(
    resource: EppResource,
    now: DateTime<Utc>,
    config: &RegistryConfig,
) -> CoreResult<TransferStep> {
    require_pending(&resource)?;
    Ok(apply_approval(
        resource,
        now,
        TransferStatus::ClientApproved,
        config,
    ))
}

/// 出让注册商显式拒绝
pub fn reject(resource: EppResource, now: DateTime<Utc>) -> CoreResult<TransferStep> {
    require_pending(&resource)?;
    Ok(close_pending(resource, now, TransferStatus::ClientRejected))
}

/// 受让注册商（请求方）撤回请求
pub fn cancel(
    resource: EppResource,
    actor_client_id: &str,
    now: DateTime<Utc>,
) -> CoreResult<TransferStep> {
    require_pending(&resource)?;
    let gaining = resource
        .transfer
        .as_ref()
        .map(|t| t.gaining_client_id.clone())
        .unwrap_or_default();
    if gaining != actor_client_id {
        return Err(FlowError::ResourceNotOwned(resource.label.clone()));
    }
    Ok(close_pending(resource, now, TransferStatus::ClientCancelled))
}

/// 服务端强制取消（删除流程解决 pending 转移时调用）
#[must_use]
pub fn server_cancel(resource: EppResource, now: DateTime<Utc>) -> TransferStep {
    if !resource.has_pending_transfer() {
        return (resource, Vec::new());
    }
    close_pending(resource, now, TransferStatus::ServerCancelled)
}

fn require_pending(resource: &EppResource) -> CoreResult<()> {
    if resource.has_pending_transfer() {
        Ok(())
    } else {
        Err(FlowError::NotPendingTransfer(resource.label.clone()))
    }
}

/// 批准（显式或隐式）的共同效果：sponsorship 归受让方，域名注册期
/// 延长一年（十年封顶），出让方的自动续费宽限期换成转移宽限期。
fn apply_approval(
    mut resource: EppResource,
    effective: DateTime<Utc>,
    status: TransferStatus,
    config: &RegistryConfig,
) -> TransferStep {
    let Some(mut transfer) = resource.transfer.take() else {
        return (resource, Vec::new());
    };
    let gaining = transfer.gaining_client_id.clone();
    let losing = transfer.losing_client_id.clone();
    // 批准可能由任意并发读者通过懒解析触发，批准计费 ID 必须是
    // (资源, 转移记录) 的确定函数，读者之间才能收敛到同一资源状态。
    let approve_billing_id = Uuid::new_v5(
        &Uuid::NAMESPACE_OID,
        format!(
            "{}/{}/transfer-approve",
            resource.repo_id,
            transfer.request_time.to_rfc3339()
        )
        .as_bytes(),
    )
    .to_string();
    transfer.status = status;
    resource.transfer = Some(transfer);

    let mut billing = vec![BillingEvent {
        id: approve_billing_id.clone(),
        resource_repo_id: resource.repo_id.clone(),
        client_id: gaining.clone(),
        event_time: effective,
        kind: BillingEventKind::TransferApprove,
    }];

    resource.sponsor_client_id = gaining;
    resource.statuses.remove(&StatusValue::PendingTransfer);
    if resource.statuses.is_empty() {
        resource.statuses.insert(StatusValue::Ok);
    }
    resource.touch(effective);

    let repo_id = resource.repo_id.clone();
    let transfer_grace = config.transfer_grace_length();
    let max_years = config.max_registration_years;
    if let Some(domain) = resource.domain_mut() {
        // 出让方的自动续费在转移批准时不再收取
        let (kept, cancelled): (Vec<GracePeriod>, Vec<GracePeriod>) = domain
            .grace_periods
            .drain(..)
            .partition(|g| g.kind != GracePeriodKind::AutoRenew);
        domain.grace_periods = kept;
        for grace in cancelled {
            if let Some(event_id) = grace.billing_event_id {
                billing.push(BillingEvent::new(
                    repo_id.clone(),
                    losing.clone(),
                    effective,
                    BillingEventKind::Cancellation {
                        cancelled_event_id: event_id,
                    },
                ));
            }
        }
        domain.expiration_time =
            extend_registration_with_cap(effective, domain.expiration_time, 1, max_years);
        domain.grace_periods.push(GracePeriod {
            kind: GracePeriodKind::Transfer,
            expires_at: effective + transfer_grace,
            billing_event_id: Some(approve_billing_id),
        });
    }

    (resource, billing)
}

fn close_pending(
    mut resource: EppResource,
    now: DateTime<Utc>,
    status: TransferStatus,
) -> TransferStep {
    let mut billing = Vec::new();
    if let Some(transfer) = resource.transfer.as_mut() {
        transfer.status = status;
        if let Some(event_id) = transfer.billing_event_id.take() {
            billing.push(BillingEvent::new(
                resource.repo_id.clone(),
                transfer.gaining_client_id.clone(),
                now,
                BillingEventKind::Cancellation {
                    cancelled_event_id: event_id,
                },
            ));
        }
    }
    resource.statuses.remove(&StatusValue::PendingTransfer);
    if resource.statuses.is_empty() {
        resource.statuses.insert(StatusValue::Ok);
    }
    resource.touch(now);
    (resource, billing)
}

/// 注册期延长，封顶于 `now + max_years`，且绝不缩短现有注册期。
#[must_use]
pub fn extend_registration_with_cap(
    now: DateTime<Utc>,
    current_expiration: DateTime<Utc>,
    years: u32,
    max_years: u32,
) -> DateTime<Utc> {
    let extended = current_expiration
        .checked_add_months(Months::new(12 * years))
        .unwrap_or(current_expiration);
    let cap = now
        .checked_add_months(Months::new(12 * max_years))
        .unwrap_or(now + Duration::days(i64::from(max_years) * 366));
    extended.min(cap).max(current_expiration)
}

/// 转移命令统一入口
pub fn dispatch(
    resource: EppResource,
    op: TransferOp,
    actor_client_id: &str,
    now: DateTime<Utc>,
    config: &RegistryConfig,
) -> CoreResult<TransferStep> {
    match op {
        TransferOp::Request => request(resource, actor_client_id, now, config),
        TransferOp::Approve => approve(resource, now, config),
        TransferOp::Reject => reject(resource, now),
        TransferOp::Cancel => cancel(resource, actor_client_id, now),
    }
}
