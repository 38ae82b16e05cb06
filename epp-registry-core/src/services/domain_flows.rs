//! 域名 mutator
//!
//! 给定当前资源状态与命令，计算下一个资源状态，并产出随同一事务落盘的
//! 计费事件。到期计算一律使用贯穿整个流程事务的单一 "now"。

use chrono::{DateTime, Months, Utc};
use uuid::Uuid;

use super::{apply_status_changes, transfer, MutationOutcome};
use crate::config::RegistryConfig;
use crate::error::{CoreResult, FlowError};
use crate::types::{
    BillingEvent, BillingEventKind, DomainData, DsRecord, EppResource, GracePeriod,
    GracePeriodKind, ResourceData, ResultCode, SessionContext, StatusValue, UpdateArgs,
};

/// 域名创建
#[allow(clippy::too_many_arguments)]
pub(crate) fn create(
    label: &str,
    registrant: &str,
    nameservers: Vec<String>,
    ds_records: Vec<DsRecord>,
    auth_info: String,
    period_years: u32,
    client_id: &str,
    now: DateTime<Utc>,
    config: &RegistryConfig,
) -> CoreResult<MutationOutcome> {
    let repo_id = Uuid::new_v4().to_string();
    let expiration_time = now
        .checked_add_months(Months::new(12 * period_years))
        .ok_or_else(|| FlowError::ParameterRange("registration period overflow".to_string()))?;

    let billing = BillingEvent::new(
        repo_id.clone(),
        client_id.to_string(),
        now,
        BillingEventKind::Create {
            years: period_years,
        },
    );
    let resource = EppResource {
        repo_id,
        label: label.to_string(),
        sponsor_client_id: client_id.to_string(),
        creating_client_id: client_id.to_string(),
        created_at: now,
        updated_at: now,
        deletion_time: None,
        statuses: [StatusValue::Ok].into(),
        transfer: None,
        revision: 0,
        data: ResourceData::Domain(DomainData {
            registrant: registrant.to_string(),
            expiration_time,
            nameservers,
            ds_records,
            auth_info,
            grace_periods: vec![GracePeriod {
                kind: GracePeriodKind::Add,
                expires_at: now + config.add_grace_length(),
                billing_event_id: Some(billing.id.clone()),
            }],
        }),
    };
    Ok(MutationOutcome {
        resource,
        billing: vec![billing],
        code: ResultCode::Success,
    })
}

/// 域名续费
///
/// 自动续费宽限期内的显式续费撤销待定的自动续费计费，而不是叠加收取。
pub(crate) fn renew(
    mut resource: EppResource,
    current_expiration: DateTime<Utc>,
    years: u32,
    now: DateTime<Utc>,
    config: &RegistryConfig,
) -> CoreResult<MutationOutcome> {
    let repo_id = resource.repo_id.clone();
    let sponsor = resource.sponsor_client_id.clone();
    let renew_grace = config.renew_grace_length();
    let max_years = config.max_registration_years;
    let label = resource.label.clone();
    let Some(domain) = resource.domain_mut() else {
        return Err(FlowError::SyntaxError(format!(
            "not a domain object: {label}"
        )));
    };

    if domain.expiration_time != current_expiration {
        return Err(FlowError::ParameterPolicy(format!(
            "stated expiration does not match actual expiration of {label}"
        )));
    }
    let new_expiration = domain
        .expiration_time
        .checked_add_months(Months::new(12 * years))
        .ok_or_else(|| FlowError::ParameterRange("renewal period overflow".to_string()))?;
    let cap = now
        .checked_add_months(Months::new(12 * max_years))
        .ok_or_else(|| FlowError::ParameterRange("renewal period overflow".to_string()))?;
    if new_expiration > cap {
        return Err(FlowError::ParameterPolicy(format!(
            "renewal would exceed the {max_years}-year maximum registration period"
        )));
    }

    let mut billing = Vec::new();
    // 自动续费宽限期内续费：撤销待定的自动续费计费
    let (kept, in_auto_renew): (Vec<GracePeriod>, Vec<GracePeriod>) = domain
        .grace_periods
        .drain(..)
        .partition(|g| !(g.kind == GracePeriodKind::AutoRenew && g.is_active(now)));
    domain.grace_periods = kept;
    for grace in in_auto_renew {
        if let Some(event_id) = grace.billing_event_id {
            billing.push(BillingEvent::new(
                repo_id.clone(),
                sponsor.clone(),
                now,
                BillingEventKind::Cancellation {
                    cancelled_event_id: event_id,
                },
            ));
        }
    }

    let renew_billing = BillingEvent::new(
        repo_id,
        sponsor,
        now,
        BillingEventKind::Renew { years },
    );
    domain.expiration_time = new_expiration;
    domain.grace_periods.push(GracePeriod {
        kind: GracePeriodKind::Renew,
        expires_at: now + renew_grace,
        billing_event_id: Some(renew_billing.id.clone()),
    });
    billing.push(renew_billing);
    resource.touch(now);

    Ok(MutationOutcome {
        resource,
        billing,
        code: ResultCode::Success,
    })
}

/// 域名删除
///
/// add 宽限期内删除立即成为 tombstone 并撤销创建计费；否则进入赎回期
/// （deletion time = now + 赎回时长），返回 1001。待处理转移先由服务端取消。
pub(crate) fn delete(
    resource: EppResource,
    now: DateTime<Utc>,
    config: &RegistryConfig,
) -> CoreResult<MutationOutcome> {
    let (mut resource, mut billing) = transfer::server_cancel(resource, now);

    let repo_id = resource.repo_id.clone();
    let sponsor = resource.sponsor_client_id.clone();
    let in_add_grace = resource
        .domain()
        .is_some_and(|d| d.grace_periods.iter().any(|g| {
            g.kind == GracePeriodKind::Add && g.is_active(now)
        }));

    if in_add_grace {
        if let Some(domain) = resource.domain_mut() {
            for grace in domain.grace_periods.drain(..) {
                if grace.kind == GracePeriodKind::Add {
                    if let Some(event_id) = grace.billing_event_id {
                        billing.push(BillingEvent::new(
                            repo_id.clone(),
                            sponsor.clone(),
                            now,
                            BillingEventKind::Cancellation {
                                cancelled_event_id: event_id,
                            },
                        ));
                    }
                }
            }
        }
        resource.deletion_time = Some(now);
        resource.statuses.clear();
        resource.touch(now);
        return Ok(MutationOutcome {
            resource,
            billing,
            code: ResultCode::Success,
        });
    }

    let redemption_expiry = now + config.redemption_length();
    resource.deletion_time = Some(redemption_expiry);
    resource.statuses.clear();
    resource.statuses.insert(StatusValue::PendingDelete);
    if let Some(domain) = resource.domain_mut() {
        domain.grace_periods = vec![GracePeriod {
            kind: GracePeriodKind::Redemption,
            expires_at: redemption_expiry,
            billing_event_id: None,
        }];
    }
    resource.touch(now);
    Ok(MutationOutcome {
        resource,
        billing,
        code: ResultCode::SuccessWithActionPending,
    })
}

/// 域名更新
pub(crate) fn update(
    mut resource: EppResource,
    args: &UpdateArgs,
    session: &SessionContext,
    now: DateTime<Utc>,
    config: &RegistryConfig,
) -> CoreResult<MutationOutcome> {
    apply_status_changes(&mut resource, args, session)?;

    let max_nameservers = config.max_nameservers;
    let max_ds_records = config.max_ds_records;
    let label = resource.label.clone();
    let Some(domain) = resource.domain_mut() else {
        return Err(FlowError::SyntaxError(format!(
            "not a domain object: {label}"
        )));
    };

    domain
        .nameservers
        .retain(|ns| !args.remove_nameservers.contains(ns));
    for ns in &args.add_nameservers {
        if !domain.nameservers.contains(ns) {
            domain.nameservers.push(ns.clone());
        }
    }
    if domain.nameservers.len() > max_nameservers {
        return Err(FlowError::ParameterPolicy(format!(
            "too many nameservers: {} (max {max_nameservers})",
            domain.nameservers.len()
        )));
    }

    domain
        .ds_records
        .retain(|ds| !args.remove_ds_records.contains(ds));
    for ds in &args.add_ds_records {
        if !domain.ds_records.contains(ds) {
            domain.ds_records.push(ds.clone());
        }
    }
    if domain.ds_records.len() > max_ds_records {
        return Err(FlowError::ParameterPolicy(format!(
            "too many DS records: {} (max {max_ds_records})",
            domain.ds_records.len()
        )));
    }

    if let Some(ref auth_info) = args.new_auth_info {
        domain.auth_info.clone_from(auth_info);
    }
    resource.touch(now);
    Ok(MutationOutcome::ok(resource))
}
