//! 主机 mutator
//!
//! 主机没有 auth info 与宽限期。被域名委派引用的主机不可删除，
//! 该联动检查需要跨资源读取，由流程编排层完成。

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{apply_status_changes, transfer, MutationOutcome};
use crate::error::{CoreResult, FlowError};
use crate::types::{
    EppResource, HostData, ResourceData, ResultCode, SessionContext, StatusValue, UpdateArgs,
};

/// 主机创建
pub(crate) fn create(
    label: &str,
    addresses: Vec<String>,
    client_id: &str,
    now: DateTime<Utc>,
) -> CoreResult<MutationOutcome> {
    let resource = EppResource {
        repo_id: Uuid::new_v4().to_string(),
        label: label.to_string(),
        sponsor_client_id: client_id.to_string(),
        creating_client_id: client_id.to_string(),
        created_at: now,
        updated_at: now,
        deletion_time: None,
        statuses: [StatusValue::Ok].into(),
        transfer: None,
        revision: 0,
        data: ResourceData::Host(HostData { addresses }),
    };
    Ok(MutationOutcome::ok(resource))
}

/// 主机更新（粘连地址增删）
pub(crate) fn update(
    mut resource: EppResource,
    args: &UpdateArgs,
    session: &SessionContext,
    now: DateTime<Utc>,
) -> CoreResult<MutationOutcome> {
    apply_status_changes(&mut resource, args, session)?;

    let ResourceData::Host(ref mut host) = resource.data else {
        return Err(FlowError::SyntaxError(format!(
            "not a host object: {}",
            resource.label
        )));
    };
    host.addresses
        .retain(|addr| !args.remove_addresses.contains(addr));
    for addr in &args.add_addresses {
        if !host.addresses.contains(addr) {
            host.addresses.push(addr.clone());
        }
    }
    resource.touch(now);
    Ok(MutationOutcome::ok(resource))
}

/// 主机删除：立即 tombstone（调用方已确认无域名引用）
pub(crate) fn delete(resource: EppResource, now: DateTime<Utc>) -> CoreResult<MutationOutcome> {
    let (mut resource, billing) = transfer::server_cancel(resource, now);
    resource.deletion_time = Some(now);
    resource.statuses.clear();
    resource.touch(now);
    Ok(MutationOutcome {
        resource,
        billing,
        code: ResultCode::Success,
    })
}
