//! 联系人 mutator
//!
//! 联系人没有到期时间与宽限期，删除立即 tombstone。

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{apply_status_changes, transfer, MutationOutcome};
use crate::error::{CoreResult, FlowError};
use crate::types::{
    ContactData, EppResource, ResourceData, ResultCode, SessionContext, StatusValue, UpdateArgs,
};

/// 联系人创建
pub(crate) fn create(
    label: &str,
    name: &str,
    email: &str,
    auth_info: String,
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
        data: ResourceData::Contact(ContactData {
            name: name.to_string(),
            email: email.to_string(),
            auth_info,
        }),
    };
    Ok(MutationOutcome::ok(resource))
}

/// 联系人更新
pub(crate) fn update(
    mut resource: EppResource,
    args: &UpdateArgs,
    session: &SessionContext,
    now: DateTime<Utc>,
) -> CoreResult<MutationOutcome> {
    apply_status_changes(&mut resource, args, session)?;

    let ResourceData::Contact(ref mut contact) = resource.data else {
        return Err(FlowError::SyntaxError(format!(
            "not a contact object: {}",
            resource.label
        )));
    };
    if let Some(ref email) = args.new_email {
        contact.email.clone_from(email);
    }
    if let Some(ref auth_info) = args.new_auth_info {
        contact.auth_info.clone_from(auth_info);
    }
    resource.touch(now);
    Ok(MutationOutcome::ok(resource))
}

/// 联系人删除：无赎回期，立即 tombstone
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
