//! 历史记录构建

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::{
    CommandOp, EppResource, EppResponse, HistoryEntry, HistoryType, ResourceKind, SessionContext,
    TransferOp,
};

/// 资源类型 × 操作 → 历史记录类别
#[must_use]
pub fn history_type(kind: ResourceKind, op: &CommandOp) -> HistoryType {
    use HistoryType as H;
    match (kind, op) {
        (ResourceKind::Domain, CommandOp::Create(_)) => H::DomainCreate,
        (ResourceKind::Domain, CommandOp::Update(_)) => H::DomainUpdate,
        (ResourceKind::Domain, CommandOp::Renew { .. }) => H::DomainRenew,
        (ResourceKind::Domain, CommandOp::Delete) => H::DomainDelete,
        (ResourceKind::Domain, CommandOp::Transfer(TransferOp::Request)) => {
            H::DomainTransferRequest
        }
        (ResourceKind::Domain, CommandOp::Transfer(TransferOp::Approve)) => {
            H::DomainTransferApprove
        }
        (ResourceKind::Domain, CommandOp::Transfer(TransferOp::Reject)) => H::DomainTransferReject,
        (ResourceKind::Domain, CommandOp::Transfer(TransferOp::Cancel)) => H::DomainTransferCancel,
        (ResourceKind::Contact, CommandOp::Create(_)) => H::ContactCreate,
        (ResourceKind::Contact, CommandOp::Update(_) | CommandOp::Renew { .. }) => H::ContactUpdate,
        (ResourceKind::Contact, CommandOp::Delete) => H::ContactDelete,
        (ResourceKind::Contact, CommandOp::Transfer(TransferOp::Request)) => {
            H::ContactTransferRequest
        }
        (ResourceKind::Contact, CommandOp::Transfer(TransferOp::Approve)) => {
            H::ContactTransferApprove
        }
        (ResourceKind::Contact, CommandOp::Transfer(TransferOp::Reject)) => {
            H::ContactTransferReject
        }
        (ResourceKind::Contact, CommandOp::Transfer(TransferOp::Cancel)) => {
            H::ContactTransferCancel
        }
        (ResourceKind::Host, CommandOp::Create(_)) => H::HostCreate,
        (ResourceKind::Host, CommandOp::Update(_) | CommandOp::Renew { .. }) => H::HostUpdate,
        (ResourceKind::Host, CommandOp::Delete) => H::HostDelete,
        (ResourceKind::Host, CommandOp::Transfer(TransferOp::Request)) => H::HostTransferRequest,
        (ResourceKind::Host, CommandOp::Transfer(TransferOp::Approve)) => H::HostTransferApprove,
        (ResourceKind::Host, CommandOp::Transfer(TransferOp::Reject)) => H::HostTransferReject,
        (ResourceKind::Host, CommandOp::Transfer(TransferOp::Cancel)) => H::HostTransferCancel,
    }
}

/// 构建本次流程的历史记录（与资源变更同一事务提交）
pub(crate) fn record(
    entry_type: HistoryType,
    session: &SessionContext,
    client_trid: Option<String>,
    server_trid: &str,
    now: DateTime<Utc>,
    snapshot: &EppResource,
    response: &EppResponse,
) -> HistoryEntry {
    HistoryEntry {
        id: Uuid::new_v4().to_string(),
        resource_repo_id: snapshot.repo_id.clone(),
        entry_type,
        modification_time: now,
        client_id: session.client_id.clone(),
        client_trid,
        server_trid: server_trid.to_string(),
        resource_snapshot: snapshot.clone(),
        response: response.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UpdateArgs;

    #[test]
    fn maps_kind_and_op() {
        assert_eq!(
            history_type(
                ResourceKind::Domain,
                &CommandOp::Transfer(TransferOp::Request)
            ),
            HistoryType::DomainTransferRequest
        );
        assert_eq!(
            history_type(ResourceKind::Host, &CommandOp::Delete),
            HistoryType::HostDelete
        );
        assert_eq!(
            history_type(ResourceKind::Contact, &CommandOp::Update(UpdateArgs::default())),
            HistoryType::ContactUpdate
        );
    }
}
