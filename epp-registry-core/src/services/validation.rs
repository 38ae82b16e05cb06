//! 校验层
//!
//! 按固定顺序执行：命令结构 → 扩展兼容性 →（orchestrator 加载后）资源存在性 →
//! 授权 → auth info。全部为纯检查，任何失败都在变更发生前中止整个事务。

use crate::config::RegistryConfig;
use crate::error::{CoreResult, FlowError};
use crate::types::{
    CommandOp, CreateArgs, EppCommand, EppResource, ResourceKind, SessionContext, StatusValue,
    TransferOp,
};

/// 命令结构/语法检查（检查 (a)）
pub fn validate_syntax(command: &EppCommand, config: &RegistryConfig) -> CoreResult<()> {
    validate_label(command.kind, &command.target)?;

    match &command.op {
        CommandOp::Create(args) => validate_create_args(command.kind, args, config),
        CommandOp::Renew { years, .. } => {
            if command.kind != ResourceKind::Domain {
                return Err(FlowError::SyntaxError(
                    "renew is only valid for domain objects".to_string(),
                ));
            }
            validate_period(*years, config)
        }
        CommandOp::Transfer(TransferOp::Request)
        | CommandOp::Transfer(TransferOp::Approve)
        | CommandOp::Transfer(TransferOp::Reject)
        | CommandOp::Transfer(TransferOp::Cancel)
        | CommandOp::Update(_)
        | CommandOp::Delete => Ok(()),
    }
}

/// 扩展兼容性检查（检查 (b)）
pub fn validate_extensions(command: &EppCommand, config: &RegistryConfig) -> CoreResult<()> {
    for uri in &command.extensions {
        if !config.supports_extension(uri) {
            return Err(FlowError::UnimplementedExtension(uri.clone()));
        }
    }
    Ok(())
}

/// 授权检查（检查 (d)(e)）
///
/// 转移请求不要求发起方是 sponsor（受让方本来就不是），改由 auth info 授权；
/// 转移取消的发起方校验需要 pending 转移数据，留给状态机。其余命令要求
/// sponsoring registrar 或超级用户。
pub fn authorize(
    command: &EppCommand,
    session: &SessionContext,
    resource: &EppResource,
) -> CoreResult<()> {
    if session.is_superuser() {
        return Ok(());
    }

    match &command.op {
        CommandOp::Transfer(TransferOp::Request) => {
            let Some(supplied) = command.auth_info.as_deref() else {
                return Err(FlowError::MissingTransferRequestAuthInfo(
                    command.target.clone(),
                ));
            };
            match resource.auth_info() {
                Some(expected) if expected == supplied => Ok(()),
                _ => Err(FlowError::BadAuthInfo(command.target.clone())),
            }
        }
        CommandOp::Transfer(TransferOp::Cancel) => check_supplied_auth_info(command, resource),
        _ => {
            if resource.sponsor_client_id != session.client_id {
                return Err(FlowError::ResourceNotOwned(command.target.clone()));
            }
            check_supplied_auth_info(command, resource)
        }
    }
}

/// 资源状态是否允许此操作（检查 (f)，超级用户豁免）
pub fn check_status_allows(
    op: &CommandOp,
    resource: &EppResource,
    session: &SessionContext,
) -> CoreResult<()> {
    if session.is_superuser() {
        return Ok(());
    }

    let prohibited: &[StatusValue] = match op {
        CommandOp::Update(args) => {
            // 客户端允许在同一条命令里解除自己设置的 update 禁止
            if resource.statuses.contains(&StatusValue::ClientUpdateProhibited)
                && !args.remove_statuses.contains(&StatusValue::ClientUpdateProhibited)
            {
                return Err(status_error(resource, StatusValue::ClientUpdateProhibited));
            }
            &[StatusValue::ServerUpdateProhibited, StatusValue::PendingDelete]
        }
        CommandOp::Delete => &[
            StatusValue::ClientDeleteProhibited,
            StatusValue::ServerDeleteProhibited,
            StatusValue::PendingDelete,
        ],
        CommandOp::Renew { .. } => &[
            StatusValue::ClientRenewProhibited,
            StatusValue::ServerRenewProhibited,
            StatusValue::PendingDelete,
        ],
        CommandOp::Transfer(TransferOp::Request) => &[
            StatusValue::ClientTransferProhibited,
            StatusValue::ServerTransferProhibited,
            StatusValue::PendingDelete,
        ],
        // pending 校验由状态机负责
        CommandOp::Transfer(_) | CommandOp::Create(_) => &[],
    };

    for status in prohibited {
        if resource.statuses.contains(status) {
            return Err(status_error(resource, *status));
        }
    }
    Ok(())
}

fn status_error(resource: &EppResource, status: StatusValue) -> FlowError {
    FlowError::StatusProhibitsOperation(format!("{}: {status:?}", resource.label))
}

/// 命令附带 auth info 时必须与资源一致
fn check_supplied_auth_info(command: &EppCommand, resource: &EppResource) -> CoreResult<()> {
    if let Some(supplied) = command.auth_info.as_deref() {
        match resource.auth_info() {
            Some(expected) if expected == supplied => {}
            _ => return Err(FlowError::BadAuthInfo(command.target.clone())),
        }
    }
    Ok(())
}

fn validate_label(kind: ResourceKind, label: &str) -> CoreResult<()> {
    if label.trim().is_empty() {
        return Err(FlowError::RequiredParameterMissing(
            "target label".to_string(),
        ));
    }
    if label.chars().any(char::is_whitespace) {
        return Err(FlowError::SyntaxError(format!(
            "label contains whitespace: '{label}'"
        )));
    }
    match kind {
        ResourceKind::Domain | ResourceKind::Host => {
            if !label.contains('.') {
                return Err(FlowError::SyntaxError(format!(
                    "not a fully qualified name: '{label}'"
                )));
            }
            if label.chars().any(|c| c.is_ascii_uppercase()) {
                return Err(FlowError::SyntaxError(format!(
                    "name must be lower case: '{label}'"
                )));
            }
            Ok(())
        }
        ResourceKind::Contact => Ok(()),
    }
}

fn validate_period(years: u32, config: &RegistryConfig) -> CoreResult<()> {
    if years == 0 || years > config.max_registration_years {
        return Err(FlowError::ParameterRange(format!(
            "period must be 1-{} years, got {years}",
            config.max_registration_years
        )));
    }
    Ok(())
}

fn validate_create_args(
    kind: ResourceKind,
    args: &CreateArgs,
    config: &RegistryConfig,
) -> CoreResult<()> {
    match (kind, args) {
        (
            ResourceKind::Domain,
            CreateArgs::Domain {
                period_years,
                registrant,
                nameservers,
                ds_records,
                auth_info,
            },
        ) => {
            validate_period(period_years.unwrap_or(1), config)?;
            if registrant.trim().is_empty() {
                return Err(FlowError::RequiredParameterMissing("registrant".to_string()));
            }
            if auth_info.is_empty() {
                return Err(FlowError::RequiredParameterMissing("authInfo".to_string()));
            }
            if nameservers.len() > config.max_nameservers {
                return Err(FlowError::ParameterPolicy(format!(
                    "too many nameservers: {} (max {})",
                    nameservers.len(),
                    config.max_nameservers
                )));
            }
            if ds_records.len() > config.max_ds_records {
                return Err(FlowError::ParameterPolicy(format!(
                    "too many DS records: {} (max {})",
                    ds_records.len(),
                    config.max_ds_records
                )));
            }
            Ok(())
        }
        (ResourceKind::Contact, CreateArgs::Contact { name, email, auth_info }) => {
            if name.trim().is_empty() {
                return Err(FlowError::RequiredParameterMissing("name".to_string()));
            }
            if !email.contains('@') {
                return Err(FlowError::SyntaxError(format!("invalid email: '{email}'")));
            }
            if auth_info.is_empty() {
                return Err(FlowError::RequiredParameterMissing("authInfo".to_string()));
            }
            Ok(())
        }
        (ResourceKind::Host, CreateArgs::Host { .. }) => Ok(()),
        _ => Err(FlowError::SyntaxError(
            "create payload does not match object type".to_string(),
        )),
    }
}
