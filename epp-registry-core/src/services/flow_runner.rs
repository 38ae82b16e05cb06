//! 流程编排器
//!
//! 每条命令对应一次流程事务：固定顺序的校验 → 懒解析到期转移 →
//! 变更计算 → 历史记录 → 原子提交。事务内时钟只读取一次，所有
//! 时间计算共享同一个 "now"。
//!
//! 存储争用（乐观并发冲突）是唯一可重试的失败，按指数退避重试到
//! 配置上限；其余错误一次定论。

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    contact_flows, domain_flows, history, host_flows, transfer, validation, FlowContext,
    MutationOutcome,
};
use crate::error::{CoreResult, FlowError};
use crate::traits::CommitSet;
use crate::types::{
    BillingEvent, CommandOp, CreateArgs, EppCommand, EppResource, EppResponse, ResourceKind,
    ResourceSummary, ResultCode, SessionContext,
};

/// 流程编排器
pub struct FlowRunner {
    ctx: Arc<FlowContext>,
}

impl FlowRunner {
    /// 创建编排器
    #[must_use]
    pub fn new(ctx: Arc<FlowContext>) -> Self {
        Self { ctx }
    }

    /// 命令入口：任何命令都得到一个结构完整的响应，绝不向调用方抛错。
    ///
    /// 预期内的业务失败映射为对应结果码；基础设施故障的细节只进日志，
    /// 客户端收到通用的 2400。
    pub async fn handle(&self, command: &EppCommand, session: &SessionContext) -> EppResponse {
        match self.run(command, session).await {
            Ok(response) => response,
            Err(e) if e.is_expected() => {
                log::warn!(
                    "flow returned failure response: client={} op={} target={} error={e}",
                    session.client_id,
                    command.op.name(),
                    command.target
                );
                EppResponse::failure(
                    e.result_code(),
                    e.to_string(),
                    command.client_trid.clone(),
                    Uuid::new_v4().to_string(),
                )
            }
            Err(e) => {
                log::error!(
                    "unexpected failure in flow execution: client={} op={} target={} error={e}",
                    session.client_id,
                    command.op.name(),
                    command.target
                );
                EppResponse::failure(
                    ResultCode::CommandFailed,
                    "Command failed".to_string(),
                    command.client_trid.clone(),
                    Uuid::new_v4().to_string(),
                )
            }
        }
    }

    /// 执行命令，存储争用按指数退避重试
    pub async fn run(
        &self,
        command: &EppCommand,
        session: &SessionContext,
    ) -> CoreResult<EppResponse> {
        let mut attempt: u32 = 0;
        loop {
            match self.execute_once(command, session).await {
                Err(e) if e.is_retryable() && attempt < self.ctx.config.store_retry_attempts => {
                    attempt += 1;
                    // 指数封顶，重试预算配得再大也不会移位溢出
                    let delay = self
                        .ctx
                        .config
                        .store_retry_base_delay_ms
                        .saturating_mul(1_u64 << (attempt - 1).min(16));
                    log::warn!(
                        "store contention, retrying flow: op={} target={} attempt={attempt} delay_ms={delay}",
                        command.op.name(),
                        command.target
                    );
                    tokio::time::sleep(StdDuration::from_millis(delay)).await;
                }
                other => return other,
            }
        }
    }

    /// 单次流程事务
    async fn execute_once(
        &self,
        command: &EppCommand,
        session: &SessionContext,
    ) -> CoreResult<EppResponse> {
        let config = &self.ctx.config;
        validation::validate_syntax(command, config)?;
        validation::validate_extensions(command, config)?;
        self.check_registrar_active(session).await?;

        let now = self.ctx.clock.now();
        let server_trid = Uuid::new_v4().to_string();

        let existing = self
            .ctx
            .store
            .find_by_label(command.kind, &command.target)
            .await?;

        // 幂等重放：同一注册商以同一 clTRID 重发同一目标的命令时，
        // 原样返回首次计算出的响应，不再变更任何状态。
        if let (Some(trid), Some(resource)) = (&command.client_trid, &existing) {
            if let Some(latest) = self.ctx.store.latest_history(&resource.repo_id).await? {
                if latest.client_trid.as_deref() == Some(trid)
                    && latest.client_id == session.client_id
                {
                    log::info!(
                        "replayed command, returning stored response: client={} clTRID={trid}",
                        session.client_id
                    );
                    return Ok(latest.response);
                }
            }
        }

        let mut outcome;
        let mut billing: Vec<BillingEvent> = Vec::new();

        if let CommandOp::Create(args) = &command.op {
            if existing.as_ref().is_some_and(|r| r.is_live(now)) {
                return Err(FlowError::ObjectExists(command.target.clone()));
            }
            outcome = self
                .execute_create(&command.target, args, session, now)
                .await?;
        } else {
            let resource = existing
                .filter(|r| r.is_live(now))
                .ok_or_else(|| FlowError::ObjectDoesNotExist(command.target.clone()))?;

            // 越过自动批准边界的转移在加载后立即解析，后续校验
            // 看到的是解析后的资源（sponsorship 可能已经易手）。
            let (resource, resolution_billing) = transfer::resolve_expiry(resource, now, config);
            billing = resolution_billing;

            validation::authorize(command, session, &resource)?;
            validation::check_status_allows(&command.op, &resource, session)?;

            outcome = self
                .execute_mutation(command, session, resource, now)
                .await?;
        }
        billing.append(&mut outcome.billing);

        let response = EppResponse::success(
            outcome.code,
            Some(ResourceSummary::from_resource(&outcome.resource)),
            command.client_trid.clone(),
            server_trid.clone(),
        );
        let entry = history::record(
            history::history_type(command.kind, &command.op),
            session,
            command.client_trid.clone(),
            &server_trid,
            now,
            &outcome.resource,
            &response,
        );
        self.ctx
            .store
            .commit(CommitSet {
                writes: vec![outcome.resource],
                history: vec![entry],
                billing,
            })
            .await?;
        Ok(response)
    }

    /// 注册商必须存在且处于活跃状态（超级用户豁免）
    async fn check_registrar_active(&self, session: &SessionContext) -> CoreResult<()> {
        if session.is_superuser() {
            return Ok(());
        }
        match self.ctx.registrars.get(&session.client_id).await? {
            Some(registrar) if registrar.is_active() => Ok(()),
            _ => Err(FlowError::RegistrarNotActive(session.client_id.clone())),
        }
    }

    async fn execute_create(
        &self,
        target: &str,
        args: &CreateArgs,
        session: &SessionContext,
        now: DateTime<Utc>,
    ) -> CoreResult<MutationOutcome> {
        match args {
            CreateArgs::Domain {
                period_years,
                registrant,
                nameservers,
                ds_records,
                auth_info,
            } => {
                self.require_live(ResourceKind::Contact, registrant, now)
                    .await?;
                for host_name in nameservers {
                    self.require_live(ResourceKind::Host, host_name, now).await?;
                }
                domain_flows::create(
                    target,
                    registrant,
                    nameservers.clone(),
                    ds_records.clone(),
                    auth_info.clone(),
                    period_years.unwrap_or(1),
                    &session.client_id,
                    now,
                    &self.ctx.config,
                )
            }
            CreateArgs::Contact {
                name,
                email,
                auth_info,
            } => contact_flows::create(
                target,
                name,
                email,
                auth_info.clone(),
                &session.client_id,
                now,
            ),
            CreateArgs::Host { addresses } => {
                host_flows::create(target, addresses.clone(), &session.client_id, now)
            }
        }
    }

    async fn execute_mutation(
        &self,
        command: &EppCommand,
        session: &SessionContext,
        resource: EppResource,
        now: DateTime<Utc>,
    ) -> CoreResult<MutationOutcome> {
        let config = &self.ctx.config;
        match &command.op {
            CommandOp::Update(args) => match resource.kind() {
                ResourceKind::Domain => domain_flows::update(resource, args, session, now, config),
                ResourceKind::Contact => contact_flows::update(resource, args, session, now),
                ResourceKind::Host => host_flows::update(resource, args, session, now),
            },
            CommandOp::Delete => match resource.kind() {
                ResourceKind::Domain => domain_flows::delete(resource, now, config),
                ResourceKind::Contact => contact_flows::delete(resource, now),
                ResourceKind::Host => {
                    let linked = self
                        .ctx
                        .store
                        .domains_referencing_host(&resource.label, now)
                        .await?;
                    if !linked.is_empty() {
                        return Err(FlowError::HostLinked(resource.label.clone()));
                    }
                    host_flows::delete(resource, now)
                }
            },
            CommandOp::Renew {
                current_expiration,
                years,
            } => domain_flows::renew(resource, *current_expiration, *years, now, config),
            CommandOp::Transfer(op) => {
                let (resource, billing) =
                    transfer::dispatch(resource, *op, &session.client_id, now, config)?;
                Ok(MutationOutcome {
                    resource,
                    billing,
                    code: ResultCode::Success,
                })
            }
            CommandOp::Create(_) => Err(FlowError::InternalError(
                "create dispatched through mutation path".to_string(),
            )),
        }
    }

    /// 引用的资源必须存在且活跃
    async fn require_live(
        &self,
        kind: ResourceKind,
        label: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        match self.ctx.store.find_by_label(kind, label).await? {
            Some(ref r) if r.is_live(now) => Ok(()),
            _ => Err(FlowError::ObjectDoesNotExist(label.to_string())),
        }
    }
}
