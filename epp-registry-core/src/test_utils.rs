//! 测试工具模块
//!
//! 提供内存版存储/仓库 mock 与测试数据工厂，仅在 `cfg(test)` 下编译。

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::RegistryConfig;
use crate::error::{CoreResult, FlowError};
use crate::services::FlowContext;
use crate::traits::{CommitSet, RegistrarRepository, ResourceStore};
use crate::types::{
    BillingEvent, ContactData, DomainData, EppResource, HistoryEntry, HostData, Registrar,
    RegistrarStatus, ResourceData, ResourceKind, SessionContext, StatusValue,
};
use crate::utils::Clock;

/// 内存资源存储 mock
///
/// 提交时执行与生产存储相同的乐观并发校验：写入的 `revision` 必须等于
/// 当前存储版本，成功后递增。可注入争用次数与提交错误。
#[derive(Default)]
pub struct MockResourceStore {
    resources: RwLock<HashMap<String, EppResource>>,
    history: RwLock<Vec<HistoryEntry>>,
    billing: RwLock<Vec<BillingEvent>>,
    save_error: RwLock<Option<FlowError>>,
    contention_failures: RwLock<u32>,
    commit_attempts: RwLock<u32>,
}

impl MockResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接种入一个资源（绕过提交校验）
    pub async fn insert(&self, resource: EppResource) {
        self.resources
            .write()
            .await
            .insert(resource.repo_id.clone(), resource);
    }

    /// 设置提交错误（每次提交都返回）
    pub async fn set_save_error(&self, error: Option<FlowError>) {
        *self.save_error.write().await = error;
    }

    /// 设置接下来 N 次提交返回争用错误
    pub async fn set_contention_failures(&self, count: u32) {
        *self.contention_failures.write().await = count;
    }

    pub async fn commit_attempts(&self) -> u32 {
        *self.commit_attempts.read().await
    }

    pub async fn history_count(&self) -> usize {
        self.history.read().await.len()
    }

    pub async fn billing_events(&self) -> Vec<BillingEvent> {
        self.billing.read().await.clone()
    }
}

#[async_trait::async_trait]
impl ResourceStore for MockResourceStore {
    async fn load(&self, repo_id: &str) -> CoreResult<Option<EppResource>> {
        Ok(self.resources.read().await.get(repo_id).cloned())
    }

    async fn find_by_label(
        &self,
        kind: ResourceKind,
        label: &str,
    ) -> CoreResult<Option<EppResource>> {
        Ok(self
            .resources
            .read()
            .await
            .values()
            .filter(|r| r.kind() == kind && r.label == label)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn domains_referencing_host(
        &self,
        host_name: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<Vec<String>> {
        Ok(self
            .resources
            .read()
            .await
            .values()
            .filter(|r| {
                r.is_live(now)
                    && r.domain()
                        .is_some_and(|d| d.nameservers.iter().any(|ns| ns == host_name))
            })
            .map(|r| r.repo_id.clone())
            .collect())
    }

    async fn latest_history(&self, repo_id: &str) -> CoreResult<Option<HistoryEntry>> {
        Ok(self
            .history
            .read()
            .await
            .iter()
            .rev()
            .find(|h| h.resource_repo_id == repo_id)
            .cloned())
    }

    async fn commit(&self, commit_set: CommitSet) -> CoreResult<()> {
        *self.commit_attempts.write().await += 1;

        {
            let mut remaining = self.contention_failures.write().await;
            if *remaining > 0 {
                *remaining -= 1;
                return Err(FlowError::Contention("revision mismatch".to_string()));
            }
        }
        if let Some(error) = self.save_error.read().await.clone() {
            return Err(error);
        }

        let mut resources = self.resources.write().await;
        for write in &commit_set.writes {
            let current = resources.get(&write.repo_id).map_or(0, |r| r.revision);
            if write.revision != current {
                return Err(FlowError::Contention(format!(
                    "revision mismatch for {}: expected {current}, got {}",
                    write.repo_id, write.revision
                )));
            }
        }
        for mut write in commit_set.writes {
            write.revision += 1;
            resources.insert(write.repo_id.clone(), write);
        }
        self.history.write().await.extend(commit_set.history);
        self.billing.write().await.extend(commit_set.billing);
        Ok(())
    }
}

/// 内存注册商仓库 mock（带查询计数，供缓存测试断言穿透次数）
#[derive(Default)]
pub struct MockRegistrarRepository {
    registrars: RwLock<HashMap<String, Registrar>>,
    lookups: RwLock<u32>,
}

impl MockRegistrarRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 带初始档案的仓库
    pub fn with_registrars(registrars: impl IntoIterator<Item = Registrar>) -> Self {
        Self {
            registrars: RwLock::new(
                registrars
                    .into_iter()
                    .map(|r| (r.client_id.clone(), r))
                    .collect(),
            ),
            lookups: RwLock::new(0),
        }
    }

    pub async fn insert(&self, registrar: Registrar) {
        self.registrars
            .write()
            .await
            .insert(registrar.client_id.clone(), registrar);
    }

    pub async fn lookup_count(&self) -> u32 {
        *self.lookups.read().await
    }
}

#[async_trait::async_trait]
impl RegistrarRepository for MockRegistrarRepository {
    async fn find_by_id(&self, client_id: &str) -> CoreResult<Option<Registrar>> {
        *self.lookups.write().await += 1;
        Ok(self.registrars.read().await.get(client_id).cloned())
    }
}

/// 可设定时间的测试时钟
pub struct FakeClock {
    now: std::sync::RwLock<DateTime<Utc>>,
}

impl FakeClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::RwLock::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().unwrap() = now;
    }

    pub fn advance(&self, delta: Duration) {
        let mut guard = self.now.write().unwrap();
        *guard += delta;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap()
    }
}

/// 创建测试流程上下文
///
/// 预置注册商：`RegistrarA`、`RegistrarB`（活跃）、`Suspended`（停用）。
pub fn create_test_context(
    now: DateTime<Utc>,
) -> (Arc<FlowContext>, Arc<MockResourceStore>, Arc<FakeClock>) {
    let store = Arc::new(MockResourceStore::new());
    let clock = Arc::new(FakeClock::new(now));

    let repo = Arc::new(MockRegistrarRepository::with_registrars([
        test_registrar("RegistrarA", RegistrarStatus::Active),
        test_registrar("RegistrarB", RegistrarStatus::Active),
        test_registrar("Suspended", RegistrarStatus::Suspended),
    ]));

    let ctx = Arc::new(FlowContext::new(
        store.clone(),
        repo,
        RegistryConfig::default(),
        clock.clone(),
    ));
    (ctx, store, clock)
}

pub fn test_registrar(client_id: &str, status: RegistrarStatus) -> Registrar {
    Registrar {
        client_id: client_id.to_string(),
        display_name: format!("{client_id} Inc."),
        status,
        created_at: DateTime::UNIX_EPOCH,
    }
}

pub fn test_session(client_id: &str) -> SessionContext {
    SessionContext::normal(client_id)
}

fn base_resource(label: &str, sponsor: &str, now: DateTime<Utc>, data: ResourceData) -> EppResource {
    EppResource {
        repo_id: Uuid::new_v4().to_string(),
        label: label.to_string(),
        sponsor_client_id: sponsor.to_string(),
        creating_client_id: sponsor.to_string(),
        created_at: now,
        updated_at: now,
        deletion_time: None,
        statuses: [StatusValue::Ok].into(),
        transfer: None,
        revision: 0,
        data,
    }
}

/// 测试域名：注册期一年，auth info 固定为 `domain-secret`
pub fn test_domain(label: &str, sponsor: &str, now: DateTime<Utc>) -> EppResource {
    base_resource(
        label,
        sponsor,
        now,
        ResourceData::Domain(DomainData {
            registrant: "contact-1".to_string(),
            expiration_time: now + Duration::days(365),
            nameservers: vec![],
            ds_records: vec![],
            auth_info: "domain-secret".to_string(),
            grace_periods: vec![],
        }),
    )
}

pub fn test_contact(label: &str, sponsor: &str, now: DateTime<Utc>) -> EppResource {
    base_resource(
        label,
        sponsor,
        now,
        ResourceData::Contact(ContactData {
            name: "Test Person".to_string(),
            email: format!("{label}@example.tld"),
            auth_info: "contact-secret".to_string(),
        }),
    )
}

pub fn test_host(label: &str, sponsor: &str, now: DateTime<Utc>) -> EppResource {
    base_resource(
        label,
        sponsor,
        now,
        ResourceData::Host(HostData { addresses: vec![] }),
    )
}
