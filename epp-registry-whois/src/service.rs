//! WHOIS 查询服务
//!
//! 基于注册局存储的只读视图。对公开数据应用与流程引擎相同的转移懒解析，
//! 因此越过自动批准边界的转移绝不会以 pending 状态对外展示——即使
//! 解析结果尚未被任何写流程落盘。

use std::sync::Arc;

use epp_registry_core::services::{transfer, RegistrarCache};
use epp_registry_core::traits::{RegistrarRepository, ResourceStore};
use epp_registry_core::types::{EppResource, ResourceKind};
use epp_registry_core::utils::Clock;
use epp_registry_core::RegistryConfig;

use crate::error::{WhoisError, WhoisResult};
use crate::types::{WhoisDomainRecord, WhoisHostRecord, WhoisRegistrarRecord};

/// WHOIS 查询服务
pub struct WhoisService {
    store: Arc<dyn ResourceStore>,
    registrars: RegistrarCache,
    config: RegistryConfig,
    clock: Arc<dyn Clock>,
}

impl WhoisService {
    /// 创建查询服务
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

    /// 域名查询
    pub async fn lookup_domain(&self, domain: &str) -> WhoisResult<WhoisDomainRecord> {
        let label = normalize_name(domain)?;
        let resource = self.load_live(ResourceKind::Domain, &label).await?;
        let registrar = self.display_name(&resource.sponsor_client_id).await?;

        let Some(data) = resource.domain() else {
            return Err(WhoisError::StorageError(format!(
                "object stored under domain label is not a domain: {label}"
            )));
        };
        Ok(WhoisDomainRecord {
            domain: resource.label.clone(),
            registrar,
            statuses: resource.statuses.iter().copied().collect(),
            created: resource.created_at,
            updated: resource.updated_at,
            expiration: data.expiration_time,
            name_servers: data.nameservers.clone(),
            dnssec_signed: !data.ds_records.is_empty(),
            transfer_status: resource.transfer.as_ref().map(|t| t.status),
        })
    }

    /// 主机查询
    pub async fn lookup_host(&self, host: &str) -> WhoisResult<WhoisHostRecord> {
        let label = normalize_name(host)?;
        let resource = self.load_live(ResourceKind::Host, &label).await?;
        let registrar = self.display_name(&resource.sponsor_client_id).await?;

        let addresses = match &resource.data {
            epp_registry_core::types::ResourceData::Host(h) => h.addresses.clone(),
            _ => {
                return Err(WhoisError::StorageError(format!(
                    "object stored under host label is not a host: {label}"
                )))
            }
        };
        Ok(WhoisHostRecord {
            host: resource.label.clone(),
            registrar,
            statuses: resource.statuses.iter().copied().collect(),
            addresses,
            created: resource.created_at,
        })
    }

    /// 注册商查询
    pub async fn lookup_registrar(&self, client_id: &str) -> WhoisResult<WhoisRegistrarRecord> {
        let client_id = client_id.trim();
        if client_id.is_empty() {
            return Err(WhoisError::ValidationError(
                "registrar id is required".to_string(),
            ));
        }
        let registrar = self
            .registrars
            .get(client_id)
            .await?
            .ok_or_else(|| WhoisError::NotFound(client_id.to_string()))?;
        Ok(WhoisRegistrarRecord {
            client_id: registrar.client_id,
            display_name: registrar.display_name,
            active: registrar.status == epp_registry_core::types::RegistrarStatus::Active,
            created: registrar.created_at,
        })
    }

    /// 读取活跃资源并应用转移懒解析（只读，不落盘）
    async fn load_live(&self, kind: ResourceKind, label: &str) -> WhoisResult<EppResource> {
        let now = self.clock.now();
        let resource = self
            .store
            .find_by_label(kind, label)
            .await?
            .filter(|r| r.is_live(now))
            .ok_or_else(|| WhoisError::NotFound(label.to_string()))?;
        let (resolved, _) = transfer::resolve_expiry(resource, now, &self.config);
        Ok(resolved)
    }

    /// sponsoring registrar 展示名称（档案缺失时退回客户端 ID）
    async fn display_name(&self, client_id: &str) -> WhoisResult<String> {
        match self.registrars.get(client_id).await? {
            Some(registrar) => Ok(registrar.display_name),
            None => {
                log::warn!("sponsoring registrar has no profile: {client_id}");
                Ok(client_id.to_string())
            }
        }
    }
}

/// 规范化查询名：去空白、折叠为小写，必须是 FQDN
fn normalize_name(name: &str) -> WhoisResult<String> {
    let name = name.trim().to_ascii_lowercase();
    if name.is_empty() {
        return Err(WhoisError::ValidationError("name is required".to_string()));
    }
    if !name.contains('.') || name.chars().any(char::is_whitespace) {
        return Err(WhoisError::ValidationError(format!(
            "not a fully qualified name: '{name}'"
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tokio::sync::RwLock;

    use epp_registry_core::error::CoreResult;
    use epp_registry_core::traits::CommitSet;
    use epp_registry_core::types::{
        DomainData, HistoryEntry, HostData, Registrar, RegistrarStatus, ResourceData, StatusValue,
        TransferData, TransferStatus,
    };

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap()
    }

    #[derive(Default)]
    struct StaticStore {
        resources: RwLock<Vec<EppResource>>,
    }

    #[async_trait::async_trait]
    impl ResourceStore for StaticStore {
        async fn load(&self, repo_id: &str) -> CoreResult<Option<EppResource>> {
            Ok(self
                .resources
                .read()
                .await
                .iter()
                .find(|r| r.repo_id == repo_id)
                .cloned())
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
                .iter()
                .find(|r| r.kind() == kind && r.label == label)
                .cloned())
        }

        async fn domains_referencing_host(
            &self,
            _host_name: &str,
            _now: DateTime<Utc>,
        ) -> CoreResult<Vec<String>> {
            Ok(vec![])
        }

        async fn latest_history(&self, _repo_id: &str) -> CoreResult<Option<HistoryEntry>> {
            Ok(None)
        }

        async fn commit(&self, _commit_set: CommitSet) -> CoreResult<()> {
            unreachable!("whois never writes")
        }
    }

    struct StaticRegistrars(HashMap<String, Registrar>);

    #[async_trait::async_trait]
    impl RegistrarRepository for StaticRegistrars {
        async fn find_by_id(&self, client_id: &str) -> CoreResult<Option<Registrar>> {
            Ok(self.0.get(client_id).cloned())
        }
    }

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn domain(label: &str, sponsor: &str) -> EppResource {
        EppResource {
            repo_id: format!("repo-{label}"),
            label: label.to_string(),
            sponsor_client_id: sponsor.to_string(),
            creating_client_id: sponsor.to_string(),
            created_at: t0(),
            updated_at: t0(),
            deletion_time: None,
            statuses: BTreeSet::from([StatusValue::Ok]),
            transfer: None,
            revision: 1,
            data: ResourceData::Domain(DomainData {
                registrant: "contact-1".to_string(),
                expiration_time: t0() + Duration::days(365),
                nameservers: vec!["ns1.example.tld".to_string()],
                ds_records: vec![],
                auth_info: "domain-secret".to_string(),
                grace_periods: vec![],
            }),
        }
    }

    fn service(resources: Vec<EppResource>, now: DateTime<Utc>) -> WhoisService {
        let store = Arc::new(StaticStore {
            resources: RwLock::new(resources),
        });
        let registrars = HashMap::from([(
            "RegistrarA".to_string(),
            Registrar {
                client_id: "RegistrarA".to_string(),
                display_name: "Registrar A Inc.".to_string(),
                status: RegistrarStatus::Active,
                created_at: t0(),
            },
        )]);
        WhoisService::new(
            store,
            Arc::new(StaticRegistrars(registrars)),
            RegistryConfig::default(),
            Arc::new(FixedClock(now)),
        )
    }

    #[tokio::test]
    async fn domain_lookup_returns_public_view() {
        let svc = service(vec![domain("example.tld", "RegistrarA")], t0());
        let record = svc.lookup_domain("EXAMPLE.TLD").await.unwrap();
        assert_eq!(record.domain, "example.tld");
        assert_eq!(record.registrar, "Registrar A Inc.");
        assert_eq!(record.name_servers, vec!["ns1.example.tld".to_string()]);
        assert!(!record.dnssec_signed);
        // 查询名大小写折叠后命中
        assert_eq!(record.statuses, vec![StatusValue::Ok]);
    }

    #[tokio::test]
    async fn unknown_domain_is_not_found() {
        let svc = service(vec![], t0());
        assert!(matches!(
            svc.lookup_domain("ghost.tld").await,
            Err(WhoisError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn tombstoned_domain_is_not_found() {
        let mut d = domain("example.tld", "RegistrarA");
        d.deletion_time = Some(t0() - Duration::days(1));
        let svc = service(vec![d], t0());
        assert!(matches!(
            svc.lookup_domain("example.tld").await,
            Err(WhoisError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn expired_transfer_is_never_shown_as_pending() {
        let mut d = domain("example.tld", "RegistrarA");
        d.transfer = Some(TransferData {
            status: TransferStatus::Pending,
            gaining_client_id: "RegistrarB".to_string(),
            losing_client_id: "RegistrarA".to_string(),
            request_time: t0(),
            expiration_time: t0() + Duration::days(5),
            billing_event_id: None,
        });
        d.statuses.insert(StatusValue::PendingTransfer);

        // 读取发生在自动批准边界之后
        let svc = service(vec![d], t0() + Duration::days(6));
        let record = svc.lookup_domain("example.tld").await.unwrap();
        assert_eq!(record.transfer_status, Some(TransferStatus::ServerApproved));
        assert!(!record.statuses.contains(&StatusValue::PendingTransfer));
        // sponsorship 展示为受让方（档案缺失时退回 ID）
        assert_eq!(record.registrar, "RegistrarB");
    }

    #[tokio::test]
    async fn host_lookup_returns_addresses() {
        let host = EppResource {
            repo_id: "repo-ns1".to_string(),
            label: "ns1.example.tld".to_string(),
            sponsor_client_id: "RegistrarA".to_string(),
            creating_client_id: "RegistrarA".to_string(),
            created_at: t0(),
            updated_at: t0(),
            deletion_time: None,
            statuses: BTreeSet::from([StatusValue::Ok]),
            transfer: None,
            revision: 1,
            data: ResourceData::Host(HostData {
                addresses: vec!["192.0.2.1".to_string()],
            }),
        };
        let svc = service(vec![host], t0());
        let record = svc.lookup_host("ns1.example.tld").await.unwrap();
        assert_eq!(record.addresses, vec!["192.0.2.1".to_string()]);
    }

    #[tokio::test]
    async fn registrar_lookup() {
        let svc = service(vec![], t0());
        let record = svc.lookup_registrar("RegistrarA").await.unwrap();
        assert_eq!(record.display_name, "Registrar A Inc.");
        assert!(record.active);

        assert!(matches!(
            svc.lookup_registrar("ghost").await,
            Err(WhoisError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn rejects_unqualified_query() {
        let svc = service(vec![], t0());
        assert!(matches!(
            svc.lookup_domain("example").await,
            Err(WhoisError::ValidationError(_))
        ));
        assert!(matches!(
            svc.lookup_domain("   ").await,
            Err(WhoisError::ValidationError(_))
        ));
    }
}
