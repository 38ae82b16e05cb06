//! 注册商档案 read-through 缓存
//!
//! 注册商数据读多写少；缓存随 `FlowContext` 显式传入各流程调用，
//! 写路径（档案变更）负责调用 `invalidate`，不存在环境态全局缓存。

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::CoreResult;
use crate::traits::RegistrarRepository;
use crate::types::Registrar;

/// 注册商缓存
pub struct RegistrarCache {
    repository: Arc<dyn RegistrarRepository>,
    cache: RwLock<HashMap<String, Registrar>>,
}

impl RegistrarCache {
    /// 包装仓库实现
    #[must_use]
    pub fn new(repository: Arc<dyn RegistrarRepository>) -> Self {
        Self {
            repository,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// read-through 读取：命中返回缓存值，未命中穿透到仓库并回填
    pub async fn get(&self, client_id: &str) -> CoreResult<Option<Registrar>> {
        if let Some(hit) = self.cache.read().await.get(client_id) {
            return Ok(Some(hit.clone()));
        }
        let loaded = self.repository.find_by_id(client_id).await?;
        if let Some(ref registrar) = loaded {
            self.cache
                .write()
                .await
                .insert(client_id.to_string(), registrar.clone());
        }
        Ok(loaded)
    }

    /// 档案写入后使对应条目失效
    pub async fn invalidate(&self, client_id: &str) {
        self.cache.write().await.remove(client_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_registrar, MockRegistrarRepository};
    use crate::types::RegistrarStatus;

    #[tokio::test]
    async fn read_through_hits_repository_once() {
        let repo = Arc::new(MockRegistrarRepository::new());
        repo.insert(test_registrar("RegistrarA", RegistrarStatus::Active))
            .await;
        let cache = RegistrarCache::new(repo.clone());

        assert!(cache.get("RegistrarA").await.unwrap().is_some());
        assert!(cache.get("RegistrarA").await.unwrap().is_some());
        assert_eq!(repo.lookup_count().await, 1);
    }

    #[tokio::test]
    async fn miss_is_not_cached() {
        let repo = Arc::new(MockRegistrarRepository::new());
        let cache = RegistrarCache::new(repo.clone());

        assert!(cache.get("ghost").await.unwrap().is_none());
        assert!(cache.get("ghost").await.unwrap().is_none());
        // 未命中不回填，每次都穿透
        assert_eq!(repo.lookup_count().await, 2);
    }

    #[tokio::test]
    async fn invalidate_forces_reload() {
        let repo = Arc::new(MockRegistrarRepository::new());
        repo.insert(test_registrar("RegistrarA", RegistrarStatus::Active))
            .await;
        let cache = RegistrarCache::new(repo.clone());

        cache.get("RegistrarA").await.unwrap();

        // 仓库中的档案被停用，缓存仍返回旧值直到失效
        repo.insert(test_registrar("RegistrarA", RegistrarStatus::Suspended))
            .await;
        let stale = cache.get("RegistrarA").await.unwrap().unwrap();
        assert_eq!(stale.status, RegistrarStatus::Active);

        cache.invalidate("RegistrarA").await;
        let fresh = cache.get("RegistrarA").await.unwrap().unwrap();
        assert_eq!(fresh.status, RegistrarStatus::Suspended);
    }
}
