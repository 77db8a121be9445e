// 按身份的请求次数限制
// 计数是终身单调递增的，没有时间窗口，需要重置时由外部清理存储

mod pg_store;
mod redis_store;
mod store;

use std::sync::Arc;

pub use pg_store::PostgresCounterStore;
pub use redis_store::RedisCounterStore;
pub use store::{CounterStore, CounterStoreError, InMemoryCounterStore};

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    ceiling: u64,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, ceiling: u64) -> Self {
        Self {
            store,
            ceiling: ceiling.max(1),
        }
    }

    pub fn ceiling(&self) -> u64 {
        self.ceiling
    }

    /// 准入检查：只读，不修改计数
    ///
    /// 检查与 [`RateLimiter::record`] 是两个独立步骤，中间不持有锁。
    /// 同一身份的并发请求可能同时通过检查，使计数短暂超过上限。
    pub async fn admit(&self, identity_id: &str) -> Result<bool, CounterStoreError> {
        let current = self.store.find(identity_id).await?.unwrap_or(0);
        if current >= self.ceiling {
            tracing::info!(
                "Identity {} rejected: {} of {} requests used",
                identity_id,
                current,
                self.ceiling
            );
            return Ok(false);
        }
        Ok(true)
    }

    /// 记录一次请求，返回新的计数
    pub async fn record(&self, identity_id: &str) -> Result<u64, CounterStoreError> {
        self.store.increment(identity_id).await
    }

    /// 当前计数，未出现过的身份为 0
    pub async fn count(&self, identity_id: &str) -> Result<u64, CounterStoreError> {
        Ok(self.store.find(identity_id).await?.unwrap_or(0))
    }
}
