use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum CounterStoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// 按身份记录请求次数的存储
///
/// 不存在的身份视为已使用 0 次。
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// 查询身份当前计数
    async fn find(&self, identity_id: &str) -> Result<Option<u64>, CounterStoreError>;

    /// 计数加一，不存在时创建为 1，返回新的计数
    async fn increment(&self, identity_id: &str) -> Result<u64, CounterStoreError>;
}

/// 进程内计数存储
#[derive(Default)]
pub struct InMemoryCounterStore {
    counters: Mutex<HashMap<String, u64>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn find(&self, identity_id: &str) -> Result<Option<u64>, CounterStoreError> {
        Ok(self.counters.lock().get(identity_id).copied())
    }

    async fn increment(&self, identity_id: &str) -> Result<u64, CounterStoreError> {
        let mut counters = self.counters.lock();
        let count = counters.entry(identity_id.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }
}
