use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};

use super::store::{CounterStore, CounterStoreError};

/// 请求计数键前缀
const REQUEST_COUNT_PREFIX: &str = "request_count:";

fn request_count_key(identity_id: &str) -> String {
    format!("{}{}", REQUEST_COUNT_PREFIX, identity_id)
}

/// Redis 计数存储，计数不设过期时间
pub struct RedisCounterStore {
    redis: Arc<RedisClient>,
}

impl RedisCounterStore {
    pub fn new(redis: RedisClient) -> Self {
        Self {
            redis: Arc::new(redis),
        }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn find(&self, identity_id: &str) -> Result<Option<u64>, CounterStoreError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let count: Option<u64> = conn.get(request_count_key(identity_id)).await?;
        Ok(count)
    }

    async fn increment(&self, identity_id: &str) -> Result<u64, CounterStoreError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        // INCR 在键不存在时从 0 开始
        let count: u64 = conn.incr(request_count_key(identity_id), 1).await?;
        Ok(count)
    }
}
