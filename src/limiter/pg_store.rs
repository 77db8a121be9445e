use async_trait::async_trait;
use sqlx::PgPool;

use super::store::{CounterStore, CounterStoreError};

/// Postgres 计数存储，每个身份一行
pub struct PostgresCounterStore {
    pool: PgPool,
}

impl PostgresCounterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 创建计数表（已存在则跳过）
    pub async fn ensure_schema(&self) -> Result<(), CounterStoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS identity_counters (
                identity_id TEXT PRIMARY KEY,
                request_count BIGINT NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl CounterStore for PostgresCounterStore {
    async fn find(&self, identity_id: &str) -> Result<Option<u64>, CounterStoreError> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT request_count FROM identity_counters WHERE identity_id = $1",
        )
        .bind(identity_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(count.map(|c| c.max(0) as u64))
    }

    async fn increment(&self, identity_id: &str) -> Result<u64, CounterStoreError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO identity_counters (identity_id, request_count)
            VALUES ($1, 1)
            ON CONFLICT (identity_id)
            DO UPDATE SET request_count = identity_counters.request_count + 1
            RETURNING request_count
            "#,
        )
        .bind(identity_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u64)
    }
}
