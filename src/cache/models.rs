use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scrape::ScrapedRecord;

/// 后台抓取结果缓存
#[derive(Debug, Serialize, Clone)]
pub struct CachedArticles {
    pub articles: Vec<ScrapedRecord>,
    pub fetched_at: DateTime<Utc>,
}

/// 搜索接口的响应缓存，保存序列化后的原始字节，命中时原样返回
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub body: Bytes,
}

/// 共享缓存中的值
#[derive(Debug, Clone)]
pub enum CachedValue {
    Articles(CachedArticles),
    Response(CachedResponse),
}
