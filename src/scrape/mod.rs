// 文章抓取
// 外部抓取接口 + 后台定时刷新任务

mod fetcher;
mod refresher;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use fetcher::{HttpArticleFetcher, parse_articles};
pub use refresher::BackgroundRefresher;

/// 一篇抓取到的文章
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedRecord {
    pub title: String,
    pub content: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[cfg(test)]
    #[error("{0}")]
    Other(String),
}

/// 文章来源，由后台刷新任务周期性调用
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch(&self) -> Result<Vec<ScrapedRecord>, FetchError>;
}
