use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use super::{ArticleFetcher, FetchError};
use crate::cache::{CachedArticles, CachedValue, SCRAPED_ARTICLES_KEY, SharedCache};

/// 后台抓取任务
///
/// 每轮：调用抓取接口，成功则整体替换 [`SCRAPED_ARTICLES_KEY`] 下的缓存；
/// 失败只记录日志，不重试，等待下一轮。两轮之间的间隔从上一轮结束开始计算。
pub struct BackgroundRefresher<F> {
    fetcher: F,
    cache: Arc<SharedCache>,
    interval: Duration,
    ttl: Duration,
}

impl<F> BackgroundRefresher<F>
where
    F: ArticleFetcher + 'static,
{
    pub fn new(fetcher: F, cache: Arc<SharedCache>, interval: Duration, ttl: Duration) -> Self {
        Self {
            fetcher,
            cache,
            interval,
            ttl,
        }
    }

    /// 启动后台任务，第一轮立即执行
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// 无限循环，只会随进程结束或任务被取消而停止
    pub async fn run(self) {
        let mut cycle: u64 = 0;
        loop {
            cycle += 1;
            tracing::info!("Scraping articles (cycle {})...", cycle);
            if let Err(e) = self.refresh_once().await {
                tracing::warn!("Scrape cycle {} failed, keeping previous articles: {}", cycle, e);
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// 执行一轮抓取，返回写入缓存的文章数
    pub async fn refresh_once(&self) -> Result<usize, FetchError> {
        let articles = self.fetcher.fetch().await?;
        let count = articles.len();
        self.cache.set(
            SCRAPED_ARTICLES_KEY.to_string(),
            CachedValue::Articles(CachedArticles {
                articles,
                fetched_at: Utc::now(),
            }),
            self.ttl,
        );
        tracing::info!("Scraped {} articles.", count);
        Ok(count)
    }
}
