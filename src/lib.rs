use std::sync::Arc;

use cache::SharedCache;
use config::Config;
use limiter::{CounterStore, RateLimiter};

pub mod cache;
pub mod config;
pub mod error;
pub mod limiter;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod scrape;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub cache: Arc<SharedCache>,
    pub limiter: RateLimiter,
}

impl AppState {
    /// 启动时创建一次，缓存与限流器在请求处理和后台任务之间共享
    pub fn new(config: Config, counters: Arc<dyn CounterStore>) -> Self {
        let cache = Arc::new(SharedCache::new(config.cache_max_entries));
        let limiter = RateLimiter::new(counters, config.rate_limit_requests);
        Self {
            config,
            cache,
            limiter,
        }
    }
}
