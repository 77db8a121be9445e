// 缓存模块
// 进程内 TTL 缓存，由后台抓取任务和搜索接口共享

pub mod keys;
pub mod models;
pub mod ttl_cache;

pub use keys::{SCRAPED_ARTICLES_KEY, search_key};
pub use models::{CachedArticles, CachedResponse, CachedValue};
pub use ttl_cache::TtlCache;

/// 抓取结果与搜索响应共用的缓存实例类型
pub type SharedCache = TtlCache<String, CachedValue>;
