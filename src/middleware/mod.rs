// 请求处理阶段
// /search 的执行顺序：validate_search -> cache_search -> rate_limit -> 处理器

mod cache_search;
mod error_handler;
mod rate_limit;
mod validate;

pub use cache_search::cache_search;
pub use error_handler::log_errors;
pub use rate_limit::rate_limit;
pub use validate::validate_search;
