use axum::{Json, extract::State};

use crate::{
    AppState,
    cache::{CachedArticles, CachedValue, SCRAPED_ARTICLES_KEY},
    error::AppError,
};

/// 返回最近一次后台抓取的文章
#[axum::debug_handler]
pub async fn get_articles(State(state): State<AppState>) -> Result<Json<CachedArticles>, AppError> {
    match state.cache.get(SCRAPED_ARTICLES_KEY) {
        Some(CachedValue::Articles(cached)) => Ok(Json(cached)),
        _ => Err(AppError::NotFound("暂无抓取结果".to_string())),
    }
}
