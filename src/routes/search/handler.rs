use std::time::Instant;

use axum::extract::{Extension, Json, State};

use super::model::{SearchQuery, SearchResponse, synthesize_results};
use crate::{AppState, error::AppError};

/// 搜索处理器
///
/// 到达这里时参数已校验、缓存未命中且已通过限流检查。
#[axum::debug_handler]
pub async fn search(
    State(state): State<AppState>,
    Extension(query): Extension<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let started = Instant::now();

    tracing::debug!("threshold {} accepted but unused", query.threshold);
    let search_results = synthesize_results(&query.text, query.top_k);

    // 记录本次请求
    let count = state.limiter.record(&query.identity_id).await?;

    let inference_time = started.elapsed().as_secs_f64();

    tracing::info!(
        "User {} made a request: text={:?} top_k={} threshold={} (request #{})",
        query.identity_id,
        query.text,
        query.top_k,
        query.threshold,
        count
    );
    tracing::info!("Inference time: {} seconds", inference_time);

    Ok(Json(SearchResponse {
        identity_id: query.identity_id,
        search_results,
        inference_time,
    }))
}
