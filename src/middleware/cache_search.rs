use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    cache::{CachedResponse, CachedValue},
    error::AppError,
    routes::search::SearchQuery,
};

/// 搜索结果缓存
///
/// 命中时直接返回缓存的响应字节，不经过限流；未命中时执行后续阶段，
/// 只缓存 200 响应。
pub async fn cache_search(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = match req.extensions().get::<SearchQuery>() {
        Some(query) => query.cache_key.clone(),
        None => {
            tracing::error!("cache_search reached without a validated query");
            return Err(AppError::InternalServerError);
        }
    };

    if let Some(CachedValue::Response(cached)) = state.cache.get(&key) {
        tracing::debug!("Search cache hit: {}", key);
        return Ok(([(header::CONTENT_TYPE, "application/json")], cached.body).into_response());
    }

    let response = next.run(req).await;
    if response.status() != StatusCode::OK {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.map_err(|e| {
        tracing::error!("Failed to buffer search response: {}", e);
        AppError::InternalServerError
    })?;
    state.cache.set(
        key,
        CachedValue::Response(CachedResponse {
            body: bytes.clone(),
        }),
        state.config.cache_ttl(),
    );

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
