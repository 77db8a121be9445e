use axum::{
    body::{Body, to_bytes},
    extract::Request,
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use crate::{cache::search_key, error::AppError, routes::search::SearchRequest};

const MAX_BODY_BYTES: usize = 64 * 1024;

/// 解析并校验搜索参数，生成缓存键，校验失败时不产生任何副作用
pub async fn validate_search(req: Request, next: Next) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let bytes = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
        tracing::debug!("Failed to read search body: {}", e);
        AppError::Validation("请求体读取失败".to_string())
    })?;

    let params: Value = serde_json::from_slice(&bytes)
        .ok()
        .filter(Value::is_object)
        .ok_or_else(|| AppError::Validation("请求体必须是 JSON 对象".to_string()))?;

    let request: SearchRequest = serde_json::from_value(params.clone())
        .map_err(|e| AppError::Validation(format!("参数格式错误: {}", e)))?;
    let query = request.validate(search_key(&params))?;

    parts.extensions.insert(query);
    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}
