use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{AppState, error::AppError, routes::search::SearchQuery};

/// 限流阶段：只做准入检查，计数由处理器在成功后记录
pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity_id = match req.extensions().get::<SearchQuery>() {
        Some(query) => query.identity_id.clone(),
        None => {
            tracing::error!("rate_limit reached without a validated query");
            return Err(AppError::InternalServerError);
        }
    };

    if !state.limiter.admit(&identity_id).await? {
        return Err(AppError::TooManyRequests);
    }

    Ok(next.run(req).await)
}
