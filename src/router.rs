use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower::ServiceBuilder;

use crate::{
    AppState,
    middleware::{cache_search, log_errors, rate_limit, validate_search},
    routes,
};

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    // 按顺序执行，先添加的在外层：缓存包裹限流，命中缓存时不做限流检查
    let search_stages = ServiceBuilder::new()
        .layer(from_fn(validate_search))
        .layer(from_fn_with_state(state.clone(), cache_search))
        .layer(from_fn_with_state(state.clone(), rate_limit));

    let router = Router::new()
        .route("/health", get(routes::health::health))
        .route("/articles", get(routes::articles::get_articles))
        .route(
            "/search",
            post(routes::search::search).layer(search_stages),
        )
        .layer(from_fn(log_errors));

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    router.with_state(state)
}
