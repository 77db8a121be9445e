use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use search_backend::{
    AppState,
    config::{Config, CounterBackend},
    limiter::{CounterStore, InMemoryCounterStore, PostgresCounterStore, RedisCounterStore},
    router::create_router,
    scrape::{BackgroundRefresher, HttpArticleFetcher},
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

async fn build_counter_store(config: &Config) -> Result<Arc<dyn CounterStore>, BoxError> {
    match config.counter_backend {
        CounterBackend::Memory => {
            tracing::warn!("Using in-memory request counters; counts reset on restart");
            Ok(Arc::new(InMemoryCounterStore::new()))
        }
        CounterBackend::Redis => {
            let url = config.redis_url.as_deref().ok_or("REDIS_URL is not set")?;
            let client = redis::Client::open(url)?;
            Ok(Arc::new(RedisCounterStore::new(client)))
        }
        CounterBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or("DATABASE_URL is not set")?;
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .after_connect(|conn, _meta| {
                    Box::pin(async move {
                        conn.execute("SET application_name = 'search_backend';")
                            .await?;
                        Ok(())
                    })
                })
                .connect(url)
                .await?;
            let store = PostgresCounterStore::new(pool);
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 设置计数存储
    let counters = build_counter_store(&config)
        .await
        .expect("Failed to set up counter store");

    // 设置应用状态
    let state = AppState::new(config.clone(), counters);

    // 启动后台抓取任务
    let refresher = if config.scrape_enabled {
        tracing::info!(
            "Scraping {} every {}s",
            config.scrape_url,
            config.scrape_interval_secs
        );
        let fetcher = HttpArticleFetcher::new(&config.scrape_url);
        Some(
            BackgroundRefresher::new(
                fetcher,
                state.cache.clone(),
                config.scrape_interval(),
                config.cache_ttl(),
            )
            .spawn(),
        )
    } else {
        tracing::info!("Background scraping disabled");
        None
    };

    let app = create_router(state);

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

    if let Some(handle) = refresher {
        handle.abort();
    }
}
