use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aegle_ai::HttpClassifier;
use aegle_cache::{Cache, NoopCache, RedisCache};
use aegle_db::pg::PgStore;
use aegle_engine::{EngineConfig, LifecycleEngine, Notifier};
use aegle_events::DeliveryChannel;

use aegle_api::config::ServerConfig;
use aegle_api::router::build_app_router;
use aegle_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aegle_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = aegle_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    aegle_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    aegle_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let store = Arc::new(PgStore::new(pool));

    // --- Cache ---
    // The cache tier is optional: without REDIS_URL the service runs
    // uncached, which only costs latency.
    let cache: Arc<dyn Cache> = match std::env::var("REDIS_URL") {
        Ok(url) => {
            let redis = RedisCache::connect(&url)
                .await
                .expect("Failed to connect to Redis");
            tracing::info!("Redis cache connected");
            Arc::new(redis)
        }
        Err(_) => {
            tracing::warn!("REDIS_URL not set, running without a cache tier");
            Arc::new(NoopCache)
        }
    };

    // --- Delivery channel ---
    let channel = Arc::new(DeliveryChannel::new());

    // --- Engine ---
    let engine_config = EngineConfig::default();
    let notifier = Arc::new(Notifier::new(
        store.clone(),
        cache.clone(),
        channel.clone(),
        engine_config.clone(),
    ));
    let engine = Arc::new(LifecycleEngine::new(
        store.clone(),
        store.clone(),
        cache.clone(),
        notifier.clone(),
        engine_config,
    ));

    // --- Classifier ---
    let classifier = Arc::new(HttpClassifier::new(config.ai_service_url.clone()));
    tracing::info!(url = %config.ai_service_url, "AI classification client ready");

    // --- App state & router ---
    let state = AppState {
        config: Arc::new(config.clone()),
        engine,
        notifier,
        channel,
        classifier,
        store,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
