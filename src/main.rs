use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use payments_ingress::buffer::IngestBuffer;
use payments_ingress::config::AppConfig;
use payments_ingress::gateways::http::HttpProcessorGateway;
use payments_ingress::health::cache::HealthCache;
use payments_ingress::health::poller::HealthPoller;
use payments_ingress::repo::transactions_repo::TransactionsRepo;
use payments_ingress::router::{GatewayRouter, SuccessPolicy};
use payments_ingress::service::recorder::TransactionRecorder;
use payments_ingress::worker::WorkerPool;
use payments_ingress::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const MAX_BODY_BYTES: usize = 8 * 1024;
const WORKER_BACKOFF: Duration = Duration::from_millis(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(cfg.db_pool_size)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let buffer = Arc::new(IngestBuffer::new(cfg.max_queue_size));
    let health = HealthCache::new();
    let recorder = TransactionRecorder::new(Arc::new(TransactionsRepo { pool }));

    let poller = HealthPoller {
        cache: health.clone(),
        client: reqwest::Client::new(),
        default_health_url: format!("{}/payments/service-health", cfg.default_base_url),
        fallback_health_url: format!("{}/payments/service-health", cfg.fallback_base_url),
        interval: cfg.health_poll_interval,
        deadline: cfg.request_timeout,
    };
    tokio::spawn(poller.run());

    let gateway = HttpProcessorGateway::new(
        cfg.default_base_url.clone(),
        cfg.fallback_base_url.clone(),
        cfg.request_timeout,
        cfg.http_pool_size,
        cfg.http_pool_count,
        cfg.connect_budget,
    )?;

    let router = Arc::new(GatewayRouter {
        gateway: Arc::new(gateway),
        recorder: recorder.clone(),
        health: health.clone(),
        success_policy: SuccessPolicy::default(),
        slow_threshold_ms: cfg.health_slow_threshold_ms,
    });

    let workers = WorkerPool {
        buffer: buffer.clone(),
        router,
        concurrency: cfg.max_concurrency,
        idle_backoff: WORKER_BACKOFF,
        requeue_cooldown: WORKER_BACKOFF,
    };
    workers.spawn();

    let state = AppState {
        buffer: buffer.clone(),
        health,
        recorder,
    };

    let app = Router::new()
        .route(
            "/payments",
            post(payments_ingress::http::handlers::payments::submit_payment),
        )
        .route(
            "/payments-summary",
            get(payments_ingress::http::handlers::summary::payments_summary),
        )
        .route(
            "/health",
            get(payments_ingress::http::handlers::health::health),
        )
        .fallback(payments_ingress::http::handlers::health::not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cfg.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Workers get one request deadline to finish what they already took.
    let drain_deadline = std::time::Instant::now() + cfg.request_timeout;
    while buffer.in_flight() > 0 && std::time::Instant::now() < drain_deadline {
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
