//! Front Desk Server - visitor flow and department routing API.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use http::HeaderValue;
use sqlx::postgres::PgPoolOptions;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use front_desk::adapters::http::api_router;
use front_desk::adapters::{
    InMemoryVisitStore, PostgresVisitStore, RestStoreConfig, RestVisitStore,
    RoleCapabilityChecker, SystemClock,
};
use front_desk::application::FrontDesk;
use front_desk::config::{AppConfig, StoreBackend};
use front_desk::ports::VisitStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config);
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        environment = ?config.server.environment,
        backend = ?config.store.backend,
        "Starting Front Desk v{}",
        env!("CARGO_PKG_VERSION")
    );

    let store = build_store(&config).await?;
    let front_desk = Arc::new(FrontDesk::new(
        store,
        Arc::new(RoleCapabilityChecker::new()),
        Arc::new(SystemClock),
        config.front_desk().context("Invalid queue or editor configuration")?,
    ));

    match front_desk.refresh().await {
        Ok(count) => tracing::info!(visits = count, "Initial visit snapshot loaded"),
        Err(e) => tracing::warn!(error = %e, "Initial visit snapshot failed; queue starts empty"),
    }

    let app = create_router(&config, front_desk.clone())?;
    let addr = config.server.socket_addr().context("Invalid server address")?;

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let unsaved = front_desk.shutdown().await;
    if unsaved.is_empty() {
        tracing::info!("Pending edits flushed");
    } else {
        tracing::warn!(visits = ?unsaved, "Purpose edits left unsaved at shutdown");
    }

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn VisitStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory visit store; visits are lost on restart");
            Ok(Arc::new(InMemoryVisitStore::new()))
        }
        StoreBackend::Rest => {
            let base_url = config
                .store
                .base_url
                .clone()
                .context("store.base_url is required for the rest backend")?;
            let token = config
                .store
                .api_token
                .clone()
                .context("store.api_token is required for the rest backend")?;
            let store = RestVisitStore::new(
                RestStoreConfig::new(base_url, token).with_timeout(config.store.timeout()),
            )?;
            tracing::info!("Using REST visit store");
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres => {
            let database = &config.database;
            let pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .min_connections(database.min_connections)
                .acquire_timeout(database.acquire_timeout())
                .idle_timeout(database.idle_timeout())
                .connect(&database.url)
                .await
                .context("Failed to connect to database")?;

            tracing::info!("Connected to database");

            let store = PostgresVisitStore::new(pool);
            if database.run_migrations {
                store.migrate().await?;
                tracing::info!("Database migrations completed");
            }
            Ok(Arc::new(store))
        }
    }
}

/// Create the application router with all routes and layers
fn create_router(config: &AppConfig, front_desk: Arc<FrontDesk>) -> anyhow::Result<Router> {
    let origins = config.server.cors_origins_list();
    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = origins
            .iter()
            .map(|o| HeaderValue::from_str(o))
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid CORS origin")?;
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    }
    .allow_methods(Any)
    .allow_headers(Any);

    Ok(api_router(front_desk)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
