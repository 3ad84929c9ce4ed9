use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use agromart_api::{app, spawn_schedule, AppState, JobRunner};
use agromart_core::{CatalogRepository, JobLock, MessagingGateway, UserDirectory};
use agromart_offer::{JobKind, MonitorConfig, OfferMonitor};
use agromart_store::app_config::Config;
use agromart_store::{
    DbClient, DryRunGateway, HttpSmsGateway, InMemoryCatalog, InMemoryUserDirectory,
    PgCatalogRepository, PgUserDirectory, RedisClient, RedisJobLock,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agromart_api=debug,agromart_offer=debug,agromart_store=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    config.validate().context("Invalid config")?;
    tracing::info!("Starting AgroMart offer monitor on port {}", config.server.port);

    // Catalog + user directory
    let (catalog, users, db): (Arc<dyn CatalogRepository>, Arc<dyn UserDirectory>, Option<Arc<DbClient>>) =
        match &config.database {
            Some(db_config) => {
                let db = DbClient::new(db_config)
                    .await
                    .context("Failed to connect to Postgres")?;
                db.migrate().await.context("Failed to run migrations")?;
                (
                    Arc::new(PgCatalogRepository::new(db.pool.clone())) as Arc<dyn CatalogRepository>,
                    Arc::new(PgUserDirectory::new(db.pool.clone())) as Arc<dyn UserDirectory>,
                    Some(Arc::new(db)),
                )
            }
            None => {
                tracing::warn!("No [database] configured, using the in-memory store");
                (
                    Arc::new(InMemoryCatalog::new()) as Arc<dyn CatalogRepository>,
                    Arc::new(InMemoryUserDirectory::new()) as Arc<dyn UserDirectory>,
                    None,
                )
            }
        };

    // SMS gateway, built once and shared by every run
    let gateway: Arc<dyn MessagingGateway> = if config.sms.dry_run {
        tracing::warn!("sms.dry_run is set, messages will only be logged");
        Arc::new(DryRunGateway::new())
    } else {
        Arc::new(HttpSmsGateway::new(&config.sms).context("Failed to build SMS gateway")?)
    };

    // Cross-instance job lock
    let lock: Option<Arc<dyn JobLock>> = match &config.redis {
        Some(redis) => {
            let client = RedisClient::new(&redis.url)
                .await
                .context("Failed to connect to Redis")?;
            Some(Arc::new(RedisJobLock::new(client)) as Arc<dyn JobLock>)
        }
        None => None,
    };

    let monitor = OfferMonitor::new(
        catalog,
        users,
        gateway,
        MonitorConfig {
            warn_horizon: config.monitor.warn_horizon(),
            send_interval: config.monitor.send_interval(),
            default_country_code: config.sms.default_country_code.clone(),
        },
    );
    let runner = Arc::new(JobRunner::new(Arc::new(monitor), lock, config.monitor.job_lock_ttl()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let schedules = vec![
        spawn_schedule(runner.clone(), JobKind::ScanAndWarn, config.monitor.scan_interval(), shutdown_rx.clone()),
        spawn_schedule(runner.clone(), JobKind::SweepExpired, config.monitor.sweep_interval(), shutdown_rx),
    ];

    let app = app(AppState { runner, db });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown requested");
            let _ = shutdown_tx.send(true);
        })
        .await
        .context("Server error")?;

    for schedule in schedules {
        if let Err(e) = schedule.await {
            tracing::error!("Scheduler task panicked: {}", e);
        }
    }
    Ok(())
}
