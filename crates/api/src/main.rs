use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};

use procura_api::app::{self, services::AppServices};
use procura_api::config::AppConfig;
use procura_infra::notify::LoggingTransport;
use procura_infra::{MarketStore, Marketplace, NotificationRuntime};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    procura_observability::init();

    if config.insecure_jwt_secret {
        warn!("JWT_SECRET not set; using insecure dev default");
    }
    if config.admin_email.is_none() {
        warn!("PROCURA_ADMIN_EMAIL not set; order alerts will be dropped");
    }

    let runtime = NotificationRuntime::start(&config.notifications, LoggingTransport)
        .context("failed to start notification workers")?;

    let mut marketplace = Marketplace::new(Arc::new(MarketStore::new()), runtime.queue.clone());
    if let Some(admin_email) = config.admin_email.clone() {
        marketplace = marketplace.with_admin_email(admin_email);
    }

    let app = app::build_app_with(config.jwt_secret.clone(), AppServices::new(marketplace));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(
        addr = %listener.local_addr()?,
        workers = config.notifications.workers,
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("draining notification workers");
    let delivered = runtime.shutdown();
    info!(
        processed = delivered.jobs_processed,
        succeeded = delivered.jobs_succeeded,
        failed = delivered.jobs_failed,
        dead_lettered = delivered.jobs_dead_lettered,
        "notification workers stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("ctrl_c signal received"),
        _ = terminate => info!("terminate signal received"),
    }
}
