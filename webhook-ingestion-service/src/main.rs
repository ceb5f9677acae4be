use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use webhook_ingestion_service::config::Config;
use webhook_ingestion_service::dispatch::Deps;
use webhook_ingestion_service::http::build_router;
use webhook_ingestion_service::ledger::{EventLedger, PostgresLedger};
use webhook_ingestion_service::processor::NoopProcessor;
use webhook_ingestion_service::worker::{self, WorkerConfig};
use webhook_ingestion_service::AppState;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::load().context("loading configuration")?;

    let ledger = PostgresLedger::connect(&config.db_url)
        .await
        .context("connecting to the event ledger")?;
    ledger.migrate().await.context("running ledger migrations")?;
    let ledger: Arc<dyn EventLedger> = Arc::new(ledger);

    let processor = Arc::new(NoopProcessor);

    let state = AppState::new(config, ledger.clone(), processor.clone());
    let worker_cfg = WorkerConfig {
        interval: state.config.worker_interval(),
        burst: state.config.worker_burst,
        idle_delay: state.config.worker_idle_delay(),
    };
    let bind_addr = state.config.bind_addr.clone();

    let cancel = CancellationToken::new();
    let worker_deps = Deps::new(ledger, processor);
    let worker_handle = tokio::spawn(worker::run(worker_deps, worker_cfg, cancel.clone()));

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    info!(addr = %bind_addr, "listening");

    let server_cancel = cancel.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("shutdown signal received, draining in-flight requests");
        })
        .await
        .context("http server")?;

    server_cancel.cancel();
    match tokio::time::timeout(SHUTDOWN_GRACE, worker_handle).await {
        Ok(Ok(())) => info!("worker stopped cleanly"),
        Ok(Err(e)) => error!(err = %e, "worker task panicked"),
        Err(_) => error!("worker did not stop within the shutdown grace period"),
    }

    info!("bye");
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webhook_ingestion_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM — whichever arrives first.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
