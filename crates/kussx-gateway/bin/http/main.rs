mod cli;

use crate::cli::CLI;
use anyhow::Context;
use clap::Parser;
use kussx_codec::KeyCodec;
use kussx_core::KvStore;
use kussx_gateway::config::{Configuration, Settings, StoreBackend};
use kussx_gateway::{telemetry, App, AppState};
use kussx_shortener::ShortLinkService;
use kussx_storage::{InMemoryStore, RedisStore};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CLI::parse();

    let config =
        Configuration::load(cli.config.as_deref()).context("failed to load configuration")?;
    let settings = Settings::from_config(&config).context("invalid configuration")?;

    telemetry::init_tracing(settings.log_format).context("failed to initialize logging")?;

    info!(
        listen_addr = %settings.listen_addr(),
        store_backend = %settings.store_backend,
        "starting kussx"
    );

    if settings.salt_generated {
        warn!("no salt configured, using a generated one; keys will not decode after a restart");
    }
    let codec = KeyCodec::new(settings.codec_settings()).context("invalid key codec settings")?;

    match settings.store_backend {
        StoreBackend::InMemory => run_server(&settings, InMemoryStore::new(), codec).await,
        StoreBackend::Redis => {
            info!(redis = ?settings.redis, "connecting to Redis");
            let store = RedisStore::connect(&settings.redis)
                .await
                .context("failed to connect to Redis")?;
            run_server(&settings, store, codec).await
        }
    }
}

async fn run_server<S: KvStore>(
    settings: &Settings,
    store: S,
    codec: KeyCodec,
) -> anyhow::Result<()> {
    let service = Arc::new(ShortLinkService::new(
        Arc::new(store),
        codec,
        settings.service.clone(),
    ));
    let router = App::router(AppState::new(service.clone()));

    let listener = tokio::net::TcpListener::bind(settings.listen_addr())
        .await
        .with_context(|| format!("failed to bind {}", settings.listen_addr()))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("draining access workers");
    service.shutdown().await;
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
