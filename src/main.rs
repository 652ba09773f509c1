use std::sync::Arc;

use anyhow::Context;

use vosyn_transcriber::infrastructure::audio::CandleWhisperLoader;
use vosyn_transcriber::infrastructure::observability::{TracingConfig, init_tracing};
use vosyn_transcriber::infrastructure::storage::BlobStoreFactory;
use vosyn_transcriber::presentation::{Environment, Settings, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment)?;

    init_tracing(&TracingConfig::new(environment, &settings.logging));

    let store = BlobStoreFactory::create(&settings.storage).context("creating blob store")?;
    let loader = Arc::new(CandleWhisperLoader::new(settings.whisper_options()));

    run(&settings, store, loader, shutdown_signal())
        .await
        .context("running server")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
