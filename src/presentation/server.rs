use std::future::Future;
use std::io;
use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::application::ports::{BlobStore, ModelLoader};
use crate::application::services::{ModelProvisioner, ProvisionError, TranscriptionService};
use crate::presentation::config::Settings;
use crate::presentation::router::create_router;
use crate::presentation::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("provisioning model: {0}")]
    Provision(#[from] ProvisionError),
    #[error("invalid listen address: {0}")]
    Address(#[from] AddrParseError),
    #[error("binding {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
    #[error("serving: {0}")]
    Serve(io::Error),
}

/// Provisions the model, then binds and serves until `shutdown` resolves.
///
/// Nothing is bound unless provisioning succeeds.
pub async fn run<F>(
    settings: &Settings,
    store: Arc<dyn BlobStore>,
    loader: Arc<dyn ModelLoader>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let provisioner =
        ModelProvisioner::new(Arc::clone(&store), loader, settings.provision_settings());
    let model = provisioner.provision().await.inspect_err(|e| {
        tracing::error!(kind = ?e.kind(), error = %e, "Model provisioning failed");
    })?;

    let transcription_service = Arc::new(TranscriptionService::new(
        store,
        model,
        settings.scratch_dir(),
    ));
    let router = create_router(AppState::new(transcription_service));

    let addr: SocketAddr = format!("{}:{}", settings.listen_host, settings.listen_port).parse()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)?;

    tracing::info!("Server stopped");
    Ok(())
}
