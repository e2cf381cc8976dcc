use anyhow::Result;
use landing::{
    auth::{create_http_client, GoTrueProvider},
    config::{Config, DocumentsLocation},
    documents::{DocumentSource, FileDocumentSource, HttpDocumentSource},
    landing::Landing,
    web, AppState,
};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting landing service");

    // Load configuration from environment
    let config = Config::load()?;
    tracing::info!(
        environment = ?config.environment,
        production = config.is_production(),
        public_url = %config.public_url,
        documents = ?config.documents,
        "Configuration loaded"
    );

    // One HTTP client shared by document fetches and the identity provider
    let http = create_http_client(
        config.http_connect_timeout_secs,
        config.http_request_timeout_secs,
    )
    .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

    let documents: Arc<dyn DocumentSource> = match &config.documents {
        DocumentsLocation::Url(url) => Arc::new(
            HttpDocumentSource::new(url, http.clone())
                .map_err(|e| anyhow::anyhow!("LANDING_DOCUMENTS_URL is not a valid URL: {}", e))?,
        ),
        DocumentsLocation::Dir(dir) => Arc::new(FileDocumentSource::new(dir)),
    };

    let landing = Landing::new(
        documents,
        Arc::new(GoTrueProvider::new(http)),
        config.redirect_settings(),
    );

    // Create shared application state
    let shutdown = CancellationToken::new();
    let bind_address = config.bind_address();
    let state = Arc::new(AppState {
        config: Arc::new(config),
        landing: Arc::new(landing),
        shutdown: shutdown.clone(),
    });

    let app = web::create_router(state);

    // Bind and serve
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Landing page listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("HTTP server exited");
    Ok(())
}

/// Wait for ctrl-c or SIGTERM, then cancel in-flight external calls
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
