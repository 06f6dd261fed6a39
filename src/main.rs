use anyhow::Context;
use api_rest::AppState;
use dental_core::analysis::ToothAnalysisClient;
use dental_core::services::AuthService;
use dental_core::{open_datastore, AppConfig, Services};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the dental practice backend
///
/// Resolves configuration from the environment (and `.env`), opens the configured
/// datastore and serves the REST API until SIGINT or SIGTERM.
///
/// # Environment Variables
/// - `DENTAL_REST_ADDR`: listen address (default: "0.0.0.0:8080")
/// - `DENTAL_DATASTORE`: `postgres` or `memory`
/// - `DATABASE_URL`: Postgres connection string
/// - `JWT_SECRET`: session token secret
/// - `ML_SERVICE_URL`: base URL of the tooth-analysis service; the route is absent without it
/// - `SHUTDOWN_GRACE_SECS`: how long in-flight requests may run after a shutdown signal
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dental=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().context("failed to read configuration")?;
    if config.auth.using_dev_secret {
        tracing::warn!("JWT_SECRET is not set; signing sessions with the development secret");
    }

    let store = open_datastore(&config).await?;
    let auth = AuthService::from_config(&store, &config.auth)?;
    let mut state = AppState::new(Services::new(&store, auth));
    match config.ml_service_url.as_deref() {
        Some(url) => {
            tracing::info!(url, "tooth analysis enabled");
            state = state.with_analysis(ToothAnalysisClient::new(url)?);
        }
        None => tracing::info!("ML_SERVICE_URL is not set; tooth analysis disabled"),
    }

    let listener = tokio::net::TcpListener::bind(&config.rest_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.rest_addr))?;
    tracing::info!("++ Starting dental REST on {}", config.rest_addr);

    api_rest::serve(
        listener,
        api_rest::router(state),
        shutdown_signal(),
        config.shutdown_grace,
    )
    .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
