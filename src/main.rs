use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;

use signal::unix::{signal as unix_signal, SignalKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tidynest_pricing::config::Config;
use tidynest_pricing::pricing::policy::PricingPolicy;
use tidynest_pricing::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::load();

    let policy = match &config.policy_path {
        Some(path) => {
            info!("Loading pricing policy overrides from {path}");
            PricingPolicy::from_file(path)
                .with_context(|| format!("failed to load pricing policy from {path}"))?
        }
        None => PricingPolicy::default(),
    };
    policy
        .validate()
        .context("pricing policy failed validation")?;

    let app = router(AppState::new(policy));

    let address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Pricing service listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        unix_signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
