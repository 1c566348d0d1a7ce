//! deaddrop server binary.

use anyhow::{Context, Result};
use clap::Parser;
use deaddrop_core::config::AppConfig;
use deaddrop_server::{AppState, create_router};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::future::IntoFuture;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// deaddrop - one-time message relay
#[derive(Parser, Debug)]
#[command(name = "deaddropd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "DEADDROP_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("deaddrop v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;

    // Initialize the storage backend and fail fast if it is unreachable.
    // This is a boot-time check only; the /health endpoint stays
    // liveness-only and never consults storage.
    let store = deaddrop_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;
    store
        .ping()
        .await
        .context("storage backend is not reachable")?;
    tracing::info!(backend = store.backend_name(), "storage backend ready");

    let state = AppState::new(config, store);
    let shutdown_grace = state.config.server.shutdown_grace();
    let app = create_router(state.clone());

    let addr: SocketAddr = state
        .config
        .server
        .bind
        .parse()
        .context("invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    tracing::info!("Listening on {addr}");

    // Serve with ConnectInfo for client address logging. On a shutdown
    // signal, stop accepting and drain in-flight requests for at most
    // `shutdown_grace` before the task is aborted outright.
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal());
    let mut server_task = tokio::spawn(server.into_future());

    tokio::select! {
        res = &mut server_task => res.context("server task failed")??,
        _ = shutdown_signal() => {
            tracing::info!(
                grace_secs = shutdown_grace.as_secs(),
                "shutdown signal received, draining in-flight requests"
            );
            match tokio::time::timeout(shutdown_grace, &mut server_task).await {
                Ok(res) => res.context("server task failed")??,
                Err(_) => {
                    tracing::warn!("shutdown grace period elapsed, terminating");
                    server_task.abort();
                }
            }
        }
    }

    Ok(())
}

/// Load configuration from an optional TOML file merged with
/// `DEADDROP_`-prefixed environment variables (nested keys split on `__`,
/// e.g. `DEADDROP_SERVER__BIND=0.0.0.0:8080`).
fn load_config(path: &str) -> Result<AppConfig> {
    let config_path = std::path::Path::new(path);
    let mut figment = Figment::new();

    if config_path.exists() {
        tracing::info!(config_path = %path, "loading configuration from file");
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::debug!("no config file found at {path}, using defaults and environment");
    }

    figment
        .merge(Env::prefixed("DEADDROP_").split("__"))
        .extract()
        .context("failed to load configuration")
}

/// Resolve when the process receives SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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
}
