//! pushrelay — HTTP relay forwarding push-notification requests to FCM.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pushrelay_fcm::{FcmClient, load_service_account};
use pushrelay_server::{AppState, ChannelSet, PrometheusOutcomes, build_router, metrics};

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "pushrelay", about = "Push-notification relay for FCM")]
struct Cli {
    /// Address to listen on (`host:port` or `:port`).
    #[arg(long, default_value = "localhost:8842")]
    addr: String,

    /// Path to the service account credentials JSON. Defaults to
    /// `$GOOGLE_APPLICATION_CREDENTIALS`, then `service-account.json`
    /// next to the executable, then in the working directory.
    #[arg(long)]
    credentials_file: Option<PathBuf>,
}

/// Resolve the default credentials path when `--credentials-file` is
/// not given.
fn default_credentials_file() -> PathBuf {
    if let Ok(path) = std::env::var("GOOGLE_APPLICATION_CREDENTIALS") {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            return dir.join("service-account.json");
        }
    }
    PathBuf::from("service-account.json")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let handle = metrics::install_recorder();

    // Startup is fail-fast: missing or bad credentials exit non-zero
    // before any traffic is served.
    let credentials = cli
        .credentials_file
        .unwrap_or_else(default_credentials_file);
    let account = load_service_account(&credentials)
        .with_context(|| format!("loading credentials from {}", credentials.display()))?;
    let client = FcmClient::new(&account).context("initializing FCM client")?;

    let state = AppState {
        deliverer: Arc::new(client),
        outcomes: Arc::new(PrometheusOutcomes),
        channels: Arc::new(ChannelSet::default()),
    };
    let router = build_router(state, handle);

    let listener = tokio::net::TcpListener::bind(&cli.addr)
        .await
        .with_context(|| format!("binding {}", cli.addr))?;
    info!(addr = %cli.addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;
    Ok(())
}

/// Resolve when the process receives SIGINT or SIGTERM, letting
/// in-flight deliveries run to completion before the server exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        let _ = signal.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
