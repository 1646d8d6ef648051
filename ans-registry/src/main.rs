//! ans-registry - Agent Name Service registry server

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ans_registry::{AppState, RegistryConfig, StorageBackend, api};
use ans_trust::GatewayTrust;

#[derive(Parser)]
#[command(name = "ans-registry")]
#[command(about = "Agent Name Service registry server", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to a TOML configuration file
    #[arg(short, long, env = "ANS_CONFIG")]
    config: Option<PathBuf>,

    /// Bind host
    #[arg(long, env = "ANS_HOST")]
    host: Option<String>,

    /// Bind port
    #[arg(short, long, env = "ANS_PORT")]
    port: Option<u16>,

    /// CA certificate PEM file
    #[arg(long, env = "ANS_CA_CERT", requires = "ca_key")]
    ca_cert: Option<PathBuf>,

    /// CA private key PEM file
    #[arg(long, env = "ANS_CA_KEY", requires = "ca_cert")]
    ca_key: Option<PathBuf>,

    /// Bearer token trust mode (proof-of-possession or ca-rooted)
    #[arg(long, env = "ANS_AUTH_MODE")]
    auth_mode: Option<GatewayTrust>,

    /// Storage backend
    #[arg(long, env = "ANS_STORAGE")]
    storage: Option<StorageBackend>,
}

impl Cli {
    fn apply(self, mut config: RegistryConfig) -> RegistryConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let (Some(cert), Some(key)) = (self.ca_cert, self.ca_key) {
            config = config.with_ca_files(cert, key);
        }
        if let Some(mode) = self.auth_mode {
            config.auth_mode = mode;
        }
        if let Some(storage) = self.storage {
            config.storage = storage;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RegistryConfig::from_file(path)?,
        None => RegistryConfig::default(),
    };

    // RUST_LOG wins over -v, which wins over the file
    let level = match cli.verbose {
        0 => config.log_level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    let config = cli.apply(config);
    run(config).await
}

async fn run(config: RegistryConfig) -> anyhow::Result<()> {
    let address = config.bind_address();
    tracing::info!(
        address = %address,
        storage = %config.storage,
        auth_mode = %config.auth_mode,
        cors = config.cors_enabled,
        "starting ans-registry"
    );

    let state = AppState::from_config(config)?;
    let app = api::create_router(state);

    let listener = TcpListener::bind(&address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("ans-registry stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
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
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
