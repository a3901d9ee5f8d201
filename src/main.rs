use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stroke_predict::api::{self, SecurityConfig};
use stroke_predict::config::ServerConfig;
use stroke_predict::inference::{StrokeModel, TreeEnsemble};

#[derive(Parser)]
#[command(name = "stroke-predict")]
#[command(about = "Stroke risk prediction API backed by an XGBoost model")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the prediction server
    Serve {
        /// Interface to bind (overrides STROKE_API_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port for HTTP API (overrides STROKE_API_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the model artifact (overrides STROKE_MODEL_PATH)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },
    /// Load a model artifact and print a summary
    ValidateModel {
        /// Defaults to STROKE_MODEL_PATH or the bundled model location
        path: Option<PathBuf>,
    },
    /// Check whether a running server is healthy
    Status {
        #[arg(long, default_value = "http://127.0.0.1:8000")]
        url: String,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "stroke_predict=info,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = ServerConfig::from_env()?;

    match cli.command {
        Some(Commands::Serve { host, port, model }) => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(model) = model {
                config.model_path = model;
            }
            serve(config).await?;
        }
        Some(Commands::ValidateModel { path }) => {
            let path = path.unwrap_or(config.model_path);
            let model = load_model(&path)?;
            let info = model.info();
            println!("Model:      {}", info.name);
            println!("Objective:  {}", info.objective);
            println!("Trees:      {}", info.num_trees);
            println!("Threshold:  {}", info.threshold);
            println!("Features:   {}", info.feature_names.join(", "));
        }
        Some(Commands::Status { url }) => {
            check_status(&url).await?;
        }
        None => serve(config).await?,
    }

    Ok(())
}

fn load_model(path: &std::path::Path) -> anyhow::Result<TreeEnsemble> {
    TreeEnsemble::load(path)
        .with_context(|| format!("Failed to load model from '{}'", path.display()))
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let model = match load_model(&config.model_path) {
        Ok(model) => model,
        Err(e) => {
            tracing::error!("{:#}", e);
            return Err(e);
        }
    };
    tracing::info!(
        trees = model.num_trees(),
        path = %config.model_path.display(),
        "Model pipeline loaded successfully"
    );

    let app = api::create_router(Arc::new(model), SecurityConfig::from_config(&config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    tracing::info!(
        "Stroke prediction API listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("Shutdown signal received");
}

async fn check_status(url: &str) -> anyhow::Result<()> {
    println!("Checking {}...", url);
    api::check_health(url).await?;
    println!("Server is healthy");
    Ok(())
}
