//! To-do API server
//!
//! A REST API for to-do lists and their items, persisted in a single JSON
//! file.
//!
//! # Configuration
//!
//! Environment variables:
//! - `TODO_API_CONFIG`: Path to config file (default: ~/.config/todo-api/config.yaml)
//! - `TODO_API_ENV`: `development`, `test` or `production` (default: development)
//! - `TODO_API_PORT`: Port to listen on (default: 3000)
//! - `TODO_API_DATA_DIR`: Directory holding the store files (default: ./database)
//! - `TODO_API_DATABASE_PATH`: Explicit store file, overrides the two above
//!
//! # Config File Format
//!
//! ```yaml
//! port: 3000
//! environment: production
//! data_dir: /var/lib/todo-api
//! ```

use axum::{extract::Request, ServiceExt};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod models;
mod server;

use config::Config;
use server::{AppState, Store};

#[derive(Parser)]
#[command(name = "todo-api")]
#[command(version)]
#[command(about = "REST API for to-do lists and their items", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(long, short)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config)?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    tracing::info!(
        "Working on {} environment",
        config.environment.to_string().to_uppercase()
    );

    let db_path = config.database_path();
    let store = Store::open(&db_path)?;
    tracing::info!("Database: {}", db_path.display());

    let app = server::router(AppState::new(store));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
