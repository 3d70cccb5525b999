//! Pet registry service entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pet_registry::api::{create_router, AppState};
use pet_registry::config::Config;
use pet_registry::metrics;
use pet_registry::store::PetStore;

/// Pet registry CRUD service.
#[derive(Parser, Debug)]
#[command(name = "pet-registry")]
#[command(about = "HTTP CRUD API for pet records with groups and traits")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to the SQLite database file (":memory:" for in-memory).
    #[arg(short, long)]
    database: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP server port.
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the SQLite database file (":memory:" for in-memory).
        #[arg(short, long)]
        database: Option<String>,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("pet_registry=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::Serve { port, database }) => cmd_serve(port, database).await,
        None => cmd_serve(args.port, args.database).await,
    }
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("PET REGISTRY - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("Database path: {}", config.database_path);
    println!("Port: {}", config.port);
    println!("Page size: {}", config.page_size);

    Ok(())
}

/// Run the HTTP server.
async fn cmd_serve(
    port_override: Option<u16>,
    database_override: Option<String>,
) -> anyhow::Result<()> {
    // Load configuration
    info!("Loading configuration...");
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Override with CLI args if provided
    if let Some(port) = port_override {
        config.port = port;
    }
    if let Some(database) = database_override {
        config.database_path = database;
    }

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    info!("Configuration loaded successfully");
    info!(
        "Database: {}",
        if config.is_in_memory() {
            "in-memory"
        } else {
            &config.database_path
        }
    );
    info!("Page size: {}", config.page_size);

    // Install Prometheus exporter
    let prometheus = PrometheusBuilder::new().install_recorder()?;
    metrics::init_metrics();

    // Open the store (creates the schema on first run)
    let store = PetStore::open(&config.database_path).await?;

    let state = AppState {
        store,
        page_size: config.page_size,
        prometheus: Some(prometheus),
    };

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let router = create_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

/// Wait for ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
