use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::AppConfig;
use crate::database::{DatabaseManager, Repositories};
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "noteful-api")]
#[command(about = "Noteful API - personal notes with folders, tags and search")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, env = "PORT", help = "Port to listen on")]
    pub port: Option<u16>,

    #[arg(long, global = true, help = "Keep data in memory instead of PostgreSQL")]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Start the HTTP server (default)")]
    Serve,

    #[command(about = "Apply database migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config, cli.memory).await,
        Commands::Migrate => migrate(config).await,
    }
}

async fn migrate(config: AppConfig) -> Result<()> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;
    Ok(())
}

async fn serve(config: AppConfig, memory: bool) -> Result<()> {
    info!("Starting Noteful API in {:?} mode", config.environment);

    let repos = if memory {
        info!("Using in-memory storage; data is lost on exit");
        Repositories::memory()
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        if config.database.run_migrations {
            DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;
        }
        Repositories::postgres(pool)
    };

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, repos)?;
    let app = crate::app(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Noteful API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
