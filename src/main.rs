use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use noteful_api::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "noteful_api=info,tower_http=info".into()))
        .with(fmt::layer())
        .init();

    cli::run(Cli::parse()).await
}
