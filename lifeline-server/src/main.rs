//! # Lifeline Server
//!
//! Emergency-dispatch bookkeeping backend.
//!
//! Records SOS tickets, manages rescuer accounts/status/location, assigns
//! rescuers to tickets, and relays per-ticket chat. Built on Axum with
//! PostgreSQL for persistent storage; the assignment workflow is the one
//! transactional operation and lives in `lifeline-core`.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lifeline_core::{AuthCrypto, DispatchService, PostgresStore};
use lifeline_server::{infra::config::Config, routes, AppState};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "lifeline-server")]
#[command(about = "Emergency-dispatch bookkeeping backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Server host
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, env = "SERVER_PORT", default_value_t = 8080)]
    port: u16,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Some(Command::Db(DbCommand::Migrate)) = cli.command {
        let config = load_config(&cli.serve)?;
        let store = connect_store(&config).await?;
        store
            .run_migrations()
            .await
            .context("failed to apply migrations")?;
        info!("Migrations applied");
        return Ok(());
    }

    run_server(cli.serve).await
}

fn load_config(args: &ServeArgs) -> Result<Config> {
    let database_url = args
        .database_url
        .clone()
        .context("DATABASE_URL must be set")?;

    Ok(Config {
        database_url,
        host: args.host.clone(),
        port: args.port,
    })
}

async fn connect_store(config: &Config) -> Result<PostgresStore> {
    PostgresStore::connect(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")
}

async fn run_server(args: ServeArgs) -> Result<()> {
    let config = load_config(&args)?;

    let store = connect_store(&config).await?;
    store
        .run_migrations()
        .await
        .context("failed to apply migrations")?;

    let crypto = AuthCrypto::new().context("failed to initialize password hashing")?;
    let dispatch = Arc::new(DispatchService::new(Arc::new(store), Arc::new(crypto)));
    let state = AppState::new(dispatch, Arc::new(config.clone()));

    let router = routes::create_router(state);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
