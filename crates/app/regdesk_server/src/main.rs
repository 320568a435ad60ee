//! Regdesk API server binary.
//!
//! Reads configuration from the environment (and `.env`), runs migrations,
//! and serves the HTTP API. `seed-admin` creates the first admin account.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use object_store::aws::AmazonS3Builder;
use regdesk_api::AppState;
use regdesk_api::config::ApiConfig;
use regdesk_core::auth::jwt::TokenSigner;
use regdesk_core::auth::queries::PgAccountStore;
use regdesk_core::clients::queries::PgClientStore;
use regdesk_core::uploads::FileIntake;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "regdesk_server", about = "Regdesk API server")]
struct Args {
    /// Maximum number of database connections in the pool.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Serve,
    /// Create an admin account if the email is not taken yet.
    SeedAdmin {
        #[arg(long, env = "SEED_ADMIN_EMAIL", default_value = "admin@regdesk.local")]
        email: String,
        #[arg(long, env = "SEED_ADMIN_PASSWORD")]
        password: String,
        #[arg(long, env = "SEED_ADMIN_NAME", default_value = "Administrator")]
        name: String,
    },
}

fn build_state(config: ApiConfig, pool: PgPool) -> Result<AppState, Box<dyn std::error::Error>> {
    let mut s3 = AmazonS3Builder::from_env()
        .with_bucket_name(&config.s3_bucket)
        .with_region(&config.aws_region);
    if let Some(endpoint) = &config.aws_endpoint {
        s3 = s3
            .with_endpoint(endpoint)
            .with_allow_http(endpoint.starts_with("http://"));
    }
    let uploads = FileIntake::new(Arc::new(s3.build()?), config.public_file_base());
    let tokens = TokenSigner::new(config.jwt_secret.as_bytes(), config.jwt_expires_in)?;

    Ok(AppState {
        accounts: Arc::new(PgAccountStore::new(pool.clone())),
        clients: Arc::new(PgClientStore::new(pool)),
        uploads,
        tokens,
        config,
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,regdesk_api=debug,regdesk_core=debug")),
        )
        .init();

    let args = Args::parse();
    let config = ApiConfig::from_env()?;

    info!(max_connections = args.max_connections, "configuring connection pool");
    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    info!("running database migrations");
    regdesk_api::migrate(&pool).await?;

    let bind_addr = config.bind_addr.clone();
    let state = build_state(config, pool)?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let app = regdesk_api::router(state);
            let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
            info!(addr = %listener.local_addr()?, "REST API listening");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        Command::SeedAdmin {
            email,
            password,
            name,
        } => match regdesk_api::services::auth::seed_admin(&state, &email, &password, &name).await {
            Ok(Some(account)) => info!(account_id = %account.id, email = %account.email, "admin account created"),
            Ok(None) => info!(email = %email, "admin account already exists"),
            Err(e) => return Err(e.into()),
        },
    }

    Ok(())
}
