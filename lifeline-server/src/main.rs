mod config;

use std::sync::Arc;

use clap::Parser;
use sqlx::SqlitePool;

use lifeline::Lifeline;
use lifeline_storage_sqlite::SqliteRepositoryProvider;

use crate::config::{DEV_JWT_SECRET, ServerConfig};

/// Command line interface for the Lifeline backend.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database connection string
    #[arg(long, env = "LIFELINE_DATABASE_URL", default_value = "sqlite::memory:")]
    database_url: String,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(clap::Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Socket address to bind
        #[arg(long, env = "LIFELINE_ADDR", default_value = "0.0.0.0:5000")]
        addr: String,

        /// HS256 signing secret for session tokens
        #[arg(long, env = "LIFELINE_JWT_SECRET", default_value = DEV_JWT_SECRET)]
        jwt_secret: String,
    },
    /// Create the database schema
    Migrate,
    /// Create or update the bootstrap admin account
    SeedAdmin {
        #[arg(long, env = "LIFELINE_ADMIN_EMAIL")]
        email: String,

        #[arg(long, env = "LIFELINE_ADMIN_PASSWORD")]
        password: String,

        #[arg(long, env = "LIFELINE_ADMIN_NAME", default_value = "Lifeline Admin")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let pool = SqlitePool::connect(&cli.database_url).await?;
    let repositories = Arc::new(SqliteRepositoryProvider::new(pool));

    match cli.command {
        Commands::Serve { addr, jwt_secret } => {
            let config = ServerConfig {
                addr,
                database_url: cli.database_url,
                jwt_secret,
                ..ServerConfig::default()
            };
            config.validate()?;

            if config.jwt_secret == DEV_JWT_SECRET {
                tracing::warn!(
                    "running with the development JWT secret; set LIFELINE_JWT_SECRET in production"
                );
            }

            let lifeline = Arc::new(Lifeline::with_options(
                repositories,
                config.jwt_config(),
                config.lockout.clone(),
                Arc::new(lifeline_core::SystemClock),
            )?);

            lifeline.migrate().await?;

            let router = lifeline_axum::create_router(lifeline);
            let listener = tokio::net::TcpListener::bind(&config.addr).await?;

            tracing::info!(addr = %config.addr, "lifeline listening");
            axum::serve(listener, router).await?;
        }
        Commands::Migrate => {
            tracing::info!("running migrations");
            let lifeline = Lifeline::new(
                repositories,
                ServerConfig::default().jwt_config(),
            )?;
            lifeline.migrate().await?;
            tracing::info!("migrations complete");
        }
        Commands::SeedAdmin {
            email,
            password,
            name,
        } => {
            let lifeline = Lifeline::new(
                repositories,
                ServerConfig::default().jwt_config(),
            )?;
            lifeline.migrate().await?;
            let admin = lifeline.ensure_admin(&name, &email, &password).await?;
            tracing::info!(email = %admin.email, "admin user ready");
        }
    }

    Ok(())
}
