use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exercise_catalog::{api, config::ServerConfig, db};

#[derive(Parser)]
#[command(name = "exercise-catalog")]
#[command(about = "Strength-training exercise catalog API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Host to bind (overrides EXERCISE_CATALOG_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port for HTTP API (overrides EXERCISE_CATALOG_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite database file (overrides EXERCISE_CATALOG_DB)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Load exercises from a JSON array file into the catalog
    Seed {
        /// JSON file in the free-exercise-db layout
        file: PathBuf,

        /// SQLite database file (overrides EXERCISE_CATALOG_DB)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "exercise_catalog=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(config: &ServerConfig) -> anyhow::Result<db::Database> {
    let db = match &config.database_path {
        Some(path) => db::Database::open(path.clone())?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let db = open_database(&config)?;
    let app = api::create_router_with_config(db, &config);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Exercise catalog listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Exercise catalog stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = ServerConfig::from_env();

    match cli.command {
        Some(Commands::Serve { host, port, db }) => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if db.is_some() {
                config.database_path = db;
            }
            serve(config).await?;
        }
        Some(Commands::Seed { file, db }) => {
            if db.is_some() {
                config.database_path = db;
            }
            let db = open_database(&config)?;
            let summary = db.import_json_file(&file)?;
            println!(
                "Imported {} exercises ({} skipped)",
                summary.inserted, summary.skipped
            );
        }
        None => {
            serve(config).await?;
        }
    }

    Ok(())
}
