use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use linkhash::auth::accounts;
use linkhash::config::{Cli, Config};
use linkhash::state::AppState;
use linkhash::{db, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal outside development
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Ok(path) = dotenv {
        tracing::info!("Loaded environment from {}", path.display());
    }

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Initialize database
    tracing::info!("Database: {}", config.db_path().display());
    let pool = db::create_pool(config.db_path())?;
    db::run_migrations(&pool)?;

    if let Some((username, password)) = config.admin_credentials() {
        accounts::ensure_admin(&pool, username, password)?;
    }

    let state = AppState {
        db: pool,
        config: config.clone(),
    };
    let app = routes::router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
